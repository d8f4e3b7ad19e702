//! Utility macros shared by the message types.

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
/// Every `with_*` method validates its input with it before building the new value,
/// so a rejected input never produces a half-modified message.
///
/// # Example
///
/// ```ignore
/// ensure!(!target.contains(char::is_whitespace), ArgumentError::invalid_request_target(target));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error.into());
        }
    };
}

pub(crate) use ensure;
