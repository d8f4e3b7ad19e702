use std::fmt;
use std::fs::OpenOptions;
use std::str::FromStr;

use tracing::debug;

use crate::error::ArgumentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// `r`: open existing for reading.
    Read,
    /// `w`: create or truncate for writing.
    Write,
    /// `a`: create, every write goes to the end.
    Append,
    /// `x`: create, fail when the file exists.
    Exclusive,
    /// `c`: create, keep existing content.
    Create,
}

/// An fopen-style open mode such as `"r"`, `"w+b"` or `"a+"`.
///
/// The first character selects the access (`r`, `w`, `a`, `x`, `c`), `+` adds the missing
/// direction, and `b` / `t` are accepted and ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenMode {
    access: Access,
    update: bool,
    raw: String,
}

impl OpenMode {
    /// `w+b`, the mode of in-memory buffers.
    pub(crate) fn memory() -> Self {
        Self { access: Access::Write, update: true, raw: "w+b".to_owned() }
    }

    pub fn is_readable(&self) -> bool {
        self.access == Access::Read || self.update
    }

    pub fn is_writable(&self) -> bool {
        self.access != Access::Read || self.update
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub(crate) fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options.read(self.is_readable());

        match self.access {
            Access::Read => options.write(self.update),
            Access::Write => options.write(true).create(true).truncate(true),
            Access::Append => options.append(true).create(true),
            Access::Exclusive => options.write(true).create_new(true),
            Access::Create => options.write(true).create(true),
        };

        options
    }
}

impl FromStr for OpenMode {
    type Err = ArgumentError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        let mut chars = mode.chars();

        let access = match chars.next() {
            Some('r') => Access::Read,
            Some('w') => Access::Write,
            Some('a') => Access::Append,
            Some('x') => Access::Exclusive,
            Some('c') => Access::Create,
            _ => {
                debug!(mode, "rejected stream open mode");
                return Err(ArgumentError::invalid_open_mode(mode));
            }
        };

        let mut update = false;
        for flag in chars {
            match flag {
                '+' if !update => update = true,
                'b' | 't' => {}
                _ => {
                    debug!(mode, "rejected stream open mode");
                    return Err(ArgumentError::invalid_open_mode(mode));
                }
            }
        }

        Ok(Self { access, update, raw: mode.to_owned() })
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directions() {
        let cases = [
            ("r", true, false),
            ("rb", true, false),
            ("r+", true, true),
            ("w", false, true),
            ("w+b", true, true),
            ("a", false, true),
            ("a+", true, true),
            ("x", false, true),
            ("c+t", true, true),
        ];

        for (raw, readable, writable) in cases {
            let mode: OpenMode = raw.parse().unwrap();
            assert_eq!(mode.is_readable(), readable, "{raw}");
            assert_eq!(mode.is_writable(), writable, "{raw}");
            assert_eq!(mode.to_string(), raw);
        }
    }

    #[test]
    fn test_invalid_modes() {
        for raw in ["", "z", "r++", "rw", "+r", "wq"] {
            assert_eq!(raw.parse::<OpenMode>(), Err(ArgumentError::invalid_open_mode(raw)), "{raw}");
        }
    }
}
