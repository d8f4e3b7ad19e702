//! Responses and their status line.
//!
//! A [`Response`] defaults to `200 OK`. [`Response::with_status`] takes any
//! [`IntoStatusCode`] value and fills the reason phrase from [`reason_phrase`] when none is
//! given; a code outside that table must come with its own phrase.

mod outgoing;
mod status;

pub use outgoing::Response;
pub use outgoing::ResponseBuilder;
pub use status::IntoStatusCode;
pub use status::reason_phrase;
