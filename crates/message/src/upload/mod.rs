//! Uploaded files of a server request.
//!
//! An [`UploadedFile`] wraps the temporary file (or stream) the server stored an upload in,
//! together with what the client reported about it. It can be moved exactly once, either to a
//! path with [`UploadedFile::move_to`] or into another stream with
//! [`UploadedFile::move_to_stream`].
//!
//! Moving goes through the [`FileMover`] capability so callers can swap the filesystem
//! for something else; [`FsMover`] is the default.

mod error_code;
mod mover;
mod uploaded_file;

pub use error_code::UploadError;
pub use mover::FileMover;
pub use mover::FsMover;
pub use mover::MoveMode;
pub use uploaded_file::UploadedFile;
pub use uploaded_file::UploadedFileBuilder;
