use std::fs;
use std::io;
use std::path::Path;

use tracing::trace;

/// How an uploaded file leaves its temporary location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMode {
    /// A plain rename, falling back to copy and remove across filesystems.
    Rename,
    /// For files the server itself received: the source must be a regular file.
    Privileged,
}

/// The file-move capability used by [`UploadedFile::move_to`](super::UploadedFile::move_to).
#[cfg_attr(test, mockall::automock)]
pub trait FileMover: Send + Sync {
    /// Moves `from` to `to`, replacing `to` if it exists.
    ///
    /// # Errors
    ///
    /// Returns the filesystem error that stopped the move.
    fn move_file(&self, from: &Path, to: &Path, mode: MoveMode) -> io::Result<()>;
}

/// Moves files with `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMover;

impl FileMover for FsMover {
    fn move_file(&self, from: &Path, to: &Path, mode: MoveMode) -> io::Result<()> {
        if mode == MoveMode::Privileged && !fs::symlink_metadata(from)?.is_file() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "privileged move source is not a regular file"));
        }

        match fs::rename(from, to) {
            Err(error) if error.kind() == io::ErrorKind::CrossesDevices => {
                trace!(from = %from.display(), to = %to.display(), "rename crosses devices, copying instead");
                fs::copy(from, to)?;
                fs::remove_file(from)
            }
            result => result,
        }
    }
}
