use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::BytesMut;

use super::mode::OpenMode;

/// Largest size an in-memory buffer may grow to through writes.
pub const MAX_MEMORY_SIZE: usize = u32::MAX as usize;

/// The byte capability behind a [`Stream`](super::Stream).
///
/// Implementations only move bytes; the owning stream checks readability, writability and
/// seekability before calling in, and keeps the end-of-stream flag itself.
pub trait StreamResource: fmt::Debug + Send {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes all of `buf`.
    fn write(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Moves the cursor and returns the new absolute position.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64>;

    /// Total size in bytes, when known.
    fn size(&self) -> Option<u64>;

    fn metadata(&self) -> StreamMetadata;
}

/// What a resource reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMetadata {
    /// Filesystem path of the resource, `None` for in-memory buffers.
    pub uri: Option<PathBuf>,
    pub mode: OpenMode,
    pub seekable: bool,
}

impl StreamMetadata {
    pub fn is_readable(&self) -> bool {
        self.mode.is_readable()
    }

    pub fn is_writable(&self) -> bool {
        self.mode.is_writable()
    }
}

/// A growable in-memory buffer opened `w+b`.
#[derive(Debug, Default)]
pub struct MemoryResource {
    buf: BytesMut,
    pos: usize,
}

impl MemoryResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer holding `bytes` with the cursor at the start.
    pub fn with_bytes(bytes: &[u8]) -> Self {
        Self { buf: BytesMut::from(bytes), pos: 0 }
    }

    #[cfg(test)]
    fn snapshot(&self) -> &[u8] {
        &self.buf
    }
}

impl StreamResource for MemoryResource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.buf.get(self.pos..).unwrap_or_default();
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }

    /// Writing past the end zero-fills the gap. The buffer never grows beyond
    /// [`MAX_MEMORY_SIZE`].
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        let end = match self.pos.checked_add(data.len()) {
            Some(end) if end <= MAX_MEMORY_SIZE => end,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("write at position {} exceeds the memory stream limit", self.pos),
                ));
            }
        };

        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[self.pos..end].copy_from_slice(data);
        self.pos = end;
        Ok(())
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let base = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::End(offset) => self.buf.len() as i128 + i128::from(offset),
            SeekFrom::Current(offset) => self.pos as i128 + i128::from(offset),
        };

        self.pos = usize::try_from(base).map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;
        Ok(self.pos as u64)
    }

    fn size(&self) -> Option<u64> {
        Some(self.buf.len() as u64)
    }

    fn metadata(&self) -> StreamMetadata {
        StreamMetadata { uri: None, mode: OpenMode::memory(), seekable: true }
    }
}

/// A file on disk.
#[derive(Debug)]
pub struct FileResource {
    file: File,
    path: PathBuf,
    mode: OpenMode,
}

impl FileResource {
    /// Opens `path` with `mode`.
    ///
    /// # Errors
    ///
    /// Returns the filesystem error when the file cannot be opened with that mode.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> io::Result<Self> {
        let path = path.as_ref();
        let file = mode.open_options().open(path)?;
        Ok(Self { file, path: path.to_path_buf(), mode })
    }

}

impl StreamResource for FileResource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }

    fn size(&self) -> Option<u64> {
        self.file.metadata().ok().map(|metadata| metadata.len())
    }

    fn metadata(&self) -> StreamMetadata {
        StreamMetadata { uri: Some(self.path.clone()), mode: self.mode.clone(), seekable: true }
    }
}
