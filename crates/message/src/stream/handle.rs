use std::fmt;
use std::io::SeekFrom;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use bytes::{Bytes, BytesMut};
use serde_json::Value;
use tracing::{trace, warn};
use triomphe::Arc;

use super::mode::OpenMode;
use super::resource::{FileResource, MemoryResource, StreamMetadata, StreamResource};
use crate::error::{MessageError, RuntimeError};
use crate::utils::ensure;

const READ_CHUNK: usize = 8 * 1024;

/// A shared handle to a message body.
///
/// Cloning a `Stream` does not copy bytes: both handles drive the same resource and the same
/// cursor. Use [`Stream::ptr_eq`] to tell whether two handles are the same stream.
///
/// A stream becomes detached after [`close`](Stream::close) or [`detach`](Stream::detach).
/// A detached stream reports nothing as readable, writable or seekable, its [`eof`](Stream::eof)
/// is `true`, and I/O on it fails with [`RuntimeError::Detached`].
#[derive(Clone)]
pub struct Stream {
    inner: Arc<Mutex<StreamState>>,
}

#[derive(Debug)]
struct StreamState {
    resource: Option<Box<dyn StreamResource>>,
    eof: bool,
}

impl Stream {
    /// An empty in-memory stream.
    pub fn memory() -> Self {
        Self::from_resource(MemoryResource::new())
    }

    /// An in-memory stream holding `bytes`, positioned at the start.
    pub fn from_bytes<B: AsRef<[u8]>>(bytes: B) -> Self {
        Self::from_resource(MemoryResource::with_bytes(bytes.as_ref()))
    }

    pub fn from_resource<R: StreamResource + 'static>(resource: R) -> Self {
        Self { inner: Arc::new(Mutex::new(StreamState { resource: Some(Box::new(resource)), eof: false })) }
    }

    /// Opens the file at `path` with an fopen-style `mode` such as `"r"` or `"w+b"`.
    ///
    /// # Errors
    ///
    /// An unknown mode is an argument error, a file that cannot be opened a runtime error.
    pub fn open<P: AsRef<Path>>(path: P, mode: &str) -> Result<Self, MessageError> {
        let mode: OpenMode = mode.parse()?;
        let resource = FileResource::open(path.as_ref(), mode).map_err(RuntimeError::io)?;
        trace!(path = %path.as_ref().display(), mode = resource.metadata().mode.as_str(), "opened stream");
        Ok(Self::from_resource(resource))
    }

    /// Returns `true` when both handles share the same underlying stream.
    pub fn ptr_eq(&self, other: &Stream) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StreamState>, RuntimeError> {
        Ok(self.inner.lock()?)
    }

    /// Reads up to `len` bytes. Fewer bytes are returned only at the end of the stream, which
    /// also sets [`eof`](Stream::eof).
    ///
    /// # Errors
    ///
    /// Fails when the stream is detached, not readable, or the resource fails.
    pub fn read(&self, len: usize) -> Result<Bytes, RuntimeError> {
        let mut state = self.lock()?;
        let resource = state.readable()?;

        let mut buf = BytesMut::with_capacity(len.min(READ_CHUNK));
        let mut chunk = [0u8; READ_CHUNK];
        while buf.len() < len {
            let want = (len - buf.len()).min(READ_CHUNK);
            let n = resource.read(&mut chunk[..want])?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        state.eof = buf.len() < len;
        Ok(buf.freeze())
    }

    /// Reads everything from the current position to the end.
    ///
    /// # Errors
    ///
    /// Fails when the stream is detached, not readable, or the resource fails.
    pub fn contents(&self) -> Result<Bytes, RuntimeError> {
        let mut state = self.lock()?;
        let resource = state.readable()?;

        let mut contents = BytesMut::new();
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = resource.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            contents.extend_from_slice(&chunk[..n]);
        }

        state.eof = true;
        Ok(contents.freeze())
    }

    /// Writes all of `data` at the current position and returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Fails when the stream is detached, not writable, or the resource fails.
    pub fn write(&self, data: &[u8]) -> Result<usize, RuntimeError> {
        let mut state = self.lock()?;
        let resource = state.resource.as_mut().ok_or(RuntimeError::Detached)?;
        ensure!(resource.metadata().is_writable(), RuntimeError::NotWritable);

        resource.write(data)?;
        state.eof = false;
        Ok(data.len())
    }

    /// Moves the cursor and returns the new position.
    ///
    /// # Errors
    ///
    /// Fails when the stream is detached, not seekable, or the position is invalid.
    pub fn seek(&self, pos: SeekFrom) -> Result<u64, RuntimeError> {
        let mut state = self.lock()?;
        let resource = state.resource.as_mut().ok_or(RuntimeError::Detached)?;
        ensure!(resource.metadata().seekable, RuntimeError::NotSeekable);

        let position = resource.seek(pos)?;
        state.eof = false;
        Ok(position)
    }

    /// Seeks back to the start.
    ///
    /// # Errors
    ///
    /// Same as [`seek`](Stream::seek).
    pub fn rewind(&self) -> Result<(), RuntimeError> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Returns the current position.
    ///
    /// # Errors
    ///
    /// Fails when the stream is detached or the position cannot be determined.
    pub fn tell(&self) -> Result<u64, RuntimeError> {
        let mut state = self.lock()?;
        let resource = state.resource.as_mut().ok_or(RuntimeError::Detached)?;
        Ok(resource.seek(SeekFrom::Current(0))?)
    }

    pub fn eof(&self) -> bool {
        self.lock().map_or(true, |state| state.eof || state.resource.is_none())
    }

    /// Size in bytes, `None` when detached or unknown.
    pub fn size(&self) -> Option<u64> {
        self.with_resource(|resource| resource.size()).flatten()
    }

    pub fn is_readable(&self) -> bool {
        self.metadata().is_some_and(|metadata| metadata.is_readable())
    }

    pub fn is_writable(&self) -> bool {
        self.metadata().is_some_and(|metadata| metadata.is_writable())
    }

    pub fn is_seekable(&self) -> bool {
        self.metadata().is_some_and(|metadata| metadata.seekable)
    }

    /// Metadata of the underlying resource, `None` when detached.
    pub fn metadata(&self) -> Option<StreamMetadata> {
        self.with_resource(|resource| resource.metadata())
    }

    /// A single metadata entry: `"uri"`, `"mode"` or `"seekable"`.
    pub fn metadata_value(&self, key: &str) -> Option<Value> {
        let metadata = self.metadata()?;
        match key {
            "uri" => metadata.uri.map(|uri| Value::String(uri.display().to_string())),
            "mode" => Some(Value::String(metadata.mode.to_string())),
            "seekable" => Some(Value::Bool(metadata.seekable)),
            _ => None,
        }
    }

    /// Releases the resource. Every handle to this stream becomes detached.
    pub fn close(&self) {
        drop(self.detach());
    }

    /// Takes the resource out of the stream, leaving every handle detached.
    pub fn detach(&self) -> Option<Box<dyn StreamResource>> {
        let mut state = self.lock().ok()?;
        state.eof = true;
        state.resource.take()
    }

    fn with_resource<T, F>(&self, f: F) -> Option<T>
    where
        F: FnOnce(&(dyn StreamResource + 'static)) -> T,
    {
        let state = self.lock().ok()?;
        state.resource.as_deref().map(f)
    }
}

impl StreamState {
    fn readable(&mut self) -> Result<&mut Box<dyn StreamResource>, RuntimeError> {
        let resource = self.resource.as_mut().ok_or(RuntimeError::Detached)?;
        ensure!(resource.metadata().is_readable(), RuntimeError::NotReadable);
        Ok(resource)
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::memory()
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.lock() {
            Ok(state) => f.debug_struct("Stream").field("resource", &state.resource).field("eof", &state.eof).finish(),
            Err(_) => f.write_str("Stream { <poisoned> }"),
        }
    }
}

/// Rewinds when possible and renders the whole content, lossily decoded as UTF-8.
///
/// Never fails: a stream that cannot be read renders as an empty string.
impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_seekable()
            && let Err(error) = self.rewind()
        {
            warn!(%error, "failed to rewind stream, rendering as empty");
            return Ok(());
        }

        match self.contents() {
            Ok(contents) => f.write_str(&String::from_utf8_lossy(&contents)),
            Err(error) => {
                warn!(%error, "failed to read stream, rendering as empty");
                Ok(())
            }
        }
    }
}
