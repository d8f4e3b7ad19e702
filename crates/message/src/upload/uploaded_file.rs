use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use mime::Mime;
use tracing::{debug, error};
use triomphe::Arc;

use super::error_code::UploadError;
use super::mover::{FileMover, FsMover, MoveMode};
use crate::error::{ArgumentError, MessageError, RuntimeError};
use crate::stream::Stream;
use crate::utils::ensure;

/// A file received as part of a server request.
///
/// `UploadedFile` is a shared handle: clones refer to the same upload, and moving it through
/// one clone marks every clone as moved. After a move the content is gone from the original
/// location and [`stream`](UploadedFile::stream) fails.
#[derive(Clone)]
pub struct UploadedFile {
    inner: Arc<Inner>,
}

struct Inner {
    file: Option<PathBuf>,
    stream: Stream,
    size: Option<u64>,
    error: UploadError,
    client_filename: Option<String>,
    client_media_type: Option<String>,
    mode: MoveMode,
    mover: Box<dyn FileMover>,
    moved: Mutex<bool>,
}

impl UploadedFile {
    /// An upload stored at `path`. The file is opened for reading and writing and created when
    /// missing.
    pub fn from_path<P: Into<PathBuf>>(path: P) -> UploadedFileBuilder {
        UploadedFileBuilder::new(Source::Path(path.into()))
    }

    /// An upload backed by an existing stream. The stream's `uri` metadata, when present, is the
    /// file that [`move_to`](UploadedFile::move_to) moves; otherwise the content is written out.
    pub fn from_stream(stream: Stream) -> UploadedFileBuilder {
        UploadedFileBuilder::new(Source::Stream(stream))
    }

    /// The file backing this upload, if it lives on disk.
    pub fn file(&self) -> Option<&Path> {
        self.inner.file.as_deref()
    }

    /// The upload's stream.
    ///
    /// # Errors
    ///
    /// Fails with [`RuntimeError::AlreadyMoved`] once the upload was moved.
    pub fn stream(&self) -> Result<Stream, RuntimeError> {
        ensure!(!self.is_moved(), RuntimeError::AlreadyMoved);
        Ok(self.inner.stream.clone())
    }

    pub fn size(&self) -> Option<u64> {
        self.inner.size
    }

    pub fn error(&self) -> UploadError {
        self.inner.error
    }

    pub fn client_filename(&self) -> Option<&str> {
        self.inner.client_filename.as_deref()
    }

    pub fn client_media_type(&self) -> Option<&str> {
        self.inner.client_media_type.as_deref()
    }

    /// The client media type parsed as a MIME type, `None` when absent or malformed.
    pub fn mime(&self) -> Option<Mime> {
        self.client_media_type()?.parse().ok()
    }

    pub fn is_moved(&self) -> bool {
        self.inner.moved.lock().map_or(true, |moved| *moved)
    }

    /// Moves the upload to `target`.
    ///
    /// # Errors
    ///
    /// - an empty target, or a target whose directory is missing or read-only, is an
    ///   argument error
    /// - moving an upload twice, or a failing move, is a runtime error
    pub fn move_to<P: AsRef<Path>>(&self, target: P) -> Result<(), MessageError> {
        let target = target.as_ref();
        check_target(target)?;

        let mut moved = self.inner.moved.lock().map_err(RuntimeError::from)?;
        ensure!(!*moved, RuntimeError::AlreadyMoved);

        match &self.inner.file {
            Some(file) => {
                debug!(from = %file.display(), to = %target.display(), mode = ?self.inner.mode, "moving uploaded file");
                self.inner.mover.move_file(file, target, self.inner.mode).map_err(|source| {
                    error!(from = %file.display(), to = %target.display(), %source, "failed to move uploaded file");
                    RuntimeError::move_failed(file, target, source)
                })?;
            }
            None => {
                debug!(to = %target.display(), "writing in-memory upload");
                let contents = self.read_all()?;
                fs::write(target, &contents).map_err(RuntimeError::io)?;
            }
        }

        *moved = true;
        self.inner.stream.close();
        Ok(())
    }

    /// Copies the upload into `target` and removes the source file.
    ///
    /// The source file is removed before `target` is written, so a failed removal leaves
    /// `target` untouched and the upload can be moved again. Once the source is gone the
    /// upload counts as moved, even if writing `target` then fails.
    ///
    /// # Errors
    ///
    /// Fails when the upload was already moved, `target` is not writable, or the source file
    /// cannot be removed.
    pub fn move_to_stream(&self, target: &Stream) -> Result<(), MessageError> {
        let mut moved = self.inner.moved.lock().map_err(RuntimeError::from)?;
        ensure!(!*moved, RuntimeError::AlreadyMoved);
        ensure!(target.is_writable(), RuntimeError::NotWritable);

        let contents = self.read_all()?;

        if let Some(file) = &self.inner.file {
            debug!(from = %file.display(), "removing uploaded file before copying it to a stream");
            fs::remove_file(file).map_err(RuntimeError::io)?;
        }

        match target.write(&contents) {
            Err(error) if self.inner.file.is_none() => Err(error.into()),
            written => {
                *moved = true;
                self.inner.stream.close();
                written.map(|_| ()).map_err(Into::into)
            }
        }
    }

    fn read_all(&self) -> Result<bytes::Bytes, RuntimeError> {
        let stream = &self.inner.stream;
        if stream.is_seekable() {
            stream.rewind()?;
        }
        stream.contents()
    }
}

fn check_target(target: &Path) -> Result<(), ArgumentError> {
    ensure!(!target.as_os_str().is_empty(), ArgumentError::invalid_target_path(target, "path is empty"));

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let writable = fs::metadata(dir).is_ok_and(|metadata| metadata.is_dir() && !metadata.permissions().readonly());
    if !writable {
        debug!(target = %target.display(), "upload target directory is missing or not writable");
        return Err(ArgumentError::invalid_target_path(target, "directory does not exist or is not writable"));
    }

    Ok(())
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file", &self.inner.file)
            .field("size", &self.inner.size)
            .field("error", &self.inner.error)
            .field("client_filename", &self.inner.client_filename)
            .field("client_media_type", &self.inner.client_media_type)
            .field("moved", &self.is_moved())
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
enum Source {
    Path(PathBuf),
    Stream(Stream),
}

/// Options of an [`UploadedFile`], validated in [`build`](UploadedFileBuilder::build).
pub struct UploadedFileBuilder {
    source: Source,
    size: Option<u64>,
    error: Result<UploadError, ArgumentError>,
    client_filename: Option<String>,
    client_media_type: Option<String>,
    mode: MoveMode,
    mover: Box<dyn FileMover>,
}

impl UploadedFileBuilder {
    fn new(source: Source) -> Self {
        Self {
            source,
            size: None,
            error: Ok(UploadError::Ok),
            client_filename: None,
            client_media_type: None,
            mode: MoveMode::Rename,
            mover: Box::new(FsMover),
        }
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the upload error from an [`UploadError`] or a numeric code.
    pub fn error<E>(mut self, error: E) -> Self
    where
        E: TryInto<UploadError>,
        E::Error: Into<ArgumentError>,
    {
        self.error = error.try_into().map_err(Into::into);
        self
    }

    pub fn client_filename<S: Into<String>>(mut self, name: S) -> Self {
        self.client_filename = Some(name.into());
        self
    }

    pub fn client_media_type<S: Into<String>>(mut self, media_type: S) -> Self {
        self.client_media_type = Some(media_type.into());
        self
    }

    /// Marks the upload as received by this server, moved with [`MoveMode::Privileged`].
    pub fn privileged(mut self, privileged: bool) -> Self {
        self.mode = if privileged { MoveMode::Privileged } else { MoveMode::Rename };
        self
    }

    /// Replaces the default [`FsMover`].
    pub fn mover<M: FileMover + 'static>(mut self, mover: M) -> Self {
        self.mover = Box::new(mover);
        self
    }

    /// # Errors
    ///
    /// An invalid upload error code is an argument error; a path that cannot be opened is a
    /// runtime error.
    pub fn build(self) -> Result<UploadedFile, MessageError> {
        let error = self.error?;

        let (file, stream) = match self.source {
            Source::Path(path) => {
                let stream = Stream::open(&path, "c+b")?;
                (Some(path), stream)
            }
            Source::Stream(stream) => {
                let file = stream.metadata().and_then(|metadata| metadata.uri);
                (file, stream)
            }
        };

        Ok(UploadedFile {
            inner: Arc::new(Inner {
                file,
                stream,
                size: self.size,
                error,
                client_filename: self.client_filename,
                client_media_type: self.client_media_type,
                mode: self.mode,
                mover: self.mover,
                moved: Mutex::new(false),
            }),
        })
    }
}

impl fmt::Debug for UploadedFileBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFileBuilder")
            .field("source", &self.source)
            .field("size", &self.size)
            .field("error", &self.error)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::mover::MockFileMover;
    use std::io;

    fn temp_upload(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("upload.tmp");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_accessors() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_upload(dir.path(), "png");

        let upload = UploadedFile::from_path(&path)
            .size(4096)
            .error(UploadError::Ok)
            .client_filename("testfile")
            .client_media_type("image/png")
            .build()
            .unwrap();

        assert_eq!(upload.file(), Some(path.as_path()));
        assert_eq!(upload.size(), Some(4096));
        assert_eq!(upload.error(), UploadError::Ok);
        assert_eq!(upload.client_filename(), Some("testfile"));
        assert_eq!(upload.client_media_type(), Some("image/png"));
        assert_eq!(upload.mime(), Some(mime::IMAGE_PNG));
        assert!(!upload.is_moved());
        assert_eq!(upload.stream().unwrap().to_string(), "png");
    }

    #[test]
    fn test_defaults() {
        let upload = UploadedFile::from_stream(Stream::memory()).build().unwrap();
        assert_eq!(upload.file(), None);
        assert_eq!(upload.size(), None);
        assert_eq!(upload.error(), UploadError::Ok);
        assert_eq!(upload.client_filename(), None);
        assert_eq!(upload.mime(), None);
    }

    #[test]
    fn test_invalid_error_code() {
        let error = UploadedFile::from_stream(Stream::memory()).error(5).build().unwrap_err();
        assert!(error.is_invalid_argument());

        let error = UploadedFile::from_stream(Stream::memory()).error(-1).build().unwrap_err();
        assert!(error.is_invalid_argument());

        let upload = UploadedFile::from_stream(Stream::memory()).error(8).build().unwrap();
        assert_eq!(upload.error(), UploadError::Extension);
    }

    #[test]
    fn test_stream_is_the_original() {
        let stream = Stream::from_bytes("data");
        let upload = UploadedFile::from_stream(stream.clone()).build().unwrap();
        assert!(upload.stream().unwrap().ptr_eq(&stream));
    }

    #[test]
    fn test_file_comes_from_stream_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_upload(dir.path(), "data");
        let stream = Stream::open(&path, "r").unwrap();

        let upload = UploadedFile::from_stream(stream).build().unwrap();
        assert_eq!(upload.file(), Some(path.as_path()));
    }

    #[test]
    fn test_move_to() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_upload(dir.path(), "moved content");
        let target = dir.path().join("target.txt");

        let upload = UploadedFile::from_path(&path).build().unwrap();
        upload.move_to(&target).unwrap();

        assert!(upload.is_moved());
        assert!(!path.exists());
        assert_eq!(fs::read_to_string(&target).unwrap(), "moved content");
    }

    #[test]
    fn test_stream_fails_after_move() {
        let dir = tempfile::tempdir().unwrap();
        let upload = UploadedFile::from_path(temp_upload(dir.path(), "x")).build().unwrap();
        let clone = upload.clone();

        upload.move_to(dir.path().join("target")).unwrap();

        assert!(matches!(clone.stream(), Err(RuntimeError::AlreadyMoved)));
    }

    #[test]
    fn test_move_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        let upload = UploadedFile::from_path(temp_upload(dir.path(), "x")).build().unwrap();

        upload.move_to(dir.path().join("first")).unwrap();
        let error = upload.move_to(dir.path().join("second")).unwrap_err();

        assert!(matches!(error, MessageError::Runtime { source: RuntimeError::AlreadyMoved }));
    }

    #[test]
    fn test_invalid_targets() {
        let dir = tempfile::tempdir().unwrap();
        let upload = UploadedFile::from_path(temp_upload(dir.path(), "x")).build().unwrap();

        let error = upload.move_to("").unwrap_err();
        assert!(error.is_invalid_argument());

        let error = upload.move_to(dir.path().join("missing_dir").join("target")).unwrap_err();
        assert!(error.is_invalid_argument());
        assert!(!upload.is_moved());
    }

    #[test]
    fn test_invalid_target_is_checked_before_moved_state() {
        let dir = tempfile::tempdir().unwrap();
        let upload = UploadedFile::from_path(temp_upload(dir.path(), "x")).build().unwrap();
        upload.move_to(dir.path().join("first")).unwrap();

        let error = upload.move_to("").unwrap_err();
        assert!(error.is_invalid_argument());
    }

    #[test]
    fn test_memory_upload_is_written_out() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("memory.txt");

        let upload = UploadedFile::from_stream(Stream::from_bytes("in memory")).build().unwrap();
        upload.move_to(&target).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "in memory");
    }

    #[test]
    fn test_privileged_move_uses_privileged_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_upload(dir.path(), "x");
        let target = dir.path().join("target");

        let expected_from = path.clone();
        let expected_to = target.clone();
        let mut mover = MockFileMover::new();
        mover
            .expect_move_file()
            .withf(move |from, to, mode| from == expected_from && to == expected_to && *mode == MoveMode::Privileged)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let upload = UploadedFile::from_path(&path).privileged(true).mover(mover).build().unwrap();
        upload.move_to(&target).unwrap();
        assert!(upload.is_moved());
    }

    #[test]
    fn test_failed_move_is_runtime_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut mover = MockFileMover::new();
        mover
            .expect_move_file()
            .times(1)
            .returning(|_, _, _| Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")));

        let upload = UploadedFile::from_path(temp_upload(dir.path(), "x")).mover(mover).build().unwrap();
        let error = upload.move_to(dir.path().join("target")).unwrap_err();

        assert!(matches!(error, MessageError::Runtime { source: RuntimeError::MoveFailed { .. } }));
        assert!(!upload.is_moved());
        assert!(upload.stream().is_ok());
    }

    #[test]
    fn test_move_to_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_upload(dir.path(), "streamed");
        let upload = UploadedFile::from_path(&path).build().unwrap();

        let target = Stream::memory();
        upload.move_to_stream(&target).unwrap();

        assert_eq!(target.to_string(), "streamed");
        assert!(!path.exists());
        assert!(upload.is_moved());
        assert!(upload.move_to_stream(&target).is_err());
    }

    #[test]
    fn test_move_to_stream_failed_removal_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_upload(dir.path(), "streamed");
        let upload = UploadedFile::from_path(&path).build().unwrap();
        fs::remove_file(&path).unwrap();

        let target = Stream::memory();
        let error = upload.move_to_stream(&target).unwrap_err();

        assert!(error.is_runtime());
        assert!(!upload.is_moved());
        assert_eq!(target.size(), Some(0));
    }

    #[test]
    fn test_move_to_read_only_stream_fails_before_removal() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_upload(dir.path(), "kept");
        let target_path = dir.path().join("target.txt");
        fs::write(&target_path, "").unwrap();
        let upload = UploadedFile::from_path(&path).build().unwrap();

        let read_only = Stream::open(&target_path, "r").unwrap();
        let error = upload.move_to_stream(&read_only).unwrap_err();

        assert!(matches!(error, MessageError::Runtime { source: RuntimeError::NotWritable }));
        assert!(path.exists());
        assert!(!upload.is_moved());
    }
}
