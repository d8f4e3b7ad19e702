//! Message bodies.
//!
//! A [`Stream`] is a shared handle over a byte resource. Every message clone points at the
//! same handle, so reading from the body of one copy moves the cursor seen by the others.
//! Only `with_body` replaces it.
//!
//! # Architecture
//!
//! - [`Stream`]: the handle, tracking end-of-stream and the detached state
//! - [`StreamResource`]: the byte capability behind a stream (read, write, seek, stat)
//!   - [`MemoryResource`]: an in-memory buffer, the default body of every message
//!   - [`FileResource`]: a file opened with an fopen-style [`OpenMode`]
//! - [`StreamMetadata`]: what a resource reports about itself (`uri`, `mode`, `seekable`)
//!
//! Failures of the underlying resource, and any operation on a detached stream, surface as
//! [`RuntimeError`](crate::RuntimeError).

mod handle;
mod mode;
mod resource;

pub use handle::Stream;
pub use mode::OpenMode;
pub use resource::FileResource;
pub use resource::MAX_MEMORY_SIZE;
pub use resource::MemoryResource;
pub use resource::StreamMetadata;
pub use resource::StreamResource;
