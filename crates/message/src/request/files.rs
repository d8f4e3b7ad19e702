use std::fmt::Write as _;
use std::iter;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::error::ArgumentError;
use crate::upload::UploadedFile;

/// The uploaded files of a server request, nested the way the form fields named them.
///
/// Leaves must be [`UploadedFile`]s. Anything else that ended up in the tree is kept as
/// [`FileTree::Other`] so [`validate`](FileTree::validate) can report where it is.
#[derive(Debug, Clone)]
pub enum FileTree {
    File(UploadedFile),
    List(Vec<FileTree>),
    Map(IndexMap<String, FileTree>),
    Other(Value),
}

impl FileTree {
    /// Checks that the root is a list or a map and that every leaf, at any depth, is an
    /// uploaded file. Empty lists and maps are fine.
    ///
    /// # Errors
    ///
    /// Fails for a bare file at the root, and names the first leaf that is not an uploaded
    /// file.
    pub fn validate(&self) -> Result<(), ArgumentError> {
        if let Self::File(file) = self {
            debug!(?file, "rejected uploaded files tree with a single file at its root");
            return Err(ArgumentError::invalid_uploaded_files("root must be a list or a map, not a single file"));
        }

        let mut path = String::new();
        self.validate_at(&mut path)
    }

    fn validate_at(&self, path: &mut String) -> Result<(), ArgumentError> {
        match self {
            Self::File(_) => Ok(()),
            Self::List(items) => items.iter().enumerate().try_for_each(|(index, item)| {
                let len = path.len();
                let _ = write!(path, "[{index}]");
                let result = item.validate_at(path);
                path.truncate(len);
                result
            }),
            Self::Map(entries) => entries.iter().try_for_each(|(key, item)| {
                let len = path.len();
                let _ = write!(path, "[{key}]");
                let result = item.validate_at(path);
                path.truncate(len);
                result
            }),
            Self::Other(value) => {
                let at = if path.is_empty() { "root" } else { path.as_str() };
                debug!(at, %value, "rejected uploaded files tree");
                Err(ArgumentError::invalid_uploaded_files(format!("{at} is not an uploaded file")))
            }
        }
    }

    /// Iterates the uploaded files in the tree, depth first.
    pub fn files(&self) -> Box<dyn Iterator<Item = &UploadedFile> + '_> {
        match self {
            Self::File(file) => Box::new(iter::once(file)),
            Self::List(items) => Box::new(items.iter().flat_map(FileTree::files)),
            Self::Map(entries) => Box::new(entries.values().flat_map(FileTree::files)),
            Self::Other(_) => Box::new(iter::empty()),
        }
    }

    /// The subtree under `key` of a map.
    pub fn get(&self, key: &str) -> Option<&FileTree> {
        match self {
            Self::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }

    /// `true` for an empty list or map.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::List(items) => items.is_empty(),
            Self::Map(entries) => entries.is_empty(),
            Self::File(_) | Self::Other(_) => false,
        }
    }
}

impl Default for FileTree {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl From<UploadedFile> for FileTree {
    fn from(file: UploadedFile) -> Self {
        Self::File(file)
    }
}

impl<T: Into<FileTree>> From<Vec<T>> for FileTree {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FileTree>> From<IndexMap<String, T>> for FileTree {
    fn from(entries: IndexMap<String, T>) -> Self {
        Self::Map(entries.into_iter().map(|(key, item)| (key, item.into())).collect())
    }
}

/// Arrays and objects become lists and maps; every other value is an [`Other`](FileTree::Other)
/// leaf.
impl From<Value> for FileTree {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => items.into(),
            Value::Object(entries) => Self::Map(entries.into_iter().map(|(key, item)| (key, item.into())).collect()),
            other => Self::Other(other),
        }
    }
}

impl<K: Into<String>, T: Into<FileTree>> FromIterator<(K, T)> for FileTree {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().map(|(key, item)| (key.into(), item.into())).collect())
    }
}
