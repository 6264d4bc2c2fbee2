use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::TransferError;

/// One chunk of file data, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based position of the chunk within the file.
    pub index: u64,
    /// Byte offset within the file.
    pub offset: u64,
    /// Raw chunk data.
    pub data: Vec<u8>,
}

impl Chunk {
    /// Size of this chunk in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Where the bytes of a [`FileDescriptor`] come from.
#[derive(Debug, Clone)]
pub enum ContentSource {
    /// A file on disk, opened lazily when its session starts.
    Path(PathBuf),
    /// Bytes already held in memory.
    Memory(Arc<[u8]>),
}

/// A file submitted for upload. Immutable once created.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    name: String,
    size: u64,
    source: ContentSource,
}

impl FileDescriptor {
    /// Describes a file on disk, taking its name and size from the filesystem.
    pub fn from_path(path: &Path) -> Result<Self, TransferError> {
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            name,
            size: metadata.len(),
            source: ContentSource::Path(path.to_path_buf()),
        })
    }

    /// Describes in-memory content under the given name.
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            size: data.len() as u64,
            source: ContentSource::Memory(data),
        }
    }

    /// Builds a descriptor from parts. `size` is trusted as given.
    pub fn new(name: impl Into<String>, size: u64, source: ContentSource) -> Self {
        Self {
            name: name.into(),
            size,
            source,
        }
    }

    /// File name as shown to the user and sent to the server.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Content handle.
    pub fn source(&self) -> &ContentSource {
        &self.source
    }
}
