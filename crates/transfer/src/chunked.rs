use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;

use crate::types::{Chunk, ContentSource, FileDescriptor};
use crate::{DEFAULT_CHUNK_SIZE, TransferError};

// ---------------------------------------------------------------------------
// ChunkPlan
// ---------------------------------------------------------------------------

/// Byte range of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpec {
    pub index: u64,
    pub offset: u64,
    pub length: u64,
}

/// Splits a file of known size into fixed-size chunks.
///
/// Every chunk is `chunk_size` bytes except possibly the last one.
/// Chunks cover `[0, file_size)` with no gap and no overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    file_size: u64,
    chunk_size: u64,
}

impl ChunkPlan {
    /// Creates a plan. If `chunk_size` is 0, [`DEFAULT_CHUNK_SIZE`] (1 MiB) is used.
    pub fn new(file_size: u64, chunk_size: u64) -> Self {
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        Self {
            file_size,
            chunk_size,
        }
    }

    /// `ceil(file_size / chunk_size)`; 0 for an empty file.
    pub fn total_chunks(&self) -> u64 {
        self.file_size.div_ceil(self.chunk_size)
    }

    /// Returns the byte range of chunk `index`, or `None` past the end.
    pub fn chunk(&self, index: u64) -> Option<ChunkSpec> {
        if index >= self.total_chunks() {
            return None;
        }
        let offset = index * self.chunk_size;
        let length = self.chunk_size.min(self.file_size - offset);
        Some(ChunkSpec {
            index,
            offset,
            length,
        })
    }

    /// Iterates over every chunk in index order.
    pub fn iter(&self) -> impl Iterator<Item = ChunkSpec> + '_ {
        (0..self.total_chunks()).filter_map(|i| self.chunk(i))
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }
}

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

enum Handle {
    File(std::fs::File),
    Memory(Arc<[u8]>),
}

/// Reads chunks of one file by index.
///
/// Blocking I/O; async callers run it inside `spawn_blocking`.
pub struct ChunkReader {
    handle: Handle,
    plan: ChunkPlan,
}

impl ChunkReader {
    /// Opens the descriptor's content for chunked reading.
    ///
    /// If `chunk_size` is 0, [`DEFAULT_CHUNK_SIZE`] (1 MiB) is used.
    pub fn open(descriptor: &FileDescriptor, chunk_size: u64) -> Result<Self, TransferError> {
        let handle = match descriptor.source() {
            ContentSource::Path(path) => Handle::File(std::fs::File::open(path)?),
            ContentSource::Memory(data) => Handle::Memory(Arc::clone(data)),
        };
        Ok(Self {
            handle,
            plan: ChunkPlan::new(descriptor.size(), chunk_size),
        })
    }

    /// Reads chunk `index`.
    ///
    /// Fails with an I/O error if the content is shorter than the size the
    /// descriptor was created with.
    pub fn read_chunk(&mut self, index: u64) -> Result<Chunk, TransferError> {
        let spec = self
            .plan
            .chunk(index)
            .ok_or(TransferError::ChunkOutOfRange {
                index,
                total: self.plan.total_chunks(),
            })?;

        let data = match &mut self.handle {
            Handle::File(file) => {
                file.seek(SeekFrom::Start(spec.offset))?;
                let mut buf = vec![0u8; spec.length as usize];
                file.read_exact(&mut buf)?;
                buf
            }
            Handle::Memory(bytes) => {
                let start = spec.offset as usize;
                let end = start + spec.length as usize;
                bytes
                    .get(start..end)
                    .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::UnexpectedEof))?
                    .to_vec()
            }
        };

        Ok(Chunk {
            index,
            offset: spec.offset,
            data,
        })
    }

    /// The plan this reader follows.
    pub fn plan(&self) -> &ChunkPlan {
        &self.plan
    }
}
