//! Sequential fixed-size file chunking
//!
//! Reads one chunk at a time so memory use is bounded by the chunk size,
//! never by the file size.

use crate::error::{Error, Result};
use bytes::Bytes;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Reads a file front to back in chunks of at most `chunk_size` bytes
#[derive(Debug)]
pub struct ChunkReader {
    file: File,
    chunk_size: u64,
    remaining: u64,
}

impl ChunkReader {
    /// Open `path` for chunked reading
    pub async fn open(path: &Path, chunk_size: u64) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::validation("Chunk size must be greater than zero"));
        }
        let file = File::open(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound {
                path: path.display().to_string(),
            },
            _ => Error::Io(e),
        })?;
        let remaining = file.metadata().await?.len();

        Ok(Self {
            file,
            chunk_size,
            remaining,
        })
    }

    /// Bytes not yet read
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Number of chunks a file of `len` bytes splits into
    pub fn chunk_count(len: u64, chunk_size: u64) -> u64 {
        if chunk_size == 0 {
            return 0;
        }
        len.div_ceil(chunk_size)
    }

    /// Read the next chunk, or `None` at end of file
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let want = self.chunk_size.min(self.remaining);
        let mut buf = Vec::with_capacity(want as usize);
        (&mut self.file).take(want).read_to_end(&mut buf).await?;

        if buf.is_empty() {
            // file shrank underneath us
            self.remaining = 0;
            return Ok(None);
        }
        self.remaining = self.remaining.saturating_sub(buf.len() as u64);
        Ok(Some(Bytes::from(buf)))
    }
}
