//! Length-prefixed chunk writer.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::core::{Error, Result};

/// Bytes in a chunk length prefix.
pub const LENGTH_PREFIX: usize = 4;

/// Appends `[u32 LE length][payload]` chunks to a byte sink.
///
/// Empty payloads are never written: an empty match has no place in a
/// corpus. The writer is the only thing that may touch its sink, so chunk
/// order on disk is exactly call order.
#[derive(Debug)]
pub struct ChunkWriter<W: Write> {
    inner: W,
    chunks: usize,
    skipped: usize,
    bytes: u64,
}

impl<W: Write> ChunkWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            chunks: 0,
            skipped: 0,
            bytes: 0,
        }
    }

    /// Write one chunk. Returns `false` if the payload was empty and skipped.
    pub fn write_chunk(&mut self, payload: &[u8]) -> Result<bool> {
        if payload.is_empty() {
            self.skipped += 1;
            return Ok(false);
        }
        let len = u32::try_from(payload.len()).map_err(|_| Error::ChunkTooLarge {
            len: payload.len(),
        })?;
        self.inner.write_u32::<LittleEndian>(len)?;
        self.inner.write_all(payload)?;
        self.chunks += 1;
        self.bytes += (LENGTH_PREFIX + payload.len()) as u64;
        Ok(true)
    }

    /// Chunks written so far.
    #[must_use]
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Empty payloads skipped so far.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Bytes written so far, prefixes included.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and hand back the sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_layout() {
        let mut writer = ChunkWriter::new(Vec::new());
        assert!(writer.write_chunk(&[0xaa, 0xbb, 0xcc]).unwrap());

        let out = writer.into_inner().unwrap();
        assert_eq!(out, vec![3, 0, 0, 0, 0xaa, 0xbb, 0xcc]);
    }

    #[test]
    fn test_empty_payload_skipped() {
        let mut writer = ChunkWriter::new(Vec::new());
        assert!(!writer.write_chunk(&[]).unwrap());
        assert!(writer.write_chunk(&[1]).unwrap());
        assert!(!writer.write_chunk(&[]).unwrap());

        assert_eq!(writer.chunks(), 1);
        assert_eq!(writer.skipped(), 2);
        assert_eq!(writer.bytes_written(), 5);
        assert_eq!(writer.into_inner().unwrap(), vec![1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_chunks_concatenate_in_order() {
        let mut writer = ChunkWriter::new(Vec::new());
        writer.write_chunk(&[1]).unwrap();
        writer.write_chunk(&[2, 2]).unwrap();

        let out = writer.into_inner().unwrap();
        assert_eq!(out, vec![1, 0, 0, 0, 1, 2, 0, 0, 0, 2, 2]);
    }
}
