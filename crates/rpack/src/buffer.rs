//! Segmented output buffer used to stage section data during repacking.

use std::io::{self, Write};

use crate::types::PART_ALIGNMENT;

/// Largest contiguous allocation a single chunk may grow to. Keeps huge
/// sections from ever demanding one multi-gigabyte `Vec`.
const MAX_CHUNK_SIZE: usize = 1_900_000_000;

/// Append-only byte buffer spanning multiple fixed-capacity chunks.
///
/// Section payloads are accumulated here while walking files in processing
/// order, then flushed once to the output stream via
/// [`ChunkedBuffer::copy_to`]. The buffer is never read back during assembly,
/// so it exposes no read API.
#[derive(Debug, Default)]
pub struct ChunkedBuffer {
    chunks: Vec<Vec<u8>>,
    len: u64,
}

impl ChunkedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of bytes appended so far.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append zero bytes until the buffer length reaches the next 16-byte
    /// boundary.
    pub fn pad_to_alignment(&mut self) -> io::Result<()> {
        let padding = (PART_ALIGNMENT - self.len % PART_ALIGNMENT) % PART_ALIGNMENT;
        if padding > 0 {
            self.write_all(&vec![0u8; padding as usize])?;
        }
        Ok(())
    }

    /// Flush every chunk, in order, into `writer`.
    pub fn copy_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for chunk in &self.chunks {
            writer.write_all(chunk)?;
        }
        Ok(())
    }
}

impl Write for ChunkedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut remaining = buf;

        while !remaining.is_empty() {
            let space = match self.chunks.last() {
                Some(chunk) if chunk.len() < MAX_CHUNK_SIZE => MAX_CHUNK_SIZE - chunk.len(),
                _ => {
                    self.chunks.push(Vec::new());
                    MAX_CHUNK_SIZE
                }
            };

            let take = remaining.len().min(space);
            let chunk = self
                .chunks
                .last_mut()
                .expect("a chunk is always available after the space check");
            chunk.extend_from_slice(&remaining[..take]);
            self.len += take as u64;
            remaining = &remaining[take..];
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::ChunkedBuffer;

    #[test]
    fn starts_empty() {
        let buffer = ChunkedBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn appends_and_flushes_in_order() -> std::io::Result<()> {
        let mut buffer = ChunkedBuffer::new();
        buffer.write_all(b"Hello ")?;
        buffer.write_all(b"World")?;
        assert_eq!(buffer.len(), 11);

        let mut out = Vec::new();
        buffer.copy_to(&mut out)?;
        assert_eq!(out, b"Hello World");

        Ok(())
    }

    #[test]
    fn pads_to_sixteen_bytes() -> std::io::Result<()> {
        let mut buffer = ChunkedBuffer::new();
        buffer.write_all(&[0xFF; 10])?;
        buffer.pad_to_alignment()?;
        assert_eq!(buffer.len(), 16);

        // Already aligned, nothing appended.
        buffer.pad_to_alignment()?;
        assert_eq!(buffer.len(), 16);

        let mut out = Vec::new();
        buffer.copy_to(&mut out)?;
        assert_eq!(&out[10..], &[0u8; 6]);

        Ok(())
    }
}
