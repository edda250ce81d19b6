//! Pull-based gzip compression of a byte source.
//!
//! [`GzipStream`] owns its source and produces the gzip-compressed form of
//! it on demand. Memory use is bounded by one source chunk plus whatever the
//! encoder emits for that chunk, independent of the source size. The stream
//! is a single forward pass and cannot be rewound.

use std::io::{self, ErrorKind, Read, Write};

use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;

use crate::constants::GZIP_CHUNK_SIZE;

/// Gzip-compressing reader over an owned source.
pub struct GzipStream<R: Read> {
    source: R,
    /// Encoder writing into the buffer of compressed bytes not yet handed out
    encoder: GzEncoder<Vec<u8>>,
    /// Read position inside the encoder's buffer
    pos: usize,
    chunk: Vec<u8>,
    source_done: bool,
    bytes_in: u64,
}

impl<R: Read> GzipStream<R> {
    /// Wrap `source`, compressing at the maximum level.
    pub fn new(source: R) -> Self {
        GzipStream {
            source,
            encoder: GzEncoder::new(Vec::with_capacity(GZIP_CHUNK_SIZE), Compression::best()),
            pos: 0,
            chunk: vec![0u8; GZIP_CHUNK_SIZE],
            source_done: false,
            bytes_in: 0,
        }
    }

    /// Total bytes consumed from the source so far.
    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Consume the stream as a sequence of compressed chunks of up to
    /// `GZIP_CHUNK_SIZE` bytes each.
    pub fn chunks(self) -> GzipChunks<R> {
        GzipChunks {
            stream: self,
            done: false,
        }
    }

    fn pending(&self) -> &[u8] {
        &self.encoder.get_ref()[self.pos..]
    }

    /// Feed one source chunk to the encoder, or finish it once the source
    /// is exhausted.
    fn refill(&mut self) -> io::Result<()> {
        // Reuse the buffer from the front
        self.encoder.get_mut().clear();
        self.pos = 0;

        let n = loop {
            match self.source.read(&mut self.chunk) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };

        if n == 0 {
            self.encoder.try_finish()?;
            self.source_done = true;
            debug!("Compressed stream finished after {} input bytes", self.bytes_in);
        } else {
            self.bytes_in += n as u64;
            self.encoder.write_all(&self.chunk[..n])?;
        }
        Ok(())
    }
}

impl<R: Read> Read for GzipStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            let pending = self.pending();
            if !pending.is_empty() {
                let n = pending.len().min(buf.len());
                buf[..n].copy_from_slice(&pending[..n]);
                self.pos += n;
                return Ok(n);
            }
            if self.source_done {
                return Ok(0);
            }
            self.refill()?;
        }
    }
}

/// Iterator over the compressed bytes of a [`GzipStream`].
///
/// Yields filled chunks of `GZIP_CHUNK_SIZE` bytes (the last one may be
/// shorter). Iteration stops after the first error.
pub struct GzipChunks<R: Read> {
    stream: GzipStream<R>,
    done: bool,
}

impl<R: Read> Iterator for GzipChunks<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut chunk = vec![0u8; GZIP_CHUNK_SIZE];
        let mut filled = 0;
        while filled < chunk.len() {
            match self.stream.read(&mut chunk[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        if filled == 0 {
            self.done = true;
            return None;
        }
        chunk.truncate(filled);
        Some(Ok(chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Cursor;

    fn decompress(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_empty_source() {
        let mut stream = GzipStream::new(Cursor::new(Vec::new()));
        let mut compressed = Vec::new();
        stream.read_to_end(&mut compressed).unwrap();

        assert!(!compressed.is_empty());
        assert_eq!(decompress(&compressed), Vec::<u8>::new());
        assert_eq!(stream.bytes_in(), 0);
    }

    #[test]
    fn test_small_reads() {
        let data = b"hello hello hello hello".to_vec();
        let mut stream = GzipStream::new(Cursor::new(data.clone()));

        let mut compressed = Vec::new();
        let mut buf = [0u8; 3];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            compressed.extend_from_slice(&buf[..n]);
        }
        assert_eq!(decompress(&compressed), data);
    }

    #[test]
    fn test_chunks_multi_chunk() {
        let data: Vec<u8> = (0..GZIP_CHUNK_SIZE * 3 + 17)
            .map(|i| (i * 7919 % 251) as u8)
            .collect();
        let chunks: Vec<Vec<u8>> = GzipStream::new(Cursor::new(data.clone()))
            .chunks()
            .collect::<io::Result<_>>()
            .unwrap();

        assert!(chunks
            .iter()
            .rev()
            .skip(1)
            .all(|c| c.len() == GZIP_CHUNK_SIZE));
        assert_eq!(decompress(&chunks.concat()), data);
    }

    #[test]
    fn test_source_error_propagates() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(ErrorKind::Other, "disk gone"))
            }
        }

        let mut chunks = GzipStream::new(Failing).chunks();
        assert!(matches!(chunks.next(), Some(Err(_))));
        assert!(chunks.next().is_none());
    }
}
