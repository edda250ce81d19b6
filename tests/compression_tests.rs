//! Integration tests for the streaming gzip compressor.

use std::io::{Cursor, Read};

use anyhow::Result;
use flate2::read::GzDecoder;
use proptest::prelude::*;

use artifact_publisher::constants::GZIP_CHUNK_SIZE;
use artifact_publisher::utils::compress::GzipStream;

fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    GzipStream::new(Cursor::new(data.to_vec())).read_to_end(&mut out)?;
    Ok(out)
}

#[test]
fn test_round_trip_empty() -> Result<()> {
    assert_eq!(gunzip(&compress(b"")?)?, b"");
    Ok(())
}

#[test]
fn test_round_trip_single_chunk() -> Result<()> {
    let data = b"2024-01-01 12:00:00 INFO job started\n".repeat(10);
    assert!(data.len() < GZIP_CHUNK_SIZE);
    assert_eq!(gunzip(&compress(&data)?)?, data);
    Ok(())
}

#[test]
fn test_round_trip_multi_chunk() -> Result<()> {
    let data: Vec<u8> = (0..GZIP_CHUNK_SIZE * 5 + 123)
        .map(|i| ((i * 31) ^ (i >> 7)) as u8)
        .collect();
    assert_eq!(gunzip(&compress(&data)?)?, data);
    Ok(())
}

#[test]
fn test_compresses_text() -> Result<()> {
    let data = b"repeated log line\n".repeat(4096);
    let compressed = compress(&data)?;
    assert!(compressed.len() * 10 < data.len());
    Ok(())
}

#[test]
fn test_chunk_iterator() -> Result<()> {
    let data = vec![b'x'; GZIP_CHUNK_SIZE * 2];
    let mut stream = GzipStream::new(Cursor::new(data.clone()));
    let mut first = [0u8; 4];
    stream.read_exact(&mut first)?;
    // gzip magic
    assert_eq!(&first[..2], &[0x1f, 0x8b]);

    let mut joined = first.to_vec();
    for chunk in stream.chunks() {
        let chunk = chunk?;
        assert!(!chunk.is_empty() && chunk.len() <= GZIP_CHUNK_SIZE);
        joined.extend_from_slice(&chunk);
    }
    assert_eq!(gunzip(&joined)?, data);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_round_trip(data in proptest::collection::vec(any::<u8>(), 0..(GZIP_CHUNK_SIZE * 3))) {
        let compressed = compress(&data).unwrap();
        prop_assert_eq!(gunzip(&compressed).unwrap(), data);
    }

    #[test]
    fn prop_read_size_does_not_matter(
        data in proptest::collection::vec(any::<u8>(), 0..4096),
        read_size in 1usize..64,
    ) {
        let mut stream = GzipStream::new(Cursor::new(data.clone()));
        let mut compressed = Vec::new();
        let mut buf = vec![0u8; read_size];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            compressed.extend_from_slice(&buf[..n]);
        }
        prop_assert_eq!(gunzip(&compressed).unwrap(), data);
    }
}
