//! Byte-stream utilities used while uploading.
//!
//! ## Components
//!
//! - **Compression**: constant-memory gzip stream over any reader
//! - **Archive**: tar.gz bundles for single-request uploads
//!
//! ## Common Use Cases
//!
//! ### Compressing a Log File on the Fly
//!
//! ```no_run
//! use artifact_publisher::utils::compress::GzipStream;
//! use std::fs::File;
//! use std::io::Read;
//!
//! # fn example() -> anyhow::Result<()> {
//! let file = File::open("/tmp/logs/job-output.txt")?;
//! let mut compressed = Vec::new();
//! GzipStream::new(file).read_to_end(&mut compressed)?;
//! println!("Compressed to {} bytes", compressed.len());
//! # Ok(())
//! # }
//! ```

/// Streaming gzip compression
pub mod compress;

/// Tar archive creation for archive-mode uploads
pub mod archive;
