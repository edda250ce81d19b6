//! # artifact-publisher
//!
//! Publishes the build and test output of a CI job to object storage and
//! makes it browsable.
//!
//! ## Overview
//!
//! A run moves through four stages, each finishing before the next starts:
//!
//! 1. **Enumerate**: walk the input paths into an ordered [`manifest::Manifest`],
//!    dropping anything a symlink would pull in from outside the tree.
//! 2. **Index**: generate an `index.html` listing per directory and splice
//!    the pages into the manifest.
//! 3. **Compress**: text content is gzipped on the fly, in constant memory,
//!    while it is being uploaded.
//! 4. **Upload**: a bounded pool of worker threads pushes every entry to the
//!    backend, retrying each one on its own and reporting the ones that
//!    still fail instead of aborting the batch.
//!
//! ## Usage
//!
//! ```no_run
//! use artifact_publisher::cloud::s3::{S3Backend, S3Config};
//! use artifact_publisher::cloud::uploader::{Destination, UploadOptions, Uploader};
//! use artifact_publisher::index::{IndexOptions, Indexer};
//! use artifact_publisher::manifest::Manifest;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut manifest = Manifest::new();
//! manifest.add("/tmp/job-output/")?;
//! Indexer::new(&mut manifest).make_indexes(&IndexOptions::default())?;
//!
//! let destination = Destination::resolve("ci-logs", Some("change/42/check"), false);
//! let backend = S3Backend::new(&S3Config {
//!     bucket: destination.container.clone(),
//!     ..Default::default()
//! })?;
//! let report = Uploader::new(backend, destination, UploadOptions::default())
//!     .upload(&manifest)?;
//!
//! println!("{} ({} failures)", report.url, report.failures.len());
//! manifest.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions and argument parsing
//! - [`models`]: Manifest entries and failure records
//! - [`manifest`]: Enumeration of input paths
//! - [`index`]: Directory listing generation
//! - [`cloud`]: Backend trait, S3 adapter and the concurrent uploader
//! - [`config`]: YAML configuration
//! - [`utils`]: Streaming compression and archive creation
//! - [`security`]: Path containment checks
//! - [`constants`]: Application-wide constants

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Core data models and structures used throughout the application
pub mod models;

/// Ordered manifest of entries to publish
pub mod manifest;

/// HTML directory index generation
pub mod index;

/// Utility functions for compression and archives
pub mod utils;

/// Object storage backends and the uploader
pub mod cloud;

/// Configuration management
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Security utilities for path validation
pub mod security;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;
