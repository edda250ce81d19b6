//! Object storage publishing.
//!
//! The upload pipeline is written once against the narrow [`Backend`]
//! trait; each storage service supplies an adapter implementing it.
//!
//! ## Supported Providers
//!
//! - **Amazon S3**: S3 and S3-compatible storage via rusoto
//!
//! ## Features
//!
//! - **Parallel Transfers**: Bounded pool of worker threads over a shared queue
//! - **Retry Logic**: Three attempts per object with a linear backoff
//! - **Compression**: Text content is gzipped on the fly while uploading
//! - **Partial Failure**: Failed objects are reported, the rest still upload
//! - **Archive Mode**: One tar.gz request for backends that extract server-side
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐
//! │    Manifest     │────▶│  Work Queue     │
//! └─────────────────┘     └────────┬────────┘
//!                                  │
//!                    ┌─────────────┴─────────────┐
//!                    │                           │
//!              ┌─────▼──────┐           ┌───────▼────────┐
//!              │  upload-0  │    ...    │  upload-N      │
//!              │ (retrying) │           │  (retrying)    │
//!              └─────┬──────┘           └───────┬────────┘
//!                    │                           │
//!              ┌─────▼───────────────────────────▼──┐
//!              │        Backend (S3, ...)           │
//!              └────────────────────────────────────┘
//! ```
//!
//! ## Usage Example
//!
//! ```no_run
//! use artifact_publisher::cloud::s3::{S3Backend, S3Config};
//! use artifact_publisher::cloud::uploader::{Destination, UploadOptions, Uploader};
//! use artifact_publisher::manifest::Manifest;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut manifest = Manifest::new();
//! manifest.add("/tmp/logs/")?;
//!
//! let destination = Destination::resolve("ci-logs", Some("change/42"), false);
//! let backend = S3Backend::new(&S3Config {
//!     bucket: destination.container.clone(),
//!     ..Default::default()
//! })?;
//!
//! let report = Uploader::new(backend, destination, UploadOptions::default())
//!     .upload(&manifest)?;
//! println!("Published to {}", report.url);
//! # Ok(())
//! # }
//! ```

/// The storage backend trait
pub mod backend;

/// Retry helper for backend calls
pub mod retry;

/// Concurrent manifest uploader
pub mod uploader;

/// S3 client construction
pub mod client;

/// Amazon S3 backend
pub mod s3;

pub use backend::{Backend, Body, Headers};
pub use retry::RetryPolicy;
pub use uploader::{Destination, UploadOptions, UploadReport, Uploader};
