//! Global constants for the artifact publisher.
//!
//! This module centralizes all hardcoded values to improve maintainability
//! and make configuration changes easier.

use std::time::Duration;

// Upload pool and retry constants
/// Upper bound on concurrent upload workers
pub const MAX_UPLOAD_THREADS: usize = 24;

/// Attempts made for each entry before it is recorded as a failure
pub const POST_ATTEMPTS: usize = 3;

/// Unit of the linear retry backoff; attempt `n` sleeps `n * RETRY_DELAY_UNIT`
pub const RETRY_DELAY_UNIT: Duration = Duration::from_secs(10);

// Compression constants
/// Chunk size pulled from the source (and handed to the transport) by the gzip stream (16KB)
pub const GZIP_CHUNK_SIZE: usize = 16 * 1024;

// S3 constants
/// Part size for streamed S3 uploads (8MB, S3 minimum is 5MB). Bodies that
/// fit in one part go out as a single PutObject.
pub const S3_PART_SIZE: usize = 8 * 1024 * 1024;

// Index generation constants
/// Name of generated (and pre-existing) directory listing pages
pub const INDEX_FILENAME: &str = "index.html";

/// Default footer file whose contents are appended to generated listings
pub const DEFAULT_FOOTER: &str = "index_footer.html";

/// Display name and relative path of synthetic parent links
pub const PARENT_LINK_NAME: &str = "..";

/// Prefix of the private temporary directories holding generated pages
pub const TEMPDIR_PREFIX: &str = "s-u-l-tmp";

// MIME constants
/// MIME type assumed for files with an unknown extension
pub const DEFAULT_FILE_MIME: &str = "text/plain";

/// MIME type reported for directories and the manifest root
pub const DIRECTORY_MIME: &str = "application/directory";

/// Non-`text/*` MIME types that are still worth compressing on upload
pub const COMPRESSIBLE_MIME_TYPES: &[&str] = &["application/json", "image/svg+xml"];

// Object header names
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_CONTENT_ENCODING: &str = "content-encoding";
pub const HEADER_DELETE_AFTER: &str = "x-delete-after";

// Destination constants
/// Public endpoint used when no S3 endpoint is configured
pub const DEFAULT_S3_ENDPOINT: &str = "https://s3.amazonaws.com/";

/// Endpoint reported by dry runs
pub const DRY_RUN_ENDPOINT: &str = "http://dry-run-url.com";

/// Path reported by dry runs
pub const DRY_RUN_PATH: &str = "/a/path";

/// Object name used when reporting a failed archive upload
pub const ARCHIVE_NAME: &str = "archive.tar.gz";
