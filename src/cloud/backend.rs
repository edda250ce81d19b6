//! The storage seam between the upload pipeline and a concrete service.

use std::collections::BTreeMap;
use std::io::Read;

use anyhow::{bail, Result};

/// Object headers, keyed by lower-case header name.
pub type Headers = BTreeMap<String, String>;

/// Object content handed to a backend; read once, front to back.
pub type Body = Box<dyn Read + Send>;

/// An object-storage service the uploader can publish into.
///
/// Implementations are shared by all upload workers and must tolerate
/// concurrent `put_object` calls.
#[cfg_attr(test, mockall::automock)]
pub trait Backend: Send + Sync {
    /// Create the container if it does not exist and apply its visibility.
    fn ensure_container(&self, name: &str, public: bool) -> Result<()>;

    /// Store one object at a container-relative path.
    fn put_object(&self, path: &str, body: Body, headers: &Headers) -> Result<()>;

    /// Base URL the container's objects are served from.
    fn resolve_public_url(&self) -> Result<String>;

    /// Whether a source file's own content encoding (`xz`, `bzip2`, ...)
    /// should be passed through as the object's `content-encoding`.
    fn forward_source_encoding(&self) -> bool {
        true
    }

    fn supports_archive(&self) -> bool {
        false
    }

    /// Upload a gzip tar to be unpacked server-side under `prefix`.
    fn put_archive(&self, prefix: &str, body: Body, headers: &Headers) -> Result<()> {
        let _ = (body, headers);
        bail!("Archive extraction is not supported by this backend (prefix '{}')", prefix)
    }
}
