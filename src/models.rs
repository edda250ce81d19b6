use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DIRECTORY_MIME, PARENT_LINK_NAME};
use crate::manifest::mime::guess_type;

/// One file, directory or generated listing page destined for upload.
///
/// Entries are immutable once created. Metadata is captured at creation
/// time; a path that cannot be stat'ed (for example a log file rotated away
/// mid-walk) gets a zero size and the epoch as its modification time.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Absolute local path; `None` for the manifest root and parent links
    pub full_path: Option<PathBuf>,
    /// Slash-separated path relative to the enumeration root; `""` is the root
    pub relative_path: String,
    /// Name shown in listings (`..` for parent links)
    pub filename: String,
    pub is_folder: bool,
    pub mime_type: String,
    /// Encoding the file already carries, e.g. `gzip` for `*.gz`
    pub content_encoding: Option<String>,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

impl FileEntry {
    /// Build an entry from a local path.
    ///
    /// `filename` defaults to the last component of `full_path`. Anything
    /// that is not a regular file (directories, symlinks to directories,
    /// missing paths) is recorded as a folder.
    pub fn new(full_path: Option<&Path>, relative_path: &str, filename: Option<&str>) -> Self {
        let filename = match filename {
            Some(name) => name.to_string(),
            None => full_path
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        let (is_folder, mime_type, content_encoding) = match full_path {
            Some(path) if path.is_file() => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let (mime, encoding) = guess_type(&name);
                (false, mime, encoding)
            }
            _ => (true, DIRECTORY_MIME.to_string(), None),
        };

        let (size, last_modified) = match full_path.map(fs::metadata) {
            Some(Ok(meta)) => {
                let modified = meta
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .and_then(|d| DateTime::<Utc>::from_timestamp(d.as_secs() as i64, 0))
                    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
                (meta.len(), modified)
            }
            _ => (0, DateTime::<Utc>::UNIX_EPOCH),
        };

        FileEntry {
            full_path: full_path.map(Path::to_path_buf),
            relative_path: relative_path.to_string(),
            filename,
            is_folder,
            mime_type,
            content_encoding,
            size,
            last_modified,
        }
    }

    /// The synthetic entry standing for the enumeration root itself.
    pub fn root() -> Self {
        FileEntry::new(None, "", Some(""))
    }

    /// A synthetic `..` link used at the top of listing pages.
    pub fn parent_link() -> Self {
        FileEntry::new(None, PARENT_LINK_NAME, Some(PARENT_LINK_NAME))
    }

    /// Whether this is the manifest root placeholder.
    pub fn is_root(&self) -> bool {
        self.full_path.is_none() && self.relative_path.is_empty()
    }

    /// Modification time in the fixed, locale-independent `asctime` layout.
    pub fn last_modified_asctime(&self) -> String {
        self.last_modified.format("%a %b %e %H:%M:%S %Y").to_string()
    }
}

impl fmt::Display for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_folder { "Folder" } else { "File" };
        write!(f, "<{} {}>", kind, self.relative_path)
    }
}

/// A single entry that could not be uploaded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub file: String,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_entry_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("job-output.json");
        fs::write(&path, b"{}").unwrap();

        let entry = FileEntry::new(Some(path.as_path()), "job-output.json", None);
        assert_eq!(entry.filename, "job-output.json");
        assert!(!entry.is_folder);
        assert_eq!(entry.mime_type, "application/json");
        assert_eq!(entry.content_encoding, None);
        assert_eq!(entry.size, 2);
        assert!(entry.last_modified > DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_file_entry_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        let entry = FileEntry::new(Some(temp_dir.path()), "logs", Some("logs"));
        assert!(entry.is_folder);
        assert_eq!(entry.mime_type, "application/directory");
    }

    #[test]
    fn test_file_entry_missing_path_degrades() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vanished.txt");

        let entry = FileEntry::new(Some(path.as_path()), "vanished.txt", None);
        assert_eq!(entry.size, 0);
        assert_eq!(entry.last_modified, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(entry.filename, "vanished.txt");
    }

    #[test]
    fn test_root_and_parent_link() {
        let root = FileEntry::root();
        assert!(root.is_root());
        assert!(root.is_folder);
        assert_eq!(root.filename, "");

        let parent = FileEntry::parent_link();
        assert!(!parent.is_root());
        assert_eq!(parent.filename, "..");
        assert_eq!(parent.relative_path, "..");
    }

    #[test]
    fn test_asctime_epoch() {
        let root = FileEntry::root();
        assert_eq!(root.last_modified_asctime(), "Thu Jan  1 00:00:00 1970");
    }

    #[test]
    fn test_display() {
        assert_eq!(FileEntry::root().to_string(), "<Folder >");
    }
}
