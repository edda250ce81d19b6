//! Single-request upload bundles.
//!
//! Packs a manifest into one gzip-compressed tar file for backends that
//! can extract an archive server-side.

use std::fs::File;

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, info, warn};
use tar::Builder;
use tempfile::NamedTempFile;

use crate::manifest::Manifest;

/// Write every entry of `manifest` into a temporary `.tar.gz`.
///
/// Files are stored under their relative path and folders as directory
/// members. An entry that cannot be read is logged and left out; only a
/// failure of the archive file itself is an error.
pub fn build_archive(manifest: &Manifest) -> Result<NamedTempFile> {
    let archive = tempfile::Builder::new()
        .prefix("artifact-archive")
        .suffix(".tar.gz")
        .tempfile()
        .context("Failed to create archive file")?;

    let file = archive
        .reopen()
        .context("Failed to open archive file for writing")?;
    let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));
    builder.follow_symlinks(true);

    let mut added = 0usize;
    for entry in manifest {
        let full_path = match (&entry.full_path, entry.is_root()) {
            (Some(path), false) => path,
            _ => continue,
        };

        let result = if entry.is_folder {
            builder.append_dir(&entry.relative_path, full_path)
        } else {
            File::open(full_path).and_then(|mut f| builder.append_file(&entry.relative_path, &mut f))
        };

        match result {
            Ok(()) => {
                added += 1;
                debug!("Archived {}", entry.relative_path);
            }
            Err(e) => warn!("Failed to add {} to archive: {}", entry.relative_path, e),
        }
    }

    let encoder = builder
        .into_inner()
        .context("Failed to finish tar stream")?;
    encoder
        .finish()
        .context("Failed to finish gzip stream")?;

    info!("Built archive with {} entries at {}", added, archive.path().display());
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_log_fixture;
    use flate2::read::GzDecoder;
    use std::collections::BTreeSet;

    #[test]
    fn test_archive_contains_manifest_paths() {
        let fixture = create_log_fixture().unwrap();
        let mut manifest = Manifest::new();
        manifest.add(fixture.path().join("logs/zuul-info")).unwrap();

        let archive = build_archive(&manifest).unwrap();
        let file = File::open(archive.path()).unwrap();
        let mut reader = tar::Archive::new(GzDecoder::new(file));

        let names: BTreeSet<String> = reader
            .entries()
            .unwrap()
            .map(|e| {
                e.unwrap()
                    .path()
                    .unwrap()
                    .to_string_lossy()
                    .trim_end_matches('/')
                    .to_string()
            })
            .collect();

        let expected: BTreeSet<String> = [
            "zuul-info",
            "zuul-info/inventory.yaml",
            "zuul-info/zuul-info.controller.txt",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(names, expected);
    }
}
