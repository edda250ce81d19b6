//! Directory listing generation.
//!
//! [`Indexer::make_indexes`] adds one `index.html` entry per directory of a
//! [`Manifest`]. It works in two passes:
//!
//! 1. Group every entry under the directory whose listing shows it and
//!    render one page per group into a temporary directory owned by the
//!    manifest.
//! 2. Rebuild the entry list, placing each page right after the last entry
//!    belonging to its directory. The root page always goes last.
//!
//! Existing entries are never modified. A directory that already holds a
//! file named `index.html` keeps it and gets no generated page, which also
//! makes a second run over the same manifest a no-op.

use std::collections::HashMap;
use std::fs;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::constants::{DEFAULT_FOOTER, INDEX_FILENAME};
use crate::manifest::Manifest;
use crate::models::FileEntry;

/// Page rendering helpers
pub mod html;

/// Embedded icon images
pub mod icons;

pub use html::{html_escape, quote, sizeof_fmt};
pub use icons::get_mime_icon;

/// Options controlling generated listing pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOptions {
    /// Prepend a `..` row to every non-root listing
    pub create_parent_links: bool,
    /// Prepend a `..` row to the root listing as well
    pub create_topdir_parent_link: bool,
    /// Name of a file whose contents are appended to the listing it appears in
    pub footer: Option<String>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        IndexOptions {
            create_parent_links: true,
            create_topdir_parent_link: false,
            footer: Some(DEFAULT_FOOTER.to_string()),
        }
    }
}

/// Entries listed on one directory page, in manifest order.
struct Group {
    directory: String,
    members: Vec<usize>,
}

pub struct Indexer<'a> {
    manifest: &'a mut Manifest,
}

impl<'a> Indexer<'a> {
    pub fn new(manifest: &'a mut Manifest) -> Self {
        Indexer { manifest }
    }

    /// Generate listing pages and splice them into the manifest.
    pub fn make_indexes(&mut self, options: &IndexOptions) -> Result<()> {
        let pages = self.render_pages(options);

        let mut generated = Vec::with_capacity(pages.len());
        for (directory, content) in pages {
            let dir = self.manifest.tempdir()?;
            let path = dir.join(INDEX_FILENAME);
            fs::write(&path, content)
                .with_context(|| format!("Failed to write index page {}", path.display()))?;

            let relative = join_directory(&directory, INDEX_FILENAME);
            debug!("Generated index page {}", relative);
            generated.push((directory, FileEntry::new(Some(path.as_path()), &relative, None)));
        }

        info!("Generated {} index pages", generated.len());
        let entries = splice_indexes(self.manifest.entries(), generated);
        self.manifest.replace_entries(entries);
        Ok(())
    }

    fn render_pages(&self, options: &IndexOptions) -> Vec<(String, String)> {
        let entries = self.manifest.entries();
        let mut pages = Vec::new();

        for group in group_entries(entries) {
            let is_top = group.directory.is_empty();
            let listed: Vec<&FileEntry> = group
                .members
                .iter()
                .map(|&i| &entries[i])
                .filter(|e| !e.is_root())
                .collect();

            if listed.iter().any(|e| e.filename == INDEX_FILENAME) {
                debug!(
                    "Keeping existing {} in '{}'",
                    INDEX_FILENAME, group.directory
                );
                continue;
            }

            let parent = FileEntry::parent_link();
            let mut rows = Vec::with_capacity(listed.len() + 1);
            let wants_parent = if is_top {
                options.create_topdir_parent_link
            } else {
                options.create_parent_links
            };
            if wants_parent {
                rows.push(&parent);
            }
            rows.extend(listed.iter().copied());

            let footer = options
                .footer
                .as_deref()
                .and_then(|name| read_footer(&listed, name));

            let title = format!("Index of {}", group.directory);
            pages.push((
                group.directory,
                html::render_index(&title, &rows, footer.as_deref()),
            ));
        }

        pages
    }
}

/// Directory part of a slash-separated relative path; `""` for top-level names.
fn parent_directory(relative_path: &str) -> &str {
    relative_path
        .rsplit_once('/')
        .map(|(parent, _)| parent)
        .unwrap_or("")
}

fn join_directory(directory: &str, name: &str) -> String {
    if directory.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", directory, name)
    }
}

/// Group entries by the listing they appear on.
///
/// Files and folders are both listed on their parent's page. Every folder
/// also opens its own group so that empty directories still get a page.
fn group_entries(entries: &[FileEntry]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    let mut slot = |groups: &mut Vec<Group>, directory: &str| -> usize {
        *positions.entry(directory.to_string()).or_insert_with(|| {
            groups.push(Group {
                directory: directory.to_string(),
                members: Vec::new(),
            });
            groups.len() - 1
        })
    };

    for (i, entry) in entries.iter().enumerate() {
        if entry.is_folder {
            slot(&mut groups, &entry.relative_path);
        }
        let g = slot(&mut groups, parent_directory(&entry.relative_path));
        groups[g].members.push(i);
    }

    groups
}

/// The directory whose page must follow this entry in upload order.
fn splice_key(entry: &FileEntry) -> &str {
    if entry.is_folder {
        &entry.relative_path
    } else {
        parent_directory(&entry.relative_path)
    }
}

/// Second pass: rebuild the entry list with generated pages in place.
fn splice_indexes(entries: &[FileEntry], generated: Vec<(String, FileEntry)>) -> Vec<FileEntry> {
    let mut last_position: HashMap<&str, usize> = HashMap::new();
    for (i, entry) in entries.iter().enumerate() {
        last_position.insert(splice_key(entry), i);
    }

    let mut after: HashMap<usize, FileEntry> = HashMap::new();
    let mut unplaced = Vec::new();
    let mut root_index = None;

    for (directory, index) in generated {
        if directory.is_empty() {
            root_index = Some(index);
            continue;
        }
        match last_position.get(directory.as_str()) {
            Some(&pos) => {
                after.insert(pos, index);
            }
            None => unplaced.push(index),
        }
    }

    let mut rebuilt = Vec::with_capacity(entries.len() + after.len() + unplaced.len() + 1);
    for (i, entry) in entries.iter().enumerate() {
        rebuilt.push(entry.clone());
        if let Some(index) = after.remove(&i) {
            rebuilt.push(index);
        }
    }
    rebuilt.extend(unplaced);
    rebuilt.extend(root_index);
    rebuilt
}

fn read_footer(listed: &[&FileEntry], footer_name: &str) -> Option<String> {
    let footer = listed
        .iter()
        .rev()
        .find(|e| !e.is_folder && e.filename == footer_name)?;
    let path = footer.full_path.as_ref()?;

    match fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            warn!("Error opening footer {}: {}", path.display(), e);
            None
        }
    }
}
