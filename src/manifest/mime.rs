//! Extension-based MIME type and content-encoding detection.
//!
//! Detection never looks at file contents. A trailing compression suffix
//! (`.gz`, `.xz`, ...) is reported as the content encoding and stripped
//! before the remaining extension is looked up.

use crate::constants::DEFAULT_FILE_MIME;

/// Compression suffixes and the content encoding they imply.
const ENCODINGS_MAP: &[(&str, &str)] = &[
    ("gz", "gzip"),
    ("Z", "compress"),
    ("bz2", "bzip2"),
    ("xz", "xz"),
    ("br", "br"),
];

/// Shorthand suffixes expanded before any other lookup.
const SUFFIX_MAP: &[(&str, &str)] = &[
    ("tgz", ".tar.gz"),
    ("taz", ".tar.gz"),
    ("tz", ".tar.gz"),
    ("tbz2", ".tar.bz2"),
    ("txz", ".tar.xz"),
];

const TYPES_MAP: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("txt", "text/plain"),
    ("log", "text/plain"),
    ("conf", "text/plain"),
    ("yaml", "text/plain"),
    ("yml", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("xml", "text/xml"),
    ("py", "text/x-python"),
    ("json", "application/json"),
    ("svg", "image/svg+xml"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("ico", "image/vnd.microsoft.icon"),
    ("pdf", "application/pdf"),
    ("tar", "application/x-tar"),
    ("zip", "application/zip"),
    ("sh", "application/x-sh"),
    ("wasm", "application/wasm"),
];

fn split_extension(name: &str) -> Option<(&str, &str)> {
    let dot = name.rfind('.')?;
    // A leading dot names a hidden file, not an extension
    if dot == 0 {
        return None;
    }
    Some((&name[..dot], &name[dot + 1..]))
}

fn lookup<'a>(table: &'a [(&str, &str)], ext: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(k, _)| *k == ext)
        .or_else(|| {
            let lower = ext.to_lowercase();
            table.iter().find(|(k, _)| *k == lower)
        })
        .map(|(_, v)| *v)
}

/// Guess `(mime_type, encoding)` for a filename.
///
/// Unknown types fall back to `text/plain`; `encoding` is `None` unless the
/// name carries a known compression suffix.
pub fn guess_type(filename: &str) -> (String, Option<String>) {
    let mut name = filename.to_string();

    if let Some((stem, ext)) = split_extension(&name) {
        if let Some(expanded) = SUFFIX_MAP.iter().find(|(k, _)| *k == ext).map(|(_, v)| *v) {
            name = format!("{}{}", stem, expanded);
        }
    }

    let mut encoding = None;
    if let Some((stem, ext)) = split_extension(&name) {
        if let Some(enc) = ENCODINGS_MAP.iter().find(|(k, _)| *k == ext).map(|(_, v)| *v) {
            encoding = Some(enc.to_string());
            name = stem.to_string();
        }
    }

    let mime = split_extension(&name)
        .and_then(|(_, ext)| lookup(TYPES_MAP, ext))
        .unwrap_or(DEFAULT_FILE_MIME);

    (mime.to_string(), encoding)
}

/// Whether content of this type benefits from gzip on upload.
pub fn is_text_type(mime: &str) -> bool {
    mime.starts_with("text/") || crate::constants::COMPRESSIBLE_MIME_TYPES.contains(&mime)
}
