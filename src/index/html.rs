//! Rendering of directory listing pages.

use std::fmt::Write;

use crate::index::icons::get_mime_icon;
use crate::models::FileEntry;

const SIZE_UNITS: [&str; 8] = ["", "K", "M", "G", "T", "P", "E", "Z"];

/// Human readable size using binary multiples, one decimal place.
///
/// `sizeof_fmt(1536, "B")` is `"1.5KB"`. Listing pages use an empty suffix.
pub fn sizeof_fmt(num: u64, suffix: &str) -> String {
    let mut value = num as f64;
    for unit in SIZE_UNITS {
        if value.abs() < 1024.0 {
            return format!("{:3.1}{}{}", value, unit, suffix);
        }
        value /= 1024.0;
    }
    format!("{:.1}Y{}", value, suffix)
}

/// Percent-encode a link target, leaving unreserved characters and `/` alone.
pub fn quote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.' | b'-' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{:02X}", byte);
            }
        }
    }
    out
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn html_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_row(out: &mut String, entry: &FileEntry) {
    let (display, link) = if entry.is_folder {
        (
            format!("{}/", entry.filename),
            format!("{}/index.html", entry.filename),
        )
    } else {
        (entry.filename.clone(), entry.filename.clone())
    };

    out.push_str("<tr>");
    let _ = write!(
        out,
        "<td><img alt=\"[ ]\" title=\"{}\" src=\"{}\"></img></td>",
        html_escape(&entry.mime_type),
        get_mime_icon(&entry.filename, &entry.mime_type)
    );
    let _ = write!(
        out,
        "<td><a href=\"{}\">{}</a></td>",
        quote(&link),
        html_escape(&display)
    );
    let _ = write!(out, "<td>{}</td>", entry.last_modified_asctime());
    let _ = write!(
        out,
        "<td style=\"text-align: right\">{}</td>",
        sizeof_fmt(entry.size, "")
    );
    out.push_str("</tr>\n");
}

/// Render a complete listing page.
///
/// `footer`, when present, is inserted verbatim below the table.
pub fn render_index(title: &str, rows: &[&FileEntry], footer: Option<&str>) -> String {
    let title = html_escape(title);
    let mut out = String::new();

    let _ = write!(out, "<html><head><title>{}</title></head><body>\n", title);
    let _ = write!(out, "<h1>{}</h1>\n", title);
    out.push_str("<table><tr><th></th><th>Name</th><th>Last Modified</th>");
    out.push_str("<th>Size</th></tr>");

    for entry in rows {
        render_row(&mut out, entry);
    }
    out.push_str("</table>");

    if let Some(footer) = footer {
        out.push_str("<br /><hr />");
        out.push_str(footer);
    }

    out.push_str("</body></html>\n");
    out
}
