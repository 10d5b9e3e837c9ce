//! Text helpers for rendering and path helpers for saving

use crate::error::{Error, Result, SaveError};
use crate::types::FieldValue;
use std::path::{Path, PathBuf};
use url::Url;

/// Maximum number of rename attempts when resolving file collisions
pub(crate) const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Escape text for insertion into HTML markup (element text or attribute values)
///
/// # Examples
///
/// ```
/// use audio_dl::utils::escape_html;
///
/// assert_eq!(escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
///            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
/// ```
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`
///
/// The mapping is per character, so the output has one character per input character
/// and sanitizing twice gives the same result as sanitizing once.
///
/// # Examples
///
/// ```
/// use audio_dl::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Song: Title/Mix"), "Song__Title_Mix");
/// ```
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Format a view count for display
///
/// - `>= 1_000_000` → one decimal with an `M` suffix
/// - `>= 1_000` → one decimal with a `K` suffix
/// - otherwise the plain number
///
/// Text is parsed as a leading integer first; text without one is returned unchanged.
///
/// # Examples
///
/// ```
/// use audio_dl::utils::format_views;
/// use audio_dl::FieldValue;
///
/// assert_eq!(format_views(&FieldValue::from(1500)), "1.5K");
/// assert_eq!(format_views(&FieldValue::from(2_300_000)), "2.3M");
/// assert_eq!(format_views(&FieldValue::from("abc")), "abc");
/// ```
#[must_use]
pub fn format_views(views: &FieldValue) -> String {
    let (count, plain) = match views {
        FieldValue::Number(n) => match n.as_f64() {
            Some(v) => (v, views.to_string()),
            None => return views.to_string(),
        },
        FieldValue::Text(text) => match parse_leading_int(text) {
            Some(v) => (v as f64, v.to_string()),
            None => return text.clone(),
        },
    };

    if count >= 1_000_000.0 {
        format!("{:.1}M", count / 1_000_000.0)
    } else if count >= 1_000.0 {
        format!("{:.1}K", count / 1_000.0)
    } else {
        plain
    }
}

/// Parse the leading decimal integer of a string
///
/// Leading whitespace and a single sign are accepted; parsing stops at the first
/// non-digit. Returns `None` when no digit follows (or the value overflows `i64`).
#[must_use]
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Resolve a (possibly relative) endpoint against `base`
///
/// Absolute endpoints are returned unchanged.
///
/// # Examples
///
/// ```
/// use audio_dl::utils::resolve_endpoint;
/// use url::Url;
///
/// let base = Url::parse("http://localhost:5000").unwrap();
/// assert_eq!(resolve_endpoint(&base, "/api/download/abc").unwrap(),
///            "http://localhost:5000/api/download/abc");
/// ```
pub fn resolve_endpoint(base: &Url, endpoint: &str) -> Result<String> {
    base.join(endpoint)
        .map(String::from)
        .map_err(|e| Error::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
}

/// Path tried on the `attempt`-th save of `path` under the rename policy
///
/// Attempt 0 is `path` itself; attempt `n` inserts ` (n)` before the extension.
///
/// # Examples
///
/// ```
/// use audio_dl::utils::numbered_path;
/// use std::path::Path;
///
/// let path = Path::new("/tmp/song.mp3");
/// assert_eq!(numbered_path(path, 0).unwrap(), path);
/// assert_eq!(numbered_path(path, 2).unwrap(), Path::new("/tmp/song (2).mp3"));
/// ```
pub fn numbered_path(path: &Path, attempt: u32) -> Result<PathBuf> {
    if attempt == 0 {
        return Ok(path.to_path_buf());
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
        Error::Save(SaveError::InvalidPath {
            path: path.to_path_buf(),
            reason: "Cannot extract file stem".to_string(),
        })
    })?;

    let parent = path.parent().ok_or_else(|| {
        Error::Save(SaveError::InvalidPath {
            path: path.to_path_buf(),
            reason: "Cannot extract parent directory".to_string(),
        })
    })?;

    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{} ({}).{}", stem, attempt, ext),
        None => format!("{} ({})", stem, attempt),
    };
    Ok(parent.join(name))
}
