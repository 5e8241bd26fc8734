//! `Content-Disposition` filename extraction for datasheet downloads

use regex::Regex;
use std::sync::OnceLock;

fn extended_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)filename\*\s*=\s*(?:UTF-8|ISO-8859-1)?'[^']*'([^;]+)"#)
            .expect("filename* regex is valid")
    })
}

fn plain_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)filename\s*=\s*(?:"([^"]*)"|([^;\s]+))"#)
            .expect("filename regex is valid")
    })
}

/// Decode `%XX` escapes. Malformed escapes are kept literally.
fn percent_decode(input: &str) -> String {
    fn hex(b: u8) -> Option<u8> {
        (b as char).to_digit(16).map(|d| d as u8)
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Keep only the final path component so a header cannot steer the write.
fn sanitize(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}

/// Filename advertised by a `Content-Disposition` header value.
///
/// Prefers the RFC 5987 `filename*=` form over plain `filename=`.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    if let Some(caps) = extended_pattern().captures(header) {
        let encoded = caps.get(1).map_or("", |m| m.as_str()).trim();
        if let Some(name) = sanitize(&percent_decode(encoded)) {
            return Some(name);
        }
    }
    let caps = plain_pattern().captures(header)?;
    let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
    sanitize(raw)
}
