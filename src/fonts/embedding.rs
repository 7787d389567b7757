//! Static font-embedding scan
//!
//! A best-effort byte-level scan, not a conforming PDF reader: the bytes
//! are treated as single-byte characters and only ASCII structural tokens
//! are matched, so string content and compressed streams are ignored. A
//! name carrying the six-uppercase-letter subset prefix is taken as proof
//! of embedding without looking for the font-program object, which can
//! under- or over-report versus a structural check. The external contract
//! (raw bytes in, set of suspect font names out) would survive swapping
//! this for a real object-graph walk.

use std::collections::BTreeSet;

/// The Base-14 font names every engine synthesizes without embedded data
pub const STANDARD_FONTS: [&str; 14] = [
    "Courier",
    "Courier-Bold",
    "Courier-BoldOblique",
    "Courier-Oblique",
    "Helvetica",
    "Helvetica-Bold",
    "Helvetica-BoldOblique",
    "Helvetica-Oblique",
    "Times-Roman",
    "Times-Bold",
    "Times-Italic",
    "Times-BoldItalic",
    "Symbol",
    "ZapfDingbats",
];

/// Font subtype tags whose presence mandates an embedded font program
const EMBEDDING_SUBTYPES: [&[u8]; 5] = [
    b"/CIDFontType0",
    b"/CIDFontType2",
    b"/TrueType",
    b"/Type0",
    b"/OpenType",
];

const BASE_FONT_TOKEN: &[u8] = b"/BaseFont";

/// Scan raw document bytes for fonts likely to render incorrectly because
/// their data is not embedded. Deduplicated, sorted.
pub fn find_unembedded_fonts(bytes: &[u8]) -> Vec<String> {
    if !EMBEDDING_SUBTYPES
        .iter()
        .any(|tag| contains_bytes(bytes, tag))
    {
        return Vec::new();
    }

    let mut suspects = BTreeSet::new();
    for name in base_font_names(bytes) {
        let stripped = strip_subset_prefix(&name);
        if STANDARD_FONTS.contains(&stripped) {
            continue;
        }
        // The subset prefix convention is taken as sufficient proof of
        // embedding.
        if has_subset_prefix(&name) {
            continue;
        }
        suspects.insert(name);
    }
    suspects.into_iter().collect()
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}

/// Every name token following a `/BaseFont` key, decoded byte-per-char.
fn base_font_names(bytes: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut at = 0;
    while at + BASE_FONT_TOKEN.len() < bytes.len() {
        if &bytes[at..at + BASE_FONT_TOKEN.len()] != BASE_FONT_TOKEN {
            at += 1;
            continue;
        }
        let mut cursor = at + BASE_FONT_TOKEN.len();
        while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
            cursor += 1;
        }
        if cursor < bytes.len() && bytes[cursor] == b'/' {
            cursor += 1;
            let start = cursor;
            while cursor < bytes.len() && !is_name_delimiter(bytes[cursor]) {
                cursor += 1;
            }
            if cursor > start {
                names.push(bytes[start..cursor].iter().map(|&b| b as char).collect());
            }
        }
        at = cursor.max(at + 1);
    }
    names
}

fn is_name_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'/' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'%')
}

/// Exactly six uppercase letters followed by `+`.
fn has_subset_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() > 7 && bytes[6] == b'+' && bytes[..6].iter().all(u8::is_ascii_uppercase)
}

fn strip_subset_prefix(name: &str) -> &str {
    if has_subset_prefix(name) {
        &name[7..]
    } else {
        name
    }
}
