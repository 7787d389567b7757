//! Glyph coverage checking
//!
//! The engine runs in an isolated filesystem with no host fonts. A page
//! that references a font which is neither standard nor embedded renders
//! as blank space or placeholder boxes with no native error signal; the
//! per-character unicode-map scan below is the only available detector
//! for that silent failure mode.

use serde::{Deserialize, Serialize};

use crate::engine::{NativePtr, PdfEngine, NULL};

/// Result of scanning a page's text view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphCoverage {
    /// Characters with no unicode mapping
    pub missing: u32,
    /// Characters inspected
    pub total: u32,
}

/// Releases the text view on every exit path.
struct TextPageGuard<'a> {
    engine: &'a dyn PdfEngine,
    ptr: NativePtr,
}

impl Drop for TextPageGuard<'_> {
    fn drop(&mut self) {
        self.engine.text_close_page(self.ptr);
    }
}

/// Scan the page's text view for characters without a glyph mapping.
///
/// A page for which the engine cannot produce a text view is reported as
/// fully covered.
pub(crate) fn check_page(engine: &dyn PdfEngine, page_ptr: NativePtr) -> GlyphCoverage {
    let text_ptr = engine.text_load_page(page_ptr);
    if text_ptr == NULL {
        return GlyphCoverage {
            missing: 0,
            total: 0,
        };
    }
    let guard = TextPageGuard {
        engine,
        ptr: text_ptr,
    };

    let total = engine.text_count_chars(guard.ptr).max(0);
    let missing = (0..total)
        .filter(|&i| engine.text_has_unicode_map_error(guard.ptr, i) > 0)
        .count() as u32;

    GlyphCoverage {
        missing,
        total: total as u32,
    }
}

/// Plain text of the page via per-character unicode queries.
pub(crate) fn page_text(engine: &dyn PdfEngine, page_ptr: NativePtr) -> String {
    let text_ptr = engine.text_load_page(page_ptr);
    if text_ptr == NULL {
        return String::new();
    }
    let guard = TextPageGuard {
        engine,
        ptr: text_ptr,
    };

    let count = engine.text_count_chars(guard.ptr).max(0);
    (0..count)
        .filter_map(|i| {
            let code = engine.text_char_unicode(guard.ptr, i);
            (code != 0).then(|| char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
        })
        .collect()
}
