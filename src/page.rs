//! Page handles
//!
//! A [`Page`] owns one native page pointer, borrowed from its document so
//! it can never outlive it. The lifecycle is asymmetric on purpose: the
//! engine releases page memory when the owning document closes, so callers
//! are not required to close pages, but an explicit [`Page::close`]
//! exists, is safe, and also runs from `Drop`.

use crate::engine::{NativePtr, NULL};
use crate::error::{Error, Result};
use crate::glyphs;

/// One page of an open document
pub struct Page<'a> {
    doc: &'a crate::document::Document<'a>,
    page_ptr: NativePtr,
    index: u32,
    closed: bool,
}

impl<'a> Page<'a> {
    pub(crate) fn new(doc: &'a crate::document::Document<'a>, page_ptr: NativePtr, index: u32) -> Self {
        Self {
            doc,
            page_ptr,
            index,
            closed: false,
        }
    }

    pub(crate) fn doc(&self) -> &crate::document::Document<'a> {
        self.doc
    }

    pub(crate) fn ptr(&self) -> NativePtr {
        self.page_ptr
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        Ok(())
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Page width in points, queried from the engine.
    pub fn width(&self) -> Result<f32> {
        self.ensure_open()?;
        Ok(self.doc.engine().page_width(self.page_ptr))
    }

    /// Page height in points, queried from the engine.
    pub fn height(&self) -> Result<f32> {
        self.ensure_open()?;
        Ok(self.doc.engine().page_height(self.page_ptr))
    }

    /// Glyph coverage of the page's text view.
    pub fn glyph_coverage(&self) -> Result<glyphs::GlyphCoverage> {
        self.ensure_open()?;
        Ok(glyphs::check_page(self.doc.engine(), self.page_ptr))
    }

    /// Plain text of the page, via per-character unicode queries over the
    /// text view. Empty when the engine cannot produce a text view.
    pub fn text(&self) -> Result<String> {
        self.ensure_open()?;
        Ok(glyphs::page_text(self.doc.engine(), self.page_ptr))
    }

    /// Release the native page. Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.doc.engine().close_page(self.page_ptr);
        self.page_ptr = NULL;
        self.closed = true;
    }
}

impl Drop for Page<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
