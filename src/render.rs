//! Bitmap rendering pipeline
//!
//! Renders a page into a caller-visible pixel buffer:
//!
//! 1. scale the page's point dimensions up to whole pixels,
//! 2. allocate a native framebuffer and bind a BGRA bitmap object to it,
//! 3. prefill with opaque white; the engine does not guarantee background
//!    initialization, and uninitialized heap bytes must never reach the
//!    caller,
//! 4. render with rotation 0 and no flags over the full rectangle,
//! 5. copy the pixels out through a view of native memory taken *after*
//!    the render call, since the linear heap may grow or relocate while the
//!    engine runs, so a view cached earlier may be stale,
//! 6. destroy the bitmap, free the framebuffer, and gate the result on the
//!    glyph coverage scan.
//!
//! The buffer comes back in the engine's native BGRA order; converting to
//! RGBA is the caller's downstream step via [`RenderedBitmap::into_rgba`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::{NativePtr, PdfEngine, ScopedAlloc, BITMAP_FORMAT_BGRA, NULL};
use crate::error::{Error, Result};
use crate::glyphs;
use crate::page::Page;

const WHITE: u32 = 0xffff_ffff;

/// Options for [`Page::render`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Pixels per point
    pub scale: f32,
    /// Skip the post-render glyph coverage gate
    pub ignore_missing_glyphs: bool,
    /// Highest tolerated number of unmapped characters
    pub missing_glyph_threshold: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            ignore_missing_glyphs: false,
            missing_glyph_threshold: 0,
        }
    }
}

/// A rendered page, pixels in BGRA order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBitmap {
    /// `width * height * 4` bytes
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RenderedBitmap {
    /// Reorder the pixel bytes from BGRA to RGBA.
    pub fn into_rgba(mut self) -> Self {
        bgra_to_rgba(&mut self.pixels);
        self
    }
}

/// Swap bytes 0 and 2 of every 4-byte pixel, leaving green and alpha
/// untouched. Applying it twice reproduces the input exactly.
pub fn bgra_to_rgba(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
}

/// Destroys the native bitmap object on every exit path.
struct BitmapGuard<'a> {
    engine: &'a dyn PdfEngine,
    ptr: NativePtr,
}

impl Drop for BitmapGuard<'_> {
    fn drop(&mut self) {
        self.engine.bitmap_destroy(self.ptr);
    }
}

impl Page<'_> {
    /// Render this page to a BGRA pixel buffer.
    ///
    /// Fails with [`Error::MissingFont`] before any native render call when
    /// the document's embedding scan flagged fonts, and with
    /// [`Error::MissingGlyph`] afterwards when more characters lack a glyph
    /// than `missing_glyph_threshold` tolerates; in that case the rendered
    /// buffer is discarded rather than returned partially correct.
    pub fn render(&self, options: &RenderOptions) -> Result<RenderedBitmap> {
        self.ensure_open()?;

        let missing_fonts = self.doc().missing_fonts();
        if !missing_fonts.is_empty() {
            return Err(Error::MissingFont(missing_fonts.to_vec()));
        }

        if !(options.scale.is_finite() && options.scale > 0.0) {
            return Err(Error::RenderFailed(format!(
                "scale must be a positive number, got {}",
                options.scale
            )));
        }

        let engine = self.doc().engine();

        let width = (self.width()? * options.scale).ceil() as i64;
        let height = (self.height()? * options.scale).ceil() as i64;
        if width <= 0 || height <= 0 {
            return Err(Error::RenderFailed(format!(
                "page has no area at scale {}",
                options.scale
            )));
        }
        let stride = width * 4;
        let buffer_size = stride * height;
        if buffer_size > u32::MAX as i64 {
            return Err(Error::RenderFailed(format!(
                "render target of {width}x{height} exceeds the engine heap"
            )));
        }
        let (width, height, stride) = (width as i32, height as i32, stride as i32);

        let framebuffer = ScopedAlloc::new(engine, buffer_size as u32)?;

        let bitmap_ptr = engine.bitmap_create(
            width,
            height,
            BITMAP_FORMAT_BGRA,
            framebuffer.ptr(),
            stride,
        );
        if bitmap_ptr == NULL {
            return Err(Error::RenderFailed(format!(
                "bitmap creation failed for {width}x{height}"
            )));
        }
        let bitmap = BitmapGuard {
            engine,
            ptr: bitmap_ptr,
        };

        engine.bitmap_fill_rect(bitmap.ptr, 0, 0, width, height, WHITE);
        engine.render_page_bitmap(bitmap.ptr, self.ptr(), 0, 0, width, height, 0, 0);

        // Fresh pointers and views only from here on: the render call may
        // have grown the heap.
        let buffer_ptr = engine.bitmap_buffer(bitmap.ptr);
        let engine_stride = engine.bitmap_stride(bitmap.ptr);
        let row_bytes = width as usize * 4;
        let mut pixels = vec![0u8; row_bytes * height as usize];
        for row in 0..height as usize {
            let src = buffer_ptr + (row as u32) * engine_stride as u32;
            engine.read_memory(src, &mut pixels[row * row_bytes..(row + 1) * row_bytes]);
        }

        drop(bitmap);
        drop(framebuffer);

        if !options.ignore_missing_glyphs {
            let coverage = glyphs::check_page(engine, self.ptr());
            if coverage.missing > options.missing_glyph_threshold {
                return Err(Error::MissingGlyph {
                    missing: coverage.missing,
                    threshold: options.missing_glyph_threshold,
                });
            }
        }

        debug!(
            index = self.index(),
            width, height, scale = options.scale, "page rendered"
        );

        Ok(RenderedBitmap {
            pixels,
            width: width as u32,
            height: height as u32,
        })
    }
}
