//! Document handles
//!
//! A [`Document`] owns exactly two native pointers: the opaque document
//! reference and the buffer the raw PDF bytes were copied into at open
//! time. Both are released together, exactly once, on [`Document::close`];
//! closing again is a no-op. Pages borrow the document, so a document
//! cannot be closed while one of its pages is alive.

use tracing::{debug, warn};

use crate::engine::{NativePtr, PdfEngine, ScopedAlloc, NULL};
use crate::error::{DocumentError, Error, Result};
use crate::fonts::find_unembedded_fonts;
use crate::library::Library;
use crate::page::Page;

/// An open document on the engine heap
pub struct Document<'lib> {
    lib: &'lib Library,
    doc_ptr: NativePtr,
    data_ptr: NativePtr,
    /// Fonts the pre-open byte scan flagged as unembedded; non-empty blocks
    /// rendering
    missing_fonts: Vec<String>,
    closed: bool,
}

impl<'lib> Document<'lib> {
    pub(crate) fn open(lib: &'lib Library, bytes: &[u8], password: Option<&str>) -> Result<Self> {
        let engine = &**lib.engine();

        let data = ScopedAlloc::copy_in(engine, bytes)?;

        let password_alloc = match password {
            Some(password) => Some(crate::engine::write_cstring(engine, password)?),
            None => None,
        };
        let password_ptr = password_alloc.as_ref().map_or(NULL, ScopedAlloc::ptr);

        let doc_ptr = engine.load_mem_document(data.ptr(), bytes.len() as u32, password_ptr);
        // The engine copies the password during the call; release it now
        // whatever the outcome.
        drop(password_alloc);

        if doc_ptr == NULL {
            let code = engine.last_error();
            // `data` drops here, so the buffer does not leak on this path.
            return Err(Error::Document(DocumentError::from_code(
                code,
                password.is_some(),
            )));
        }

        let missing_fonts = find_unembedded_fonts(bytes);
        if !missing_fonts.is_empty() {
            warn!(fonts = ?missing_fonts, "document references unembedded fonts; rendering will be blocked");
        }
        debug!(size = bytes.len(), "document opened");

        Ok(Self {
            lib,
            doc_ptr,
            data_ptr: data.into_raw(),
            missing_fonts,
            closed: false,
        })
    }

    pub(crate) fn engine(&self) -> &dyn PdfEngine {
        &**self.lib.engine()
    }

    #[cfg(test)]
    pub(crate) fn ptr(&self) -> NativePtr {
        self.doc_ptr
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        Ok(())
    }

    /// Number of pages. Queried from the engine on every call, never cached.
    pub fn page_count(&self) -> Result<u32> {
        self.ensure_open()?;
        Ok(self.engine().page_count(self.doc_ptr).max(0) as u32)
    }

    /// Load page `index` (zero-based).
    pub fn page(&self, index: u32) -> Result<Page<'_>> {
        self.ensure_open()?;
        let index_native =
            i32::try_from(index).map_err(|_| Error::Document(DocumentError::PageError))?;
        let page_ptr = self.engine().load_page(self.doc_ptr, index_native);
        if page_ptr == NULL {
            debug!(index, "page load failed");
            return Err(Error::Document(DocumentError::PageError));
        }
        Ok(Page::new(self, page_ptr, index))
    }

    /// Fonts the static embedding scan flagged. Non-empty blocks rendering.
    pub fn missing_fonts(&self) -> &[String] {
        &self.missing_fonts
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Close the native document and free the backing data buffer.
    ///
    /// Idempotent: repeated calls return immediately.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.engine().close_document(self.doc_ptr);
        self.engine().free(self.data_ptr);
        self.closed = true;
        debug!("document closed");
    }
}

impl Drop for Document<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
