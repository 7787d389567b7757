//! Library lifecycle
//!
//! A [`Library`] wraps one engine instance and owns every pointer the
//! config marshaler allocated for it: the font-search-path strings and the
//! null-terminated pointer array. Those allocations must outlive the
//! native library, so they are recorded at init time and freed together on
//! [`Library::destroy`], which is idempotent and also runs from `Drop`.
//!
//! Documents borrow the library, so the borrow checker rules out
//! destroying a library while one of its documents is still open.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::config::{
    build_search_path_array, pack_library_config, LibraryConfig, CONFIG_STRUCT_SIZE, CONFIG_VERSION,
};
use crate::document::Document;
use crate::engine::{NativePtr, PdfEngine, ScopedAlloc};
use crate::error::Result;
use crate::fonts::FontRegistry;

/// An initialized engine library
pub struct Library {
    engine: Arc<dyn PdfEngine>,
    config: LibraryConfig,
    /// Search-path allocations, freed together on destroy
    path_allocations: Vec<NativePtr>,
    initialized: bool,
}

impl Library {
    /// Initialize the engine with the default configuration.
    pub fn init(engine: Arc<dyn PdfEngine>) -> Result<Self> {
        Self::init_with_config(engine, LibraryConfig::default())
    }

    /// Initialize the engine with an explicit configuration.
    ///
    /// Marshals the search-path array and the config struct, invokes the
    /// native init entry point, then releases the struct. The path array
    /// and its strings stay allocated for the lifetime of the library. An
    /// allocator failure aborts initialization with nothing left behind on
    /// the engine heap.
    pub fn init_with_config(engine: Arc<dyn PdfEngine>, config: LibraryConfig) -> Result<Self> {
        let paths = config.search_paths();
        let array = build_search_path_array(&*engine, &paths)?;

        let config_alloc = match ScopedAlloc::new(&*engine, CONFIG_STRUCT_SIZE) {
            Ok(alloc) => alloc,
            Err(err) => {
                for &ptr in &array.allocations {
                    engine.free(ptr);
                }
                return Err(err);
            }
        };

        let packed = pack_library_config(CONFIG_VERSION, array.array_ptr);
        engine.write_memory(config_alloc.ptr(), &packed);
        engine.init_with_config(config_alloc.ptr());
        // The struct is only read during init; the path array must outlive it.
        drop(config_alloc);

        debug!(search_paths = ?paths, "engine library initialized");

        Ok(Self {
            engine,
            config,
            path_allocations: array.allocations,
            initialized: true,
        })
    }

    /// The engine this library was initialized on.
    pub fn engine(&self) -> &Arc<dyn PdfEngine> {
        &self.engine
    }

    /// The configuration the library was initialized with.
    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// Font registry rooted at this library's font directory.
    pub fn fonts(&self) -> FontRegistry<'_> {
        FontRegistry::new(&*self.engine, &self.config.font_root)
    }

    /// Open a document from raw PDF bytes.
    pub fn open_document(&self, bytes: &[u8]) -> Result<Document<'_>> {
        Document::open(self, bytes, None)
    }

    /// Open an encrypted document from raw PDF bytes.
    pub fn open_document_with_password(&self, bytes: &[u8], password: &str) -> Result<Document<'_>> {
        Document::open(self, bytes, Some(password))
    }

    /// Tear down the native library and free the search-path allocations.
    ///
    /// Safe to call repeatedly; only the first call does anything.
    pub fn destroy(&mut self) {
        if !self.initialized {
            return;
        }
        self.engine.destroy_library();
        for ptr in self.path_allocations.drain(..) {
            self.engine.free(ptr);
        }
        self.initialized = false;
        debug!("engine library destroyed");
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Guarded holder for a lazily constructed, process-shared [`Library`].
///
/// Replaces a module-global cached singleton: the call site owns the cell
/// and passes the library into every operation explicitly. The mutex makes
/// racing first callers agree on a single initialization.
#[derive(Default)]
pub struct LibraryCell {
    inner: Mutex<Option<Arc<Library>>>,
}

impl LibraryCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared library, constructing it on first use.
    ///
    /// When construction fails the cell stays empty, so a later call can
    /// retry.
    pub fn get_or_init<F>(&self, init: F) -> Result<Arc<Library>>
    where
        F: FnOnce() -> Result<Library>,
    {
        let mut slot = self.inner.lock();
        if let Some(library) = slot.as_ref() {
            return Ok(Arc::clone(library));
        }
        let library = Arc::new(init()?);
        *slot = Some(Arc::clone(&library));
        Ok(library)
    }

    /// Drop the cached instance, if any. The library is torn down once the
    /// last outstanding `Arc` goes away.
    pub fn reset(&self) -> Option<Arc<Library>> {
        self.inner.lock().take()
    }
}
