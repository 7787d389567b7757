//! Library configuration marshaling
//!
//! The engine's init entry point takes a pointer to a fixed-layout config
//! struct: version word at offset 0, pointer to a null-terminated array of
//! font-search-path strings at offset 4, every remaining byte zero. The
//! engine reads all fields of the struct whether or not this binding uses
//! them, so the packer zero-fills the full 16 bytes.
//!
//! Packing is split from allocation on purpose: [`pack_library_config`] is
//! a pure function over semantic fields, unit-tested against byte fixtures
//! so an ABI regression is caught without the engine in the loop.

use serde::{Deserialize, Serialize};

use crate::engine::{NativePtr, PdfEngine, ScopedAlloc, NULL};
use crate::error::Result;

/// Version word this binding writes into the config struct
pub(crate) const CONFIG_VERSION: u32 = 2;

/// Byte size of the native config struct
pub(crate) const CONFIG_STRUCT_SIZE: u32 = 16;

const POINTER_SIZE: u32 = 4;

/// Library configuration: where the engine looks for fonts.
///
/// The defaults mirror the search list the engine's build bakes in: the
/// provisioning root `/fonts` first, then the conventional system font
/// directories of the sandboxed filesystem image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryConfig {
    /// Root directory fonts are provisioned into
    pub font_root: String,
    /// Additional font search paths passed verbatim to the engine
    pub extra_search_paths: Vec<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            font_root: "/fonts".to_string(),
            extra_search_paths: vec![
                "/usr/share/fonts".to_string(),
                "/usr/share/X11/fonts/Type1".to_string(),
                "/usr/share/X11/fonts/TTF".to_string(),
                "/usr/local/share/fonts".to_string(),
            ],
        }
    }
}

impl LibraryConfig {
    /// The full search list in engine order: font root first.
    pub fn search_paths(&self) -> Vec<String> {
        let mut paths = Vec::with_capacity(1 + self.extra_search_paths.len());
        paths.push(self.font_root.clone());
        paths.extend(self.extra_search_paths.iter().cloned());
        paths
    }
}

/// Pack the native config struct from semantic fields.
pub(crate) fn pack_library_config(version: u32, font_paths_ptr: NativePtr) -> [u8; 16] {
    let mut buf = [0u8; 16];
    buf[0..4].copy_from_slice(&version.to_le_bytes());
    buf[4..8].copy_from_slice(&font_paths_ptr.to_le_bytes());
    buf
}

/// The marshaled search-path array: one allocation per string plus the
/// null-terminated pointer array itself. All pointers must outlive the
/// library and are freed together when it is destroyed.
pub(crate) struct SearchPathArray {
    /// Pointer to the null-terminated array of string pointers
    pub(crate) array_ptr: NativePtr,
    /// Every allocation backing the array, the array pointer included
    pub(crate) allocations: Vec<NativePtr>,
}

/// Allocate and fill the null-terminated search-path array.
///
/// On any failure every allocation made so far is freed before the error
/// propagates; a partially built array never escapes.
pub(crate) fn build_search_path_array(
    engine: &dyn PdfEngine,
    paths: &[String],
) -> Result<SearchPathArray> {
    let mut string_ptrs: Vec<NativePtr> = Vec::with_capacity(paths.len());

    let free_all = |ptrs: &[NativePtr]| {
        for &ptr in ptrs {
            engine.free(ptr);
        }
    };

    for path in paths {
        match crate::engine::write_cstring(engine, path) {
            Ok(alloc) => string_ptrs.push(alloc.into_raw()),
            Err(err) => {
                free_all(&string_ptrs);
                return Err(err);
            }
        }
    }

    let array_size = (paths.len() as u32 + 1) * POINTER_SIZE;
    let array = match ScopedAlloc::new(engine, array_size) {
        Ok(alloc) => alloc,
        Err(err) => {
            free_all(&string_ptrs);
            return Err(err);
        }
    };

    for (i, &ptr) in string_ptrs.iter().enumerate() {
        engine.write_u32(array.ptr() + i as u32 * POINTER_SIZE, ptr);
    }
    engine.write_u32(array.ptr() + paths.len() as u32 * POINTER_SIZE, NULL);

    let array_ptr = array.into_raw();
    let mut allocations = string_ptrs;
    allocations.push(array_ptr);

    Ok(SearchPathArray {
        array_ptr,
        allocations,
    })
}
