//! The native engine boundary
//!
//! The PDFium engine is consumed as an opaque capability: a flat, C-style
//! function boundary over a private linear heap. [`PdfEngine`] captures that
//! boundary as an object-safe trait: the fixed entry-point set, the
//! byte/word views of linear memory, the `malloc`/`free` allocator, and the
//! virtual-filesystem surface used for font provisioning.
//!
//! Nothing in this crate owns an engine implementation; a wasm-runtime-backed
//! instance lives downstream. Tests run against the scripted engine in
//! [`mock`].
//!
//! # Memory discipline
//!
//! The engine's linear memory may grow or relocate during any native call.
//! The trait therefore exposes no long-lived view of memory: every
//! [`PdfEngine::read_memory`] / [`PdfEngine::write_memory`] call implies a
//! fresh view taken at call time. Holding bytes copied out earlier is fine;
//! holding a stale view is not expressible through this interface.

mod mem;
mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub(crate) use mem::{write_cstring, ScopedAlloc};
pub use traits::{error_code, FileStat, NativePtr, PdfEngine, VfsError, BITMAP_FORMAT_BGRA, NULL};
