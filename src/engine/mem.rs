//! Marshaling helpers over the engine allocator
//!
//! Every native allocation made by this crate goes through [`ScopedAlloc`]:
//! an owning guard whose backing pointer is freed exactly once, on drop or
//! never again after [`ScopedAlloc::into_raw`] transfers ownership to a
//! longer-lived handle. This keeps the error paths leak-free without
//! caller-remembered cleanup.

use crate::engine::{NativePtr, PdfEngine, NULL};
use crate::error::{Error, Result};

/// Owning guard for one engine-heap allocation
pub(crate) struct ScopedAlloc<'a> {
    engine: &'a dyn PdfEngine,
    ptr: NativePtr,
}

impl<'a> ScopedAlloc<'a> {
    /// Allocate `size` bytes, failing with [`Error::OutOfMemory`] when the
    /// engine allocator returns null.
    pub(crate) fn new(engine: &'a dyn PdfEngine, size: u32) -> Result<Self> {
        let ptr = engine.malloc(size);
        if ptr == NULL {
            return Err(Error::OutOfMemory(size));
        }
        Ok(Self { engine, ptr })
    }

    /// Allocate and fill with `bytes`.
    pub(crate) fn copy_in(engine: &'a dyn PdfEngine, bytes: &[u8]) -> Result<Self> {
        // malloc(0) may legitimately return null; keep the pointer distinct.
        let alloc = Self::new(engine, (bytes.len() as u32).max(1))?;
        engine.write_memory(alloc.ptr, bytes);
        Ok(alloc)
    }

    pub(crate) fn ptr(&self) -> NativePtr {
        self.ptr
    }

    /// Give up ownership; the caller becomes responsible for freeing.
    pub(crate) fn into_raw(mut self) -> NativePtr {
        std::mem::replace(&mut self.ptr, NULL)
    }
}

impl Drop for ScopedAlloc<'_> {
    fn drop(&mut self) {
        if self.ptr != NULL {
            self.engine.free(self.ptr);
        }
    }
}

/// Allocate and write a null-terminated UTF-8 copy of `s`.
///
/// An interior NUL would silently truncate the string on the native side,
/// so it is rejected as a binding defect.
pub(crate) fn write_cstring<'a>(engine: &'a dyn PdfEngine, s: &str) -> Result<ScopedAlloc<'a>> {
    if s.as_bytes().contains(&0) {
        return Err(Error::Config(format!(
            "string contains an interior NUL byte: {s:?}"
        )));
    }
    let alloc = ScopedAlloc::new(engine, s.len() as u32 + 1)?;
    engine.write_memory(alloc.ptr(), s.as_bytes());
    engine.write_memory(alloc.ptr() + s.len() as u32, &[0]);
    Ok(alloc)
}
