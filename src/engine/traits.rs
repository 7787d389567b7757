//! The `PdfEngine` trait and its ABI constants

use thiserror::Error;

/// Pointer into the engine's 32-bit linear memory
pub type NativePtr = u32;

/// The engine's null pointer
pub const NULL: NativePtr = 0;

/// 32-bit-per-pixel BGRA, the only bitmap format this bridge renders to
pub const BITMAP_FORMAT_BGRA: i32 = 4;

/// Native last-error codes as reported by the engine.
///
/// These never escape the crate; see `DocumentError::from_code`.
pub mod error_code {
    pub const SUCCESS: u32 = 0;
    pub const UNKNOWN: u32 = 1;
    pub const FILE: u32 = 2;
    pub const FORMAT: u32 = 3;
    pub const PASSWORD: u32 = 4;
    pub const SECURITY: u32 = 5;
    pub const PAGE: u32 = 6;
}

/// Virtual-filesystem failure reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    /// The path already exists (directory creation tolerates this)
    #[error("path already exists: {0}")]
    AlreadyExists(String),

    /// The path does not exist
    #[error("path not found: {0}")]
    NotFound(String),

    /// The path is not acceptable to this bridge (empty, absolute-escaping, ..)
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Any other filesystem failure
    #[error("filesystem error: {0}")]
    Other(String),
}

/// Result of a virtual-filesystem `stat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub is_dir: bool,
    pub size: u64,
}

/// The flat function boundary of the compiled PDF engine.
///
/// One implementation wraps one engine instance with one private linear
/// heap. All pointer-owning operations against the same instance must be
/// strictly serialized by the caller; handles derived from the same
/// instance inherit that requirement. The bridge itself never interleaves
/// native calls within a single operation.
pub trait PdfEngine: Send + Sync {
    // --- allocator ---

    /// Allocate `size` bytes on the engine heap. Returns [`NULL`] when the
    /// heap is exhausted.
    fn malloc(&self, size: u32) -> NativePtr;

    /// Release a pointer previously returned by [`PdfEngine::malloc`].
    fn free(&self, ptr: NativePtr);

    // --- linear memory ---

    /// Copy bytes out of linear memory, through a view taken at call time.
    fn read_memory(&self, ptr: NativePtr, out: &mut [u8]);

    /// Copy bytes into linear memory, through a view taken at call time.
    fn write_memory(&self, ptr: NativePtr, bytes: &[u8]);

    /// Read one little-endian word.
    fn read_u32(&self, ptr: NativePtr) -> u32 {
        let mut buf = [0u8; 4];
        self.read_memory(ptr, &mut buf);
        u32::from_le_bytes(buf)
    }

    /// Write one little-endian word.
    fn write_u32(&self, ptr: NativePtr, value: u32) {
        self.write_memory(ptr, &value.to_le_bytes());
    }

    // --- library ---

    /// `FPDF_InitLibraryWithConfig`
    fn init_with_config(&self, config_ptr: NativePtr);

    /// `FPDF_DestroyLibrary`
    fn destroy_library(&self);

    /// `FPDF_GetLastError`
    fn last_error(&self) -> u32;

    // --- document ---

    /// `FPDF_LoadMemDocument`; `password_ptr` may be [`NULL`]
    fn load_mem_document(&self, data_ptr: NativePtr, size: u32, password_ptr: NativePtr)
        -> NativePtr;

    /// `FPDF_CloseDocument`
    fn close_document(&self, doc: NativePtr);

    /// `FPDF_GetPageCount`
    fn page_count(&self, doc: NativePtr) -> i32;

    // --- page ---

    /// `FPDF_LoadPage`
    fn load_page(&self, doc: NativePtr, index: i32) -> NativePtr;

    /// `FPDF_ClosePage`
    fn close_page(&self, page: NativePtr);

    /// `FPDF_GetPageWidthF`, in points
    fn page_width(&self, page: NativePtr) -> f32;

    /// `FPDF_GetPageHeightF`, in points
    fn page_height(&self, page: NativePtr) -> f32;

    // --- bitmap ---

    /// `FPDFBitmap_CreateEx` over a caller-allocated framebuffer
    fn bitmap_create(
        &self,
        width: i32,
        height: i32,
        format: i32,
        buffer: NativePtr,
        stride: i32,
    ) -> NativePtr;

    /// `FPDFBitmap_FillRect`; `color` is `0xAARRGGBB`
    fn bitmap_fill_rect(&self, bitmap: NativePtr, left: i32, top: i32, width: i32, height: i32, color: u32);

    /// `FPDF_RenderPageBitmap`
    #[allow(clippy::too_many_arguments)]
    fn render_page_bitmap(
        &self,
        bitmap: NativePtr,
        page: NativePtr,
        start_x: i32,
        start_y: i32,
        width: i32,
        height: i32,
        rotate: i32,
        flags: i32,
    );

    /// `FPDFBitmap_GetBuffer`
    fn bitmap_buffer(&self, bitmap: NativePtr) -> NativePtr;

    /// `FPDFBitmap_GetStride`, in bytes per row
    fn bitmap_stride(&self, bitmap: NativePtr) -> i32;

    /// `FPDFBitmap_Destroy`
    fn bitmap_destroy(&self, bitmap: NativePtr);

    // --- text ---

    /// `FPDFText_LoadPage`; may return [`NULL`] when no text view exists
    fn text_load_page(&self, page: NativePtr) -> NativePtr;

    /// `FPDFText_ClosePage`
    fn text_close_page(&self, text_page: NativePtr);

    /// `FPDFText_CountChars`
    fn text_count_chars(&self, text_page: NativePtr) -> i32;

    /// `FPDFText_GetUnicode`
    fn text_char_unicode(&self, text_page: NativePtr, index: i32) -> u32;

    /// `FPDFText_HasUnicodeMapError`: positive when the character at
    /// `index` has no unicode mapping, zero when it does, negative on error
    fn text_has_unicode_map_error(&self, text_page: NativePtr, index: i32) -> i32;

    // --- virtual filesystem (font provisioning) ---

    /// Create a directory. Callers tolerate [`VfsError::AlreadyExists`].
    fn fs_mkdir(&self, path: &str) -> Result<(), VfsError>;

    /// Write a file, replacing any previous content.
    fn fs_write(&self, path: &str, data: &[u8]) -> Result<(), VfsError>;

    /// List the entry names directly under a directory.
    fn fs_read_dir(&self, path: &str) -> Result<Vec<String>, VfsError>;

    /// Stat a path.
    fn fs_stat(&self, path: &str) -> Result<FileStat, VfsError>;

    /// Remove a file.
    fn fs_unlink(&self, path: &str) -> Result<(), VfsError>;
}
