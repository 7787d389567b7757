//! Scripted in-process engine for tests
//!
//! Implements the full [`PdfEngine`] boundary over a real linear heap so
//! marshaling, pointer ownership, and teardown order can be verified
//! without the compiled engine. Allocation tracking panics on double-free
//! and exposes leak counters; document/page/bitmap handles live in a
//! separate numeric space from heap pointers so a confusion between the
//! two shows up immediately.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use parking_lot::Mutex;

use crate::engine::{error_code, FileStat, NativePtr, PdfEngine, VfsError, NULL};

const HANDLE_BASE: NativePtr = 0x4000_0000;
const HEAP_BASE: NativePtr = 0x100;

#[derive(Debug, Clone)]
pub(crate) struct MockEngineBuilder {
    page_count: i32,
    page_width: f32,
    page_height: f32,
    password: Option<String>,
    load_error: Option<u32>,
    page_text: String,
    missing_glyph_count: i32,
    text_page_unavailable: bool,
    fail_alloc_at: Option<usize>,
}

impl Default for MockEngineBuilder {
    fn default() -> Self {
        Self {
            page_count: 1,
            page_width: 612.0,
            page_height: 792.0,
            password: None,
            load_error: None,
            page_text: String::new(),
            missing_glyph_count: 0,
            text_page_unavailable: false,
            fail_alloc_at: None,
        }
    }
}

impl MockEngineBuilder {
    pub(crate) fn page_count(mut self, count: i32) -> Self {
        self.page_count = count;
        self
    }

    pub(crate) fn page_size(mut self, width: f32, height: f32) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Require this password to open documents.
    pub(crate) fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    /// Fail every document load with the given native error code.
    pub(crate) fn load_error(mut self, code: u32) -> Self {
        self.load_error = Some(code);
        self
    }

    /// Text content reported by the text view of every page.
    pub(crate) fn page_text(mut self, text: &str) -> Self {
        self.page_text = text.to_string();
        self
    }

    /// The first `count` characters of each page report a unicode map error.
    pub(crate) fn missing_glyphs(mut self, count: i32) -> Self {
        self.missing_glyph_count = count;
        self
    }

    /// `text_load_page` returns null.
    pub(crate) fn without_text_page(mut self) -> Self {
        self.text_page_unavailable = true;
        self
    }

    /// The n-th allocation (0-based) returns null.
    pub(crate) fn fail_alloc_at(mut self, n: usize) -> Self {
        self.fail_alloc_at = Some(n);
        self
    }

    pub(crate) fn build(self) -> MockEngine {
        MockEngine {
            behavior: self,
            state: Mutex::new(State::default()),
        }
    }
}

struct MockDoc {
    data: Vec<u8>,
}

struct MockBitmap {
    width: i32,
    height: i32,
    stride: i32,
    buffer: NativePtr,
}

#[derive(Default)]
struct State {
    memory: Vec<u8>,
    next_ptr: NativePtr,
    allocations: HashMap<NativePtr, u32>,
    alloc_count: usize,
    next_handle: NativePtr,
    last_error: u32,
    initialized: bool,
    init_count: usize,
    search_paths: Vec<String>,
    docs: HashMap<NativePtr, MockDoc>,
    pages: HashMap<NativePtr, (NativePtr, i32)>,
    bitmaps: HashMap<NativePtr, MockBitmap>,
    text_pages: HashMap<NativePtr, NativePtr>,
    render_calls: usize,
    dirs: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
}

impl State {
    fn new_handle(&mut self) -> NativePtr {
        self.next_handle += 1;
        HANDLE_BASE + self.next_handle
    }

    fn grow_to(&mut self, end: usize) {
        if self.memory.len() < end {
            self.memory.resize(end, 0);
        }
    }

    fn read_cstring(&self, mut ptr: NativePtr) -> String {
        let mut out = Vec::new();
        loop {
            let b = *self.memory.get(ptr as usize).unwrap_or(&0);
            if b == 0 {
                break;
            }
            out.push(b);
            ptr += 1;
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    fn read_u32(&self, ptr: NativePtr) -> u32 {
        let mut buf = [0u8; 4];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = *self.memory.get(ptr as usize + i).unwrap_or(&0);
        }
        u32::from_le_bytes(buf)
    }
}

/// Scripted engine; see module docs
pub(crate) struct MockEngine {
    behavior: MockEngineBuilder,
    state: Mutex<State>,
}

impl MockEngine {
    pub(crate) fn builder() -> MockEngineBuilder {
        MockEngineBuilder::default()
    }

    // --- assertion helpers ---

    /// Heap allocations not yet freed.
    pub(crate) fn outstanding_allocations(&self) -> usize {
        self.state.lock().allocations.len()
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    pub(crate) fn init_count(&self) -> usize {
        self.state.lock().init_count
    }

    /// Search paths parsed out of the config struct at init time.
    pub(crate) fn search_paths(&self) -> Vec<String> {
        self.state.lock().search_paths.clone()
    }

    pub(crate) fn render_calls(&self) -> usize {
        self.state.lock().render_calls
    }

    pub(crate) fn open_documents(&self) -> usize {
        self.state.lock().docs.len()
    }

    pub(crate) fn open_pages(&self) -> usize {
        self.state.lock().pages.len()
    }

    pub(crate) fn open_text_pages(&self) -> usize {
        self.state.lock().text_pages.len()
    }

    /// Bytes the last opened document was loaded from.
    pub(crate) fn document_bytes(&self, doc: NativePtr) -> Vec<u8> {
        self.state.lock().docs[&doc].data.clone()
    }

    pub(crate) fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().files.get(path).cloned()
    }

    pub(crate) fn has_dir(&self, path: &str) -> bool {
        self.state.lock().dirs.contains(path)
    }
}

fn parent_dir(path: &str) -> String {
    match path.rfind('/') {
        Some(0) => "/".to_string(),
        Some(i) => path[..i].to_string(),
        None => "/".to_string(),
    }
}

impl PdfEngine for MockEngine {
    fn malloc(&self, size: u32) -> NativePtr {
        let mut state = self.state.lock();
        let n = state.alloc_count;
        state.alloc_count += 1;
        if self.behavior.fail_alloc_at == Some(n) {
            return NULL;
        }
        if state.next_ptr == 0 {
            state.next_ptr = HEAP_BASE;
        }
        let ptr = state.next_ptr;
        // Bump allocator, 8-byte aligned, no reuse. Good enough for tests.
        state.next_ptr += (size.max(1) + 7) & !7;
        let end = (ptr + size.max(1)) as usize;
        state.grow_to(end);
        state.allocations.insert(ptr, size);
        ptr
    }

    fn free(&self, ptr: NativePtr) {
        let mut state = self.state.lock();
        if state.allocations.remove(&ptr).is_none() {
            panic!("free of unknown or already-freed pointer {ptr:#x}");
        }
    }

    fn read_memory(&self, ptr: NativePtr, out: &mut [u8]) {
        let state = self.state.lock();
        for (i, b) in out.iter_mut().enumerate() {
            *b = *state.memory.get(ptr as usize + i).unwrap_or(&0);
        }
    }

    fn write_memory(&self, ptr: NativePtr, bytes: &[u8]) {
        let mut state = self.state.lock();
        let end = ptr as usize + bytes.len();
        state.grow_to(end);
        state.memory[ptr as usize..end].copy_from_slice(bytes);
    }

    fn init_with_config(&self, config_ptr: NativePtr) {
        let mut state = self.state.lock();
        let version = state.read_u32(config_ptr);
        assert_eq!(version, 2, "unexpected config struct version");
        let mut slot = state.read_u32(config_ptr + 4);
        let mut paths = Vec::new();
        if slot != NULL {
            loop {
                let str_ptr = state.read_u32(slot);
                if str_ptr == NULL {
                    break;
                }
                paths.push(state.read_cstring(str_ptr));
                slot += 4;
            }
        }
        state.search_paths = paths;
        state.initialized = true;
        state.init_count += 1;
    }

    fn destroy_library(&self) {
        let mut state = self.state.lock();
        assert!(state.initialized, "destroy_library without init");
        state.initialized = false;
    }

    fn last_error(&self) -> u32 {
        self.state.lock().last_error
    }

    fn load_mem_document(
        &self,
        data_ptr: NativePtr,
        size: u32,
        password_ptr: NativePtr,
    ) -> NativePtr {
        let mut state = self.state.lock();
        if let Some(code) = self.behavior.load_error {
            state.last_error = code;
            return NULL;
        }
        if let Some(expected) = &self.behavior.password {
            if password_ptr == NULL || state.read_cstring(password_ptr) != *expected {
                state.last_error = error_code::PASSWORD;
                return NULL;
            }
        }
        let data = state.memory[data_ptr as usize..(data_ptr + size) as usize].to_vec();
        let handle = state.new_handle();
        state.docs.insert(handle, MockDoc { data });
        state.last_error = error_code::SUCCESS;
        handle
    }

    fn close_document(&self, doc: NativePtr) {
        let mut state = self.state.lock();
        if state.docs.remove(&doc).is_none() {
            panic!("close of unknown or already-closed document {doc:#x}");
        }
    }

    fn page_count(&self, doc: NativePtr) -> i32 {
        let state = self.state.lock();
        assert!(state.docs.contains_key(&doc), "page_count on closed document");
        self.behavior.page_count
    }

    fn load_page(&self, doc: NativePtr, index: i32) -> NativePtr {
        let mut state = self.state.lock();
        assert!(state.docs.contains_key(&doc), "load_page on closed document");
        if index < 0 || index >= self.behavior.page_count {
            state.last_error = error_code::PAGE;
            return NULL;
        }
        let handle = state.new_handle();
        state.pages.insert(handle, (doc, index));
        handle
    }

    fn close_page(&self, page: NativePtr) {
        let mut state = self.state.lock();
        if state.pages.remove(&page).is_none() {
            panic!("close of unknown or already-closed page {page:#x}");
        }
    }

    fn page_width(&self, _page: NativePtr) -> f32 {
        self.behavior.page_width
    }

    fn page_height(&self, _page: NativePtr) -> f32 {
        self.behavior.page_height
    }

    fn bitmap_create(
        &self,
        width: i32,
        height: i32,
        format: i32,
        buffer: NativePtr,
        stride: i32,
    ) -> NativePtr {
        let mut state = self.state.lock();
        if width <= 0 || height <= 0 || format != crate::engine::BITMAP_FORMAT_BGRA {
            return NULL;
        }
        let needed = (stride as u32) * (height as u32);
        let allocated = *state
            .allocations
            .get(&buffer)
            .expect("bitmap buffer must be an allocated pointer");
        assert!(allocated >= needed, "bitmap buffer too small");
        let handle = state.new_handle();
        state.bitmaps.insert(
            handle,
            MockBitmap {
                width,
                height,
                stride,
                buffer,
            },
        );
        handle
    }

    fn bitmap_fill_rect(
        &self,
        bitmap: NativePtr,
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        color: u32,
    ) {
        let mut state = self.state.lock();
        let (buffer, stride) = {
            let bmp = &state.bitmaps[&bitmap];
            (bmp.buffer, bmp.stride)
        };
        let [b, g, r, a] = [
            (color & 0xff) as u8,
            ((color >> 8) & 0xff) as u8,
            ((color >> 16) & 0xff) as u8,
            ((color >> 24) & 0xff) as u8,
        ];
        for y in top..top + height {
            for x in left..left + width {
                let at = buffer as usize + y as usize * stride as usize + x as usize * 4;
                state.grow_to(at + 4);
                state.memory[at..at + 4].copy_from_slice(&[b, g, r, a]);
            }
        }
    }

    fn render_page_bitmap(
        &self,
        bitmap: NativePtr,
        page: NativePtr,
        _start_x: i32,
        _start_y: i32,
        _width: i32,
        _height: i32,
        _rotate: i32,
        _flags: i32,
    ) {
        let mut state = self.state.lock();
        assert!(state.pages.contains_key(&page), "render on closed page");
        state.render_calls += 1;
        // Force the heap to grow so stale views of memory would go wrong.
        let grow_to = state.memory.len() + 4096;
        state.grow_to(grow_to);
        let (buffer, width, height, stride) = {
            let bmp = &state.bitmaps[&bitmap];
            (bmp.buffer, bmp.width, bmp.height, bmp.stride)
        };
        // Deterministic BGRA pattern keyed on coordinates.
        for y in 0..height {
            for x in 0..width {
                let at = buffer as usize + y as usize * stride as usize + x as usize * 4;
                state.memory[at..at + 4].copy_from_slice(&[
                    (x & 0xff) as u8,
                    (y & 0xff) as u8,
                    ((x + y) & 0xff) as u8,
                    0xff,
                ]);
            }
        }
    }

    fn bitmap_buffer(&self, bitmap: NativePtr) -> NativePtr {
        self.state.lock().bitmaps[&bitmap].buffer
    }

    fn bitmap_stride(&self, bitmap: NativePtr) -> i32 {
        self.state.lock().bitmaps[&bitmap].stride
    }

    fn bitmap_destroy(&self, bitmap: NativePtr) {
        let mut state = self.state.lock();
        if state.bitmaps.remove(&bitmap).is_none() {
            panic!("destroy of unknown or already-destroyed bitmap {bitmap:#x}");
        }
    }

    fn text_load_page(&self, page: NativePtr) -> NativePtr {
        let mut state = self.state.lock();
        assert!(state.pages.contains_key(&page), "text view of closed page");
        if self.behavior.text_page_unavailable {
            return NULL;
        }
        let handle = state.new_handle();
        state.text_pages.insert(handle, page);
        handle
    }

    fn text_close_page(&self, text_page: NativePtr) {
        let mut state = self.state.lock();
        if state.text_pages.remove(&text_page).is_none() {
            panic!("close of unknown or already-closed text page {text_page:#x}");
        }
    }

    fn text_count_chars(&self, _text_page: NativePtr) -> i32 {
        (self.behavior.page_text.chars().count() as i32).max(self.behavior.missing_glyph_count)
    }

    fn text_char_unicode(&self, _text_page: NativePtr, index: i32) -> u32 {
        self.behavior
            .page_text
            .chars()
            .nth(index as usize)
            .map(|c| c as u32)
            .unwrap_or(0)
    }

    fn text_has_unicode_map_error(&self, _text_page: NativePtr, index: i32) -> i32 {
        i32::from(index < self.behavior.missing_glyph_count)
    }

    fn fs_mkdir(&self, path: &str) -> Result<(), VfsError> {
        let mut state = self.state.lock();
        if state.dirs.contains(path) {
            return Err(VfsError::AlreadyExists(path.to_string()));
        }
        let parent = parent_dir(path);
        if parent != "/" && !state.dirs.contains(parent.as_str()) {
            return Err(VfsError::NotFound(parent));
        }
        state.dirs.insert(path.to_string());
        Ok(())
    }

    fn fs_write(&self, path: &str, data: &[u8]) -> Result<(), VfsError> {
        let mut state = self.state.lock();
        let parent = parent_dir(path);
        if parent != "/" && !state.dirs.contains(parent.as_str()) {
            return Err(VfsError::NotFound(parent));
        }
        state.files.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn fs_read_dir(&self, path: &str) -> Result<Vec<String>, VfsError> {
        let state = self.state.lock();
        if !state.dirs.contains(path) {
            return Err(VfsError::NotFound(path.to_string()));
        }
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let mut names: Vec<String> = state
            .files
            .keys()
            .chain(state.dirs.iter())
            .filter_map(|p| p.strip_prefix(&prefix))
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
            .map(str::to_string)
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn fs_stat(&self, path: &str) -> Result<FileStat, VfsError> {
        let state = self.state.lock();
        if state.dirs.contains(path) {
            return Ok(FileStat {
                is_dir: true,
                size: 0,
            });
        }
        if let Some(data) = state.files.get(path) {
            return Ok(FileStat {
                is_dir: false,
                size: data.len() as u64,
            });
        }
        Err(VfsError::NotFound(path.to_string()))
    }

    fn fs_unlink(&self, path: &str) -> Result<(), VfsError> {
        let mut state = self.state.lock();
        if state.files.remove(path).is_none() {
            return Err(VfsError::NotFound(path.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_allocator_tracks_and_panics_on_double_free() {
        let engine = MockEngine::builder().build();
        let a = engine.malloc(16);
        let b = engine.malloc(16);
        assert_ne!(a, b);
        assert_eq!(engine.outstanding_allocations(), 2);
        engine.free(a);
        engine.free(b);
        assert_eq!(engine.outstanding_allocations(), 0);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| engine.free(a)));
        assert!(result.is_err());
    }

    #[test]
    fn test_memory_roundtrip() {
        let engine = MockEngine::builder().build();
        let ptr = engine.malloc(4);
        engine.write_u32(ptr, 0xdead_beef);
        assert_eq!(engine.read_u32(ptr), 0xdead_beef);
    }

    #[test]
    fn test_vfs_mkdir_reports_existing() {
        let engine = MockEngine::builder().build();
        engine.fs_mkdir("/fonts").unwrap();
        assert_eq!(
            engine.fs_mkdir("/fonts"),
            Err(VfsError::AlreadyExists("/fonts".to_string()))
        );
    }
}
