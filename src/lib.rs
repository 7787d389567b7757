//! Estampa: document rendering over a sandboxed PDFium engine
//!
//! The engine is a compiled, isolated PDF renderer reachable only through
//! a flat function boundary with manual memory management and a private
//! linear heap. This crate is the bridge: it marshals config structs and
//! string arrays into the engine's byte layout, owns and frees native
//! pointers across the document/page/bitmap lifecycle, converts rendered
//! pixel buffers into consumer formats, detects documents whose rendering
//! would silently fail for lack of font data, and extracts font assets
//! from archives.
//!
//! # Modules
//!
//! - `engine`: the opaque [`PdfEngine`] boundary and marshaling helpers
//! - `library` / `document` / `page` / `render`: the handle hierarchy and
//!   the bitmap pipeline
//! - `fonts`: provisioning into the engine filesystem and the static
//!   embedding scan
//! - `archive`: single-entry archive extraction for font provisioning
//!
//! # Usage
//!
//! ```rust,ignore
//! use estampa::{Library, RenderOptions};
//!
//! let library = Library::init(engine)?;
//! let doc = library.open_document(&pdf_bytes)?;
//! let page = doc.page(0)?;
//! let bitmap = page.render(&RenderOptions::default())?.into_rgba();
//! ```
//!
//! # Serialization requirement
//!
//! One engine instance is one mutable linear-memory arena. All operations
//! against the same instance must be strictly serialized by the caller;
//! this crate never interleaves native calls within one operation but does
//! not queue across operations. The native render call is synchronous and
//! cannot be cancelled once issued; apply timeouts at the granularity of
//! whole document lifecycles.

pub mod archive;
mod config;
mod document;
pub mod engine;
mod error;
pub mod fonts;
mod glyphs;
mod library;
mod page;
mod render;

pub use archive::{extract_entry, ArchiveError};
pub use config::LibraryConfig;
pub use document::Document;
pub use engine::{FileStat, NativePtr, PdfEngine, VfsError};
pub use error::{DocumentError, Error, Result};
pub use fonts::{find_unembedded_fonts, FontDescriptor, FontRegistry, STANDARD_FONTS};
pub use glyphs::GlyphCoverage;
pub use library::{Library, LibraryCell};
pub use page::Page;
pub use render::{bgra_to_rgba, RenderOptions, RenderedBitmap};
