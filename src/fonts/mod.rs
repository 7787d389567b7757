//! Font provisioning and embedding analysis
//!
//! Two independent halves:
//!
//! - [`FontRegistry`] writes caller-supplied font files into the engine's
//!   virtual filesystem, where the configured search paths pick them up on
//!   the next document open.
//! - [`find_unembedded_fonts`] is a static byte scan of a raw document for
//!   fonts that will silently render wrong because their data is absent.

mod embedding;
mod registry;

pub use embedding::{find_unembedded_fonts, STANDARD_FONTS};
pub use registry::{FontDescriptor, FontRegistry};
