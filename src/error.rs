//! Error taxonomy for the engine bridge
//!
//! Raw native error codes never cross this boundary: they are translated
//! into [`DocumentError`] at the point of detection, and everything else
//! an operation can fail with gets its own typed variant so callers can
//! branch on it (notably [`Error::MissingFont`] and [`Error::MissingGlyph`],
//! which are distinguishable from a generic render failure).

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::engine::VfsError;

/// Unified error type for all bridge operations
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed native config struct or search-path array.
    ///
    /// Always a binding defect, never caller-recoverable.
    #[error("engine configuration failed: {0}")]
    Config(String),

    /// The native allocator returned a null pointer.
    #[error("native allocation of {0} bytes failed")]
    OutOfMemory(u32),

    /// Document-level failure derived from a native error code
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Any failure inside the bitmap render pipeline
    #[error("render failed: {0}")]
    RenderFailed(String),

    /// The document references fonts that are neither standard nor embedded.
    ///
    /// Raised before any native render call is issued; the listed names come
    /// from the static byte scan of the raw document.
    #[error("document references unembedded fonts: {}", .0.join(", "))]
    MissingFont(Vec<String>),

    /// Too many characters on the rendered page had no glyph.
    ///
    /// The rendered buffer has been discarded; callers decide whether to
    /// retry with substitute fonts or re-render with a higher threshold.
    #[error("{missing} character(s) could not be mapped to a glyph (threshold {threshold})")]
    MissingGlyph { missing: u32, threshold: u32 },

    /// Archive extraction failure
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Virtual-filesystem failure during font provisioning
    #[error(transparent)]
    Vfs(#[from] VfsError),

    /// Operation attempted on a handle that was already closed
    #[error("operation on a closed handle")]
    Closed,
}

/// Document-level error, translated from the engine's last-error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// Load failed with no usable native diagnostic
    #[error("document could not be loaded")]
    Unknown,

    /// The data is not a valid PDF
    #[error("document is not a valid PDF")]
    InvalidFormat,

    /// The document is encrypted and no password was supplied
    #[error("document is password protected")]
    PasswordRequired,

    /// The supplied password did not match
    #[error("incorrect document password")]
    IncorrectPassword,

    /// The document uses a security scheme the engine cannot handle
    #[error("unsupported security scheme")]
    UnsupportedSecurity,

    /// Page missing or page content unusable
    #[error("page not found or content error")]
    PageError,
}

impl DocumentError {
    /// Translate a native last-error code into a typed error.
    ///
    /// The password code is ambiguous at the native level: it is reported
    /// both when a password was required but absent and when the supplied
    /// one was wrong, so `had_password` disambiguates.
    pub fn from_code(code: u32, had_password: bool) -> Self {
        use crate::engine::error_code;

        match code {
            error_code::FORMAT => Self::InvalidFormat,
            error_code::PASSWORD => {
                if had_password {
                    Self::IncorrectPassword
                } else {
                    Self::PasswordRequired
                }
            }
            error_code::SECURITY => Self::UnsupportedSecurity,
            error_code::PAGE => Self::PageError,
            _ => Self::Unknown,
        }
    }
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;
