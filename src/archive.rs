//! Single-entry archive extraction
//!
//! Pulls one asset out of a ZIP-style archive by walking local file
//! headers sequentially from offset 0. The walk stops at the first
//! signature that is not a local file header, taken as the start of the
//! central directory or other trailing data.
//!
//! Behind the narrow `extract_entry` interface this could be replaced by a
//! central-directory-aware parser; callers would not notice. Note the
//! consequence of the sequential walk: an entry stored after an early
//! non-header marker is never found and reports `NotFound`. Revisit before
//! trusting arbitrary third-party archives.

use std::io::Read;

use flate2::read::DeflateDecoder;
use thiserror::Error;

/// Local-file-header signature, little-endian `PK\x03\x04`
const LOCAL_FILE_HEADER_MAGIC: u32 = 0x0403_4b50;

/// Fixed header size up to the start of the filename
const HEADER_LEN: usize = 30;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATE: u16 = 8;

/// Archive extraction failure
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// No entry name ended with the requested suffix
    #[error("no archive entry matching '{0}'")]
    NotFound(String),

    /// The matching entry uses a compression method other than stored or
    /// deflate
    #[error("unsupported compression method {0}")]
    UnsupportedCompression(u16),

    /// Truncated header or broken deflate stream
    #[error("corrupt archive: {0}")]
    Corrupt(String),
}

/// Find the first entry whose filename ends with `suffix` and return its
/// decompressed bytes.
pub fn extract_entry(archive: &[u8], suffix: &str) -> Result<Vec<u8>, ArchiveError> {
    let mut offset = 0usize;

    while offset + HEADER_LEN <= archive.len() {
        if read_u32(archive, offset) != LOCAL_FILE_HEADER_MAGIC {
            // Reached the central directory or trailing data.
            break;
        }

        let method = read_u16(archive, offset + 8);
        let compressed_size = read_u32(archive, offset + 18) as usize;
        let name_len = read_u16(archive, offset + 26) as usize;
        let extra_len = read_u16(archive, offset + 28) as usize;

        let name_start = offset + HEADER_LEN;
        let data_start = name_start + name_len + extra_len;
        let data_end = data_start + compressed_size;
        if data_end > archive.len() || name_start + name_len > archive.len() {
            return Err(ArchiveError::Corrupt(format!(
                "entry at offset {offset} extends past the end of the archive"
            )));
        }

        let name = &archive[name_start..name_start + name_len];
        if name.ends_with(suffix.as_bytes()) {
            let data = &archive[data_start..data_end];
            return match method {
                METHOD_STORED => Ok(data.to_vec()),
                METHOD_DEFLATE => inflate(data),
                other => Err(ArchiveError::UnsupportedCompression(other)),
            };
        }

        offset = data_end;
    }

    Err(ArchiveError::NotFound(suffix.to_string()))
}

fn inflate(data: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    let mut out = Vec::new();
    DeflateDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|err| ArchiveError::Corrupt(format!("deflate stream: {err}")))?;
    Ok(out)
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
