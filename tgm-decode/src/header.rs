//! File header detection
//!
//! A 3GM file starts with one of three shapes:
//!
//! ```text
//! Full:        "3DGM" | version: u32 | info: u32   (12 bytes)
//! VersionOnly: version: u32 in 0x01000100..=0x10000100  (4 bytes)
//! None:        chunk stream starts at offset 0
//! ```

use crate::bytes::read_u32_le;
use crate::error::{DecodeError, DecodeResult};
use crate::{
    CHUNK_HEADER_SIZE, FULL_HEADER_MAGIC, FULL_HEADER_SIZE, MAX_HEADER_VERSION,
    MIN_HEADER_VERSION, VERSION_HEADER_SIZE,
};

/// Which header shape precedes the chunk stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    None,
    VersionOnly,
    Full,
}

impl HeaderKind {
    pub fn name(self) -> &'static str {
        match self {
            HeaderKind::None => "none",
            HeaderKind::VersionOnly => "version-only",
            HeaderKind::Full => "full",
        }
    }
}

/// Decoded file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub kind: HeaderKind,
    /// `FULL_HEADER_MAGIC` for full headers, 0 otherwise
    pub magic: u32,
    pub version: u32,
    /// Only present in full headers
    pub info: u32,
    /// Byte offset of the first chunk
    pub chunk_start_offset: usize,
}

impl FileHeader {
    /// Check that at least one chunk header fits after the file header.
    pub fn validate(&self, file_len: usize) -> DecodeResult<()> {
        let remaining = file_len.saturating_sub(self.chunk_start_offset);
        if remaining < CHUNK_HEADER_SIZE {
            return Err(DecodeError::TruncatedFile {
                offset: self.chunk_start_offset,
                remaining,
            });
        }
        Ok(())
    }
}

/// Classify the leading bytes of a file.
///
/// This only decides the header shape. Use [`FileHeader::validate`] to check
/// that a chunk stream follows it.
pub fn detect(data: &[u8]) -> DecodeResult<FileHeader> {
    let probe = read_u32_le(data, 0).ok_or(DecodeError::InvalidHeader {
        len: data.len(),
        detail: "need at least 4 bytes",
    })?;

    if probe == FULL_HEADER_MAGIC {
        if data.len() < FULL_HEADER_SIZE {
            return Err(DecodeError::InvalidHeader {
                len: data.len(),
                detail: "full header needs 12 bytes",
            });
        }
        let version = read_u32_le(data, 4).unwrap_or_default();
        let info = read_u32_le(data, 8).unwrap_or_default();
        tracing::debug!(version, info, "full header");
        return Ok(FileHeader {
            kind: HeaderKind::Full,
            magic: probe,
            version,
            info,
            chunk_start_offset: FULL_HEADER_SIZE,
        });
    }

    if (MIN_HEADER_VERSION..=MAX_HEADER_VERSION).contains(&probe) {
        tracing::debug!(version = probe, "version-only header");
        return Ok(FileHeader {
            kind: HeaderKind::VersionOnly,
            magic: 0,
            version: probe,
            info: 0,
            chunk_start_offset: VERSION_HEADER_SIZE,
        });
    }

    Ok(FileHeader {
        kind: HeaderKind::None,
        magic: 0,
        version: 0,
        info: 0,
        chunk_start_offset: 0,
    })
}
