//! Decode error types

use crate::chunk::FourCC;
use crate::diagnostics::EventCode;

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors that abort a decode.
///
/// Framing errors (header, overrun, terminator) are reported as-is. Anything
/// raised while a single chunk is being decoded is wrapped in
/// [`DecodeError::DecodeAborted`] so the caller learns which chunk failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// Buffer too small for any header, or for the header its first bytes announce
    #[error("invalid header: {detail} ({len} bytes available)")]
    InvalidHeader { len: usize, detail: &'static str },

    /// Not enough bytes after the header for one chunk header
    #[error("truncated file: {remaining} bytes after offset {offset}, need at least 8")]
    TruncatedFile { offset: usize, remaining: usize },

    /// A chunk declares more payload than the buffer holds
    #[error("chunk '{chunk}' at offset {offset} declares {size} bytes but only {available} remain")]
    ChunkOverrun {
        chunk: FourCC,
        offset: usize,
        size: u32,
        available: usize,
    },

    /// The chunk stream ended without an "End " chunk
    #[error("no terminator chunk before offset {offset}")]
    MissingTerminator { offset: usize },

    /// Payload length does not fit the chunk's record layout
    #[error(
        "chunk '{chunk}' at offset {offset}: {size} byte payload does not fit {stride}-byte records"
    )]
    UnsupportedChunkSize {
        chunk: FourCC,
        offset: usize,
        size: usize,
        stride: usize,
    },

    /// Texture id outside `[-1, max_textures)`
    #[error("texture id {texture_id} out of range (max {max_textures})")]
    InvalidTextureId { texture_id: i16, max_textures: u16 },

    /// Every surface id is in use
    #[error("surface limit exceeded (max {max_surfaces})")]
    SurfaceLimitExceeded { max_surfaces: u16 },

    /// Tried to allocate a surface id that is already active
    #[error("surface {0} is already allocated")]
    SurfaceAlreadyAllocated(u16),

    /// Referenced a surface id that was never allocated
    #[error("surface {0} is not allocated")]
    SurfaceNotAllocated(u16),

    /// Cursor arithmetic left the input or output slice
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A chunk failed mid-mesh
    #[error("decoding chunk '{chunk}' at offset {offset} failed: {source}")]
    DecodeAborted {
        chunk: FourCC,
        offset: usize,
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// Innermost error, looking through any `DecodeAborted` wrappers.
    pub fn root_cause(&self) -> &DecodeError {
        match self {
            DecodeError::DecodeAborted { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Byte offset the error was detected at, when it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            DecodeError::TruncatedFile { offset, .. }
            | DecodeError::ChunkOverrun { offset, .. }
            | DecodeError::MissingTerminator { offset }
            | DecodeError::UnsupportedChunkSize { offset, .. }
            | DecodeError::DecodeAborted { offset, .. } => Some(*offset),
            DecodeError::InvalidHeader { .. } => Some(0),
            _ => None,
        }
    }

    /// Diagnostic code reported for this error.
    pub fn event_code(&self) -> EventCode {
        match self.root_cause() {
            DecodeError::InvalidTextureId { .. } => EventCode::InvalidTextureId,
            DecodeError::SurfaceLimitExceeded { .. } => EventCode::SurfaceLimitExceeded,
            DecodeError::SurfaceAlreadyAllocated(_) => EventCode::SurfaceAlreadyAllocated,
            DecodeError::SurfaceNotAllocated(_) => EventCode::SurfaceNotAllocated,
            _ => EventCode::InvalidData,
        }
    }
}
