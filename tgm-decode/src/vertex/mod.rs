//! Vertex chunk decoding
//!
//! Three packing schemes feed one fixed record layout of 8 floats per vertex:
//!
//! | Chunk | Algorithm                 | Prefix | Stride |
//! |-------|---------------------------|--------|--------|
//! | Dot2  | PackedToFloat             | 8      | 12     |
//! | Dots  | PackedToFloat3Component   | 0      | 12     |
//! | FDot  | DecrunchDots              | 24     | 6      |
//! | cDot  | DecrunchDots              | 4      | 6      |
//!
//! Decoded positions then pass through [`Vertex::from_raw`], which rejects
//! non-finite or out-of-range coordinates and derives UVs and normals.

mod decode;

#[cfg(test)]
mod tests;

pub use decode::{
    decrunch_dot_records, decrunch_dots, packed_to_float, packed_to_float_3component,
};

use glam::Vec3;

use crate::bytes::read_u32_words;
use crate::chunk::ChunkKind;
use crate::error::DecodeResult;
use crate::{VERTEX_SENTINEL_BITS, VERTEX_STRIDE_FLOATS};

// ============================================================================
// Constants
// ============================================================================

/// Packed words per vertex for the Dot2/Dots layouts
pub const PACKED_WORDS_PER_VERTEX: usize = 3;

/// Parameter block preceding FDot records
pub const DECRUNCH_PARAMETER_BYTES: usize = 24;

/// Bytes per compressed vertex (three i16)
pub const DECRUNCH_RECORD_BYTES: usize = 6;

/// Positions closer to the origin than this get the up-vector normal
const DEGENERATE_NORMAL_LENGTH: f32 = 0.001;

/// Half-extent of the planar UV projection
const UV_PROJECTION_EXTENT: f32 = 25.0;

const VERTEX_COLOR_WHITE: u32 = 0xFFFF_FFFF;

// ============================================================================
// Layout
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexAlgorithm {
    /// Backward-reference cursor walk over 3-word groups
    PackedToFloat,
    /// Sequential 3-word groups
    PackedToFloat3Component,
    /// 6-byte fixed-point records
    DecrunchDots,
}

/// How a vertex chunk payload is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexChunkLayout {
    pub algorithm: VertexAlgorithm,
    /// Bytes before the first vertex record
    pub prefix: usize,
    /// Bytes per vertex record
    pub stride: usize,
}

impl VertexChunkLayout {
    pub fn for_chunk(kind: ChunkKind) -> Option<Self> {
        let (algorithm, prefix, stride) = match kind {
            ChunkKind::Dot2 => (VertexAlgorithm::PackedToFloat, 8, 12),
            ChunkKind::Dots => (VertexAlgorithm::PackedToFloat3Component, 0, 12),
            ChunkKind::FDot => (
                VertexAlgorithm::DecrunchDots,
                DECRUNCH_PARAMETER_BYTES,
                DECRUNCH_RECORD_BYTES,
            ),
            ChunkKind::CDot => (VertexAlgorithm::DecrunchDots, 4, DECRUNCH_RECORD_BYTES),
            _ => return None,
        };
        Some(Self {
            algorithm,
            prefix,
            stride,
        })
    }

    /// Number of vertex records in a payload, `None` if the length does not fit the layout
    pub fn record_count(&self, payload_len: usize) -> Option<usize> {
        let body = payload_len.checked_sub(self.prefix)?;
        (body % self.stride == 0).then_some(body / self.stride)
    }

    /// Run the chunk's algorithm over the records following the prefix.
    ///
    /// Trailing bytes that do not fill a record are ignored; callers check
    /// [`record_count`](Self::record_count) first.
    pub fn decode(&self, payload: &[u8]) -> DecodeResult<VertexBuffer> {
        let body = payload.get(self.prefix..).unwrap_or_default();
        match self.algorithm {
            VertexAlgorithm::PackedToFloat => packed_to_float(&read_u32_words(body)),
            VertexAlgorithm::PackedToFloat3Component => {
                Ok(packed_to_float_3component(&read_u32_words(body)))
            }
            VertexAlgorithm::DecrunchDots => Ok(decrunch_dot_records(body)),
        }
    }
}

// ============================================================================
// Raw vertex buffer
// ============================================================================

/// Decoder output: 8 floats per vertex followed by one quiet-NaN sentinel
#[derive(Debug, Clone)]
pub struct VertexBuffer {
    floats: Vec<f32>,
}

/// Bitwise comparison, so the NaN sentinel compares equal to itself
impl PartialEq for VertexBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.floats.len() == other.floats.len()
            && self
                .floats
                .iter()
                .zip(&other.floats)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Eq for VertexBuffer {}

impl VertexBuffer {
    /// Zero-filled buffer for `count` vertices, sentinel already written
    pub fn zeroed(count: usize) -> Self {
        let mut floats = vec![0.0; count * VERTEX_STRIDE_FLOATS + 1];
        floats[count * VERTEX_STRIDE_FLOATS] = f32::from_bits(VERTEX_SENTINEL_BITS);
        Self { floats }
    }

    pub fn vertex_count(&self) -> usize {
        self.floats.len() / VERTEX_STRIDE_FLOATS
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.floats
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.floats
    }

    /// The 8-float record for vertex `index`
    pub fn record(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(VERTEX_STRIDE_FLOATS)?;
        if index >= self.vertex_count() {
            return None;
        }
        self.floats.get(start..start + VERTEX_STRIDE_FLOATS)
    }

    /// First three floats of every record
    pub fn positions(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.floats
            .chunks_exact(VERTEX_STRIDE_FLOATS)
            .map(|r| [r[0], r[1], r[2]])
    }

    /// Bits of the float after the last record
    pub fn sentinel_bits(&self) -> Option<u32> {
        self.floats.last().map(|f| f.to_bits())
    }
}

// ============================================================================
// Normalized vertex
// ============================================================================

/// Why a decoded position was replaced by [`Vertex::SAFE_DEFAULT`]
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum VertexRejection {
    #[error("component {axis} is NaN")]
    NotANumber { axis: usize },
    #[error("component {axis} is infinite")]
    Infinite { axis: usize },
    #[error("component {axis} = {value} exceeds bound {bound}")]
    OutOfRange { axis: usize, value: f32, bound: f32 },
}

/// Mesh vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// RGBA8, packed
    pub color: u32,
}

impl Vertex {
    /// Substituted for rejected vertices
    pub const SAFE_DEFAULT: Vertex = Vertex {
        position: [0.0, 0.0, 0.0],
        normal: [0.0, 1.0, 0.0],
        uv: [0.5, 0.5],
        color: VERTEX_COLOR_WHITE,
    };

    /// Build a vertex from a position, deriving normal and UV.
    pub fn from_position(position: [f32; 3]) -> Self {
        let p = Vec3::from_array(position);
        let length = p.length();
        let normal = if length > DEGENERATE_NORMAL_LENGTH {
            p / length
        } else {
            Vec3::Y
        };

        let extent = UV_PROJECTION_EXTENT * 2.0;
        Self {
            position,
            normal: normal.to_array(),
            uv: [
                (p.x + UV_PROJECTION_EXTENT) / extent,
                (p.y + UV_PROJECTION_EXTENT) / extent,
            ],
            color: VERTEX_COLOR_WHITE,
        }
    }

    /// Validate a decoded position against `bound`, then build the vertex.
    pub fn from_raw(position: [f32; 3], bound: f32) -> Result<Self, VertexRejection> {
        for (axis, &value) in position.iter().enumerate() {
            if value.is_nan() {
                return Err(VertexRejection::NotANumber { axis });
            }
            if value.is_infinite() {
                return Err(VertexRejection::Infinite { axis });
            }
            if value.abs() > bound {
                return Err(VertexRejection::OutOfRange { axis, value, bound });
            }
        }
        Ok(Self::from_position(position))
    }
}
