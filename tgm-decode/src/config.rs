//! Decoder limits

use serde::{Deserialize, Serialize};

use crate::chunk::ChunkKind;
use crate::{DEFAULT_MAX_SURFACES, DEFAULT_MAX_TEXTURES};

/// Decoder configuration.
///
/// Every field has a default, so a partial TOML table only overrides what it names:
///
/// ```toml
/// max_surfaces = 4000
///
/// [vertex_bounds]
/// fdot = 20000.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Texture ids must lie in `[-1, max_textures)`
    pub max_textures: u16,
    /// Surface ids are allocated from `1..=max_surfaces`
    pub max_surfaces: u16,
    pub vertex_bounds: VertexBounds,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_textures: DEFAULT_MAX_TEXTURES,
            max_surfaces: DEFAULT_MAX_SURFACES,
            vertex_bounds: VertexBounds::default(),
        }
    }
}

/// Largest accepted coordinate magnitude per vertex chunk kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VertexBounds {
    pub dot2: f32,
    pub dots: f32,
    pub fdot: f32,
    pub cdot: f32,
}

impl Default for VertexBounds {
    fn default() -> Self {
        Self {
            dot2: 1.0e5,
            dots: 1.0e5,
            fdot: 1.0e4,
            cdot: 1.0e4,
        }
    }
}

impl VertexBounds {
    /// Bound for a vertex chunk, `None` for chunks that carry no vertices
    pub fn for_chunk(&self, kind: ChunkKind) -> Option<f32> {
        match kind {
            ChunkKind::Dot2 => Some(self.dot2),
            ChunkKind::Dots => Some(self.dots),
            ChunkKind::FDot => Some(self.fdot),
            ChunkKind::CDot => Some(self.cdot),
            _ => None,
        }
    }
}
