//! Decoded mesh

use glam::Vec3;

use crate::primitive::{PrimitiveKind, PrimitiveRecord};
use crate::surface::Surface;
use crate::vertex::Vertex;

/// Vertices, primitives and surfaces of one decoded file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub primitives: Vec<PrimitiveRecord>,
    /// Ordered by surface id
    pub surfaces: Vec<Surface>,
}

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.primitives.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(|p| p.triangles().len()).sum()
    }

    /// Primitives belonging to one surface, in decode order
    pub fn primitives_for_surface(
        &self,
        surface_id: u16,
    ) -> impl Iterator<Item = &PrimitiveRecord> {
        self.primitives
            .iter()
            .filter(move |p| p.surface_id == surface_id)
    }

    pub fn primitive_count(&self, kind: PrimitiveKind) -> usize {
        self.primitives.iter().filter(|p| p.kind == kind).count()
    }

    /// Axis-aligned bounds of all vertex positions
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut positions = self.vertices.iter().map(|v| Vec3::from_array(v.position));
        let first = positions.next()?;
        Some(positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }
}
