//! Primitive type table
//!
//! Raw codes found in `Prim` chunks, their canonical kinds and flag patterns.

use std::fmt;

/// Canonical primitive kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    TriangleStrip,
    TriangleList,
    QuadStrip,
    PointSprite,
    LineStrip,
    /// Ten opaque data words, no vertex indices
    ComplexPrimitive,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 6] = [
        PrimitiveKind::TriangleStrip,
        PrimitiveKind::TriangleList,
        PrimitiveKind::QuadStrip,
        PrimitiveKind::PointSprite,
        PrimitiveKind::LineStrip,
        PrimitiveKind::ComplexPrimitive,
    ];

    /// Raw code of the canonical encoding
    pub const fn code(self) -> u16 {
        match self {
            PrimitiveKind::TriangleStrip => 16646,
            PrimitiveKind::QuadStrip => 18190,
            PrimitiveKind::TriangleList => 20486,
            PrimitiveKind::PointSprite => 21251,
            PrimitiveKind::LineStrip => 28422,
            PrimitiveKind::ComplexPrimitive => 30733,
        }
    }

    pub const fn flags(self) -> PrimitiveFlags {
        match self {
            PrimitiveKind::TriangleStrip | PrimitiveKind::TriangleList => {
                PrimitiveFlags(PrimitiveFlags::BASIC.0 | PrimitiveFlags::INDEXED.0)
            }
            PrimitiveKind::QuadStrip => {
                PrimitiveFlags(PrimitiveFlags::COMPLEX.0 | PrimitiveFlags::EXTENDED.0)
            }
            PrimitiveKind::PointSprite => PrimitiveFlags::BASIC,
            PrimitiveKind::LineStrip => {
                PrimitiveFlags(PrimitiveFlags::BASIC.0 | PrimitiveFlags::EXTENDED.0)
            }
            PrimitiveKind::ComplexPrimitive => PrimitiveFlags::COMPLEX,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::TriangleStrip => "TriangleStrip",
            PrimitiveKind::TriangleList => "TriangleList",
            PrimitiveKind::QuadStrip => "QuadStrip",
            PrimitiveKind::PointSprite => "PointSprite",
            PrimitiveKind::LineStrip => "LineStrip",
            PrimitiveKind::ComplexPrimitive => "ComplexPrimitive",
        }
    }

    /// Required data word count, if fixed
    pub const fn data_words(self) -> Option<usize> {
        match self {
            PrimitiveKind::ComplexPrimitive => Some(10),
            _ => None,
        }
    }

    /// Whether data words are vertex indices
    pub const fn is_indexed(self) -> bool {
        !matches!(self, PrimitiveKind::ComplexPrimitive)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Flag bit pattern carried by a primitive kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveFlags(pub u32);

impl PrimitiveFlags {
    pub const BASIC: Self = Self(0x0000_0001);
    pub const EXTENDED: Self = Self(0x0000_0100);
    pub const INDEXED: Self = Self(0x0001_0000);
    pub const COMPLEX: Self = Self(0x0000_0101);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Result of classifying a raw code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveCode {
    Kind(PrimitiveKind),
    /// 0x6000: ends the records of the current chunk
    EndMarker,
    /// 0xFFFE: ends the primitive list
    Terminator,
    Unknown(u16),
}

pub const QUAD_STRIP_INPUT_CODE: u16 = 18189;
pub const LINE_STRIP_ALT_CODE: u16 = 28423;
pub const END_MARKER_CODE: u16 = 0x6000;
pub const TERMINATOR_CODE: u16 = 0xFFFE;

/// Classify a raw code, resolving aliases to their canonical kind.
pub fn classify(raw: u16) -> PrimitiveCode {
    match raw {
        END_MARKER_CODE => PrimitiveCode::EndMarker,
        TERMINATOR_CODE => PrimitiveCode::Terminator,
        QUAD_STRIP_INPUT_CODE => PrimitiveCode::Kind(PrimitiveKind::QuadStrip),
        LINE_STRIP_ALT_CODE => PrimitiveCode::Kind(PrimitiveKind::PointSprite),
        _ => PrimitiveKind::ALL
            .into_iter()
            .find(|kind| kind.code() == raw)
            .map_or(PrimitiveCode::Unknown(raw), PrimitiveCode::Kind),
    }
}

/// Rewrite alias codes to the code of their canonical kind.
pub fn canonicalize(raw: u16) -> u16 {
    match classify(raw) {
        PrimitiveCode::Kind(kind) => kind.code(),
        _ => raw,
    }
}

/// One decoded primitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveRecord {
    pub kind: PrimitiveKind,
    pub surface_id: u16,
    pub texture_id: i16,
    pub flags: u16,
    /// Mesh-wide vertex indices, or opaque data words for complex primitives
    pub indices: Vec<u16>,
}

impl PrimitiveRecord {
    /// Triangles for export. Kinds without faces yield nothing.
    pub fn triangles(&self) -> Vec<[u16; 3]> {
        match self.kind {
            PrimitiveKind::TriangleList => self
                .indices
                .chunks_exact(3)
                .map(|t| [t[0], t[1], t[2]])
                .collect(),
            PrimitiveKind::TriangleStrip => self
                .indices
                .windows(3)
                .enumerate()
                .map(|(i, w)| {
                    if i % 2 == 0 {
                        [w[0], w[1], w[2]]
                    } else {
                        [w[1], w[0], w[2]]
                    }
                })
                .filter(|t| t[0] != t[1] && t[1] != t[2] && t[0] != t[2])
                .collect(),
            // Each quad shares its trailing edge with the next one
            PrimitiveKind::QuadStrip => self
                .indices
                .windows(4)
                .step_by(2)
                .flat_map(|q| [[q[0], q[1], q[2]], [q[1], q[3], q[2]]])
                .collect(),
            PrimitiveKind::PointSprite
            | PrimitiveKind::LineStrip
            | PrimitiveKind::ComplexPrimitive => Vec::new(),
        }
    }

    /// Consecutive index pairs of a line strip
    pub fn line_segments(&self) -> Vec<[u16; 2]> {
        match self.kind {
            PrimitiveKind::LineStrip => self.indices.windows(2).map(|w| [w[0], w[1]]).collect(),
            _ => Vec::new(),
        }
    }
}
