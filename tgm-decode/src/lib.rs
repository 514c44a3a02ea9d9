//! tgm-decode: decoder for the chunked 3GM binary model format
//!
//! 3GM files carry static meshes as a stream of self-describing chunks. The
//! layout was recovered by reverse engineering, so the decoder is strict about
//! framing and forgiving about content: a broken chunk header aborts the whole
//! file, while a single bad vertex or primitive is replaced or skipped and
//! reported as a warning.
//!
//! # Key Features
//!
//! - **Pure and synchronous**: No I/O, no threads, no global state. The caller
//!   supplies the file bytes and owns the decoded [`Mesh`].
//! - **Zero-copy framing**: Chunks are described by offsets into the caller's
//!   buffer; payloads are never copied during the scan.
//! - **Structured diagnostics**: Non-fatal anomalies are returned with the
//!   mesh and forwarded to an optional [`DiagnosticSink`].
//!
//! # Format Overview
//!
//! ```text
//! [optional header: 0, 4 or 12 bytes]
//! [chunk] [chunk] ... ["End " chunk]
//!
//! chunk := type: u32 LE (ASCII four-cc) | size: u32 LE | payload: size bytes
//! ```
//!
//! Vertex chunks (`Dot2`, `Dots`, `FDot`, `cDot`) use one of three packing
//! schemes, `Prim` chunks carry primitive records that are grouped into
//! surfaces keyed by primitive kind, texture and flags.
//!
//! # Usage
//!
//! ```ignore
//! use tgm_decode::{Decoder, DecoderConfig};
//!
//! let bytes = std::fs::read("ammo_box.3GM")?;
//! let mut decoder = Decoder::new(DecoderConfig::default());
//! let output = decoder.decode(&bytes)?;
//!
//! println!("{} vertices", output.mesh.vertices.len());
//! for warning in &output.warnings {
//!     println!("warning: {warning}");
//! }
//! ```

pub mod bytes;
mod chunk;
mod config;
mod decoder;
mod diagnostics;
mod error;
mod header;
mod mesh;
mod primitive;
mod surface;
mod vertex;

pub use chunk::{ChunkKind, ChunkReader, FourCC, RawChunk, ReaderState, scan_all};
pub use config::{DecoderConfig, VertexBounds};
pub use decoder::{ChunkSummary, DecodeOutput, Decoder, DecoderState, decode};
pub use diagnostics::{Diagnostic, DiagnosticSink, EventCode, NullSink, TracingSink};
pub use error::{DecodeError, DecodeResult};
pub use header::{FileHeader, HeaderKind, detect};
pub use mesh::Mesh;
pub use primitive::{
    PrimitiveCode, PrimitiveFlags, PrimitiveKind, PrimitiveRecord, canonicalize, classify,
};
pub use surface::{Surface, SurfaceGenerator, SurfaceHashEntry, SurfaceStatistics};
pub use vertex::{
    Vertex, VertexAlgorithm, VertexBuffer, VertexChunkLayout, VertexRejection,
    decrunch_dot_records, decrunch_dots, packed_to_float, packed_to_float_3component,
};

// =============================================================================
// Constants
// =============================================================================

/// Size of a chunk header (type code + payload length)
pub const CHUNK_HEADER_SIZE: usize = 8;

/// "3DGM" read as a little-endian u32
pub const FULL_HEADER_MAGIC: u32 = 0x4D47_4433;

/// Size of a full ("3DGM" + version + info) header
pub const FULL_HEADER_SIZE: usize = 12;

/// Size of a version-only header
pub const VERSION_HEADER_SIZE: usize = 4;

/// Lowest value accepted as a version-only header
pub const MIN_HEADER_VERSION: u32 = 0x0100_0100;

/// Highest value accepted as a version-only header
pub const MAX_HEADER_VERSION: u32 = 0x1000_0100;

/// Floats per decoded vertex record
pub const VERTEX_STRIDE_FLOATS: usize = 8;

/// Bit pattern appended after the last vertex record (quiet NaN)
pub const VERTEX_SENTINEL_BITS: u32 = 0x7FC0_0000;

/// Default texture bound for the surface generator
pub const DEFAULT_MAX_TEXTURES: u16 = 1000;

/// Default surface bound for the surface generator
pub const DEFAULT_MAX_SURFACES: u16 = 2000;
