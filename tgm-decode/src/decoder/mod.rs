//! Decode orchestration
//!
//! ```text
//! Init -> HeaderParsed -> ChunksScanned -> Decoding -> Done
//!                                                   \-> Failed
//! ```
//!
//! Framing is checked for the whole file before any chunk is decoded, so a
//! truncated or unterminated file never yields a partial mesh.

mod prim;


use tracing::{debug, info};

use crate::bytes::read_u32_le;
use crate::chunk::{ChunkKind, FourCC, RawChunk, scan_all};
use crate::config::DecoderConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, EventCode, NullSink};
use crate::error::{DecodeError, DecodeResult};
use crate::header::{FileHeader, detect};
use crate::mesh::Mesh;
use crate::surface::SurfaceGenerator;
use crate::vertex::{Vertex, VertexChunkLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Init,
    HeaderParsed,
    ChunksScanned,
    Decoding,
    Done,
    Failed,
}

/// Per-chunk result, in file order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSummary {
    pub type_code: FourCC,
    pub kind: ChunkKind,
    /// Offset of the chunk header
    pub offset: usize,
    pub size: u32,
    pub vertices_added: usize,
    pub primitives_added: usize,
}

/// Everything produced by a successful decode
#[derive(Debug, Clone)]
pub struct DecodeOutput {
    pub header: FileHeader,
    pub chunks: Vec<ChunkSummary>,
    pub mesh: Mesh,
    /// Non-fatal anomalies, in the order they were found
    pub warnings: Vec<Diagnostic>,
}

/// Mutable state of one decode call
pub(crate) struct Session<'s> {
    pub(crate) mesh: Mesh,
    pub(crate) warnings: Vec<Diagnostic>,
    sink: &'s mut dyn DiagnosticSink,
    /// Set by a 0xFFFE primitive code
    pub(crate) primitive_list_closed: bool,
}

impl<'s> Session<'s> {
    fn new(sink: &'s mut dyn DiagnosticSink) -> Self {
        Self {
            mesh: Mesh::default(),
            warnings: Vec::new(),
            sink,
            primitive_list_closed: false,
        }
    }

    pub(crate) fn warn(&mut self, code: EventCode, offset: usize, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(code, Some(offset), message);
        debug!(code = code.code(), offset, "{}", diagnostic.message);
        self.sink.emit(&diagnostic);
        self.warnings.push(diagnostic);
    }
}

/// Reusable decoder. Each call to [`decode`](Self::decode) starts from
/// empty surface tables.
#[derive(Debug, Clone)]
pub struct Decoder {
    config: DecoderConfig,
    surfaces: SurfaceGenerator,
    state: DecoderState,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            surfaces: SurfaceGenerator::from_config(&config),
            config,
            state: DecoderState::Init,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Surface tables left by the most recent decode
    pub fn surfaces(&self) -> &SurfaceGenerator {
        &self.surfaces
    }

    /// Decode a whole file.
    pub fn decode(&mut self, data: &[u8]) -> DecodeResult<DecodeOutput> {
        self.decode_with_sink(data, &mut NullSink)
    }

    /// Decode a whole file, forwarding every diagnostic to `sink`.
    ///
    /// A fatal error is reported to the sink before it is returned.
    pub fn decode_with_sink(
        &mut self,
        data: &[u8],
        sink: &mut dyn DiagnosticSink,
    ) -> DecodeResult<DecodeOutput> {
        self.state = DecoderState::Init;
        self.surfaces.reset();

        let mut session = Session::new(sink);
        match self.run(data, &mut session) {
            Ok((header, chunks)) => {
                self.state = DecoderState::Done;
                let mut mesh = session.mesh;
                mesh.surfaces = self.surfaces.surfaces().copied().collect();
                info!(
                    vertices = mesh.vertices.len(),
                    primitives = mesh.primitives.len(),
                    surfaces = mesh.surfaces.len(),
                    warnings = session.warnings.len(),
                    "decoded"
                );
                Ok(DecodeOutput {
                    header,
                    chunks,
                    mesh,
                    warnings: session.warnings,
                })
            }
            Err(err) => {
                self.state = DecoderState::Failed;
                session.sink.emit(&Diagnostic::new(
                    err.event_code(),
                    err.offset(),
                    err.to_string(),
                ));
                Err(err)
            }
        }
    }

    fn run(
        &mut self,
        data: &[u8],
        session: &mut Session<'_>,
    ) -> DecodeResult<(FileHeader, Vec<ChunkSummary>)> {
        let header = detect(data)?;
        header.validate(data.len())?;
        self.state = DecoderState::HeaderParsed;
        debug!(kind = header.kind.name(), start = header.chunk_start_offset, "header");

        let chunks = scan_all(data, header.chunk_start_offset)?;
        self.state = DecoderState::ChunksScanned;
        debug!(count = chunks.len(), "chunks scanned");

        self.state = DecoderState::Decoding;
        let mut summaries = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let vertices_before = session.mesh.vertices.len();
            let primitives_before = session.mesh.primitives.len();
            let payload = &data[chunk.payload_offset..chunk.payload_end()];

            self.decode_chunk(chunk, payload, session)
                .map_err(|source| DecodeError::DecodeAborted {
                    chunk: chunk.type_code,
                    offset: chunk.header_offset(),
                    source: Box::new(source),
                })?;

            summaries.push(ChunkSummary {
                type_code: chunk.type_code,
                kind: chunk.kind(),
                offset: chunk.header_offset(),
                size: chunk.size,
                vertices_added: session.mesh.vertices.len() - vertices_before,
                primitives_added: session.mesh.primitives.len() - primitives_before,
            });
        }

        Ok((header, summaries))
    }

    fn decode_chunk(
        &mut self,
        chunk: &RawChunk,
        payload: &[u8],
        session: &mut Session<'_>,
    ) -> DecodeResult<()> {
        match chunk.kind() {
            ChunkKind::Dot2 | ChunkKind::Dots | ChunkKind::FDot | ChunkKind::CDot => {
                self.decode_vertices(chunk, payload, session)
            }
            ChunkKind::Prim => prim::decode_prim_chunk(&mut self.surfaces, chunk, payload, session),
            ChunkKind::End => Ok(()),
            ChunkKind::Line
            | ChunkKind::SoPF
            | ChunkKind::FPos
            | ChunkKind::TxNm
            | ChunkKind::Unknown => {
                session.warn(
                    EventCode::ChunkSkipped,
                    chunk.header_offset(),
                    format!("skipped '{}' chunk ({} bytes)", chunk.type_code, chunk.size),
                );
                Ok(())
            }
        }
    }

    fn decode_vertices(
        &self,
        chunk: &RawChunk,
        payload: &[u8],
        session: &mut Session<'_>,
    ) -> DecodeResult<()> {
        let kind = chunk.kind();
        let Some(layout) = VertexChunkLayout::for_chunk(kind) else {
            return Ok(());
        };

        let count = layout
            .record_count(payload.len())
            .ok_or(DecodeError::UnsupportedChunkSize {
                chunk: chunk.type_code,
                offset: chunk.header_offset(),
                size: payload.len(),
                stride: layout.stride,
            })?;

        if count == 0 {
            session.warn(
                EventCode::InvalidData,
                chunk.header_offset(),
                format!("no vertices in '{}' chunk", chunk.type_code),
            );
            return Ok(());
        }

        if kind == ChunkKind::CDot {
            let declared = read_u32_le(payload, 0).unwrap_or_default();
            if declared as usize != count {
                session.warn(
                    EventCode::VertexCountMismatch,
                    chunk.payload_offset,
                    format!("cDot declares {declared} vertices, payload holds {count}"),
                );
            }
        }

        let bound = self
            .config
            .vertex_bounds
            .for_chunk(kind)
            .unwrap_or(f32::MAX);
        let buffer = layout.decode(payload)?;
        let first_index = session.mesh.vertices.len();

        for (i, position) in buffer.positions().enumerate() {
            match Vertex::from_raw(position, bound) {
                Ok(vertex) => session.mesh.vertices.push(vertex),
                Err(reason) => {
                    session.warn(
                        EventCode::VertexRejected,
                        chunk.payload_offset + layout.prefix + i * layout.stride,
                        format!("vertex {} replaced: {reason}", first_index + i),
                    );
                    session.mesh.vertices.push(Vertex::SAFE_DEFAULT);
                }
            }
        }

        debug!(chunk = %chunk.type_code, vertices = count, "vertex chunk");
        Ok(())
    }
}

/// Decode with default limits.
pub fn decode(data: &[u8]) -> DecodeResult<DecodeOutput> {
    Decoder::default().decode(data)
}
