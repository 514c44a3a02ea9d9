//! Text reports for the `info` and `chunks` commands

use anyhow::{Context, Result};
use std::fmt::Write;
use std::path::Path;

use tgm_decode::{
    ChunkSummary, DecodeOutput, Decoder, DecoderConfig, FileHeader, PrimitiveKind, RawChunk,
    detect, scan_all,
};

/// Header plus raw chunk framing, without decoding payloads
pub fn read_chunk_table(input: &Path) -> Result<(FileHeader, Vec<RawChunk>)> {
    let data =
        std::fs::read(input).with_context(|| format!("Failed to read input: {:?}", input))?;
    let header = detect(&data).with_context(|| format!("Failed to read header of {:?}", input))?;
    header
        .validate(data.len())
        .with_context(|| format!("Failed to read header of {:?}", input))?;
    let chunks = scan_all(&data, header.chunk_start_offset)
        .with_context(|| format!("Failed to scan chunks of {:?}", input))?;
    Ok((header, chunks))
}

/// Fully decode a file for reporting
pub fn decode_file(input: &Path, config: &DecoderConfig) -> Result<DecodeOutput> {
    let data =
        std::fs::read(input).with_context(|| format!("Failed to read input: {:?}", input))?;
    Decoder::new(config.clone())
        .decode(&data)
        .with_context(|| format!("Failed to decode {:?}", input))
}

pub fn format_header(header: &FileHeader) -> String {
    format!(
        "header: {} (version 0x{:08X}, chunks at {})",
        header.kind.name(),
        header.version,
        header.chunk_start_offset
    )
}

pub fn format_chunk_table(chunks: &[RawChunk]) -> String {
    let mut out = String::from("offset      type  size\n");
    for chunk in chunks {
        let _ = writeln!(
            out,
            "0x{:08X}  {}  {}",
            chunk.header_offset(),
            chunk.type_code,
            chunk.size
        );
    }
    out
}

fn format_summaries(chunks: &[ChunkSummary]) -> String {
    let mut out = String::from("offset      type  size      vertices  primitives\n");
    for c in chunks {
        let _ = writeln!(
            out,
            "0x{:08X}  {}  {:<8}  {:<8}  {}",
            c.offset, c.type_code, c.size, c.vertices_added, c.primitives_added
        );
    }
    out
}

/// Header, chunk table, mesh counts and warnings
pub fn format_report(output: &DecodeOutput) -> String {
    let mesh = &output.mesh;
    let mut out = format_header(&output.header);
    out.push('\n');
    out.push_str(&format_summaries(&output.chunks));

    let _ = writeln!(out, "vertices: {}", mesh.vertices.len());
    let _ = writeln!(out, "primitives: {}", mesh.primitives.len());
    for kind in PrimitiveKind::ALL {
        let count = mesh.primitive_count(kind);
        if count > 0 {
            let _ = writeln!(out, "  {kind}: {count}");
        }
    }
    let _ = writeln!(out, "triangles: {}", mesh.triangle_count());
    let _ = writeln!(out, "surfaces: {}", mesh.surfaces.len());
    if let Some((min, max)) = mesh.bounds() {
        let _ = writeln!(
            out,
            "bounds: [{:.3}, {:.3}, {:.3}] - [{:.3}, {:.3}, {:.3}]",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    let _ = writeln!(out, "warnings: {}", output.warnings.len());
    for warning in &output.warnings {
        let _ = writeln!(out, "  {warning}");
    }
    out
}
