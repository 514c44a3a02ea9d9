//! `Prim` chunk records
//!
//! ```text
//! code: u16  [texture: i16  flags: u16  count: u16  count x u16]
//! ```
//!
//! `0x6000` ends the chunk, `0xFFFE` ends the primitive list for the file.

use tracing::debug;

use crate::bytes::{read_i16_le, read_u16_le};
use crate::chunk::RawChunk;
use crate::diagnostics::EventCode;
use crate::error::{DecodeError, DecodeResult};
use crate::primitive::{PrimitiveCode, PrimitiveRecord, classify};
use crate::surface::SurfaceGenerator;

use super::Session;

/// Bytes of texture, flags and count following a primitive code
const RECORD_HEADER_BYTES: usize = 6;

pub(super) fn decode_prim_chunk(
    surfaces: &mut SurfaceGenerator,
    chunk: &RawChunk,
    payload: &[u8],
    session: &mut Session<'_>,
) -> DecodeResult<()> {
    if session.primitive_list_closed {
        session.warn(
            EventCode::PrimitiveListClosed,
            chunk.header_offset(),
            "Prim chunk after primitive list terminator",
        );
        return Ok(());
    }

    if payload.len() % 2 != 0 {
        return Err(DecodeError::UnsupportedChunkSize {
            chunk: chunk.type_code,
            offset: chunk.header_offset(),
            size: payload.len(),
            stride: 2,
        });
    }

    let base = chunk.payload_offset;
    let vertex_count = session.mesh.vertices.len();
    let mut cursor = 0usize;
    let mut accepted = 0usize;

    while let Some(raw) = read_u16_le(payload, cursor) {
        let record_offset = base + cursor;
        cursor += 2;

        let kind = match classify(raw) {
            PrimitiveCode::EndMarker => break,
            PrimitiveCode::Terminator => {
                session.primitive_list_closed = true;
                break;
            }
            PrimitiveCode::Kind(kind) => Some(kind),
            PrimitiveCode::Unknown(_) => None,
        };

        let (Some(texture_id), Some(flags), Some(count)) = (
            read_i16_le(payload, cursor),
            read_u16_le(payload, cursor + 2),
            read_u16_le(payload, cursor + 4),
        ) else {
            session.warn(
                EventCode::PrimitiveSkipped,
                record_offset,
                format!("truncated header for primitive code {raw}"),
            );
            break;
        };
        cursor += RECORD_HEADER_BYTES;

        let data_end = cursor + usize::from(count) * 2;
        let Some(data) = payload.get(cursor..data_end) else {
            session.warn(
                EventCode::PrimitiveSkipped,
                record_offset,
                format!("primitive code {raw} declares {count} words past end of chunk"),
            );
            break;
        };
        cursor = data_end;

        let Some(kind) = kind else {
            session.warn(
                EventCode::PrimitiveSkipped,
                record_offset,
                format!("unknown primitive code {raw}"),
            );
            continue;
        };

        if let Some(required) = kind.data_words()
            && usize::from(count) != required
        {
            session.warn(
                EventCode::PrimitiveSkipped,
                record_offset,
                format!("{kind} carries {count} data words, expected {required}"),
            );
            continue;
        }

        if !surfaces.is_valid_texture_id(texture_id) {
            session.warn(
                EventCode::InvalidTextureId,
                record_offset,
                format!(
                    "{kind} texture id {texture_id} outside [-1, {})",
                    surfaces.max_textures()
                ),
            );
            continue;
        }

        let indices: Vec<u16> = data
            .chunks_exact(2)
            .map(|w| u16::from_le_bytes([w[0], w[1]]))
            .collect();

        if kind.is_indexed()
            && let Some(bad) = indices.iter().find(|&&i| usize::from(i) >= vertex_count)
        {
            session.warn(
                EventCode::PrimitiveSkipped,
                record_offset,
                format!("{kind} index {bad} out of range for {vertex_count} vertices"),
            );
            continue;
        }

        let surface_id = surfaces.get_or_create_surface(kind, texture_id, flags)?;
        session.mesh.primitives.push(PrimitiveRecord {
            kind,
            surface_id,
            texture_id,
            flags,
            indices,
        });
        accepted += 1;
    }

    debug!(
        primitives = accepted,
        closed = session.primitive_list_closed,
        "prim chunk"
    );
    Ok(())
}
