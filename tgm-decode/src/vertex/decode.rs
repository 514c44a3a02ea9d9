//! The three vertex unpacking algorithms

use crate::VERTEX_STRIDE_FLOATS;
use crate::bytes::{complex_byte_swap, read_i16_le};
use crate::error::{DecodeError, DecodeResult};

use super::{DECRUNCH_PARAMETER_BYTES, DECRUNCH_RECORD_BYTES, PACKED_WORDS_PER_VERTEX, VertexBuffer};

/// Byte-swap a packed word and reinterpret its bits as an f32
#[inline]
fn unpack_word(word: u32) -> f32 {
    f32::from_bits(complex_byte_swap(word))
}

/// Read `words[cursor - back]`
fn word_behind(words: &[u32], cursor: usize, back: usize) -> DecodeResult<u32> {
    cursor
        .checked_sub(back)
        .and_then(|i| words.get(i).copied())
        .ok_or(DecodeError::IndexOutOfBounds {
            index: cursor.saturating_sub(back),
            len: words.len(),
        })
}

/// Write `out[cursor - back] = value`
fn store_behind(out: &mut [f32], cursor: usize, back: usize, value: f32) -> DecodeResult<()> {
    let len = out.len();
    let slot = cursor
        .checked_sub(back)
        .and_then(|i| out.get_mut(i))
        .ok_or(DecodeError::IndexOutOfBounds {
            index: cursor.saturating_sub(back),
            len,
        })?;
    *slot = value;
    Ok(())
}

/// Dot2 unpacking.
///
/// X is read at the input cursor, which then jumps a full 3-word group;
/// Y and Z are read two and one words behind the new position. The output
/// cursor likewise jumps a full record after X, and Y and Z land seven and
/// six floats behind it. Every jump is checked against the slice length.
///
/// Words past the last complete group are ignored.
pub fn packed_to_float(words: &[u32]) -> DecodeResult<VertexBuffer> {
    let count = words.len() / PACKED_WORDS_PER_VERTEX;
    let mut buffer = VertexBuffer::zeroed(count);
    let out = buffer.as_mut_slice();

    let mut input = 0usize;
    let mut output = 0usize;
    for _ in 0..count {
        let x = word_behind(words, input, 0)?;
        input += PACKED_WORDS_PER_VERTEX;
        store_behind(out, output, 0, unpack_word(x))?;
        output += VERTEX_STRIDE_FLOATS;

        let y = word_behind(words, input, 2)?;
        store_behind(out, output, 7, unpack_word(y))?;

        let z = word_behind(words, input, 1)?;
        store_behind(out, output, 6, unpack_word(z))?;
    }

    tracing::trace!(vertices = count, "packed_to_float");
    Ok(buffer)
}

/// Dots unpacking: each group of three words is X, Y, Z in order.
pub fn packed_to_float_3component(words: &[u32]) -> VertexBuffer {
    let count = words.len() / PACKED_WORDS_PER_VERTEX;
    let mut buffer = VertexBuffer::zeroed(count);
    let out = buffer.as_mut_slice();

    for (group, record) in words
        .chunks_exact(PACKED_WORDS_PER_VERTEX)
        .zip(out.chunks_exact_mut(VERTEX_STRIDE_FLOATS))
    {
        record[0] = unpack_word(group[0]);
        record[1] = unpack_word(group[1]);
        record[2] = unpack_word(group[2]);
    }

    tracing::trace!(vertices = count, "packed_to_float_3component");
    buffer
}

/// FDot unpacking: skip the 24-byte parameter block, then decode records.
pub fn decrunch_dots(payload: &[u8]) -> DecodeResult<VertexBuffer> {
    let body = payload
        .get(DECRUNCH_PARAMETER_BYTES..)
        .ok_or(DecodeError::IndexOutOfBounds {
            index: DECRUNCH_PARAMETER_BYTES,
            len: payload.len(),
        })?;
    Ok(decrunch_dot_records(body))
}

/// Expand 6-byte records (three LE i16 in hundredths) into 8-float records.
///
/// The remaining five floats of each record stay zero. A raw -1 means unset
/// and decodes as 0.0.
pub fn decrunch_dot_records(body: &[u8]) -> VertexBuffer {
    let count = body.len() / DECRUNCH_RECORD_BYTES;
    let mut buffer = VertexBuffer::zeroed(count);
    let out = buffer.as_mut_slice();

    for (raw, record) in body
        .chunks_exact(DECRUNCH_RECORD_BYTES)
        .zip(out.chunks_exact_mut(VERTEX_STRIDE_FLOATS))
    {
        for (axis, slot) in record[..3].iter_mut().enumerate() {
            *slot = decrunch_component(read_i16_le(raw, axis * 2).unwrap_or(-1));
        }
    }

    tracing::trace!(vertices = count, "decrunch_dots");
    buffer
}

#[inline]
fn decrunch_component(raw: i16) -> f32 {
    if raw == -1 { 0.0 } else { f32::from(raw) / 100.0 }
}
