//! Little-endian field extraction from raw byte slices
//!
//! Every reader is bounds checked and returns `None` past the end of the
//! slice, so callers decide whether running out of bytes is an error.

/// Read a little-endian u16 at `offset`.
pub fn read_u16_le(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Read a little-endian i16 at `offset`.
pub fn read_i16_le(data: &[u8], offset: usize) -> Option<i16> {
    read_u16_le(data, offset).map(|v| v as i16)
}

/// Read a little-endian u32 at `offset`.
pub fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Split a byte slice into little-endian u32 words.
///
/// Trailing bytes that do not fill a whole word are ignored.
pub fn read_u32_words(data: &[u8]) -> Vec<u32> {
    data.chunks_exact(4)
        .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .collect()
}

/// Byte shuffle applied to packed vertex words.
///
/// Computed as
/// `(((w << 16) | (w & 0xFF00)) << 8) | (((w >> 16) | (w & 0xFF0000)) >> 8)`,
/// bit for bit. Bits shifted past either end are discarded.
pub const fn complex_byte_swap(w: u32) -> u32 {
    (((w << 16) | (w & 0xFF00)) << 8) | (((w >> 16) | (w & 0x00FF_0000)) >> 8)
}
