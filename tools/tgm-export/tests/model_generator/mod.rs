//! Programmatic 3GM generation for integration tests.
//!
//! Generates small but complete model files:
//! - Full header, Dot2 vertices, Prim records and a terminator
//! - Surfaces with and without alpha

/// Pyramid corners: square base at y = 0, apex at y = 2
pub const PYRAMID: [[f32; 3]; 5] = [
    [-1.0, 0.0, -1.0],
    [1.0, 0.0, -1.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [0.0, 2.0, 0.0],
];

fn push_chunk(out: &mut Vec<u8>, code: &[u8; 4], payload: &[u8]) {
    out.extend_from_slice(code);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
}

fn push_record(out: &mut Vec<u8>, code: u16, texture: i16, flags: u16, data: &[u16]) {
    out.extend_from_slice(&code.to_le_bytes());
    out.extend_from_slice(&texture.to_le_bytes());
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    for word in data {
        out.extend_from_slice(&word.to_le_bytes());
    }
}

/// Packed Dot2 payload for a list of positions
fn dot2_payload(positions: &[[f32; 3]]) -> Vec<u8> {
    let mut payload = vec![0u8; 8];
    for component in positions.iter().flatten() {
        payload.extend_from_slice(&component.to_bits().swap_bytes().to_le_bytes());
    }
    payload
}

/// Generate a pyramid: four sides as a triangle list (texture 0), the base as
/// a triangle strip (texture 1, alpha) and an untextured outline of the base.
pub fn generate_pyramid() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"3DGM");
    out.extend_from_slice(&0x0100_0100u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());

    push_chunk(&mut out, b"Dot2", &dot2_payload(&PYRAMID));

    let mut prim = Vec::new();
    push_record(&mut prim, 20486, 0, 0, &[0, 4, 1, 1, 4, 2, 2, 4, 3, 3, 4, 0]);
    push_record(&mut prim, 16646, 1, 0, &[0, 1, 3, 2]);
    push_record(&mut prim, 28422, -1, 0, &[0, 1, 2, 3, 0]);
    prim.extend_from_slice(&0xFFFEu16.to_le_bytes());
    push_chunk(&mut out, b"Prim", &prim);

    push_chunk(&mut out, b"TxNm", b"stone\0");
    push_chunk(&mut out, b"End ", &[]);
    out
}

/// A file whose only chunk declares more bytes than it carries
pub fn generate_truncated() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"Dots");
    out.extend_from_slice(&64u32.to_le_bytes());
    out.extend_from_slice(&[0u8; 12]);
    out
}
