use super::*;
use crate::VERTEX_SENTINEL_BITS;
use crate::bytes::complex_byte_swap;
use crate::error::DecodeError;

fn bits(position: [f32; 3]) -> [u32; 3] {
    position.map(f32::to_bits)
}

// ========== Algorithm B ==========

#[test]
fn test_3component_reinterprets_bits() {
    let words = [1, 2, 3, 1, 2, 3];
    let buffer = packed_to_float_3component(&words);

    assert_eq!(buffer.vertex_count(), 2);
    assert_eq!(buffer.as_slice().len(), 2 * 8 + 1);

    let expected = [0x0100_0000, 0x0200_0000, 0x0300_0000];
    for position in buffer.positions() {
        assert_eq!(bits(position), expected);
    }

    // Numeric cast would give 1.0e0-style values, not denormal bit patterns
    assert_ne!(buffer.as_slice()[0], complex_byte_swap(1) as f32);
}

#[test]
fn test_3component_stride_and_padding() {
    let words = [0x0000_803F, 0, 0, 0, 0x0000_803F, 0];
    let buffer = packed_to_float_3component(&words);
    let floats = buffer.as_slice();

    // 0x0000803F swaps to 0x3F800000 = 1.0
    assert_eq!(floats[0], 1.0);
    assert_eq!(floats[8 + 1], 1.0);
    assert!(floats[3..8].iter().all(|&f| f == 0.0));
    assert_eq!(buffer.sentinel_bits(), Some(VERTEX_SENTINEL_BITS));
}

// ========== Algorithm A ==========

#[test]
fn test_packed_to_float_matches_sequential_layout() {
    let words = [
        0x0000_803F,
        0x0000_0040,
        0x0000_4040,
        0x0000_80BF,
        0x0000_0000,
        0x0000_C842,
    ];
    let buffer = packed_to_float(&words).unwrap();

    let positions: Vec<[f32; 3]> = buffer.positions().collect();
    assert_eq!(positions, vec![[1.0, 2.0, 3.0], [-1.0, 0.0, 100.0]]);
    assert_eq!(buffer, packed_to_float_3component(&words));
}

#[test]
fn test_buffer_equality_is_bitwise() {
    let buffer = packed_to_float(&[0x0000_803F, 0, 0]).unwrap();
    assert_eq!(buffer, buffer.clone());
    assert_eq!(buffer, packed_to_float(&[0x0000_803F, 0, 0]).unwrap());
    assert_eq!(VertexBuffer::zeroed(0), VertexBuffer::zeroed(0));

    // -0.0 == 0.0 numerically, but not bit for bit
    let negative_zero = packed_to_float(&[0x0000_0080, 0, 0]).unwrap();
    assert_ne!(buffer, negative_zero);
    assert_ne!(negative_zero, packed_to_float(&[0, 0, 0]).unwrap());
    assert_ne!(VertexBuffer::zeroed(1), VertexBuffer::zeroed(2));
}

#[test]
fn test_packed_to_float_sentinel() {
    let buffer = packed_to_float(&[7, 8, 9]).unwrap();
    assert_eq!(buffer.as_slice().len(), 9);
    assert_eq!(buffer.sentinel_bits(), Some(VERTEX_SENTINEL_BITS));
    assert!(buffer.as_slice()[8].is_nan());
}

#[test]
fn test_packed_to_float_ignores_partial_group() {
    let buffer = packed_to_float(&[1, 2, 3, 4, 5]).unwrap();
    assert_eq!(buffer.vertex_count(), 1);
}

#[test]
fn test_packed_to_float_empty() {
    let buffer = packed_to_float(&[]).unwrap();
    assert_eq!(buffer.vertex_count(), 0);
    assert_eq!(buffer.positions().count(), 0);
    assert_eq!(buffer.sentinel_bits(), Some(VERTEX_SENTINEL_BITS));
}

// ========== Algorithm C ==========

#[test]
fn test_decrunch_dots() {
    let mut payload = vec![0u8; 24];
    payload.extend_from_slice(&[0x64, 0x00, 0xC8, 0x00, 0x9C, 0xFF]);

    let buffer = decrunch_dots(&payload).unwrap();
    assert_eq!(buffer.vertex_count(), 1);
    assert_eq!(buffer.record(0).unwrap(), &[1.0, 2.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(buffer.sentinel_bits(), Some(VERTEX_SENTINEL_BITS));
}

#[test]
fn test_decrunch_unset_component() {
    let buffer = decrunch_dot_records(&[0xFF, 0xFF, 0x32, 0x00, 0xFE, 0xFF]);
    let position = buffer.positions().next().unwrap();
    assert_eq!(position, [0.0, 0.5, -0.02]);
}

#[test]
fn test_decrunch_dots_requires_parameter_block() {
    assert_eq!(
        decrunch_dots(&[0u8; 10]),
        Err(DecodeError::IndexOutOfBounds { index: 24, len: 10 })
    );
}

// ========== Layout ==========

#[test]
fn test_layout_record_count() {
    let dot2 = VertexChunkLayout::for_chunk(ChunkKind::Dot2).unwrap();
    assert_eq!(dot2.algorithm, VertexAlgorithm::PackedToFloat);
    assert_eq!(dot2.record_count(8 + 24), Some(2));
    assert_eq!(dot2.record_count(8 + 13), None);
    assert_eq!(dot2.record_count(4), None);

    let cdot = VertexChunkLayout::for_chunk(ChunkKind::CDot).unwrap();
    assert_eq!(cdot.record_count(4 + 12), Some(2));

    assert!(VertexChunkLayout::for_chunk(ChunkKind::Prim).is_none());
}

#[test]
fn test_layout_decode_skips_prefix() {
    let mut payload = vec![0xAA; 4];
    payload.extend_from_slice(&100i16.to_le_bytes());
    payload.extend_from_slice(&(-1i16).to_le_bytes());
    payload.extend_from_slice(&250i16.to_le_bytes());

    let layout = VertexChunkLayout::for_chunk(ChunkKind::CDot).unwrap();
    let buffer = layout.decode(&payload).unwrap();
    assert_eq!(buffer.positions().collect::<Vec<_>>(), vec![[1.0, 0.0, 2.5]]);
}

// ========== Normalization ==========

#[test]
fn test_origin_gets_up_normal() {
    let v = Vertex::from_position([0.0, 0.0, 0.0]);
    assert_eq!(v.normal, [0.0, 1.0, 0.0]);
    assert_eq!(v.uv, [0.5, 0.5]);
    assert_eq!(v.color, 0xFFFF_FFFF);
}

#[test]
fn test_normal_and_uv_from_position() {
    let v = Vertex::from_position([25.0, 0.0, 0.0]);
    assert_eq!(v.normal, [1.0, 0.0, 0.0]);
    assert_eq!(v.uv, [1.0, 0.5]);

    let v = Vertex::from_position([0.0, 3.0, 4.0]);
    assert!((v.normal[1] - 0.6).abs() < 1e-6);
    assert!((v.normal[2] - 0.8).abs() < 1e-6);
}

#[test]
fn test_rejects_nan_and_infinite() {
    assert_eq!(
        Vertex::from_raw([0.0, f32::NAN, 0.0], 1.0e4),
        Err(VertexRejection::NotANumber { axis: 1 })
    );
    assert_eq!(
        Vertex::from_raw([f32::NEG_INFINITY, 0.0, 0.0], 1.0e4),
        Err(VertexRejection::Infinite { axis: 0 })
    );
}

#[test]
fn test_rejects_out_of_range() {
    assert!(matches!(
        Vertex::from_raw([0.0, 0.0, -20_000.0], 1.0e4),
        Err(VertexRejection::OutOfRange { axis: 2, .. })
    ));
    assert!(Vertex::from_raw([0.0, 0.0, -20_000.0], 1.0e5).is_ok());
}

#[test]
fn test_safe_default_is_consistent() {
    assert_eq!(Vertex::SAFE_DEFAULT, Vertex::from_position([0.0, 0.0, 0.0]));
}
