//! Chunk framing
//!
//! Chunks are `type: u32 LE | size: u32 LE | payload`, repeated until an
//! `"End "` chunk. The reader only records offsets, payloads stay in the
//! caller's buffer.

use std::fmt;

use crate::CHUNK_HEADER_SIZE;
use crate::bytes::read_u32_le;
use crate::error::{DecodeError, DecodeResult};

/// Four-character chunk type code, stored as the little-endian u32 read from the file
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC(pub u32);

impl FourCC {
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.to_bytes() {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC(\"{self}\" 0x{:08X})", self.0)
    }
}

/// Known chunk kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    /// Packed vertices, backward-reference layout
    Dot2,
    /// Packed vertices, sequential layout
    Dots,
    /// Compressed vertices with a 24-byte parameter block
    FDot,
    /// Compressed vertices with a vertex count prefix
    CDot,
    /// Primitive records
    Prim,
    Line,
    SoPF,
    FPos,
    TxNm,
    /// Stream terminator
    End,
    Unknown,
}

impl ChunkKind {
    pub const DOT2: FourCC = FourCC(0x3274_6F44);
    pub const DOTS: FourCC = FourCC(0x7374_6F44);
    pub const FDOT: FourCC = FourCC(0x746F_4446);
    pub const CDOT: FourCC = FourCC(0x746F_4463);
    pub const PRIM: FourCC = FourCC(0x6D69_7250);
    pub const LINE: FourCC = FourCC(0x656E_694C);
    pub const SOPF: FourCC = FourCC(0x4650_6F73);
    pub const FPOS: FourCC = FourCC(0x736F_5046);
    pub const TXNM: FourCC = FourCC(0x6D4E_7854);
    pub const END: FourCC = FourCC(0x2064_6E45);

    pub fn from_fourcc(code: FourCC) -> Self {
        match code {
            Self::DOT2 => ChunkKind::Dot2,
            Self::DOTS => ChunkKind::Dots,
            Self::FDOT => ChunkKind::FDot,
            Self::CDOT => ChunkKind::CDot,
            Self::PRIM => ChunkKind::Prim,
            Self::LINE => ChunkKind::Line,
            Self::SOPF => ChunkKind::SoPF,
            Self::FPOS => ChunkKind::FPos,
            Self::TXNM => ChunkKind::TxNm,
            Self::END => ChunkKind::End,
            _ => ChunkKind::Unknown,
        }
    }

    /// Carries vertex data
    pub fn is_vertex(self) -> bool {
        matches!(
            self,
            ChunkKind::Dot2 | ChunkKind::Dots | ChunkKind::FDot | ChunkKind::CDot
        )
    }
}

/// One framed chunk. Offsets index into the scanned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChunk {
    pub type_code: FourCC,
    pub size: u32,
    pub payload_offset: usize,
}

impl RawChunk {
    pub fn kind(&self) -> ChunkKind {
        ChunkKind::from_fourcc(self.type_code)
    }

    /// Offset of the chunk's type code
    pub fn header_offset(&self) -> usize {
        self.payload_offset - CHUNK_HEADER_SIZE
    }

    /// Header plus payload
    pub fn total_size(&self) -> usize {
        CHUNK_HEADER_SIZE + self.size as usize
    }

    pub fn payload_end(&self) -> usize {
        self.payload_offset + self.size as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Scanning,
    Done,
}

/// Iterates chunks from a start offset until the terminator or end of buffer.
pub struct ChunkReader<'a> {
    data: &'a [u8],
    offset: usize,
    start: usize,
    state: ReaderState,
}

impl<'a> ChunkReader<'a> {
    pub fn new(data: &'a [u8], start_offset: usize) -> Self {
        Self {
            data,
            offset: start_offset,
            start: start_offset,
            state: ReaderState::Scanning,
        }
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Current read position
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes covered by the chunks emitted so far
    pub fn bytes_consumed(&self) -> usize {
        self.offset - self.start
    }

    /// Read the next chunk.
    ///
    /// Returns `Ok(None)` once the terminator has been read or fewer than 8
    /// bytes remain.
    pub fn next_chunk(&mut self) -> DecodeResult<Option<RawChunk>> {
        if self.state == ReaderState::Done {
            return Ok(None);
        }

        let (Some(type_code), Some(size)) = (
            read_u32_le(self.data, self.offset),
            read_u32_le(self.data, self.offset + 4),
        ) else {
            self.state = ReaderState::Done;
            return Ok(None);
        };
        let type_code = FourCC(type_code);

        let payload_offset = self.offset + CHUNK_HEADER_SIZE;
        let available = self.data.len() - payload_offset;
        if size as usize > available {
            return Err(DecodeError::ChunkOverrun {
                chunk: type_code,
                offset: self.offset,
                size,
                available,
            });
        }

        let chunk = RawChunk {
            type_code,
            size,
            payload_offset,
        };
        tracing::trace!(chunk = %type_code, offset = self.offset, size, "chunk");

        self.offset = chunk.payload_end();
        if chunk.kind() == ChunkKind::End {
            self.state = ReaderState::Done;
        }

        Ok(Some(chunk))
    }

    /// Payload bytes of a chunk produced by this reader
    pub fn payload(&self, chunk: &RawChunk) -> &'a [u8] {
        &self.data[chunk.payload_offset..chunk.payload_end()]
    }
}

/// Frame every chunk from `start_offset` through the terminator.
///
/// Fails instead of returning a partial list: any overrun, or a stream that
/// ends without `"End "`, is an error.
pub fn scan_all(data: &[u8], start_offset: usize) -> DecodeResult<Vec<RawChunk>> {
    let mut reader = ChunkReader::new(data, start_offset);
    let mut chunks = Vec::new();

    while let Some(chunk) = reader.next_chunk()? {
        chunks.push(chunk);
    }

    match chunks.last() {
        Some(last) if last.kind() == ChunkKind::End => Ok(chunks),
        _ => Err(DecodeError::MissingTerminator {
            offset: reader.offset(),
        }),
    }
}
