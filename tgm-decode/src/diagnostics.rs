//! Structured decode events
//!
//! The decoder never prints. Non-fatal anomalies are returned with the
//! decoded mesh and forwarded to a caller-supplied [`DiagnosticSink`].

use std::fmt;

/// Stable numeric event codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EventCode {
    InvalidData = 0x6A,
    InvalidTextureId = 800,
    SurfaceLimitExceeded = 2402,
    SurfaceAlreadyAllocated = 2403,
    SurfaceNotAllocated = 2404,
    /// A vertex was replaced by the safe default
    VertexRejected = 3001,
    /// A primitive record was dropped
    PrimitiveSkipped = 3002,
    /// A chunk was recognized (or not) and ignored
    ChunkSkipped = 3003,
    /// A vertex count field disagreed with the payload length
    VertexCountMismatch = 3004,
    /// A Prim chunk arrived after the primitive list was closed
    PrimitiveListClosed = 3005,
}

impl EventCode {
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// One decode event
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: EventCode,
    /// Byte offset in the input, when the event has one
    pub offset: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: EventCode, offset: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            code,
            offset,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(
                f,
                "[{}] {} (offset 0x{offset:X})",
                self.code.code(),
                self.message
            ),
            None => write!(f, "[{}] {}", self.code.code(), self.message),
        }
    }
}

/// Receives decode events as they happen
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: &Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.push(diagnostic.clone());
    }
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        tracing::warn!(
            code = diagnostic.code.code(),
            offset = diagnostic.offset,
            "{}",
            diagnostic.message
        );
    }
}

/// Discards events
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _diagnostic: &Diagnostic) {}
}
