//! Protocol definitions
//!
//! A [`ProtoDef`] is a pure, `'static`-constructible descriptor of one
//! header type: its minimum length, how to compute its actual length, and
//! how to derive the key selecting the next protocol. Parse nodes reference
//! protocol definitions; the same definition may back any number of nodes.

use crate::codes::ParseCode;

/// Header length callback. The slice starts at the header and extends to
/// the end of the parseable region. An `Err` propagates verbatim as a stop
/// code.
pub type LenFn = fn(hdr: &[u8]) -> Result<usize, ParseCode>;

/// Header length callback that also receives the number of bytes remaining.
pub type LenMaxFn = fn(hdr: &[u8], maxlen: usize) -> Result<usize, ParseCode>;

/// Next-protocol callback returning the lookup key for the protocol table.
pub type NextProtoFn = fn(hdr: &[u8]) -> Result<u32, ParseCode>;

/// Next-protocol callback taking a key from the control data key array,
/// selected by the node's `key_sel`.
pub type NextProtoKeyInFn = fn(hdr: &[u8], key: u32) -> Result<u32, ParseCode>;

/// How a protocol computes its header length.
///
/// A definition carries exactly one variant, so the illegal "both `len`
/// and `len_maxlen` set" configuration cannot be expressed.
#[derive(Debug, Clone, Copy, Default)]
pub enum LenOp {
    /// Length is `min_len`.
    #[default]
    MinLen,
    Fn(LenFn),
    MaxLenFn(LenMaxFn),
}

/// How a protocol derives the next-protocol key, if at all.
#[derive(Debug, Clone, Copy, Default)]
pub enum NextProtoOp {
    /// No next protocol; the node is a leaf unless it has a wildcard.
    #[default]
    None,
    Fn(NextProtoFn),
    KeyIn(NextProtoKeyInFn),
}

/// Descriptor of one protocol header.
#[derive(Debug)]
pub struct ProtoDef {
    /// Text name for diagnostics.
    pub name: &'static str,
    /// Bytes that must be present before any length callback runs.
    pub min_len: usize,
    /// Crossing this header is an encapsulation boundary.
    pub encap: bool,
    /// The cursor does not advance past this header; the successor
    /// re-reads the same bytes.
    pub overlay: bool,
    pub len: LenOp,
    pub next_proto: NextProtoOp,
}

impl ProtoDef {
    /// Fixed-size protocol with no successor.
    pub const fn plain(name: &'static str, min_len: usize) -> Self {
        ProtoDef {
            name,
            min_len,
            encap: false,
            overlay: false,
            len: LenOp::MinLen,
            next_proto: NextProtoOp::None,
        }
    }

    /// Compute the effective header length at the cursor.
    ///
    /// `hdr` runs from the cursor to the end of the parseable region, so
    /// `hdr.len()` is the remaining byte count. Enforces `min_len` before
    /// the callback runs and re-checks the reported length against both
    /// bounds afterwards.
    pub fn hdr_len(&self, hdr: &[u8]) -> Result<usize, ParseCode> {
        if hdr.len() < self.min_len {
            return Err(ParseCode::StopLength);
        }
        let hlen = match self.len {
            LenOp::MinLen => self.min_len,
            LenOp::Fn(f) => f(hdr)?,
            LenOp::MaxLenFn(f) => f(hdr, hdr.len())?,
        };
        if hlen < self.min_len || hlen > hdr.len() {
            return Err(ParseCode::StopLength);
        }
        Ok(hlen)
    }

    /// Derive the next-protocol key, or `None` when the definition has no
    /// next-protocol operation.
    pub fn next_proto_key(&self, hdr: &[u8], key_in: u32) -> Option<Result<u32, ParseCode>> {
        match self.next_proto {
            NextProtoOp::None => None,
            NextProtoOp::Fn(f) => Some(f(hdr)),
            NextProtoOp::KeyIn(f) => Some(f(hdr, key_in)),
        }
    }
}

/// Zero-length placeholder protocol for terminal and hook nodes.
pub static NULL_PROTO: ProtoDef = ProtoDef::plain("NULL-proto", 0);

/// Overlay variant of the placeholder protocol.
pub static NULL_PROTO_OVERLAY: ProtoDef = ProtoDef {
    name: "NULL-proto",
    min_len: 0,
    encap: false,
    overlay: true,
    len: LenOp::MinLen,
    next_proto: NextProtoOp::None,
};
