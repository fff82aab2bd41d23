//! Parse nodes and protocol tables
//!
//! A parse node is one vertex of the protocol graph: a reference to the
//! protocol definition for its header, the operations to run on it, and
//! the table selecting its successor. Nodes live in the parser's arena and
//! reference each other by stable [`NodeId`] indices, so graphs may be
//! declared in any order and may be cyclic in declaration order.

use crate::array::ArrayNode;
use crate::codes::ParseCode;
use crate::ctrl::CtrlData;
use crate::flag_fields::FlagFieldsNode;
use crate::metadata::MetadataFrames;
use crate::proto::{ProtoDef, NULL_PROTO};
use crate::tlv::TlvsNode;

/// Stable index of a parse node in a parser's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Metadata extraction callback.
///
/// `hdr` covers exactly the current header (or option); `hdr_off` is its
/// absolute offset in the packet. Output goes through the typed metadata
/// handle; counters and keys are reachable through `ctrl`.
pub type ExtractMetadataFn =
    fn(hdr: &[u8], hdr_off: usize, meta: &mut MetadataFrames<'_>, ctrl: &mut CtrlData<'_>);

/// Per-node handler callback. Returning anything other than `Okay` steers
/// or stops the walk.
pub type HandlerFn = fn(
    hdr: &[u8],
    hdr_off: usize,
    meta: &mut MetadataFrames<'_>,
    ctrl: &mut CtrlData<'_>,
) -> ParseCode;

/// Operation bundle for a parse node. All operations are optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeOps {
    pub extract_metadata: Option<ExtractMetadataFn>,
    pub handler: Option<HandlerFn>,
    /// Runs after the node's sub-parser (TLVs, flag fields, array).
    pub post_handler: Option<HandlerFn>,
}

/// Node flag: a zero-byte tail at this node ends the walk with `StopOkay`
/// instead of `StopLength`.
pub const NODE_F_ZERO_LEN_OK: u8 = 1;

/// Kind-specific payload of a parse node.
#[derive(Debug, Default)]
pub enum NodeKind {
    #[default]
    Plain,
    Tlvs(TlvsNode),
    FlagFields(FlagFieldsNode),
    Array(ArrayNode),
}

/// One vertex of the protocol graph.
#[derive(Debug)]
pub struct ParseNode {
    /// Diagnostic name; filled from the declaration if left empty.
    pub name: String,
    pub proto: &'static ProtoDef,
    pub ops: NodeOps,
    /// Keyed successors. A node with no table but a wildcard follows the
    /// wildcard unconditionally (auto-next).
    pub proto_table: Option<ProtoTable>,
    /// Successor when the key misses the table.
    pub wildcard: Option<NodeId>,
    /// Code returned when no successor matches and no wildcard is set.
    pub unknown_ret: ParseCode,
    /// Index into the control-data key array for `next_proto_keyin`.
    pub key_sel: u8,
    pub flags: u8,
    pub kind: NodeKind,
}

impl Default for ParseNode {
    fn default() -> Self {
        ParseNode {
            name: String::new(),
            proto: &NULL_PROTO,
            ops: NodeOps::default(),
            proto_table: None,
            wildcard: None,
            unknown_ret: ParseCode::StopUnknownProto,
            key_sel: 0,
            flags: 0,
            kind: NodeKind::Plain,
        }
    }
}

/// Ordered `(key, node)` sequence looked up linearly. Tables are small;
/// first match wins.
#[derive(Debug, Clone, Default)]
pub struct ProtoTable {
    entries: Vec<(u32, NodeId)>,
}

impl ProtoTable {
    pub fn new(entries: Vec<(u32, NodeId)>) -> Self {
        ProtoTable { entries }
    }

    pub fn lookup(&self, key: u32) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|(value, _)| *value == key)
            .map(|&(_, node)| node)
    }

    pub fn entries(&self) -> &[(u32, NodeId)] {
        &self.entries
    }
}
