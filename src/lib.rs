//! # Protowalk - Declarative Protocol-Graph Packet Parsing
//!
//! A protocol suite is described as a directed graph: nodes are protocol
//! headers, edges are keyed transitions ("IPv4's `protocol` field value 6
//! leads to the TCP node"). The engine walks this graph over a packet
//! buffer, validates header lengths, extracts typed metadata into
//! caller-provided frames, runs per-node and per-option handlers, and
//! stops with a well-defined [`ParseCode`].
//!
//! ## Building a parser
//!
//! Protocol definitions are `'static` descriptors; the graph is assembled
//! at load time through [`ParserBuilder`], which supports forward
//! references so tables may mention nodes defined later:
//!
//! ```rust
//! use protowalk::{
//!     CtrlData, LenOp, NextProtoOp, ParseNode, ParserBuilder, ParserConfig, ProtoDef,
//!     ProtoTable, hdr,
//! };
//!
//! fn ether_type(hdr: &[u8]) -> Result<u32, protowalk::ParseCode> {
//!     hdr::read_be16(hdr, 12).map(u32::from)
//! }
//!
//! static ETHER: ProtoDef = ProtoDef {
//!     name: "Ethernet",
//!     min_len: 14,
//!     encap: false,
//!     overlay: false,
//!     len: LenOp::MinLen,
//!     next_proto: NextProtoOp::Fn(ether_type),
//! };
//!
//! let mut b = ParserBuilder::new("example");
//! b.config(ParserConfig { frame_size: 64, ..ParserConfig::default() });
//! let ipv4 = b.declare_node("ipv4");
//! let ether = b.add_node(
//!     "ether",
//!     ParseNode {
//!         proto: &ETHER,
//!         proto_table: Some(ProtoTable::new(vec![(0x0800, ipv4)])),
//!         ..ParseNode::default()
//!     },
//! );
//! # b.define_node(ipv4, ParseNode::default()).unwrap();
//! b.root(ether);
//! let parser = b.build().unwrap();
//!
//! let packet = [0u8; 14];
//! let mut metadata = vec![0u8; 64 + 4 * 64];
//! let mut ctrl = CtrlData::for_parser(&parser);
//! let status = parser.parse(&packet, &mut metadata, &mut ctrl, 0);
//! # let _ = status;
//! ```
//!
//! ## Invocation model
//!
//! One invocation is single-threaded, synchronous and allocation-free; the
//! engine borrows the packet, metadata and control buffers and retains
//! nothing. A built [`Parser`] is immutable and may be shared across
//! threads.
//!
//! ## Module organization
//!
//! - [`codes`] - stop/continue code taxonomy
//! - [`hdr`] - bounds-checked header access and endian readers
//! - [`proto`] - protocol definitions (length and next-protocol ops)
//! - [`node`] - parse nodes and protocol tables
//! - [`tlv`], [`flag_fields`], [`array`] - sub-parser data models
//! - [`metadata`] - metadata frame discipline
//! - [`ctrl`] - per-invocation control data
//! - [`parser`] - configuration, builder, entry points
//! - [`fast`] - hand-written fast-path walker (optimized variant)

pub mod array;
pub mod codes;
pub mod ctrl;
pub mod fast;
pub mod flag_fields;
pub mod hdr;
pub mod metadata;
pub mod node;
pub mod parser;
pub mod proto;
pub mod tlv;
mod walker;

pub use array::{ArrElNode, ArrElNodeId, ArrElOps, ArrayDef, ArrayNode, ArrayTable};
pub use codes::ParseCode;
pub use ctrl::{CtrlData, KeyData, PacketData, VarData};
pub use flag_fields::{
    FlagField, FlagFieldNode, FlagFieldOps, FlagFieldsDef, FlagFieldsNode, FlagFieldsTable,
    FlagNodeId,
};
pub use metadata::MetadataFrames;
pub use node::{
    ExtractMetadataFn, HandlerFn, NodeId, NodeKind, NodeOps, ParseNode, ProtoTable,
    NODE_F_ZERO_LEN_OK,
};
pub use parser::{
    BuildError, OptEntryFn, Parser, ParserBuilder, ParserConfig, ParserTable, ParserVariant,
    F_DEBUG,
};
pub use proto::{LenOp, NextProtoOp, ProtoDef, NULL_PROTO, NULL_PROTO_OVERLAY};
pub use tlv::{TlvDef, TlvNode, TlvNodeId, TlvOps, TlvTable, TlvsDef, TlvsNode, NULL_TLV_DEF};
