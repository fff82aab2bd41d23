//! Control data
//!
//! Per-invocation scratch block threaded through every callback. Three
//! blocks: `pkt` (caller-set facts about the packet), `var` (cursor state
//! the engine updates as it walks), and `key` (the caller's argument plus
//! the counter and key arrays sized by the parser configuration).
//!
//! The engine zeroes `var` and the counter/key arrays on entry; after the
//! walk returns, `var.last_node`, `var.ret_code`, `var.encaps` and
//! `var.node_cnt` are the caller-observable outcome.

use crate::codes::ParseCode;
use crate::node::NodeId;
use crate::parser::{Parser, ParserConfig};
use std::any::Any;

/// Facts about the packet being parsed, set by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct PacketData {
    /// Full length of the packet; filled in by the engine on entry.
    pub pkt_len: usize,
    /// Sequence number per interface.
    pub seqno: u32,
    /// Received timestamp.
    pub timestamp: u32,
    /// Received port number.
    pub in_port: u32,
    pub flags: u16,
}

/// Cursor state updated by the engine while walking.
#[derive(Debug, Clone, Copy, Default)]
pub struct VarData {
    /// Last node visited.
    pub last_node: Option<NodeId>,
    /// Final return code of the walk.
    pub ret_code: ParseCode,
    /// Encapsulation boundaries crossed.
    pub encaps: u16,
    /// Nodes visited.
    pub node_cnt: u16,
    /// Nested-TLV depth while inside nested walks.
    pub tlv_levels: u8,
    /// Absolute offset of the current header.
    pub hdr_off: usize,
    /// Effective length of the current header.
    pub hdr_len: usize,
    /// Ones' complement sum of all packet bytes preceding the current
    /// header.
    pub pkt_csum: u16,
    /// Ones' complement sum of the current header's bytes.
    pub hdr_csum: u16,
}

/// Caller argument and the per-invocation counter and key arrays.
#[derive(Default)]
pub struct KeyData<'a> {
    /// Opaque caller argument, reachable from every handler.
    pub arg: Option<&'a mut dyn Any>,
    /// 8-bit counters, `num_counters` wide; handlers read and write
    /// freely.
    pub counters: Vec<u8>,
    /// 32-bit keys, `num_keys` wide; also feed `next_proto_keyin`.
    pub keys: Vec<u32>,
}

/// Control data block passed to [`Parser::parse`].
#[derive(Default)]
pub struct CtrlData<'a> {
    pub pkt: PacketData,
    pub var: VarData,
    pub key: KeyData<'a>,
}

impl<'a> CtrlData<'a> {
    /// Control data sized for `parser`'s counter and key configuration.
    pub fn for_parser(parser: &Parser) -> Self {
        let config = parser.config();
        CtrlData {
            pkt: PacketData::default(),
            var: VarData::default(),
            key: KeyData {
                arg: None,
                counters: vec![0; config.num_counters as usize],
                keys: vec![0; config.num_keys as usize],
            },
        }
    }

    /// Like [`CtrlData::for_parser`], with the caller argument attached.
    pub fn with_arg(parser: &Parser, arg: &'a mut dyn Any) -> Self {
        let mut ctrl = CtrlData::for_parser(parser);
        ctrl.key.arg = Some(arg);
        ctrl
    }

    /// Reset the engine-owned state for a fresh walk. The caller's `pkt`
    /// facts and `arg` survive; counters and keys are zeroed and resized
    /// to the configuration.
    pub(crate) fn reset(&mut self, config: &ParserConfig) {
        self.var = VarData::default();
        self.key.counters.clear();
        self.key.counters.resize(config.num_counters as usize, 0);
        self.key.keys.clear();
        self.key.keys.resize(config.num_keys as usize, 0);
    }

    /// Key selected by a node's `key_sel`, zero when unconfigured.
    pub(crate) fn key_in(&self, key_sel: u8) -> u32 {
        self.key.keys.get(key_sel as usize).copied().unwrap_or(0)
    }
}
