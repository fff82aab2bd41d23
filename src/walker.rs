//! The generic graph walker
//!
//! One invocation steps from node to node over the packet: compute the
//! header length, extract metadata, run the handler, dispatch the node's
//! sub-parser, account encapsulations, derive the next-protocol key and
//! look up the successor, then advance the cursor. The walk ends with a
//! stop code when a callback requests it, a limit trips, a lookup misses
//! with no fallback, or a leaf is reached.
//!
//! Per-node operation order: length, `extract_metadata`, `handler`,
//! sub-parser, `post_handler`, encapsulation accounting, next-protocol
//! lookup, cursor advance. The cursor moves only after every callback of
//! the node has run, so an overlay node that stops mid-way leaves the
//! cursor at its own offset.

use crate::array::ArrayNode;
use crate::codes::ParseCode;
use crate::ctrl::CtrlData;
use crate::flag_fields::{self, FlagFieldsNode};
use crate::hdr::csum16_fold;
use crate::metadata::MetadataFrames;
use crate::node::{NodeId, NodeKind, NODE_F_ZERO_LEN_OK};
use crate::parser::{Parser, F_DEBUG};
use crate::tlv::{TlvNodeId, TlvsNode};
use tracing::trace;

/// Entry point for the generic variant; see [`Parser::parse`].
pub(crate) fn parse(
    parser: &Parser,
    packet: &[u8],
    metadata: &mut [u8],
    ctrl: &mut CtrlData<'_>,
    flags: u32,
) -> ParseCode {
    ctrl.reset(parser.config());
    ctrl.pkt.pkt_len = packet.len();

    let mut meta = match MetadataFrames::new(metadata, parser.config()) {
        Ok(meta) => meta,
        Err(code) => {
            ctrl.var.ret_code = code;
            return code;
        }
    };

    let code = walk(parser, packet, 0, packet.len(), parser.root(), &mut meta, ctrl, flags);
    let mut ret = if code == ParseCode::Okay {
        ParseCode::StopOkay
    } else {
        code
    };
    ctrl.var.ret_code = ret;

    let exit = if ret.is_okay() {
        parser.config().okay_node
    } else {
        parser.config().fail_node
    };
    if let Some(hook) = exit {
        let hook_code = run_hook_node(parser, hook, &mut meta, ctrl);
        if hook_code.is_stop() {
            ret = hook_code;
            ctrl.var.ret_code = ret;
        }
    }

    ret
}

/// Walk the region `[off, end)` starting at `start`. Also re-entered for
/// nested TLV graphs, where the region covers the option value.
fn walk(
    parser: &Parser,
    packet: &[u8],
    mut off: usize,
    end: usize,
    start: NodeId,
    meta: &mut MetadataFrames<'_>,
    ctrl: &mut CtrlData<'_>,
    flags: u32,
) -> ParseCode {
    let config = parser.config();
    let mut cur = start;

    loop {
        let node = parser.node(cur);

        ctrl.var.node_cnt += 1;
        if ctrl.var.node_cnt > config.max_nodes {
            return ParseCode::StopMaxNodes;
        }
        ctrl.var.last_node = Some(cur);

        let remaining = end - off;
        if remaining == 0 && node.flags & NODE_F_ZERO_LEN_OK != 0 {
            return ParseCode::Okay;
        }

        // Record the offset before the length dispatch so a failed read
        // reports the node that failed, not its predecessor.
        ctrl.var.hdr_off = off;
        ctrl.var.hdr_len = 0;

        let region = &packet[off..end];
        let hlen = match node.proto.hdr_len(region) {
            Ok(hlen) => hlen,
            Err(code) => return code,
        };
        let hdr = &packet[off..off + hlen];

        ctrl.var.hdr_len = hlen;
        ctrl.var.hdr_csum = csum16_fold(0, hdr);

        if flags & F_DEBUG != 0 {
            trace!(
                node = %node.name,
                off,
                hlen,
                node_cnt = ctrl.var.node_cnt,
                "visit node"
            );
        }

        if let Some(extract) = node.ops.extract_metadata {
            extract(hdr, off, meta, ctrl);
        }
        if let Some(handler) = node.ops.handler {
            let code = handler(hdr, off, meta, ctrl);
            if code != ParseCode::Okay {
                return code;
            }
        }

        let sub_code = match &node.kind {
            NodeKind::Plain => ParseCode::Okay,
            NodeKind::Tlvs(tlvs) => parse_tlvs(parser, packet, off, hlen, tlvs, meta, ctrl, flags),
            NodeKind::FlagFields(ff) => {
                parse_flag_fields(parser, packet, off, hlen, ff, meta, ctrl, flags)
            }
            NodeKind::Array(arr) => parse_array(parser, packet, off, hlen, arr, meta, ctrl, flags),
        };
        if sub_code != ParseCode::Okay {
            return sub_code;
        }

        if let Some(post) = node.ops.post_handler {
            let code = post(hdr, off, meta, ctrl);
            if code != ParseCode::Okay {
                return code;
            }
        }

        if node.proto.encap {
            ctrl.var.encaps += 1;
            if ctrl.var.encaps > config.max_encaps {
                return ParseCode::StopEncapDepth;
            }
            meta.advance(ctrl.var.encaps as usize);
            if let Some(hook) = config.atencap_node {
                let code = run_hook_node(parser, hook, meta, ctrl);
                if code.is_stop() {
                    return code;
                }
            }
        }

        let next = match node.proto.next_proto_key(hdr, ctrl.key_in(node.key_sel)) {
            // No next-protocol operation: follow the wildcard (auto-next)
            // or end the walk at this leaf.
            None => match node.wildcard {
                Some(wild) => wild,
                None => return ParseCode::Okay,
            },
            Some(Err(code)) => return code,
            Some(Ok(key)) => {
                let hit = node
                    .proto_table
                    .as_ref()
                    .and_then(|table| table.lookup(key));
                match hit.or(node.wildcard) {
                    Some(next) => next,
                    None => return node.unknown_ret,
                }
            }
        };

        if !node.proto.overlay {
            ctrl.var.pkt_csum = csum16_fold(ctrl.var.pkt_csum, hdr);
            off += hlen;
        }
        cur = next;
    }
}

/// Run a hook node (okay/fail/at-encap) once: extract plus handler against
/// the current frame, with no header bytes.
fn run_hook_node(
    parser: &Parser,
    id: NodeId,
    meta: &mut MetadataFrames<'_>,
    ctrl: &mut CtrlData<'_>,
) -> ParseCode {
    let node = parser.node(id);
    if let Some(extract) = node.ops.extract_metadata {
        extract(&[], 0, meta, ctrl);
    }
    if let Some(handler) = node.ops.handler {
        return handler(&[], 0, meta, ctrl);
    }
    ParseCode::Okay
}

/// Walk the TLV list of a TLVs node. `off` is the absolute offset of the
/// enclosing header, `hlen` its effective length.
fn parse_tlvs(
    parser: &Parser,
    packet: &[u8],
    off: usize,
    hlen: usize,
    tlvs: &TlvsNode,
    meta: &mut MetadataFrames<'_>,
    ctrl: &mut CtrlData<'_>,
    flags: u32,
) -> ParseCode {
    let def = tlvs.def;
    let hdr = &packet[off..off + hlen];
    let mut cursor = (def.start_offset)(hdr);
    let mut processed = 0usize;

    while cursor < hlen {
        // Padding is consumed before any length check.
        let first = hdr[cursor];
        if def.pad1 == Some(first) {
            cursor += 1;
            continue;
        }
        // End-of-list terminates even if bytes remain.
        if def.eol == Some(first) {
            break;
        }

        if processed >= tlvs.max_tlvs {
            return ParseCode::StopOptionLimit;
        }

        if hlen - cursor < def.min_len {
            return ParseCode::StopTlvLength;
        }
        let tlv_len = match (def.len)(&hdr[cursor..]) {
            Ok(len) => len,
            Err(code) => return code,
        };
        if tlv_len < def.min_len || tlv_len > hlen - cursor || tlv_len > tlvs.max_tlv_len {
            return ParseCode::StopTlvLength;
        }
        let tlv = &hdr[cursor..cursor + tlv_len];

        let typ = match (def.typ)(tlv) {
            Ok(typ) => typ,
            Err(code) => return code,
        };

        let code = match tlvs.table.lookup(typ).or(tlvs.wildcard) {
            Some(id) => process_tlv_node(parser, packet, off + cursor, tlv, id, meta, ctrl, flags, 0),
            None => tlvs.unknown_tlv_ret,
        };
        match code {
            ParseCode::Okay | ParseCode::StopSubNodeOkay => {}
            ParseCode::StopNodeOkay => break,
            code => return code,
        }

        cursor += tlv_len;
        processed += 1;
    }

    ParseCode::Okay
}

/// Process one matched TLV node: extract, handler, then one level of
/// overlay resolution, then an optional nested graph over the value bytes.
#[allow(clippy::too_many_arguments)]
fn process_tlv_node(
    parser: &Parser,
    packet: &[u8],
    abs_off: usize,
    tlv: &[u8],
    id: TlvNodeId,
    meta: &mut MetadataFrames<'_>,
    ctrl: &mut CtrlData<'_>,
    flags: u32,
    overlay_depth: u8,
) -> ParseCode {
    let node = parser.tlv_node(id);

    if flags & F_DEBUG != 0 {
        trace!(tlv_node = %node.name, off = abs_off, len = tlv.len(), "visit TLV");
    }

    if let Some(extract) = node.ops.extract_metadata {
        extract(tlv, abs_off, meta, ctrl);
    }
    if let Some(handler) = node.ops.handler {
        let code = handler(tlv, abs_off, meta, ctrl);
        if code != ParseCode::Okay {
            return code;
        }
    }

    if overlay_depth == 0 {
        if let Some(table) = &node.overlay_table {
            let key = match node.def.overlay_type {
                Some(typ) => match typ(tlv) {
                    Ok(key) => key,
                    Err(code) => return code,
                },
                // Keyed on the option length when no overlay type is
                // defined (TCP SACK style).
                None => tlv.len() as u32,
            };
            let code = match table.lookup(key).or(node.overlay_wildcard) {
                Some(target) => process_tlv_node(
                    parser,
                    packet,
                    abs_off,
                    tlv,
                    target,
                    meta,
                    ctrl,
                    flags,
                    overlay_depth + 1,
                ),
                None => node.unknown_overlay_ret,
            };
            match code {
                ParseCode::Okay | ParseCode::StopSubNodeOkay => {}
                code => return code,
            }
        }
    }

    if let Some(nested) = node.nested_node {
        let value_off = match node.def.nested_offset {
            Some(nested_offset) => nested_offset(tlv, tlv.len()),
            None => node.def.min_len,
        };
        if value_off > tlv.len() {
            return ParseCode::StopTlvLength;
        }
        ctrl.var.tlv_levels += 1;
        let code = walk(
            parser,
            packet,
            abs_off + value_off,
            abs_off + tlv.len(),
            nested,
            meta,
            ctrl,
            flags,
        );
        ctrl.var.tlv_levels -= 1;
        if !code.is_okay() && code != ParseCode::StopSubNodeOkay {
            return code;
        }
    }

    ParseCode::Okay
}

/// Walk the flag-field descriptors of a flag-fields node, dispatching the
/// present fields in descriptor order.
#[allow(clippy::too_many_arguments)]
fn parse_flag_fields(
    parser: &Parser,
    packet: &[u8],
    off: usize,
    hlen: usize,
    ff: &FlagFieldsNode,
    meta: &mut MetadataFrames<'_>,
    ctrl: &mut CtrlData<'_>,
    flags: u32,
) -> ParseCode {
    let def = ff.def;
    let hdr = &packet[off..off + hlen];
    let flag_word = (def.get_flags)(hdr);

    if flag_fields::invalid_flags(def.fields, flag_word) {
        return ParseCode::StopBadFlag;
    }

    let start = (def.start_offset)(hdr);
    let mut cum = 0usize;

    for (idx, field) in def.fields.iter().enumerate() {
        if !field.matches(flag_word) {
            continue;
        }
        let field_off = start + cum;
        cum += field.size;
        if field_off + field.size > hlen {
            return ParseCode::StopLength;
        }

        if let Some(id) = ff.table.lookup(idx) {
            let node = parser.flag_node(id);
            let field_bytes = &hdr[field_off..field_off + field.size];

            if flags & F_DEBUG != 0 {
                trace!(flag_node = %node.name, off = off + field_off, size = field.size, "visit flag field");
            }

            if let Some(extract) = node.ops.extract_metadata {
                extract(field_bytes, off + field_off, meta, ctrl);
            }
            if let Some(handler) = node.ops.handler {
                let code = handler(field_bytes, off + field_off, meta, ctrl);
                match code {
                    ParseCode::Okay | ParseCode::StopSubNodeOkay => {}
                    ParseCode::StopNodeOkay => break,
                    code => return code,
                }
            }
        }
    }

    ParseCode::Okay
}

/// Walk the elements of an array node.
#[allow(clippy::too_many_arguments)]
fn parse_array(
    parser: &Parser,
    packet: &[u8],
    off: usize,
    hlen: usize,
    arr: &ArrayNode,
    meta: &mut MetadataFrames<'_>,
    ctrl: &mut CtrlData<'_>,
    flags: u32,
) -> ParseCode {
    let def = arr.def;
    let hdr = &packet[off..off + hlen];
    let num_els = (def.num_els)(hdr, hlen).min(arr.max_els);
    let base = (def.start_offset)(hdr);

    for i in 0..num_els {
        let el_off = base + i * def.el_length;
        if el_off + def.el_length > hlen {
            return ParseCode::StopLength;
        }
        let el = &hdr[el_off..el_off + def.el_length];

        let target = match def.el_type {
            Some(el_type) => match el_type(el) {
                Ok(typ) => arr.table.lookup(typ).or(arr.wildcard),
                // End-of-array marker.
                Err(_) => break,
            },
            None => arr.wildcard,
        };

        let code = match target {
            Some(id) => {
                let node = parser.arrel_node(id);
                if flags & F_DEBUG != 0 {
                    trace!(arrel_node = %node.name, off = off + el_off, "visit array element");
                }
                if let Some(extract) = node.ops.extract_metadata {
                    extract(el, off + el_off, meta, ctrl);
                }
                match node.ops.handler {
                    Some(handler) => handler(el, off + el_off, meta, ctrl),
                    None => ParseCode::Okay,
                }
            }
            None => arr.unknown_ret,
        };
        match code {
            ParseCode::Okay | ParseCode::StopSubNodeOkay => {}
            ParseCode::StopNodeOkay => break,
            code => return code,
        }
    }

    ParseCode::Okay
}
