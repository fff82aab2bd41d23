//! Hand-written fast-path walker
//!
//! A specialized entry point for graphs of plain, non-overlay,
//! non-encapsulating nodes: straight table dispatch with none of the
//! sub-parser or frame machinery on the hot path. Produces results
//! bit-identical to the generic walker for every eligible graph; the
//! equivalence is a test oracle for both implementations.
//!
//! Install with [`ParserBuilder::optimized`] after checking
//! [`validate_fast`], or call [`parse_fast`] directly.
//!
//! [`ParserBuilder::optimized`]: crate::parser::ParserBuilder::optimized

use crate::codes::ParseCode;
use crate::ctrl::CtrlData;
use crate::hdr::csum16_fold;
use crate::metadata::MetadataFrames;
use crate::node::{NodeKind, NODE_F_ZERO_LEN_OK};
use crate::parser::{Parser, F_DEBUG};
use tracing::trace;

/// True when every node of the graph is on the fast path: plain kind,
/// non-overlay, non-encapsulating. Such graphs never touch the sub-parser
/// or frame-advance machinery.
pub fn validate_fast(parser: &Parser) -> bool {
    parser
        .nodes
        .iter()
        .all(|node| matches!(node.kind, NodeKind::Plain) && !node.proto.overlay && !node.proto.encap)
}

/// Fast-path entry point. Graphs that stray off the fast path stop with
/// `StopFail`; run [`validate_fast`] at build time to rule that out.
pub fn parse_fast(
    parser: &Parser,
    packet: &[u8],
    metadata: &mut [u8],
    ctrl: &mut CtrlData<'_>,
    flags: u32,
) -> ParseCode {
    let config = parser.config();
    ctrl.reset(config);
    ctrl.pkt.pkt_len = packet.len();

    let mut meta = match MetadataFrames::new(metadata, config) {
        Ok(meta) => meta,
        Err(code) => {
            ctrl.var.ret_code = code;
            return code;
        }
    };

    let mut off = 0usize;
    let mut cur = parser.root();

    let code = loop {
        let node = parser.node(cur);

        ctrl.var.node_cnt += 1;
        if ctrl.var.node_cnt > config.max_nodes {
            break ParseCode::StopMaxNodes;
        }
        ctrl.var.last_node = Some(cur);

        if !matches!(node.kind, NodeKind::Plain) || node.proto.overlay || node.proto.encap {
            break ParseCode::StopFail;
        }

        let remaining = packet.len() - off;
        if remaining == 0 && node.flags & NODE_F_ZERO_LEN_OK != 0 {
            break ParseCode::Okay;
        }

        // Record the offset before the length dispatch so a failed read
        // reports the node that failed, not its predecessor.
        ctrl.var.hdr_off = off;
        ctrl.var.hdr_len = 0;

        let region = &packet[off..];
        let hlen = match node.proto.hdr_len(region) {
            Ok(hlen) => hlen,
            Err(code) => break code,
        };
        let hdr = &packet[off..off + hlen];

        ctrl.var.hdr_len = hlen;
        ctrl.var.hdr_csum = csum16_fold(0, hdr);

        if flags & F_DEBUG != 0 {
            trace!(node = %node.name, off, hlen, "visit node (fast)");
        }

        if let Some(extract) = node.ops.extract_metadata {
            extract(hdr, off, &mut meta, ctrl);
        }
        if let Some(handler) = node.ops.handler {
            let code = handler(hdr, off, &mut meta, ctrl);
            if code != ParseCode::Okay {
                break code;
            }
        }
        if let Some(post) = node.ops.post_handler {
            let code = post(hdr, off, &mut meta, ctrl);
            if code != ParseCode::Okay {
                break code;
            }
        }

        let next = match node.proto.next_proto_key(hdr, ctrl.key_in(node.key_sel)) {
            None => match node.wildcard {
                Some(wild) => wild,
                None => break ParseCode::Okay,
            },
            Some(Err(code)) => break code,
            Some(Ok(key)) => {
                let hit = node
                    .proto_table
                    .as_ref()
                    .and_then(|table| table.lookup(key));
                match hit.or(node.wildcard) {
                    Some(next) => next,
                    None => break node.unknown_ret,
                }
            }
        };

        ctrl.var.pkt_csum = csum16_fold(ctrl.var.pkt_csum, hdr);
        off += hlen;
        cur = next;
    };

    let mut ret = if code == ParseCode::Okay {
        ParseCode::StopOkay
    } else {
        code
    };
    ctrl.var.ret_code = ret;

    let exit = if ret.is_okay() {
        config.okay_node
    } else {
        config.fail_node
    };
    if let Some(hook) = exit {
        let node = parser.node(hook);
        if let Some(extract) = node.ops.extract_metadata {
            extract(&[], 0, &mut meta, ctrl);
        }
        if let Some(handler) = node.ops.handler {
            let hook_code = handler(&[], 0, &mut meta, ctrl);
            if hook_code.is_stop() {
                ret = hook_code;
                ctrl.var.ret_code = ret;
            }
        }
    }

    ret
}
