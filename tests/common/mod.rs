//! Shared test fixtures: a TCP/IP protocol graph in the shape real
//! deployments use, plus packet builders.
//!
//! The graph covers Ethernet, IPv4 (with fragment handling), IPv6 and its
//! extension headers, an SRv6 segment-list array, GRE v0 flag fields over
//! an encapsulation boundary, UDP, and TCP options as TLVs with a
//! length-keyed SACK overlay.

#![allow(dead_code)]

use protowalk::{
    hdr, ArrElNode, ArrElOps, ArrayDef, ArrayNode, CtrlData, FlagField, FlagFieldNode,
    FlagFieldOps, FlagFieldsDef, FlagFieldsNode, FlagFieldsTable, LenOp, MetadataFrames,
    NextProtoOp, NodeId, NodeKind, NodeOps, ParseCode, ParseNode, Parser, ParserBuilder,
    ParserConfig, ProtoDef, ProtoTable, TlvNode, TlvOps, TlvTable, TlvsDef, TlvsNode,
};
use std::mem::size_of;
use zerocopy::{AsBytes, FromBytes, FromZeroes};

pub const ETH_P_IP: u32 = 0x0800;
pub const ETH_P_IPV6: u32 = 0x86dd;

pub const IPPROTO_HOPOPTS: u32 = 0;
pub const IPPROTO_TCP: u32 = 6;
pub const IPPROTO_UDP: u32 = 17;
pub const IPPROTO_ROUTING: u32 = 43;
pub const IPPROTO_GRE: u32 = 47;

pub const ADDR_TYPE_IPV4: u8 = 4;
pub const ADDR_TYPE_IPV6: u8 = 6;

/// Per-encapsulation-layer extraction target.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, AsBytes, FromBytes, FromZeroes)]
pub struct FrameMeta {
    pub ether_type: u16,
    pub addr_type: u8,
    pub ip_proto: u8,
    pub sport: u16,
    pub dport: u16,
    pub v4_saddr: [u8; 4],
    pub v4_daddr: [u8; 4],
    pub v6_saddr: [u8; 16],
    pub v6_daddr: [u8; 16],
    pub gre_version: u8,
    pub seg_cnt: u8,
    pub gre_key: u32,
    pub gre_seq: u32,
}

/// Packet-wide extraction target (TCP option details).
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, AsBytes, FromBytes, FromZeroes)]
pub struct MetaMeta {
    pub tcp_present: u8,
    pub num_sacks: u8,
    pub mss: u16,
    pub ts_val: u32,
    pub ts_echo: u32,
    pub sack: [[u32; 2]; 4],
}

pub const METAMETA_SIZE: usize = size_of::<MetaMeta>();
pub const FRAME_SIZE: usize = size_of::<FrameMeta>();
pub const MAX_FRAMES: usize = 2;

/// Metadata buffer sized and zeroed for the test configuration.
pub fn meta_buf() -> Vec<u8> {
    vec![0u8; METAMETA_SIZE + MAX_FRAMES * FRAME_SIZE]
}

pub fn metameta_of(buf: &[u8]) -> MetaMeta {
    MetaMeta::read_from(&buf[..METAMETA_SIZE]).unwrap()
}

pub fn frame_of(buf: &[u8], idx: usize) -> FrameMeta {
    let start = METAMETA_SIZE + idx * FRAME_SIZE;
    FrameMeta::read_from(&buf[start..start + FRAME_SIZE]).unwrap()
}

/* Protocol definitions */

fn ether_type(hdr: &[u8]) -> Result<u32, ParseCode> {
    hdr::read_be16(hdr, 12).map(u32::from)
}

pub static ETHER: ProtoDef = ProtoDef {
    name: "Ethernet",
    min_len: 14,
    encap: false,
    overlay: false,
    len: LenOp::MinLen,
    next_proto: NextProtoOp::Fn(ether_type),
};

fn ipv4_length(hdr: &[u8]) -> Result<usize, ParseCode> {
    Ok(((hdr[0] & 0x0f) as usize) * 4)
}

fn ipv4_proto(hdr: &[u8]) -> Result<u32, ParseCode> {
    let frag_off = hdr::read_be16(hdr, 6)?;
    if frag_off & 0x1fff != 0 {
        // Stop at a non-first fragment.
        return Err(ParseCode::StopOkay);
    }
    Ok(u32::from(hdr[9]))
}

pub static IPV4: ProtoDef = ProtoDef {
    name: "IPv4",
    min_len: 20,
    encap: false,
    overlay: false,
    len: LenOp::Fn(ipv4_length),
    next_proto: NextProtoOp::Fn(ipv4_proto),
};

fn ipv6_nexthdr(hdr: &[u8]) -> Result<u32, ParseCode> {
    Ok(u32::from(hdr[6]))
}

pub static IPV6: ProtoDef = ProtoDef {
    name: "IPv6",
    min_len: 40,
    encap: false,
    overlay: false,
    len: LenOp::MinLen,
    next_proto: NextProtoOp::Fn(ipv6_nexthdr),
};

fn ipv6_eh_length(hdr: &[u8]) -> Result<usize, ParseCode> {
    Ok((hdr[1] as usize + 1) * 8)
}

fn ipv6_eh_nexthdr(hdr: &[u8]) -> Result<u32, ParseCode> {
    Ok(u32::from(hdr[0]))
}

pub static IPV6_EH: ProtoDef = ProtoDef {
    name: "IPv6 extension header",
    min_len: 8,
    encap: false,
    overlay: false,
    len: LenOp::Fn(ipv6_eh_length),
    next_proto: NextProtoOp::Fn(ipv6_eh_nexthdr),
};

pub static UDP: ProtoDef = ProtoDef::plain("UDP", 8);

/* TCP with options */

fn tcp_length(hdr: &[u8]) -> Result<usize, ParseCode> {
    Ok(((hdr[12] >> 4) as usize) * 4)
}

pub static TCP: ProtoDef = ProtoDef {
    name: "TCP",
    min_len: 20,
    encap: false,
    overlay: false,
    len: LenOp::Fn(tcp_length),
    next_proto: NextProtoOp::None,
};

fn tcp_opt_start(_hdr: &[u8]) -> usize {
    20
}

fn tcp_opt_len(tlv: &[u8]) -> Result<usize, ParseCode> {
    Ok(tlv[1] as usize)
}

fn tcp_opt_type(tlv: &[u8]) -> Result<u32, ParseCode> {
    Ok(u32::from(tlv[0]))
}

pub static TCP_TLVS: TlvsDef = TlvsDef {
    min_len: 2,
    start_offset: tcp_opt_start,
    len: tcp_opt_len,
    typ: tcp_opt_type,
    pad1: Some(1),
    eol: Some(0),
};

pub const TCPOPT_MSS: u32 = 2;
pub const TCPOPT_SACK: u32 = 5;
pub const TCPOPT_TIMESTAMP: u32 = 8;

/* GRE */

fn gre_version(hdr: &[u8]) -> Result<u32, ParseCode> {
    Ok(u32::from(hdr[1] & 0x07))
}

pub static GRE_BASE: ProtoDef = ProtoDef {
    name: "GRE",
    min_len: 4,
    encap: false,
    overlay: true,
    len: LenOp::MinLen,
    next_proto: NextProtoOp::Fn(gre_version),
};

pub static GRE_V0_FIELDS: [FlagField; 3] = [
    // Checksum (plus reserved), key, sequence; four bytes each.
    FlagField { flag: 0x8000, mask: 0, size: 4 },
    FlagField { flag: 0x2000, mask: 0, size: 4 },
    FlagField { flag: 0x1000, mask: 0, size: 4 },
];

pub const GRE_CSUM_IDX: usize = 0;
pub const GRE_KEY_IDX: usize = 1;
pub const GRE_SEQ_IDX: usize = 2;

fn gre_v0_flags(hdr: &[u8]) -> u32 {
    // Everything except the version bits.
    u32::from(u16::from_be_bytes([hdr[0], hdr[1]])) & 0xfff8
}

fn gre_v0_fields_start(_hdr: &[u8]) -> usize {
    4
}

fn gre_v0_length(hdr: &[u8]) -> Result<usize, ParseCode> {
    Ok(4 + protowalk::flag_fields::fields_length(&GRE_V0_FIELDS, gre_v0_flags(hdr)))
}

fn gre_v0_proto(hdr: &[u8]) -> Result<u32, ParseCode> {
    hdr::read_be16(hdr, 2).map(u32::from)
}

pub static GRE_V0: ProtoDef = ProtoDef {
    name: "GRE v0",
    min_len: 4,
    encap: true,
    overlay: false,
    len: LenOp::Fn(gre_v0_length),
    next_proto: NextProtoOp::Fn(gre_v0_proto),
};

pub static GRE_V0_FF: FlagFieldsDef = FlagFieldsDef {
    fields: &GRE_V0_FIELDS,
    get_flags: gre_v0_flags,
    start_offset: gre_v0_fields_start,
};

/* SRv6 routing header with segment-list array */

fn srv6_num_els(_hdr: &[u8], hlen: usize) -> usize {
    (hlen - 8) / 16
}

fn srv6_start(_hdr: &[u8]) -> usize {
    8
}

pub static SRV6_SEG_LIST: ArrayDef = ArrayDef {
    el_length: 16,
    num_els: srv6_num_els,
    el_type: None,
    start_offset: srv6_start,
};

/* Extraction callbacks */

fn extract_ether(hdr: &[u8], _off: usize, meta: &mut MetadataFrames<'_>, _ctrl: &mut CtrlData<'_>) {
    let frame = meta.frame_as::<FrameMeta>().unwrap();
    frame.ether_type = u16::from_be_bytes([hdr[12], hdr[13]]);
}

fn extract_ipv4(hdr: &[u8], _off: usize, meta: &mut MetadataFrames<'_>, _ctrl: &mut CtrlData<'_>) {
    let frame = meta.frame_as::<FrameMeta>().unwrap();
    frame.addr_type = ADDR_TYPE_IPV4;
    frame.ip_proto = hdr[9];
    frame.v4_saddr.copy_from_slice(&hdr[12..16]);
    frame.v4_daddr.copy_from_slice(&hdr[16..20]);
}

fn extract_ipv6(hdr: &[u8], _off: usize, meta: &mut MetadataFrames<'_>, _ctrl: &mut CtrlData<'_>) {
    let frame = meta.frame_as::<FrameMeta>().unwrap();
    frame.addr_type = ADDR_TYPE_IPV6;
    frame.ip_proto = hdr[6];
    frame.v6_saddr.copy_from_slice(&hdr[8..24]);
    frame.v6_daddr.copy_from_slice(&hdr[24..40]);
}

fn extract_eh(hdr: &[u8], _off: usize, meta: &mut MetadataFrames<'_>, _ctrl: &mut CtrlData<'_>) {
    let frame = meta.frame_as::<FrameMeta>().unwrap();
    frame.ip_proto = hdr[0];
}

fn extract_ports(hdr: &[u8], _off: usize, meta: &mut MetadataFrames<'_>, _ctrl: &mut CtrlData<'_>) {
    let frame = meta.frame_as::<FrameMeta>().unwrap();
    frame.sport = u16::from_be_bytes([hdr[0], hdr[1]]);
    frame.dport = u16::from_be_bytes([hdr[2], hdr[3]]);
}

fn extract_tcp(hdr: &[u8], off: usize, meta: &mut MetadataFrames<'_>, ctrl: &mut CtrlData<'_>) {
    meta.metameta_as::<MetaMeta>().unwrap().tcp_present = 1;
    extract_ports(hdr, off, meta, ctrl);
}

fn extract_gre_v0(_hdr: &[u8], _off: usize, meta: &mut MetadataFrames<'_>, _ctrl: &mut CtrlData<'_>) {
    meta.frame_as::<FrameMeta>().unwrap().gre_version = 0x80;
}

fn extract_gre_key(hdr: &[u8], _off: usize, meta: &mut MetadataFrames<'_>, _ctrl: &mut CtrlData<'_>) {
    let frame = meta.frame_as::<FrameMeta>().unwrap();
    frame.gre_key = u32::from_be_bytes([hdr[0], hdr[1], hdr[2], hdr[3]]);
}

fn extract_gre_seq(hdr: &[u8], _off: usize, meta: &mut MetadataFrames<'_>, _ctrl: &mut CtrlData<'_>) {
    let frame = meta.frame_as::<FrameMeta>().unwrap();
    frame.gre_seq = u32::from_be_bytes([hdr[0], hdr[1], hdr[2], hdr[3]]);
}

fn extract_srv6_segment(
    _hdr: &[u8],
    _off: usize,
    meta: &mut MetadataFrames<'_>,
    ctrl: &mut CtrlData<'_>,
) {
    ctrl.key.counters[0] += 1;
    let count = ctrl.key.counters[0];
    meta.frame_as::<FrameMeta>().unwrap().seg_cnt = count;
}

fn extract_tcp_mss(hdr: &[u8], _off: usize, meta: &mut MetadataFrames<'_>, _ctrl: &mut CtrlData<'_>) {
    if hdr.len() == 4 {
        meta.metameta_as::<MetaMeta>().unwrap().mss = u16::from_be_bytes([hdr[2], hdr[3]]);
    }
}

fn extract_tcp_timestamp(
    hdr: &[u8],
    _off: usize,
    meta: &mut MetadataFrames<'_>,
    _ctrl: &mut CtrlData<'_>,
) {
    if hdr.len() == 10 {
        let mm = meta.metameta_as::<MetaMeta>().unwrap();
        mm.ts_val = u32::from_be_bytes([hdr[2], hdr[3], hdr[4], hdr[5]]);
        mm.ts_echo = u32::from_be_bytes([hdr[6], hdr[7], hdr[8], hdr[9]]);
    }
}

fn sack_block(hdr: &[u8], idx: usize) -> [u32; 2] {
    let base = 2 + idx * 8;
    [
        u32::from_be_bytes([hdr[base], hdr[base + 1], hdr[base + 2], hdr[base + 3]]),
        u32::from_be_bytes([hdr[base + 4], hdr[base + 5], hdr[base + 6], hdr[base + 7]]),
    ]
}

fn extract_sack(hdr: &[u8], meta: &mut MetadataFrames<'_>, blocks: usize) {
    let mut sack = [[0u32; 2]; 4];
    for (i, block) in sack.iter_mut().enumerate().take(blocks) {
        *block = sack_block(hdr, i);
    }
    let mm = meta.metameta_as::<MetaMeta>().unwrap();
    mm.sack = sack;
    mm.num_sacks = blocks as u8;
}

fn extract_sack_1(hdr: &[u8], _off: usize, meta: &mut MetadataFrames<'_>, _c: &mut CtrlData<'_>) {
    extract_sack(hdr, meta, 1);
}

fn extract_sack_2(hdr: &[u8], _off: usize, meta: &mut MetadataFrames<'_>, _c: &mut CtrlData<'_>) {
    extract_sack(hdr, meta, 2);
}

fn extract_sack_3(hdr: &[u8], _off: usize, meta: &mut MetadataFrames<'_>, _c: &mut CtrlData<'_>) {
    extract_sack(hdr, meta, 3);
}

fn extract_sack_4(hdr: &[u8], _off: usize, meta: &mut MetadataFrames<'_>, _c: &mut CtrlData<'_>) {
    extract_sack(hdr, meta, 4);
}

/* Graph assembly */

pub struct TestGraph {
    pub parser: Parser,
    pub ether: NodeId,
    pub ipv4: NodeId,
    pub ipv6: NodeId,
    pub tcp: NodeId,
    pub udp: NodeId,
    pub gre_base: NodeId,
    pub gre_v0: NodeId,
    pub hbh: NodeId,
    pub srv6: NodeId,
}

pub fn test_config() -> ParserConfig {
    ParserConfig {
        metameta_size: METAMETA_SIZE,
        frame_size: FRAME_SIZE,
        max_frames: MAX_FRAMES as u16,
        num_counters: 2,
        num_keys: 2,
        ..ParserConfig::default()
    }
}

/// Build the full TCP/IP test graph.
pub fn build_test_graph() -> TestGraph {
    let mut b = ParserBuilder::new("tcpip-test");
    b.config(test_config());

    let ether = b.declare_node("ether");
    let ipv4 = b.declare_node("ipv4");
    let ipv6 = b.declare_node("ipv6");
    let tcp = b.declare_node("tcp");
    let udp = b.declare_node("udp");
    let gre_base = b.declare_node("gre_base");
    let gre_v0 = b.declare_node("gre_v0");
    let hbh = b.declare_node("ipv6_hbh");
    let srv6 = b.declare_node("ipv6_srv6_rthdr");

    /* TCP option TLV nodes */
    let sack1 = b.add_tlv_node("tcp_opt_sack_1", TlvNode {
        ops: TlvOps { extract_metadata: Some(extract_sack_1), handler: None },
        ..TlvNode::default()
    });
    let sack2 = b.add_tlv_node("tcp_opt_sack_2", TlvNode {
        ops: TlvOps { extract_metadata: Some(extract_sack_2), handler: None },
        ..TlvNode::default()
    });
    let sack3 = b.add_tlv_node("tcp_opt_sack_3", TlvNode {
        ops: TlvOps { extract_metadata: Some(extract_sack_3), handler: None },
        ..TlvNode::default()
    });
    let sack4 = b.add_tlv_node("tcp_opt_sack_4", TlvNode {
        ops: TlvOps { extract_metadata: Some(extract_sack_4), handler: None },
        ..TlvNode::default()
    });
    // SACK dispatches on the option length: two bytes of header plus
    // eight per block.
    let sack = b.add_tlv_node("tcp_opt_sack", TlvNode {
        overlay_table: Some(TlvTable::new(vec![
            (0x0a, sack1),
            (0x12, sack2),
            (0x1a, sack3),
            (0x22, sack4),
        ])),
        ..TlvNode::default()
    });
    let mss = b.add_tlv_node("tcp_opt_mss", TlvNode {
        ops: TlvOps { extract_metadata: Some(extract_tcp_mss), handler: None },
        ..TlvNode::default()
    });
    let timestamp = b.add_tlv_node("tcp_opt_timestamp", TlvNode {
        ops: TlvOps { extract_metadata: Some(extract_tcp_timestamp), handler: None },
        ..TlvNode::default()
    });

    /* GRE flag-field nodes */
    let gre_key_node = b.add_flag_field_node("gre_flag_key", FlagFieldNode {
        ops: FlagFieldOps { extract_metadata: Some(extract_gre_key), handler: None },
        ..FlagFieldNode::default()
    });
    let gre_seq_node = b.add_flag_field_node("gre_flag_seq", FlagFieldNode {
        ops: FlagFieldOps { extract_metadata: Some(extract_gre_seq), handler: None },
        ..FlagFieldNode::default()
    });

    /* SRv6 segment element */
    let seg = b.add_arrel_node("srv6_segment", ArrElNode {
        ops: ArrElOps { extract_metadata: Some(extract_srv6_segment), handler: None },
        ..ArrElNode::default()
    });

    let ether_table = ProtoTable::new(vec![(ETH_P_IP, ipv4), (ETH_P_IPV6, ipv6)]);
    let ip4_table = ProtoTable::new(vec![
        (IPPROTO_TCP, tcp),
        (IPPROTO_UDP, udp),
        (IPPROTO_GRE, gre_base),
    ]);
    let ip6_table = ProtoTable::new(vec![
        (IPPROTO_TCP, tcp),
        (IPPROTO_UDP, udp),
        (IPPROTO_GRE, gre_base),
        (IPPROTO_HOPOPTS, hbh),
        (IPPROTO_ROUTING, srv6),
    ]);

    b.define_node(ether, ParseNode {
        proto: &ETHER,
        proto_table: Some(ether_table),
        ops: NodeOps { extract_metadata: Some(extract_ether), ..NodeOps::default() },
        ..ParseNode::default()
    })
    .unwrap();

    b.define_node(ipv4, ParseNode {
        proto: &IPV4,
        proto_table: Some(ip4_table),
        ops: NodeOps { extract_metadata: Some(extract_ipv4), ..NodeOps::default() },
        ..ParseNode::default()
    })
    .unwrap();

    b.define_node(ipv6, ParseNode {
        proto: &IPV6,
        proto_table: Some(ip6_table.clone()),
        ops: NodeOps { extract_metadata: Some(extract_ipv6), ..NodeOps::default() },
        ..ParseNode::default()
    })
    .unwrap();

    b.define_node(tcp, ParseNode {
        proto: &TCP,
        ops: NodeOps { extract_metadata: Some(extract_tcp), ..NodeOps::default() },
        kind: NodeKind::Tlvs(TlvsNode {
            table: TlvTable::new(vec![
                (TCPOPT_MSS, mss),
                (TCPOPT_SACK, sack),
                (TCPOPT_TIMESTAMP, timestamp),
            ]),
            max_tlvs: 16,
            ..TlvsNode::new(&TCP_TLVS)
        }),
        ..ParseNode::default()
    })
    .unwrap();

    b.define_node(udp, ParseNode {
        proto: &UDP,
        ops: NodeOps { extract_metadata: Some(extract_ports), ..NodeOps::default() },
        ..ParseNode::default()
    })
    .unwrap();

    b.define_node(gre_base, ParseNode {
        proto: &GRE_BASE,
        proto_table: Some(ProtoTable::new(vec![(0, gre_v0)])),
        ..ParseNode::default()
    })
    .unwrap();

    b.define_node(gre_v0, ParseNode {
        proto: &GRE_V0,
        proto_table: Some(ProtoTable::new(vec![(ETH_P_IP, ipv4), (ETH_P_IPV6, ipv6)])),
        ops: NodeOps { extract_metadata: Some(extract_gre_v0), ..NodeOps::default() },
        kind: NodeKind::FlagFields(FlagFieldsNode {
            table: FlagFieldsTable::new(vec![
                (GRE_KEY_IDX, gre_key_node),
                (GRE_SEQ_IDX, gre_seq_node),
            ]),
            ..FlagFieldsNode::new(&GRE_V0_FF)
        }),
        ..ParseNode::default()
    })
    .unwrap();

    b.define_node(hbh, ParseNode {
        proto: &IPV6_EH,
        proto_table: Some(ip6_table.clone()),
        ops: NodeOps { extract_metadata: Some(extract_eh), ..NodeOps::default() },
        unknown_ret: ParseCode::StopOkay,
        ..ParseNode::default()
    })
    .unwrap();

    b.define_node(srv6, ParseNode {
        proto: &IPV6_EH,
        proto_table: Some(ip6_table),
        ops: NodeOps { extract_metadata: Some(extract_eh), ..NodeOps::default() },
        unknown_ret: ParseCode::StopOkay,
        kind: NodeKind::Array(ArrayNode {
            wildcard: Some(seg),
            ..ArrayNode::new(&SRV6_SEG_LIST)
        }),
        ..ParseNode::default()
    })
    .unwrap();

    b.root(ether);
    let parser = b.build().unwrap();

    TestGraph {
        parser,
        ether,
        ipv4,
        ipv6,
        tcp,
        udp,
        gre_base,
        gre_v0,
        hbh,
        srv6,
    }
}

/* Packet builders */

pub fn eth_hdr(ethertype: u16) -> Vec<u8> {
    let mut hdr = vec![0u8; 14];
    hdr[..6].copy_from_slice(&[0x02, 0, 0, 0, 0, 1]);
    hdr[6..12].copy_from_slice(&[0x02, 0, 0, 0, 0, 2]);
    hdr[12..14].copy_from_slice(&ethertype.to_be_bytes());
    hdr
}

pub fn ipv4_hdr(proto: u8, saddr: [u8; 4], daddr: [u8; 4], payload_len: usize) -> Vec<u8> {
    let mut hdr = vec![0u8; 20];
    hdr[0] = 0x45;
    hdr[2..4].copy_from_slice(&((20 + payload_len) as u16).to_be_bytes());
    hdr[8] = 64;
    hdr[9] = proto;
    hdr[12..16].copy_from_slice(&saddr);
    hdr[16..20].copy_from_slice(&daddr);
    hdr
}

pub fn ipv6_hdr(nexthdr: u8, saddr: [u8; 16], daddr: [u8; 16], payload_len: usize) -> Vec<u8> {
    let mut hdr = vec![0u8; 40];
    hdr[0] = 0x60;
    hdr[4..6].copy_from_slice(&(payload_len as u16).to_be_bytes());
    hdr[6] = nexthdr;
    hdr[7] = 64;
    hdr[8..24].copy_from_slice(&saddr);
    hdr[24..40].copy_from_slice(&daddr);
    hdr
}

pub fn udp_hdr(sport: u16, dport: u16, payload_len: usize) -> Vec<u8> {
    let mut hdr = vec![0u8; 8];
    hdr[..2].copy_from_slice(&sport.to_be_bytes());
    hdr[2..4].copy_from_slice(&dport.to_be_bytes());
    hdr[4..6].copy_from_slice(&((8 + payload_len) as u16).to_be_bytes());
    hdr
}

/// TCP header with options padded to a four-byte boundary with NOPs.
pub fn tcp_hdr(sport: u16, dport: u16, options: &[u8]) -> Vec<u8> {
    let opt_len = (options.len() + 3) & !3;
    let doff = (20 + opt_len) / 4;
    let mut hdr = vec![0u8; 20 + opt_len];
    hdr[..2].copy_from_slice(&sport.to_be_bytes());
    hdr[2..4].copy_from_slice(&dport.to_be_bytes());
    hdr[12] = (doff as u8) << 4;
    hdr[13] = 0x10;
    hdr[20..20 + options.len()].copy_from_slice(options);
    for pad in hdr.iter_mut().skip(20 + options.len()) {
        *pad = 1;
    }
    hdr
}

/// GRE v0 header: flags word, protocol, then any present optional fields.
pub fn gre_v0_hdr(flags: u16, proto: u16, fields: &[u8]) -> Vec<u8> {
    let mut hdr = vec![0u8; 4 + fields.len()];
    hdr[..2].copy_from_slice(&flags.to_be_bytes());
    hdr[2..4].copy_from_slice(&proto.to_be_bytes());
    hdr[4..].copy_from_slice(fields);
    hdr
}

/// SRv6 routing header (type 4) carrying `segments` 16-byte entries.
pub fn srv6_hdr(nexthdr: u8, segments: &[[u8; 16]]) -> Vec<u8> {
    let hdrlen = segments.len() * 2;
    let mut hdr = vec![0u8; 8 + segments.len() * 16];
    hdr[0] = nexthdr;
    hdr[1] = hdrlen as u8;
    hdr[2] = 4;
    hdr[3] = segments.len() as u8;
    hdr[4] = segments.len().saturating_sub(1) as u8;
    for (i, seg) in segments.iter().enumerate() {
        hdr[8 + i * 16..8 + (i + 1) * 16].copy_from_slice(seg);
    }
    hdr
}

pub fn cat(parts: &[&[u8]]) -> Vec<u8> {
    let mut packet = Vec::new();
    for part in parts {
        packet.extend_from_slice(part);
    }
    packet
}
