//! Parser configuration and graph construction
//!
//! A [`Parser`] is the immutable product of a [`ParserBuilder`]: the node
//! arenas, the root node, the resource limits and the metadata layout.
//! Once built it is shared freely across threads; an invocation borrows
//! the packet, metadata and control buffers and retains nothing.
//!
//! The builder supports forward references: declare a node to get its
//! [`NodeId`], wire tables that mention it, and define it later. `build`
//! verifies every declaration was defined and every reference is in
//! range.

use crate::array::{ArrElNode, ArrElNodeId};
use crate::codes::ParseCode;
use crate::ctrl::CtrlData;
use crate::flag_fields::{FlagFieldNode, FlagNodeId};
use crate::node::{NodeId, NodeKind, ParseNode};
use crate::tlv::{TlvNode, TlvNodeId};
use crate::walker;
use thiserror::Error;

/// Default resource limits and metadata layout.
pub const DEFAULT_MAX_NODES: u16 = 255;
pub const DEFAULT_MAX_ENCAPS: u16 = 4;
pub const DEFAULT_MAX_FRAMES: u16 = 4;
pub const DEFAULT_METAMETA_SIZE: usize = 64;
pub const DEFAULT_FRAME_SIZE: usize = 256;

/// Parse flag: emit a trace event per node visited.
pub const F_DEBUG: u32 = 1 << 0;

/// Entry point of a generated or hand-written optimized parser. Must
/// produce results bit-identical to the generic walker.
pub type OptEntryFn =
    fn(&Parser, &[u8], &mut [u8], &mut CtrlData<'_>, u32) -> ParseCode;

/// Which walker an invocation dispatches to.
#[derive(Debug, Clone, Copy)]
pub enum ParserVariant {
    /// The generic loop walker.
    Generic,
    /// A specialized entry point with identical semantics.
    Optimized(OptEntryFn),
}

/// Immutable parser configuration.
#[derive(Debug, Clone, Copy)]
pub struct ParserConfig {
    pub max_nodes: u16,
    pub max_encaps: u16,
    pub max_frames: u16,
    pub metameta_size: usize,
    pub frame_size: usize,
    pub num_counters: u8,
    pub num_keys: u8,
    /// Hook node run once when the walk ends successfully.
    pub okay_node: Option<NodeId>,
    /// Hook node run once when the walk ends with a failure code.
    pub fail_node: Option<NodeId>,
    /// Hook node run at each encapsulation boundary; never followed.
    pub atencap_node: Option<NodeId>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_nodes: DEFAULT_MAX_NODES,
            max_encaps: DEFAULT_MAX_ENCAPS,
            max_frames: DEFAULT_MAX_FRAMES,
            metameta_size: DEFAULT_METAMETA_SIZE,
            frame_size: DEFAULT_FRAME_SIZE,
            num_counters: 0,
            num_keys: 0,
            okay_node: None,
            fail_node: None,
            atencap_node: None,
        }
    }
}

/// Graph construction failure, reported by [`ParserBuilder::build`].
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("node {0:?} declared but never defined")]
    UndefinedNode(String),
    #[error("node {0:?} defined twice")]
    RedefinedNode(String),
    #[error("TLV node {0:?} declared but never defined")]
    UndefinedTlvNode(String),
    #[error("TLV node {0:?} defined twice")]
    RedefinedTlvNode(String),
    #[error("reference to node index {0} out of range")]
    BadNodeRef(usize),
    #[error("reference to TLV node index {0} out of range")]
    BadTlvNodeRef(usize),
    #[error("reference to flag-field node index {0} out of range")]
    BadFlagNodeRef(usize),
    #[error("reference to array-element node index {0} out of range")]
    BadArrElNodeRef(usize),
    #[error("root node not set")]
    NoRoot,
    #[error("max_frames must be at least 1")]
    NoFrames,
    #[error("frame_size is zero with {0} frames configured")]
    ZeroFrameSize(u16),
}

/// An immutable parse graph plus configuration.
#[derive(Debug)]
pub struct Parser {
    name: String,
    pub(crate) nodes: Vec<ParseNode>,
    pub(crate) tlv_nodes: Vec<TlvNode>,
    pub(crate) flag_nodes: Vec<FlagFieldNode>,
    pub(crate) arrel_nodes: Vec<ArrElNode>,
    root: NodeId,
    config: ParserConfig,
    variant: ParserVariant,
}

impl Parser {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &ParseNode {
        &self.nodes[id.index()]
    }

    pub fn node_name(&self, id: NodeId) -> &str {
        &self.nodes[id.index()].name
    }

    pub(crate) fn tlv_node(&self, id: TlvNodeId) -> &TlvNode {
        &self.tlv_nodes[id.index()]
    }

    pub(crate) fn flag_node(&self, id: FlagNodeId) -> &FlagFieldNode {
        &self.flag_nodes[id.index()]
    }

    pub(crate) fn arrel_node(&self, id: ArrElNodeId) -> &ArrElNode {
        &self.arrel_nodes[id.index()]
    }

    /// Walk the packet from the root node.
    ///
    /// `metadata` must hold at least `metameta_size + max_frames *
    /// frame_size` pre-zeroed bytes. Set [`F_DEBUG`] in `flags` for a
    /// trace event per node.
    pub fn parse(
        &self,
        packet: &[u8],
        metadata: &mut [u8],
        ctrl: &mut CtrlData<'_>,
        flags: u32,
    ) -> ParseCode {
        match self.variant {
            ParserVariant::Generic => walker::parse(self, packet, metadata, ctrl, flags),
            ParserVariant::Optimized(entry) => entry(self, packet, metadata, ctrl, flags),
        }
    }
}

/// Ordered `(key, parser)` sequence for dispatching one of several parsers
/// by an out-of-band key (e.g. a port number).
pub struct ParserTable<'a> {
    entries: Vec<(u32, &'a Parser)>,
}

impl<'a> ParserTable<'a> {
    pub fn new(entries: Vec<(u32, &'a Parser)>) -> Self {
        ParserTable { entries }
    }

    pub fn lookup(&self, key: u32) -> Option<&'a Parser> {
        self.entries
            .iter()
            .find(|(value, _)| *value == key)
            .map(|&(_, parser)| parser)
    }
}

/// Builder for a [`Parser`].
pub struct ParserBuilder {
    name: String,
    nodes: Vec<Option<ParseNode>>,
    node_names: Vec<String>,
    tlv_nodes: Vec<Option<TlvNode>>,
    tlv_node_names: Vec<String>,
    flag_nodes: Vec<FlagFieldNode>,
    arrel_nodes: Vec<ArrElNode>,
    root: Option<NodeId>,
    config: ParserConfig,
    variant: ParserVariant,
}

impl ParserBuilder {
    pub fn new(name: &str) -> Self {
        ParserBuilder {
            name: name.to_string(),
            nodes: Vec::new(),
            node_names: Vec::new(),
            tlv_nodes: Vec::new(),
            tlv_node_names: Vec::new(),
            flag_nodes: Vec::new(),
            arrel_nodes: Vec::new(),
            root: None,
            config: ParserConfig::default(),
            variant: ParserVariant::Generic,
        }
    }

    pub fn config(&mut self, config: ParserConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Use an optimized entry point instead of the generic walker.
    pub fn optimized(&mut self, entry: OptEntryFn) -> &mut Self {
        self.variant = ParserVariant::Optimized(entry);
        self
    }

    /// Reserve a node slot, to be defined later. Allows forward references
    /// and cycles in declaration order.
    pub fn declare_node(&mut self, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(None);
        self.node_names.push(name.to_string());
        id
    }

    /// Fill in a declared node. The declaration's name is applied when the
    /// definition leaves `name` empty.
    pub fn define_node(&mut self, id: NodeId, mut node: ParseNode) -> Result<(), BuildError> {
        let slot = self
            .nodes
            .get_mut(id.index())
            .ok_or(BuildError::BadNodeRef(id.index()))?;
        if slot.is_some() {
            return Err(BuildError::RedefinedNode(self.node_names[id.index()].clone()));
        }
        if node.name.is_empty() {
            node.name = self.node_names[id.index()].clone();
        }
        *slot = Some(node);
        Ok(())
    }

    /// Declare and define in one step, for nodes with no forward
    /// references to them.
    pub fn add_node(&mut self, name: &str, node: ParseNode) -> NodeId {
        let id = self.declare_node(name);
        self.define_node(id, node).expect("fresh slot");
        id
    }

    pub fn declare_tlv_node(&mut self, name: &str) -> TlvNodeId {
        let id = TlvNodeId(self.tlv_nodes.len() as u32);
        self.tlv_nodes.push(None);
        self.tlv_node_names.push(name.to_string());
        id
    }

    pub fn define_tlv_node(&mut self, id: TlvNodeId, mut node: TlvNode) -> Result<(), BuildError> {
        let slot = self
            .tlv_nodes
            .get_mut(id.index())
            .ok_or(BuildError::BadTlvNodeRef(id.index()))?;
        if slot.is_some() {
            return Err(BuildError::RedefinedTlvNode(
                self.tlv_node_names[id.index()].clone(),
            ));
        }
        if node.name.is_empty() {
            node.name = self.tlv_node_names[id.index()].clone();
        }
        *slot = Some(node);
        Ok(())
    }

    pub fn add_tlv_node(&mut self, name: &str, node: TlvNode) -> TlvNodeId {
        let id = self.declare_tlv_node(name);
        self.define_tlv_node(id, node).expect("fresh slot");
        id
    }

    pub fn add_flag_field_node(&mut self, name: &str, mut node: FlagFieldNode) -> FlagNodeId {
        if node.name.is_empty() {
            node.name = name.to_string();
        }
        let id = FlagNodeId(self.flag_nodes.len() as u32);
        self.flag_nodes.push(node);
        id
    }

    pub fn add_arrel_node(&mut self, name: &str, mut node: ArrElNode) -> ArrElNodeId {
        if node.name.is_empty() {
            node.name = name.to_string();
        }
        let id = ArrElNodeId(self.arrel_nodes.len() as u32);
        self.arrel_nodes.push(node);
        id
    }

    pub fn root(&mut self, id: NodeId) -> &mut Self {
        self.root = Some(id);
        self
    }

    /// Validate the graph and freeze it into a [`Parser`].
    pub fn build(self) -> Result<Parser, BuildError> {
        let root = self.root.ok_or(BuildError::NoRoot)?;
        if self.config.max_frames == 0 {
            return Err(BuildError::NoFrames);
        }
        if self.config.frame_size == 0 && self.config.max_frames > 0 {
            return Err(BuildError::ZeroFrameSize(self.config.max_frames));
        }

        let mut nodes = Vec::with_capacity(self.nodes.len());
        for (i, slot) in self.nodes.into_iter().enumerate() {
            match slot {
                Some(node) => nodes.push(node),
                None => return Err(BuildError::UndefinedNode(self.node_names[i].clone())),
            }
        }
        let mut tlv_nodes = Vec::with_capacity(self.tlv_nodes.len());
        for (i, slot) in self.tlv_nodes.into_iter().enumerate() {
            match slot {
                Some(node) => tlv_nodes.push(node),
                None => {
                    return Err(BuildError::UndefinedTlvNode(
                        self.tlv_node_names[i].clone(),
                    ))
                }
            }
        }

        let parser = Parser {
            name: self.name,
            nodes,
            tlv_nodes,
            flag_nodes: self.flag_nodes,
            arrel_nodes: self.arrel_nodes,
            root,
            config: self.config,
            variant: self.variant,
        };
        parser.check_references()?;
        Ok(parser)
    }
}

impl Parser {
    fn check_node_ref(&self, id: NodeId) -> Result<(), BuildError> {
        if id.index() >= self.nodes.len() {
            return Err(BuildError::BadNodeRef(id.index()));
        }
        Ok(())
    }

    fn check_tlv_ref(&self, id: TlvNodeId) -> Result<(), BuildError> {
        if id.index() >= self.tlv_nodes.len() {
            return Err(BuildError::BadTlvNodeRef(id.index()));
        }
        Ok(())
    }

    fn check_references(&self) -> Result<(), BuildError> {
        self.check_node_ref(self.root)?;
        for hook in [
            self.config.okay_node,
            self.config.fail_node,
            self.config.atencap_node,
        ]
        .into_iter()
        .flatten()
        {
            self.check_node_ref(hook)?;
        }
        for node in &self.nodes {
            if let Some(table) = &node.proto_table {
                for &(_, target) in table.entries() {
                    self.check_node_ref(target)?;
                }
            }
            if let Some(wild) = node.wildcard {
                self.check_node_ref(wild)?;
            }
            match &node.kind {
                NodeKind::Plain => {}
                NodeKind::Tlvs(t) => {
                    for &(_, target) in t.table.entries() {
                        self.check_tlv_ref(target)?;
                    }
                    if let Some(wild) = t.wildcard {
                        self.check_tlv_ref(wild)?;
                    }
                }
                NodeKind::FlagFields(ff) => {
                    for &(_, target) in ff.table.entries() {
                        if target.index() >= self.flag_nodes.len() {
                            return Err(BuildError::BadFlagNodeRef(target.index()));
                        }
                    }
                }
                NodeKind::Array(a) => {
                    for &(_, target) in a.table.entries() {
                        if target.index() >= self.arrel_nodes.len() {
                            return Err(BuildError::BadArrElNodeRef(target.index()));
                        }
                    }
                    if let Some(wild) = a.wildcard {
                        if wild.index() >= self.arrel_nodes.len() {
                            return Err(BuildError::BadArrElNodeRef(wild.index()));
                        }
                    }
                }
            }
        }
        for tlv in &self.tlv_nodes {
            if let Some(table) = &tlv.overlay_table {
                for &(_, target) in table.entries() {
                    self.check_tlv_ref(target)?;
                }
            }
            if let Some(wild) = tlv.overlay_wildcard {
                self.check_tlv_ref(wild)?;
            }
            if let Some(nested) = tlv.nested_node {
                self.check_node_ref(nested)?;
            }
        }
        Ok(())
    }
}
