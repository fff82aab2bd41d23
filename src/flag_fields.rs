//! Flag-field sub-parser data model
//!
//! Flag fields encode optional data as a set of flag bits plus fixed-size
//! data fields, present when their flag is set and laid out in flag order
//! (GRE and GUE use this construct). A descriptor table defines the flags;
//! a flag matches when `(flags & mask) == flag`, with `mask` defaulting to
//! the flag itself for single-bit flags.

use crate::codes::ParseCode;
use crate::node::{ExtractMetadataFn, HandlerFn};

/// Stable index of a flag-field parse node in a parser's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlagNodeId(pub(crate) u32);

impl FlagNodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Descriptor for one flag and its data field.
#[derive(Debug, Clone, Copy)]
pub struct FlagField {
    pub flag: u32,
    /// Mask for multi-bit flags; zero means the flag is its own mask.
    pub mask: u32,
    /// Size of the data field gated by the flag.
    pub size: usize,
}

impl FlagField {
    pub fn effective_mask(&self) -> u32 {
        if self.mask != 0 {
            self.mask
        } else {
            self.flag
        }
    }

    pub fn matches(&self, flags: u32) -> bool {
        (flags & self.effective_mask()) == self.flag
    }
}

/// Offset of field `targ_idx` within the flag-field data area, given the
/// flags word: the cumulative size of all preceding present fields.
pub fn fields_offset(fields: &[FlagField], targ_idx: usize, flags: u32) -> usize {
    fields[..targ_idx]
        .iter()
        .filter(|f| f.matches(flags))
        .map(|f| f.size)
        .sum()
}

/// Total length of all fields present under the flags word. Equivalent to
/// the offset of a theoretical field following the last descriptor.
pub fn fields_length(fields: &[FlagField], flags: u32) -> usize {
    fields_offset(fields, fields.len(), flags)
}

/// True when `flags` carries bits outside every descriptor's mask.
pub fn invalid_flags(fields: &[FlagField], flags: u32) -> bool {
    let union: u32 = fields.iter().fold(0, |acc, f| acc | f.effective_mask());
    flags & !union != 0
}

/// Flag-fields descriptor attached to a flag-fields parse node.
#[derive(Debug)]
pub struct FlagFieldsDef {
    pub fields: &'static [FlagField],
    /// Extract the flags word from the enclosing header.
    pub get_flags: fn(hdr: &[u8]) -> u32,
    /// Offset of the first data field within the enclosing header.
    pub start_offset: fn(hdr: &[u8]) -> usize,
}

/// Operation bundle for a single flag-field node.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagFieldOps {
    pub extract_metadata: Option<ExtractMetadataFn>,
    pub handler: Option<HandlerFn>,
}

/// Parse node for one flag field.
#[derive(Debug, Default)]
pub struct FlagFieldNode {
    pub name: String,
    pub ops: FlagFieldOps,
}

/// `(descriptor index, node)` table; indices refer to entries of the
/// definition's descriptor slice.
#[derive(Debug, Clone, Default)]
pub struct FlagFieldsTable {
    entries: Vec<(usize, FlagNodeId)>,
}

impl FlagFieldsTable {
    pub fn new(entries: Vec<(usize, FlagNodeId)>) -> Self {
        FlagFieldsTable { entries }
    }

    pub fn lookup(&self, index: usize) -> Option<FlagNodeId> {
        self.entries
            .iter()
            .find(|(value, _)| *value == index)
            .map(|&(_, node)| node)
    }

    pub fn entries(&self) -> &[(usize, FlagNodeId)] {
        &self.entries
    }
}

/// Payload of a flag-fields parse node.
#[derive(Debug)]
pub struct FlagFieldsNode {
    pub def: &'static FlagFieldsDef,
    pub table: FlagFieldsTable,
}

impl FlagFieldsNode {
    pub fn new(def: &'static FlagFieldsDef) -> Self {
        FlagFieldsNode {
            def,
            table: FlagFieldsTable::default(),
        }
    }
}

/// Return the present data field for descriptor `targ_idx`, or `None`
/// when its flag is not set. `fields_data` starts at the first data field.
pub fn field_data<'a>(
    fields_data: &'a [u8],
    fields: &[FlagField],
    targ_idx: usize,
    flags: u32,
) -> Option<&'a [u8]> {
    let field = &fields[targ_idx];
    if !field.matches(flags) {
        return None;
    }
    let off = fields_offset(fields, targ_idx, flags);
    fields_data.get(off..off + field.size)
}

/// Stop-code alias used by callers validating a flags word up front.
pub fn check_flags(fields: &[FlagField], flags: u32) -> Result<(), ParseCode> {
    if invalid_flags(fields, flags) {
        Err(ParseCode::StopBadFlag)
    } else {
        Ok(())
    }
}
