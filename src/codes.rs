//! Parser return codes
//!
//! Every operation in the engine reports its outcome as a `ParseCode`.
//! `Okay` means continue; any code at or below `StopOkay` terminates the
//! walk. Handlers may return any code to steer or abort parsing.

use num_enum::TryFromPrimitive;
use std::fmt;

/// Unified stop/continue codes surfaced to callers and to handlers.
///
/// The numeric values are part of the engine's ABI: codes are compared by
/// magnitude (`code <= StopOkay` terminates the walk) and stored in
/// [`crate::ctrl::VarData::ret_code`].
#[repr(i8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum ParseCode {
    /// Okay and continue parsing.
    Okay = 0,

    /// Okay and stop parsing.
    StopOkay = -4,
    /// Stop parsing the current node, continue the walk.
    StopNodeOkay = -5,
    /// Stop parsing the current sub-node, continue the enclosing node.
    StopSubNodeOkay = -6,

    /// Generic parser failure.
    StopFail = -12,
    StopLength = -13,
    StopUnknownProto = -14,
    StopEncapDepth = -15,
    StopUnknownTlv = -16,
    StopTlvLength = -17,
    StopBadFlag = -18,
    StopFailCmp = -19,
    StopLoopCnt = -20,
    StopTlvPadding = -21,
    StopOptionLimit = -22,
    StopMaxNodes = -23,
    StopCompare = -24,
    StopBadExtract = -25,
    StopBadCntr = -26,
    StopCntr1 = -27,
    StopCntr2 = -28,
    StopCntr3 = -29,
    StopCntr4 = -30,
    StopCntr5 = -31,
    StopCntr6 = -32,
    StopCntr7 = -33,
}

impl ParseCode {
    /// True for the two success codes, `Okay` and `StopOkay`.
    pub fn is_okay(self) -> bool {
        matches!(self, ParseCode::Okay | ParseCode::StopOkay)
    }

    /// True for any code that terminates the walk (`code <= StopOkay`).
    pub fn is_stop(self) -> bool {
        (self as i8) <= (ParseCode::StopOkay as i8)
    }

    /// Diagnostic text for a code.
    pub fn text(self) -> &'static str {
        match self {
            ParseCode::Okay => "okay",
            ParseCode::StopOkay => "stop okay",
            ParseCode::StopNodeOkay => "stop node okay",
            ParseCode::StopSubNodeOkay => "stop sub-node okay",
            ParseCode::StopFail => "stop fail",
            ParseCode::StopLength => "stop length",
            ParseCode::StopUnknownProto => "stop unknown protocol",
            ParseCode::StopEncapDepth => "stop encapsulation depth",
            ParseCode::StopUnknownTlv => "stop unknown TLV",
            ParseCode::StopTlvLength => "stop TLV length",
            ParseCode::StopBadFlag => "stop bad flag",
            ParseCode::StopFailCmp => "stop fail compare",
            ParseCode::StopLoopCnt => "stop loop count",
            ParseCode::StopTlvPadding => "stop TLV padding",
            ParseCode::StopOptionLimit => "stop option limit",
            ParseCode::StopMaxNodes => "stop max nodes",
            ParseCode::StopCompare => "stop compare",
            ParseCode::StopBadExtract => "stop bad extract",
            ParseCode::StopBadCntr => "stop bad counter",
            ParseCode::StopCntr1 => "stop counter 1",
            ParseCode::StopCntr2 => "stop counter 2",
            ParseCode::StopCntr3 => "stop counter 3",
            ParseCode::StopCntr4 => "stop counter 4",
            ParseCode::StopCntr5 => "stop counter 5",
            ParseCode::StopCntr6 => "stop counter 6",
            ParseCode::StopCntr7 => "stop counter 7",
        }
    }
}

impl Default for ParseCode {
    fn default() -> Self {
        ParseCode::Okay
    }
}

impl fmt::Display for ParseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
