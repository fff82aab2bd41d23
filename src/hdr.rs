//! Bounds-checked header access
//!
//! All byte reads in the engine go through these helpers. A read that would
//! cross the end of the packet yields `StopLength`; nothing in the engine
//! indexes packet bytes directly.
//!
//! Word readers take explicit endianness; there is no conditional
//! compilation on the target byte order.

use crate::codes::ParseCode;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use zerocopy::{FromBytes, Ref};

/// Return the bytes at `off` if at least `min_bytes` are available.
pub fn view_at(data: &[u8], off: usize, min_bytes: usize) -> Result<&[u8], ParseCode> {
    match data.get(off..) {
        Some(rest) if rest.len() >= min_bytes => Ok(rest),
        _ => Err(ParseCode::StopLength),
    }
}

/// Overlay a `#[repr(C)]` header struct on the front of a byte slice.
///
/// Header types are expected to be packed (alignment 1); an unaligned or
/// short view yields `StopLength`.
pub fn header_ref<T: FromBytes>(hdr: &[u8]) -> Result<&T, ParseCode> {
    let bytes = hdr
        .get(..std::mem::size_of::<T>())
        .ok_or(ParseCode::StopLength)?;
    let layout = Ref::<_, T>::new(bytes).ok_or(ParseCode::StopLength)?;
    Ok(layout.into_ref())
}

pub fn read_u8(data: &[u8], off: usize) -> Result<u8, ParseCode> {
    data.get(off).copied().ok_or(ParseCode::StopLength)
}

pub fn read_be16(data: &[u8], off: usize) -> Result<u16, ParseCode> {
    Ok(BigEndian::read_u16(view_at(data, off, 2)?))
}

pub fn read_be32(data: &[u8], off: usize) -> Result<u32, ParseCode> {
    Ok(BigEndian::read_u32(view_at(data, off, 4)?))
}

pub fn read_be64(data: &[u8], off: usize) -> Result<u64, ParseCode> {
    Ok(BigEndian::read_u64(view_at(data, off, 8)?))
}

pub fn read_le16(data: &[u8], off: usize) -> Result<u16, ParseCode> {
    Ok(LittleEndian::read_u16(view_at(data, off, 2)?))
}

pub fn read_le32(data: &[u8], off: usize) -> Result<u32, ParseCode> {
    Ok(LittleEndian::read_u32(view_at(data, off, 4)?))
}

/// Fold `data` into a 16-bit ones' complement sum.
///
/// Used by the walker to maintain the per-header and to-header-start
/// checksum accumulators in the control data.
pub fn csum16_fold(sum: u16, data: &[u8]) -> u16 {
    let mut acc = u32::from(sum);
    let mut chunks = data.chunks_exact(2);
    for c in &mut chunks {
        acc += u32::from(u16::from_be_bytes([c[0], c[1]]));
    }
    if let [last] = chunks.remainder() {
        acc += u32::from(*last) << 8;
    }
    while acc > 0xffff {
        acc = (acc & 0xffff) + (acc >> 16);
    }
    acc as u16
}
