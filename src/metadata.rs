//! Metadata frames
//!
//! The caller hands the engine one contiguous, pre-zeroed byte buffer laid
//! out as a metameta header followed by `max_frames` fixed-size frames:
//!
//! ```text
//! [ metameta ][ frame 0 ][ frame 1 ] ... [ frame max_frames-1 ]
//! ```
//!
//! Any node may write the metameta region; frame `i` receives extraction
//! output only while the encapsulation level is `i`. Crossing an
//! encapsulation boundary advances the current frame until the last frame,
//! which then absorbs all deeper layers.
//!
//! Extract callbacks receive the buffer through [`MetadataFrames`]; typed
//! access overlays `#[repr(C, packed)]` zerocopy structs on the raw bytes.

use crate::codes::ParseCode;
use crate::parser::ParserConfig;
use std::mem::size_of;
use zerocopy::{AsBytes, FromBytes, Ref};

/// View over the caller's metadata buffer, tracking the current frame.
#[derive(Debug)]
pub struct MetadataFrames<'a> {
    buf: &'a mut [u8],
    metameta_size: usize,
    frame_size: usize,
    max_frames: usize,
    frame_num: usize,
}

impl<'a> MetadataFrames<'a> {
    pub(crate) fn new(buf: &'a mut [u8], config: &ParserConfig) -> Result<Self, ParseCode> {
        let needed = config.metameta_size + config.max_frames as usize * config.frame_size;
        if buf.len() < needed || config.max_frames == 0 {
            return Err(ParseCode::StopBadExtract);
        }
        Ok(MetadataFrames {
            buf,
            metameta_size: config.metameta_size,
            frame_size: config.frame_size,
            max_frames: config.max_frames as usize,
            frame_num: 0,
        })
    }

    /// The metameta region, writable from any encapsulation level.
    pub fn metameta(&mut self) -> &mut [u8] {
        &mut self.buf[..self.metameta_size]
    }

    /// The frame for the current encapsulation level.
    pub fn frame(&mut self) -> &mut [u8] {
        let start = self.metameta_size + self.frame_num * self.frame_size;
        &mut self.buf[start..start + self.frame_size]
    }

    /// Index of the current frame.
    pub fn frame_num(&self) -> usize {
        self.frame_num
    }

    /// Overlay a packed struct on the current frame.
    pub fn frame_as<T: FromBytes + AsBytes>(&mut self) -> Option<&mut T> {
        let frame = self.frame();
        let bytes = frame.get_mut(..size_of::<T>())?;
        Some(Ref::<_, T>::new(bytes)?.into_mut())
    }

    /// Overlay a packed struct on the metameta region.
    pub fn metameta_as<T: FromBytes + AsBytes>(&mut self) -> Option<&mut T> {
        let mm = self.metameta();
        let bytes = mm.get_mut(..size_of::<T>())?;
        Some(Ref::<_, T>::new(bytes)?.into_mut())
    }

    /// Advance the frame on an encapsulation boundary. `encaps` is the new
    /// encapsulation count; the frame moves only while it trails the count
    /// and a further frame exists.
    pub(crate) fn advance(&mut self, encaps: usize) {
        if encaps > self.frame_num && self.frame_num + 1 < self.max_frames {
            self.frame_num += 1;
        }
    }
}
