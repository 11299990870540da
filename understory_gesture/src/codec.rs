// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binary encoding of gesture configuration.
//!
//! ## Format
//!
//! All values are little-endian. Each record starts with a `u32` tag followed by fixed-width
//! fields:
//!
//! | Tag | Gesture   | Fields                                              |
//! |-----|-----------|-----------------------------------------------------|
//! | 1   | Tap       | `i32` fingers, `i32` count, `f64` distance          |
//! | 2   | LongPress | `i32` fingers, `i32` repeat (0/1), `i32` duration   |
//! | 3   | Pan       | `i32` fingers, `u32` direction bits, `f64` distance |
//! | 4   | Pinch     | `i32` fingers, `f64` distance                       |
//! | 5   | Rotation  | `i32` fingers, `f64` angle                          |
//! | 6   | Swipe     | `i32` fingers, `u32` direction bits, `f64` speed    |
//! | 7   | Group     | `i32` mode, `u32` child count, then each child      |
//!
//! Group modes are encoded as Sequence = 0, Parallel = 1, Exclusive = 2, Begin = 3, End = 4.
//! Only configuration is encoded; live recognizer state never is.
//!
//! ```
//! use understory_gesture::gesture::{Gesture, TapGesture};
//!
//! let gesture = Gesture::from(TapGesture::new(2, 1));
//! let mut buf = [0_u8; 64];
//! let written = gesture.serialize(&mut buf).unwrap();
//! assert_eq!(written, gesture.serialized_size());
//! let (decoded, read) = Gesture::deserialize(&buf[..written]).unwrap();
//! assert_eq!((decoded, read), (gesture, written));
//! ```

use alloc::vec::Vec;

use crate::gesture::{
    Gesture, GestureGroup, LongPressGesture, PanGesture, PinchGesture, RotationGesture,
    SwipeGesture, TapGesture,
};
use crate::recognizer::GroupMode;
use crate::types::{PanDirection, SwipeDirection};

/// Deepest group nesting accepted by [`Gesture::deserialize`].
pub const MAX_GROUP_DEPTH: usize = 32;

const TAG_TAP: u32 = 1;
const TAG_LONG_PRESS: u32 = 2;
const TAG_PAN: u32 = 3;
const TAG_PINCH: u32 = 4;
const TAG_ROTATION: u32 = 5;
const TAG_SWIPE: u32 = 6;
const TAG_GROUP: u32 = 7;

/// Errors from encoding or decoding gesture configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The output buffer cannot hold the record.
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes the record needs.
        needed: usize,
        /// Bytes the buffer has.
        available: usize,
    },
    /// The input ended in the middle of a record.
    #[error("truncated input: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes read so far plus the field being read.
        needed: usize,
        /// Bytes the input has.
        available: usize,
    },
    /// The record tag names no gesture.
    #[error("unknown gesture tag {0}")]
    UnknownTag(u32),
    /// The group mode is out of range.
    #[error("invalid group mode {0}")]
    InvalidGroupMode(i32),
    /// The direction has bits outside the known flags.
    #[error("invalid direction bits {0:#x}")]
    InvalidDirection(u32),
    /// A group has more children than the format can count.
    #[error("group has {0} children")]
    GroupTooLarge(usize),
    /// Groups are nested deeper than [`MAX_GROUP_DEPTH`].
    #[error("groups nested deeper than {MAX_GROUP_DEPTH}")]
    NestingTooDeep,
}

impl CodecError {
    /// Legacy status code: every failure maps to `-1`.
    pub fn code(&self) -> i32 {
        -1
    }
}

fn mode_to_i32(mode: GroupMode) -> i32 {
    match mode {
        GroupMode::Sequence => 0,
        GroupMode::Parallel => 1,
        GroupMode::Exclusive => 2,
        GroupMode::Begin => 3,
        GroupMode::End => 4,
    }
}

fn mode_from_i32(value: i32) -> Result<GroupMode, CodecError> {
    Ok(match value {
        0 => GroupMode::Sequence,
        1 => GroupMode::Parallel,
        2 => GroupMode::Exclusive,
        3 => GroupMode::Begin,
        4 => GroupMode::End,
        _ => return Err(CodecError::InvalidGroupMode(value)),
    })
}

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        let end = self.pos + bytes.len();
        let available = self.buf.len();
        let dst = self
            .buf
            .get_mut(self.pos..end)
            .ok_or(CodecError::BufferTooSmall {
                needed: end,
                available,
            })?;
        dst.copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    fn i32(&mut self, v: i32) -> Result<(), CodecError> {
        self.put(&v.to_le_bytes())
    }

    fn u32(&mut self, v: u32) -> Result<(), CodecError> {
        self.put(&v.to_le_bytes())
    }

    fn f64(&mut self, v: f64) -> Result<(), CodecError> {
        self.put(&v.to_le_bytes())
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let end = self.pos + N;
        let src = self.buf.get(self.pos..end).ok_or(CodecError::Truncated {
            needed: end,
            available: self.buf.len(),
        })?;
        let mut out = [0_u8; N];
        out.copy_from_slice(src);
        self.pos = end;
        Ok(out)
    }

    fn i32(&mut self) -> Result<i32, CodecError> {
        self.take().map(i32::from_le_bytes)
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        self.take().map(u32::from_le_bytes)
    }

    fn f64(&mut self) -> Result<f64, CodecError> {
        self.take().map(f64::from_le_bytes)
    }
}

impl Gesture {
    /// Bytes [`Gesture::serialize`] writes for this description.
    pub fn serialized_size(&self) -> usize {
        4 + match self {
            Self::Tap(_) | Self::Pan(_) | Self::Swipe(_) => 16,
            Self::LongPress(_) => 12,
            Self::Pinch(_) | Self::Rotation(_) => 12,
            Self::Group(g) => 8 + g.children.iter().map(Self::serialized_size).sum::<usize>(),
        }
    }

    /// Encode into the front of `buf`, returning the bytes written.
    ///
    /// Nothing is written when `buf` is too small.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize, CodecError> {
        let needed = self.serialized_size();
        if buf.len() < needed {
            return Err(CodecError::BufferTooSmall {
                needed,
                available: buf.len(),
            });
        }
        let mut w = Writer { buf, pos: 0 };
        self.write(&mut w)?;
        Ok(w.pos)
    }

    fn write(&self, w: &mut Writer<'_>) -> Result<(), CodecError> {
        match self {
            Self::Tap(g) => {
                w.u32(TAG_TAP)?;
                w.i32(g.fingers)?;
                w.i32(g.count)?;
                w.f64(g.distance)
            }
            Self::LongPress(g) => {
                w.u32(TAG_LONG_PRESS)?;
                w.i32(g.fingers)?;
                w.i32(i32::from(g.repeat))?;
                w.i32(g.duration)
            }
            Self::Pan(g) => {
                w.u32(TAG_PAN)?;
                w.i32(g.fingers)?;
                w.u32(g.direction.bits())?;
                w.f64(g.distance)
            }
            Self::Pinch(g) => {
                w.u32(TAG_PINCH)?;
                w.i32(g.fingers)?;
                w.f64(g.distance)
            }
            Self::Rotation(g) => {
                w.u32(TAG_ROTATION)?;
                w.i32(g.fingers)?;
                w.f64(g.angle)
            }
            Self::Swipe(g) => {
                w.u32(TAG_SWIPE)?;
                w.i32(g.fingers)?;
                w.u32(g.direction.bits())?;
                w.f64(g.speed)
            }
            Self::Group(g) => {
                let count = u32::try_from(g.children.len())
                    .map_err(|_| CodecError::GroupTooLarge(g.children.len()))?;
                w.u32(TAG_GROUP)?;
                w.i32(mode_to_i32(g.mode))?;
                w.u32(count)?;
                for child in &g.children {
                    child.write(w)?;
                }
                Ok(())
            }
        }
    }

    /// Decode one record from the front of `buf`, returning it and the bytes read.
    pub fn deserialize(buf: &[u8]) -> Result<(Self, usize), CodecError> {
        let mut r = Reader { buf, pos: 0 };
        let gesture = Self::read(&mut r, 0)?;
        Ok((gesture, r.pos))
    }

    fn read(r: &mut Reader<'_>, depth: usize) -> Result<Self, CodecError> {
        let tag = r.u32()?;
        let gesture = match tag {
            TAG_TAP => Self::Tap(TapGesture {
                fingers: r.i32()?,
                count: r.i32()?,
                distance: r.f64()?,
            }),
            TAG_LONG_PRESS => Self::LongPress(LongPressGesture {
                fingers: r.i32()?,
                repeat: r.i32()? != 0,
                duration: r.i32()?,
            }),
            TAG_PAN => {
                let fingers = r.i32()?;
                let bits = r.u32()?;
                let direction =
                    PanDirection::from_bits(bits).ok_or(CodecError::InvalidDirection(bits))?;
                Self::Pan(PanGesture {
                    fingers,
                    direction,
                    distance: r.f64()?,
                })
            }
            TAG_PINCH => Self::Pinch(PinchGesture {
                fingers: r.i32()?,
                distance: r.f64()?,
            }),
            TAG_ROTATION => Self::Rotation(RotationGesture {
                fingers: r.i32()?,
                angle: r.f64()?,
            }),
            TAG_SWIPE => {
                let fingers = r.i32()?;
                let bits = r.u32()?;
                let direction =
                    SwipeDirection::from_bits(bits).ok_or(CodecError::InvalidDirection(bits))?;
                Self::Swipe(SwipeGesture {
                    fingers,
                    direction,
                    speed: r.f64()?,
                })
            }
            TAG_GROUP => {
                if depth >= MAX_GROUP_DEPTH {
                    return Err(CodecError::NestingTooDeep);
                }
                let mode = mode_from_i32(r.i32()?)?;
                let count = r.u32()?;
                let mut children = Vec::new();
                for _ in 0..count {
                    children.push(Self::read(r, depth + 1)?);
                }
                Self::Group(GestureGroup { mode, children })
            }
            _ => return Err(CodecError::UnknownTag(tag)),
        };
        Ok(gesture)
    }
}
