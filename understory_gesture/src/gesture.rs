// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative gesture descriptions.
//!
//! A [`Gesture`] is plain configuration: it carries no live state and can be cloned, compared
//! and [serialized](crate::codec). [`Gesture::create_recognizer`] instantiates it in a
//! [`RecognizerTree`], building whole subtrees for [`GestureGroup`]s.
//!
//! ```
//! use understory_gesture::gesture::{Gesture, GestureGroup, LongPressGesture, TapGesture};
//! use understory_gesture::recognizer::GroupMode;
//! use understory_gesture::tree::RecognizerTree;
//!
//! let gesture = Gesture::Group(GestureGroup::new(
//!     GroupMode::Sequence,
//!     vec![TapGesture::new(1, 1).into(), LongPressGesture::new(1, false, 500).into()],
//! ));
//! let mut tree = RecognizerTree::default();
//! let id = gesture.create_recognizer(&mut tree).unwrap();
//! assert_eq!(tree.len(), 3);
//! assert_eq!(tree.get(id).unwrap().as_group().unwrap().children().len(), 2);
//! ```

use alloc::vec::Vec;

use crate::arena::RecognizerId;
use crate::recognizer::{
    ClickRecognizer, GroupMode, LongPressRecognizer, PanRecognizer, PinchRecognizer,
    RecognizerGroup, RotationRecognizer, SwipeRecognizer,
};
use crate::settings::DEFAULT_FINGERS;
use crate::tree::RecognizerTree;
use crate::types::{PanDirection, SwipeDirection};

/// Tap (click) gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct TapGesture {
    /// Fingers required.
    pub fingers: i32,
    /// Taps required.
    pub count: i32,
    /// Movement allowed per tap; zero or less means unlimited.
    pub distance: f64,
}

impl TapGesture {
    /// A tap without a movement limit.
    pub fn new(fingers: i32, count: i32) -> Self {
        Self {
            fingers,
            count,
            distance: 0.0,
        }
    }
}

impl Default for TapGesture {
    fn default() -> Self {
        Self::new(DEFAULT_FINGERS, 1)
    }
}

/// Long-press gesture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LongPressGesture {
    /// Fingers required.
    pub fingers: i32,
    /// Whether the action repeats while held.
    pub repeat: bool,
    /// Hold time in milliseconds; zero or less means the default.
    pub duration: i32,
}

impl LongPressGesture {
    /// Create a long-press description.
    pub fn new(fingers: i32, repeat: bool, duration: i32) -> Self {
        Self {
            fingers,
            repeat,
            duration,
        }
    }
}

impl Default for LongPressGesture {
    fn default() -> Self {
        Self::new(DEFAULT_FINGERS, false, 0)
    }
}

/// Pan gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct PanGesture {
    /// Fingers required.
    pub fingers: i32,
    /// Allowed directions.
    pub direction: PanDirection,
    /// Distance before the pan starts; negative means the default for the input source.
    pub distance: f64,
}

impl PanGesture {
    /// Create a pan description.
    pub fn new(fingers: i32, direction: PanDirection, distance: f64) -> Self {
        Self {
            fingers,
            direction,
            distance,
        }
    }
}

impl Default for PanGesture {
    fn default() -> Self {
        Self::new(DEFAULT_FINGERS, PanDirection::ALL, -1.0)
    }
}

/// Pinch gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct PinchGesture {
    /// Fingers required (2 to 5).
    pub fingers: i32,
    /// Spread change before the pinch starts; zero or less means the default.
    pub distance: f64,
}

impl PinchGesture {
    /// Create a pinch description.
    pub fn new(fingers: i32, distance: f64) -> Self {
        Self { fingers, distance }
    }
}

impl Default for PinchGesture {
    fn default() -> Self {
        Self::new(2, 0.0)
    }
}

/// Rotation gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct RotationGesture {
    /// Fingers required (2 to 5).
    pub fingers: i32,
    /// Rotation in degrees before the gesture starts.
    pub angle: f64,
}

impl RotationGesture {
    /// Create a rotation description.
    pub fn new(fingers: i32, angle: f64) -> Self {
        Self { fingers, angle }
    }
}

impl Default for RotationGesture {
    fn default() -> Self {
        Self::new(2, 0.0)
    }
}

/// Swipe gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct SwipeGesture {
    /// Fingers required.
    pub fingers: i32,
    /// Allowed axes.
    pub direction: SwipeDirection,
    /// Minimum speed in px/s; zero or less means the default.
    pub speed: f64,
}

impl SwipeGesture {
    /// Create a swipe description.
    pub fn new(fingers: i32, direction: SwipeDirection, speed: f64) -> Self {
        Self {
            fingers,
            direction,
            speed,
        }
    }
}

impl Default for SwipeGesture {
    fn default() -> Self {
        Self::new(DEFAULT_FINGERS, SwipeDirection::ALL, 0.0)
    }
}

/// Composition of gestures.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureGroup {
    /// How the children combine.
    pub mode: GroupMode,
    /// Children in order.
    pub children: Vec<Gesture>,
}

impl GestureGroup {
    /// Create a group description.
    pub fn new(mode: GroupMode, children: Vec<Gesture>) -> Self {
        Self { mode, children }
    }
}

/// Any gesture description.
#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
    /// Tap.
    Tap(TapGesture),
    /// Long press.
    LongPress(LongPressGesture),
    /// Pan.
    Pan(PanGesture),
    /// Pinch.
    Pinch(PinchGesture),
    /// Rotation.
    Rotation(RotationGesture),
    /// Swipe.
    Swipe(SwipeGesture),
    /// Group.
    Group(GestureGroup),
}

impl Gesture {
    /// Instantiate this description as a new top-level node of `tree`.
    ///
    /// Returns `None` for groups whose mode cannot form a group
    /// ([`GroupMode::Begin`]/[`GroupMode::End`]). Such nested groups are skipped.
    pub fn create_recognizer(&self, tree: &mut RecognizerTree) -> Option<RecognizerId> {
        let id = match self {
            Self::Tap(g) => tree.insert(ClickRecognizer::new(g.fingers, g.count, g.distance)),
            Self::LongPress(g) => {
                tree.insert(LongPressRecognizer::new(g.fingers, g.repeat, g.duration))
            }
            Self::Pan(g) => tree.insert(PanRecognizer::new(g.fingers, g.direction, g.distance)),
            Self::Pinch(g) => tree.insert(PinchRecognizer::new(g.fingers, g.distance)),
            Self::Rotation(g) => tree.insert(RotationRecognizer::new(g.fingers, g.angle)),
            Self::Swipe(g) => tree.insert(SwipeRecognizer::new(g.fingers, g.direction, g.speed)),
            Self::Group(g) => {
                let Some(group) = RecognizerGroup::new(g.mode) else {
                    log::warn!("{:?} cannot form a gesture group", g.mode);
                    return None;
                };
                let children: Vec<RecognizerId> = g
                    .children
                    .iter()
                    .filter_map(|c| c.create_recognizer(tree))
                    .collect();
                let id = tree.insert(group);
                tree.add_children(id, &children);
                id
            }
        };
        Some(id)
    }
}

impl From<TapGesture> for Gesture {
    fn from(g: TapGesture) -> Self {
        Self::Tap(g)
    }
}

impl From<LongPressGesture> for Gesture {
    fn from(g: LongPressGesture) -> Self {
        Self::LongPress(g)
    }
}

impl From<PanGesture> for Gesture {
    fn from(g: PanGesture) -> Self {
        Self::Pan(g)
    }
}

impl From<PinchGesture> for Gesture {
    fn from(g: PinchGesture) -> Self {
        Self::Pinch(g)
    }
}

impl From<RotationGesture> for Gesture {
    fn from(g: RotationGesture) -> Self {
        Self::Rotation(g)
    }
}

impl From<SwipeGesture> for Gesture {
    fn from(g: SwipeGesture) -> Self {
        Self::Swipe(g)
    }
}

impl From<GestureGroup> for Gesture {
    fn from(g: GestureGroup) -> Self {
        Self::Group(g)
    }
}
