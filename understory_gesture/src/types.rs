// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for gesture recognition: input samples, referee states, disposals, and policies.
//!
//! ## Overview
//!
//! These types describe the recognizer protocol and its inputs/outputs.
//! Input values ([`TouchEvent`], [`AxisEvent`]) are immutable once captured; recognizers keep
//! copies keyed by pointer id. [`RefereeState`] and [`GestureDisposal`] are the only state shared
//! between a recognizer and the [referee](crate::referee).

use kurbo::Point;

/// Phase of a touch sample.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum TouchType {
    /// Finger/pointer went down.
    Down,
    /// Finger/pointer moved while down.
    Move,
    /// Finger/pointer was lifted.
    Up,
    /// The platform canceled the touch stream.
    Cancel,
    /// Unrecognized sample; ignored by every recognizer.
    #[default]
    Unknown,
}

/// Physical source of an input event.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum SourceType {
    /// Unknown source.
    #[default]
    None,
    /// Touch screen.
    Touch,
    /// Mouse.
    Mouse,
    /// Touch pad.
    TouchPad,
    /// Keyboard.
    Keyboard,
}

/// Tool used to produce an input event.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum SourceTool {
    /// Unknown tool.
    #[default]
    Unknown,
    /// A finger.
    Finger,
    /// A stylus.
    Pen,
    /// A mouse.
    Mouse,
    /// A touch pad.
    Touchpad,
}

/// Input modality that produced the sample a gesture event was built from.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum InputEventType {
    /// A [`TouchEvent`].
    #[default]
    Touch,
    /// An [`AxisEvent`].
    Axis,
}

/// One physical pointer sample.
///
/// `position` is in window (global) coordinates; local coordinates are derived through the
/// recognizer's attached [`FrameNode`](crate::event::FrameNode).
#[derive(Clone, Debug, PartialEq)]
pub struct TouchEvent {
    /// Finger/pointer identifier, unique among concurrently active fingers.
    pub id: i32,
    /// Sample phase.
    pub kind: TouchType,
    /// Window coordinates.
    pub position: Point,
    /// Screen coordinates.
    pub screen_position: Point,
    /// Optional stylus tilt around the x axis, in degrees.
    pub tilt_x: Option<f64>,
    /// Optional stylus tilt around the y axis, in degrees.
    pub tilt_y: Option<f64>,
    /// Contact force.
    pub force: f64,
    /// Device class.
    pub source_type: SourceType,
    /// Tool class.
    pub source_tool: SourceTool,
    /// Timestamp in milliseconds; non-decreasing within a stream.
    pub time: u64,
    /// Originating device.
    pub device_id: i64,
    /// Display the sample targets.
    pub target_display_id: i32,
}

impl Default for TouchEvent {
    fn default() -> Self {
        Self {
            id: 0,
            kind: TouchType::Unknown,
            position: Point::ZERO,
            screen_position: Point::ZERO,
            tilt_x: None,
            tilt_y: None,
            force: 0.0,
            source_type: SourceType::Touch,
            source_tool: SourceTool::Finger,
            time: 0,
            device_id: 0,
            target_display_id: 0,
        }
    }
}

impl TouchEvent {
    /// Create a touch sample with the given phase, pointer id, window position and time.
    ///
    /// Screen coordinates default to the window position.
    pub fn new(kind: TouchType, id: i32, position: Point, time: u64) -> Self {
        Self {
            id,
            kind,
            position,
            screen_position: position,
            time,
            ..Default::default()
        }
    }

    /// Shorthand for a [`TouchType::Down`] sample.
    pub fn down(id: i32, position: Point, time: u64) -> Self {
        Self::new(TouchType::Down, id, position, time)
    }

    /// Shorthand for a [`TouchType::Move`] sample.
    pub fn moved(id: i32, position: Point, time: u64) -> Self {
        Self::new(TouchType::Move, id, position, time)
    }

    /// Shorthand for a [`TouchType::Up`] sample.
    pub fn up(id: i32, position: Point, time: u64) -> Self {
        Self::new(TouchType::Up, id, position, time)
    }

    /// Shorthand for a [`TouchType::Cancel`] sample.
    pub fn cancel(id: i32, position: Point, time: u64) -> Self {
        Self::new(TouchType::Cancel, id, position, time)
    }

    /// Replace the source type.
    pub fn with_source(mut self, source_type: SourceType, source_tool: SourceTool) -> Self {
        self.source_type = source_type;
        self.source_tool = source_tool;
        self
    }
}

/// Phase of an axis sample.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum AxisAction {
    /// No phase information.
    #[default]
    None,
    /// Axis stream started.
    Begin,
    /// Axis stream continued.
    Update,
    /// Axis stream ended.
    End,
    /// Axis stream was canceled.
    Cancel,
}

/// A non-contact directional input sample (wheel, knob, trackpad axis).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AxisEvent {
    /// Stream identifier; plays the role of a finger id for the referee.
    pub id: i32,
    /// Sample phase.
    pub action: AxisAction,
    /// Window coordinates of the cursor.
    pub position: Point,
    /// Screen coordinates of the cursor.
    pub screen_position: Point,
    /// Horizontal axis delta, in pixels.
    pub horizontal_axis: f64,
    /// Vertical axis delta, in pixels.
    pub vertical_axis: f64,
    /// Absolute pinch scale reported by the device (`1.0` is neutral).
    pub pinch_axis_scale: f64,
    /// Whether this stream carries rotation (knob/crown) data.
    pub is_rotation_event: bool,
    /// Absolute rotation since the stream began, in degrees.
    pub rotate_axis_angle: f64,
    /// Device class.
    pub source_type: SourceType,
    /// Tool class.
    pub source_tool: SourceTool,
    /// Timestamp in milliseconds.
    pub time: u64,
    /// Originating device.
    pub device_id: i64,
    /// Display the sample targets.
    pub target_display_id: i32,
}

impl AxisEvent {
    /// Create an axis sample with the given phase, stream id, window position and time.
    pub fn new(action: AxisAction, id: i32, position: Point, time: u64) -> Self {
        Self {
            id,
            action,
            position,
            screen_position: position,
            pinch_axis_scale: 1.0,
            source_type: SourceType::Mouse,
            source_tool: SourceTool::Mouse,
            time,
            ..Default::default()
        }
    }

    /// Set the scroll deltas.
    pub fn with_axes(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal_axis = horizontal;
        self.vertical_axis = vertical;
        self
    }

    /// Mark the sample as a rotation sample carrying `angle` degrees.
    pub fn with_rotation(mut self, angle: f64) -> Self {
        self.is_rotation_event = true;
        self.rotate_axis_angle = angle;
        self
    }

    /// Set the pinch scale.
    pub fn with_pinch_scale(mut self, scale: f64) -> Self {
        self.pinch_axis_scale = scale;
        self
    }
}

/// Per-recognizer lifecycle state as seen by the referee.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum RefereeState {
    /// No active touches.
    #[default]
    Ready,
    /// Touches active; gesture not yet confirmed.
    Detecting,
    /// Waiting on siblings or an external verdict.
    Pending,
    /// Pending, but an earlier sibling is still pending too.
    PendingBlocked,
    /// Recognized, but delivery is held back by an earlier pending sibling.
    SucceedBlocked,
    /// Recognized.
    Succeed,
    /// Rejected or disqualified.
    Fail,
}

impl RefereeState {
    /// Returns `true` for [`Succeed`](Self::Succeed) and [`Fail`](Self::Fail).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeed | Self::Fail)
    }

    /// Returns `true` while the recognizer can still win.
    pub fn is_contending(self) -> bool {
        !matches!(self, Self::Succeed | Self::Fail)
    }
}

/// A recognizer's per-event verdict reported to the referee.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum GestureDisposal {
    /// No verdict yet.
    #[default]
    None,
    /// The gesture occurred.
    Accept,
    /// The gesture cannot occur.
    Reject,
    /// The gesture occurred but needs siblings to resolve first.
    Pending,
}

/// Precedence of a recognizer within a scope.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum GesturePriority {
    /// Ordered by registration.
    #[default]
    Low,
    /// Ordered ahead of every `Low` member.
    High,
    /// Recognized independently of the other members.
    Parallel,
}

/// How a recognizer treats gestures of inner targets.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum GestureMask {
    /// Inner gestures participate normally.
    #[default]
    Normal,
    /// Inner gestures are excluded from the scope.
    IgnoreInternal,
}

/// Verdict returned by application judge callbacks.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum GestureJudgeResult {
    /// Let the recognizer decide.
    #[default]
    Continue,
    /// Confirm the recognizer's decision.
    Accept,
    /// Veto the gesture.
    Reject,
}

/// Kind tag of a recognizer node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RecognizerKind {
    /// Tap/click.
    Click,
    /// Long press.
    LongPress,
    /// Pan.
    Pan,
    /// Pinch.
    Pinch,
    /// Rotation.
    Rotation,
    /// Swipe.
    Swipe,
    /// Recognizer group.
    Group,
}

bitflags::bitflags! {
    /// Directions a pan may move in.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PanDirection: u32 {
        /// Toward negative x.
        const LEFT = 0b0001;
        /// Toward positive x.
        const RIGHT = 0b0010;
        /// Toward negative y.
        const UP = 0b0100;
        /// Toward positive y.
        const DOWN = 0b1000;
        /// Either horizontal direction.
        const HORIZONTAL = Self::LEFT.bits() | Self::RIGHT.bits();
        /// Either vertical direction.
        const VERTICAL = Self::UP.bits() | Self::DOWN.bits();
        /// Any direction.
        const ALL = Self::HORIZONTAL.bits() | Self::VERTICAL.bits();
    }
}

impl Default for PanDirection {
    fn default() -> Self {
        Self::ALL
    }
}

bitflags::bitflags! {
    /// Axes a swipe may follow.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SwipeDirection: u32 {
        /// Left or right.
        const HORIZONTAL = 0b01;
        /// Up or down.
        const VERTICAL = 0b10;
        /// Any axis.
        const ALL = Self::HORIZONTAL.bits() | Self::VERTICAL.bits();
    }
}

impl Default for SwipeDirection {
    fn default() -> Self {
        Self::ALL
    }
}
