// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture events delivered to the application, and the collaborators a recognizer consults.
//!
//! ## Callbacks
//!
//! Recognizers report through [`GestureCallbacks`]: discrete gestures (tap, long press, swipe)
//! fire `on_action`, continuous gestures fire `on_action_start`, any number of
//! `on_action_update`, then exactly one of `on_action_end` or `on_action_cancel`.
//!
//! ## Collaborators
//!
//! - [`FrameNode`]: the UI element owning a recognizer. It supplies the global→local transform,
//!   the local hit region, and a pattern name for diagnostics.
//! - [`TargetComponent`]: application judge callbacks consulted by the referee before a
//!   gesture is accepted.
//!
//! Both are held weakly by recognizers; dropping the host's `Rc` detaches them.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect, Vec2};

use crate::arena::RecognizerId;
use crate::types::{
    GestureJudgeResult, GesturePriority, InputEventType, RecognizerKind, RefereeState, SourceTool,
    SourceType,
};

/// One finger contributing to a gesture.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FingerInfo {
    /// Finger id.
    pub id: i32,
    /// Window coordinates.
    pub global_location: Point,
    /// Coordinates local to the attached frame node.
    pub local_location: Point,
    /// Screen coordinates.
    pub screen_location: Point,
    /// Device class.
    pub source_type: SourceType,
    /// Tool class.
    pub source_tool: SourceTool,
}

/// Payload of every gesture callback.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GestureEvent {
    /// Timestamp of the triggering sample, in milliseconds.
    pub time: u64,
    /// Whether this is a repeated action (long press with `repeat`).
    pub repeat: bool,
    /// Fingers currently contributing.
    pub fingers: Vec<FingerInfo>,
    /// Device class.
    pub source_type: SourceType,
    /// Tool class.
    pub source_tool: SourceTool,
    /// Originating device.
    pub device_id: i64,
    /// Window coordinates of the gesture focus.
    pub global_location: Point,
    /// Local coordinates of the gesture focus.
    pub local_location: Point,
    /// Screen coordinates of the gesture focus.
    pub screen_location: Point,
    /// Contact force of the triggering sample.
    pub force: f64,
    /// Stylus tilt around x.
    pub tilt_x: Option<f64>,
    /// Stylus tilt around y.
    pub tilt_y: Option<f64>,
    /// Display targeted by the triggering sample.
    pub target_display_id: i32,
    /// Modality of the triggering sample.
    pub input_event_type: InputEventType,
    /// Pan offset since the gesture began.
    pub offset: Vec2,
    /// Pan offset since the previous update.
    pub delta: Vec2,
    /// Pinch scale relative to the gesture start.
    pub scale: f64,
    /// Pinch center in local coordinates.
    pub pinch_center: Point,
    /// Rotation/swipe angle in degrees.
    pub angle: f64,
    /// Swipe speed in pixels per second.
    pub speed: f64,
}

/// Static description of a gesture handed to per-gesture judges.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureInfo {
    /// Recognizer kind.
    pub kind: RecognizerKind,
    /// Application tag.
    pub tag: Option<String>,
    /// Configured finger count.
    pub fingers: i32,
    /// Configured priority.
    pub priority: GesturePriority,
}

/// Snapshot of a recognizer handed to cross-recognizer judges.
#[derive(Clone, Debug, PartialEq)]
pub struct RecognizerInfo {
    /// Recognizer handle.
    pub id: RecognizerId,
    /// Recognizer kind.
    pub kind: RecognizerKind,
    /// Referee state at the time of the snapshot.
    pub state: RefereeState,
    /// Application tag.
    pub tag: Option<String>,
    /// Whether the recognizer accepts input.
    pub enabled: bool,
}

/// Accessibility notifications emitted on recognition.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AccessibilityEventType {
    /// A tap was recognized.
    Click,
    /// A long press was recognized.
    LongPress,
}

/// Callback receiving a gesture event.
pub type GestureEventFn = Box<dyn FnMut(&GestureEvent)>;

/// Callback receiving an accessibility notification.
pub type AccessibilityFn = Box<dyn FnMut(AccessibilityEventType)>;

/// Application callbacks of a recognizer.
#[derive(Default)]
pub struct GestureCallbacks {
    /// Discrete recognition (tap/click, long press, swipe).
    pub on_action: Option<GestureEventFn>,
    /// Continuous gesture started.
    pub on_action_start: Option<GestureEventFn>,
    /// Continuous gesture updated.
    pub on_action_update: Option<GestureEventFn>,
    /// Gesture ended normally.
    pub on_action_end: Option<GestureEventFn>,
    /// Gesture was canceled after it started.
    pub on_action_cancel: Option<GestureEventFn>,
    /// Accessibility notification.
    pub on_accessibility: Option<AccessibilityFn>,
}

impl core::fmt::Debug for GestureCallbacks {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GestureCallbacks")
            .field("on_action", &self.on_action.is_some())
            .field("on_action_start", &self.on_action_start.is_some())
            .field("on_action_update", &self.on_action_update.is_some())
            .field("on_action_end", &self.on_action_end.is_some())
            .field("on_action_cancel", &self.on_action_cancel.is_some())
            .field("on_accessibility", &self.on_accessibility.is_some())
            .finish()
    }
}

impl GestureCallbacks {
    pub(crate) fn fire_action(&mut self, event: &GestureEvent) {
        if let Some(f) = self.on_action.as_mut() {
            f(event);
        }
    }

    pub(crate) fn fire_start(&mut self, event: &GestureEvent) {
        if let Some(f) = self.on_action_start.as_mut() {
            f(event);
        }
    }

    pub(crate) fn fire_update(&mut self, event: &GestureEvent) {
        if let Some(f) = self.on_action_update.as_mut() {
            f(event);
        }
    }

    pub(crate) fn fire_end(&mut self, event: &GestureEvent) {
        if let Some(f) = self.on_action_end.as_mut() {
            f(event);
        }
    }

    pub(crate) fn fire_cancel(&mut self, event: &GestureEvent) {
        if let Some(f) = self.on_action_cancel.as_mut() {
            f(event);
        }
    }

    pub(crate) fn fire_accessibility(&mut self, kind: AccessibilityEventType) {
        if let Some(f) = self.on_accessibility.as_mut() {
            f(kind);
        }
    }
}

/// The UI element a recognizer is attached to.
///
/// Implemented by the host scene graph; the recognizer core only needs these three answers.
pub trait FrameNode {
    /// Transform from window coordinates to this node's local coordinates.
    fn global_to_local(&self) -> Affine;
    /// Hit-test region in local coordinates.
    fn hit_region(&self) -> Rect;
    /// Pattern name for diagnostics.
    fn pattern_name(&self) -> &str;

    /// Map a window point into local coordinates.
    fn to_local(&self, global: Point) -> Point {
        self.global_to_local() * global
    }
}

/// Per-gesture judge: `(gesture, event) -> verdict`.
pub type GestureJudgeFn = Box<dyn Fn(&GestureInfo, &GestureEvent) -> GestureJudgeResult>;

/// Cross-recognizer judge: `(event, current, others) -> verdict`.
pub type RecognizerJudgeFn =
    Box<dyn Fn(&GestureEvent, &RecognizerInfo, &[RecognizerInfo]) -> GestureJudgeResult>;

/// Application judges consulted before a gesture is accepted.
///
/// Either judge returning [`GestureJudgeResult::Reject`] turns the acceptance into a rejection.
#[derive(Default)]
pub struct TargetComponent {
    gesture_judge: Option<GestureJudgeFn>,
    recognizer_judge: Option<RecognizerJudgeFn>,
}

impl core::fmt::Debug for TargetComponent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TargetComponent")
            .field("gesture_judge", &self.gesture_judge.is_some())
            .field("recognizer_judge", &self.recognizer_judge.is_some())
            .finish()
    }
}

impl TargetComponent {
    /// Create a component without judges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the per-gesture judge.
    pub fn set_gesture_judge(&mut self, judge: GestureJudgeFn) {
        self.gesture_judge = Some(judge);
    }

    /// Install the cross-recognizer judge.
    pub fn set_recognizer_judge(&mut self, judge: RecognizerJudgeFn) {
        self.recognizer_judge = Some(judge);
    }

    /// Run the per-gesture judge, then the cross-recognizer judge.
    ///
    /// Returns [`GestureJudgeResult::Reject`] as soon as one of them vetoes.
    pub fn judge(
        &self,
        info: &GestureInfo,
        event: &GestureEvent,
        current: &RecognizerInfo,
        others: &[RecognizerInfo],
    ) -> GestureJudgeResult {
        if let Some(judge) = &self.gesture_judge
            && judge(info, event) == GestureJudgeResult::Reject
        {
            return GestureJudgeResult::Reject;
        }
        if let Some(judge) = &self.recognizer_judge
            && judge(event, current, others) == GestureJudgeResult::Reject
        {
            return GestureJudgeResult::Reject;
        }
        GestureJudgeResult::Continue
    }
}
