// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recognizer state machines.
//!
//! ## Overview
//!
//! Every recognizer runs an independent state machine over the touch and axis samples the
//! [`RecognizerTree`](crate::tree::RecognizerTree) delivers to it. Recognizers never talk to each
//! other directly: they report a [`GestureDisposal`] through their [`Context`], and the referee
//! (or the enclosing [group](group)) decides what happens next.
//!
//! The leaf recognizers implement [`GestureRecognizer`]; the closed [`Recognizer`] enum is what
//! the tree stores. Groups are not leaves: their composition logic needs access to their
//! children and therefore lives on the tree.
//!
//! ## Deadlines
//!
//! Timers (multi-tap timeout, long-press duration, ...) are requested through
//! [`Context::schedule`] and fire on the tree's logical clock, via
//! [`GestureRecognizer::handle_overdue_deadline`]. A recognizer owns at most one pending
//! deadline per [`DeadlineKind`]; scheduling again replaces it.

pub mod click;
pub mod group;
pub mod long_press;
pub mod pan;
pub mod pinch;
pub mod rotation;
pub mod swipe;

pub use click::ClickRecognizer;
pub use group::{GroupMode, RecognizerGroup, SequenceCursor};
pub use long_press::LongPressRecognizer;
pub use pan::{PanAcceptResult, PanRecognizer};
pub use pinch::PinchRecognizer;
pub use rotation::{RotationRecognizer, change_value_range};
pub use swipe::SwipeRecognizer;

use alloc::collections::{BTreeSet, VecDeque};
use alloc::rc::{Rc, Weak};
use alloc::string::String;

use kurbo::Point;

use crate::arena::RecognizerId;
use crate::event::{
    FingerInfo, FrameNode, GestureCallbacks, GestureEvent, GestureInfo, RecognizerInfo,
    TargetComponent,
};
use crate::settings::GestureSettings;
use crate::touch_points::TouchPointStore;
use crate::types::{
    AxisEvent, GestureDisposal, GestureMask, GesturePriority, InputEventType, RecognizerKind,
    RefereeState, TouchEvent, TouchType,
};

/// Timers a recognizer can request.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum DeadlineKind {
    /// All fingers of a multi-finger tap must have landed.
    Finger,
    /// The next tap of a multi-tap must have started.
    Tap,
    /// A long press is held long enough.
    LongPress,
    /// A repeating long press fires again.
    Repeat,
    /// The next child of a sequence group must have started.
    Sequence,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Request {
    Adjudicate(RecognizerId, GestureDisposal),
    Schedule {
        id: RecognizerId,
        kind: DeadlineKind,
        at: u64,
    },
    Cancel {
        id: RecognizerId,
        kind: DeadlineKind,
    },
}

/// Per-call access to the tree a recognizer lives in.
///
/// A context is only handed out for the duration of one handler call. Requests made through it
/// are queued and applied in order once the handler returns.
#[derive(Debug)]
pub struct Context<'a> {
    id: RecognizerId,
    settings: &'a GestureSettings,
    now: u64,
    requests: &'a mut VecDeque<Request>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        id: RecognizerId,
        settings: &'a GestureSettings,
        now: u64,
        requests: &'a mut VecDeque<Request>,
    ) -> Self {
        Self {
            id,
            settings,
            now,
            requests,
        }
    }

    /// The recognizer being called.
    pub fn id(&self) -> RecognizerId {
        self.id
    }

    /// Thresholds of the tree.
    pub fn settings(&self) -> &GestureSettings {
        self.settings
    }

    /// Current logical time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Report a verdict to the referee (or the enclosing group).
    pub fn adjudicate(&mut self, disposal: GestureDisposal) {
        self.requests
            .push_back(Request::Adjudicate(self.id, disposal));
    }

    /// Fire `kind` after `delay` milliseconds, replacing a pending deadline of the same kind.
    pub fn schedule(&mut self, kind: DeadlineKind, delay: u64) {
        self.requests.push_back(Request::Schedule {
            id: self.id,
            kind,
            at: self.now.saturating_add(delay),
        });
    }

    /// Drop a pending deadline of `kind`, if any.
    pub fn cancel(&mut self, kind: DeadlineKind) {
        self.requests
            .push_back(Request::Cancel { id: self.id, kind });
    }
}

/// State and configuration shared by every recognizer kind.
#[derive(Debug)]
pub struct RecognizerBase {
    fingers: i32,
    is_limit_finger_count: bool,
    pub(crate) touch_points: TouchPointStore,
    state: RefereeState,
    disposal: GestureDisposal,
    priority: GesturePriority,
    priority_mask: GestureMask,
    pub(crate) callbacks: GestureCallbacks,
    frame: Option<Weak<dyn FrameNode>>,
    target: Option<Weak<TargetComponent>>,
    tag: Option<String>,
    last_touch: Option<TouchEvent>,
    last_axis: Option<AxisEvent>,
    input_event_type: InputEventType,
    pub(crate) sessions: BTreeSet<i32>,
    pub(crate) finished: bool,
    enabled: bool,
}

impl RecognizerBase {
    /// Create a base requiring `fingers` fingers. The count is stored as given.
    pub fn new(fingers: i32) -> Self {
        Self {
            fingers,
            is_limit_finger_count: false,
            touch_points: TouchPointStore::new(),
            state: RefereeState::Ready,
            disposal: GestureDisposal::None,
            priority: GesturePriority::Low,
            priority_mask: GestureMask::Normal,
            callbacks: GestureCallbacks::default(),
            frame: None,
            target: None,
            tag: None,
            last_touch: None,
            last_axis: None,
            input_event_type: InputEventType::Touch,
            sessions: BTreeSet::new(),
            finished: false,
            enabled: true,
        }
    }

    /// Required finger count.
    pub fn fingers(&self) -> i32 {
        self.fingers
    }

    /// Whether fingers beyond [`fingers`](Self::fingers) invalidate the gesture.
    pub fn is_limit_finger_count(&self) -> bool {
        self.is_limit_finger_count
    }

    /// Make fingers beyond the required count reject the gesture.
    pub fn set_limit_finger_count(&mut self, limit: bool) {
        self.is_limit_finger_count = limit;
    }

    /// Current referee state.
    pub fn state(&self) -> RefereeState {
        self.state
    }

    /// Last verdict reported for this recognizer.
    pub fn disposal(&self) -> GestureDisposal {
        self.disposal
    }

    /// Priority within a scope.
    pub fn priority(&self) -> GesturePriority {
        self.priority
    }

    /// Set the priority within a scope.
    pub fn set_priority(&mut self, priority: GesturePriority) {
        self.priority = priority;
    }

    /// How inner gestures are treated.
    pub fn priority_mask(&self) -> GestureMask {
        self.priority_mask
    }

    /// Set how inner gestures are treated.
    pub fn set_priority_mask(&mut self, mask: GestureMask) {
        self.priority_mask = mask;
    }

    /// Application callbacks.
    pub fn callbacks_mut(&mut self) -> &mut GestureCallbacks {
        &mut self.callbacks
    }

    /// Fingers currently tracked.
    pub fn touch_points(&self) -> &TouchPointStore {
        &self.touch_points
    }

    /// Attach the owning UI element. Held weakly.
    pub fn attach_frame_node(&mut self, node: &Rc<dyn FrameNode>) {
        self.frame = Some(Rc::downgrade(node));
    }

    /// The owning UI element, if attached and still alive.
    pub fn frame_node(&self) -> Option<Rc<dyn FrameNode>> {
        self.frame.as_ref()?.upgrade()
    }

    /// Attach application judges. Held weakly.
    pub fn set_target_component(&mut self, target: &Rc<TargetComponent>) {
        self.target = Some(Rc::downgrade(target));
    }

    /// Application judges, if attached and still alive.
    pub fn target_component(&self) -> Option<Rc<TargetComponent>> {
        self.target.as_ref()?.upgrade()
    }

    /// Application tag.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Set the application tag.
    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = Some(tag.into());
    }

    /// Whether input is processed.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable input processing.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether every touch session this recognizer took part in has closed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Most recent touch sample.
    pub fn last_touch(&self) -> Option<&TouchEvent> {
        self.last_touch.as_ref()
    }

    /// Most recent axis sample.
    pub fn last_axis(&self) -> Option<&AxisEvent> {
        self.last_axis.as_ref()
    }

    pub(crate) fn set_state(&mut self, state: RefereeState) {
        if self.state != state {
            log::trace!("state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    pub(crate) fn set_disposal(&mut self, disposal: GestureDisposal) {
        self.disposal = disposal;
    }

    pub(crate) fn record_touch(&mut self, event: &TouchEvent) {
        self.last_touch = Some(event.clone());
        self.input_event_type = InputEventType::Touch;
    }

    pub(crate) fn record_axis(&mut self, event: &AxisEvent) {
        self.last_axis = Some(event.clone());
        self.input_event_type = InputEventType::Axis;
    }

    /// Clear per-occurrence state, keeping configuration and callbacks.
    pub(crate) fn reset(&mut self) {
        self.touch_points.clear();
        self.state = RefereeState::Ready;
        self.disposal = GestureDisposal::None;
        self.last_touch = None;
        self.last_axis = None;
        self.sessions.clear();
        self.finished = false;
    }

    pub(crate) fn copy_live_state(&mut self, other: &Self) {
        self.touch_points = other.touch_points.clone();
        self.state = other.state;
        self.disposal = other.disposal;
        self.last_touch = other.last_touch.clone();
        self.last_axis = other.last_axis.clone();
        self.input_event_type = other.input_event_type;
        self.sessions = other.sessions.clone();
        self.finished = other.finished;
    }

    pub(crate) fn to_local(&self, global: Point) -> Point {
        self.frame_node().map_or(global, |f| f.to_local(global))
    }

    /// Whether `global` falls in the attached node's hit region grown by `slop` on every side.
    ///
    /// Without an attached node every point is inside.
    pub(crate) fn is_point_in_region(&self, global: Point, slop: f64) -> bool {
        let Some(frame) = self.frame_node() else {
            return true;
        };
        if !slop.is_finite() {
            return true;
        }
        let local = frame.to_local(global);
        let region = frame.hit_region().inflate(slop, slop);
        local.x >= region.x0 && local.x <= region.x1 && local.y >= region.y0 && local.y <= region.y1
    }

    /// Snapshot the current input as a [`GestureEvent`].
    ///
    /// Gesture-specific fields (offset, scale, angle, speed) are left at their defaults.
    pub fn make_event(&self) -> GestureEvent {
        let mut event = GestureEvent {
            scale: 1.0,
            input_event_type: self.input_event_type,
            ..GestureEvent::default()
        };
        match self.input_event_type {
            InputEventType::Touch => {
                if let Some(t) = &self.last_touch {
                    event.time = t.time;
                    event.source_type = t.source_type;
                    event.source_tool = t.source_tool;
                    event.device_id = t.device_id;
                    event.force = t.force;
                    event.tilt_x = t.tilt_x;
                    event.tilt_y = t.tilt_y;
                    event.target_display_id = t.target_display_id;
                    event.screen_location = t.screen_position;
                    event.global_location = self.touch_points.centroid().unwrap_or(t.position);
                }
            }
            InputEventType::Axis => {
                if let Some(a) = &self.last_axis {
                    event.time = a.time;
                    event.source_type = a.source_type;
                    event.source_tool = a.source_tool;
                    event.device_id = a.device_id;
                    event.target_display_id = a.target_display_id;
                    event.screen_location = a.screen_position;
                    event.global_location = a.position;
                }
            }
        }
        event.local_location = self.to_local(event.global_location);
        event.fingers = self
            .touch_points
            .active_points()
            .map(|p| FingerInfo {
                id: p.id,
                global_location: p.position,
                local_location: self.to_local(p.position),
                screen_location: p.screen_position,
                source_type: p.source_type,
                source_tool: p.source_tool,
            })
            .collect();
        event
    }

    pub(crate) fn gesture_info(&self, kind: RecognizerKind) -> GestureInfo {
        GestureInfo {
            kind,
            tag: self.tag.clone(),
            fingers: self.fingers,
            priority: self.priority,
        }
    }

    pub(crate) fn recognizer_info(&self, id: RecognizerId, kind: RecognizerKind) -> RecognizerInfo {
        RecognizerInfo {
            id,
            kind,
            state: self.state,
            tag: self.tag.clone(),
            enabled: self.enabled,
        }
    }

    /// Track a Down and reject when fingers beyond the limit arrive.
    ///
    /// Returns `false` when the event must not be processed further.
    pub(crate) fn track_down(&mut self, event: &TouchEvent, cx: &mut Context<'_>) -> bool {
        self.touch_points.insert_down(event);
        if self.is_limit_finger_count && self.touch_points.active_count() > self.finger_count() {
            log::debug!(
                "{} fingers exceed the limit of {}",
                self.touch_points.active_count(),
                self.fingers
            );
            cx.adjudicate(GestureDisposal::Reject);
            return false;
        }
        true
    }

    /// Whether the required number of fingers is down.
    pub(crate) fn has_enough_fingers(&self) -> bool {
        self.touch_points.active_count() >= self.finger_count()
    }

    pub(crate) fn finger_count(&self) -> usize {
        usize::try_from(self.fingers).unwrap_or(0)
    }
}

/// Capability set of a leaf recognizer.
///
/// Handlers are only called while the recognizer is enabled and has not failed; the tree does
/// that gating. State changes other than `Ready → Detecting` go through
/// [`Context::adjudicate`].
pub trait GestureRecognizer: core::fmt::Debug {
    /// Shared state.
    fn base(&self) -> &RecognizerBase;
    /// Shared state.
    fn base_mut(&mut self) -> &mut RecognizerBase;
    /// Kind tag.
    fn kind(&self) -> RecognizerKind;

    /// A finger went down.
    fn handle_touch_down(&mut self, event: &TouchEvent, cx: &mut Context<'_>);
    /// A finger moved.
    fn handle_touch_move(&mut self, event: &TouchEvent, cx: &mut Context<'_>);
    /// A finger lifted.
    fn handle_touch_up(&mut self, event: &TouchEvent, cx: &mut Context<'_>);

    /// The platform canceled the touch stream.
    fn handle_touch_cancel(&mut self, _event: &TouchEvent, cx: &mut Context<'_>) {
        self.base_mut().touch_points.clear();
        cx.adjudicate(GestureDisposal::Reject);
    }

    /// An axis sample arrived. Ignored unless the kind supports axis input.
    fn handle_axis_event(&mut self, _event: &AxisEvent, _cx: &mut Context<'_>) {}

    /// A deadline requested through [`Context::schedule`] is due.
    fn handle_overdue_deadline(&mut self, _kind: DeadlineKind, _cx: &mut Context<'_>) {}

    /// The referee confirmed the gesture; the state is already [`RefereeState::Succeed`].
    fn on_accepted(&mut self, cx: &mut Context<'_>);

    /// The gesture lost; called before the state becomes [`RefereeState::Fail`].
    fn on_rejected(&mut self, _cx: &mut Context<'_>) {}

    /// Clear gesture-specific per-occurrence state.
    fn on_reset_status(&mut self);

    /// Snapshot for callbacks and judges.
    fn gesture_event(&self) -> GestureEvent {
        self.base().make_event()
    }

    /// Whether `other` carries the same configuration.
    fn config_matches(&self, other: &Self) -> bool
    where
        Self: Sized;

    /// Copy gesture-specific in-flight state from `other`.
    fn copy_live_state(&mut self, other: &Self)
    where
        Self: Sized;

    /// Take over the in-flight state of a predecessor with identical configuration.
    ///
    /// Returns `false`, leaving `self` untouched, if the configurations differ.
    fn reconcile_from(&mut self, other: &Self) -> bool
    where
        Self: Sized,
    {
        if !self.config_matches(other) {
            return false;
        }
        self.base_mut().copy_live_state(other.base());
        self.copy_live_state(other);
        true
    }
}

/// Route a touch sample into a leaf, applying the shared gating.
///
/// Disabled recognizers see nothing. Failed recognizers only drop lifted fingers so that their
/// bookkeeping stays balanced until they are reset.
pub(crate) fn dispatch_touch(
    recognizer: &mut dyn GestureRecognizer,
    event: &TouchEvent,
    cx: &mut Context<'_>,
) {
    let base = recognizer.base_mut();
    if !base.enabled {
        return;
    }
    if cx.settings().trace_input {
        log::trace!(
            "{:?} {:?} id={} at ({}, {}) t={}",
            cx.id(),
            event.kind,
            event.id,
            event.position.x,
            event.position.y,
            event.time
        );
    }
    if base.state == RefereeState::Fail {
        if matches!(event.kind, TouchType::Up | TouchType::Cancel) {
            base.touch_points.lift(event);
        }
        return;
    }
    base.record_touch(event);
    match event.kind {
        TouchType::Down => recognizer.handle_touch_down(event, cx),
        TouchType::Move => recognizer.handle_touch_move(event, cx),
        TouchType::Up => recognizer.handle_touch_up(event, cx),
        TouchType::Cancel => recognizer.handle_touch_cancel(event, cx),
        TouchType::Unknown => {}
    }
}

/// Route an axis sample into a leaf, applying the shared gating.
pub(crate) fn dispatch_axis(
    recognizer: &mut dyn GestureRecognizer,
    event: &AxisEvent,
    cx: &mut Context<'_>,
) {
    let base = recognizer.base_mut();
    if !base.enabled || base.state == RefereeState::Fail {
        return;
    }
    if cx.settings().trace_input {
        log::trace!(
            "{:?} axis {:?} id={} h={} v={} t={}",
            cx.id(),
            event.action,
            event.id,
            event.horizontal_axis,
            event.vertical_axis,
            event.time
        );
    }
    base.record_axis(event);
    recognizer.handle_axis_event(event, cx);
}

/// A node of a [`RecognizerTree`](crate::tree::RecognizerTree).
#[derive(Debug)]
pub enum Recognizer {
    /// Tap/click.
    Click(ClickRecognizer),
    /// Long press.
    LongPress(LongPressRecognizer),
    /// Pan.
    Pan(PanRecognizer),
    /// Pinch.
    Pinch(PinchRecognizer),
    /// Rotation.
    Rotation(RotationRecognizer),
    /// Swipe.
    Swipe(SwipeRecognizer),
    /// Composition of other nodes.
    Group(RecognizerGroup),
}

impl Recognizer {
    /// Shared state.
    pub fn base(&self) -> &RecognizerBase {
        match self {
            Self::Click(r) => r.base(),
            Self::LongPress(r) => r.base(),
            Self::Pan(r) => r.base(),
            Self::Pinch(r) => r.base(),
            Self::Rotation(r) => r.base(),
            Self::Swipe(r) => r.base(),
            Self::Group(g) => g.base(),
        }
    }

    /// Shared state.
    pub fn base_mut(&mut self) -> &mut RecognizerBase {
        match self {
            Self::Click(r) => r.base_mut(),
            Self::LongPress(r) => r.base_mut(),
            Self::Pan(r) => r.base_mut(),
            Self::Pinch(r) => r.base_mut(),
            Self::Rotation(r) => r.base_mut(),
            Self::Swipe(r) => r.base_mut(),
            Self::Group(g) => g.base_mut(),
        }
    }

    /// Kind tag.
    pub fn kind(&self) -> RecognizerKind {
        match self {
            Self::Group(_) => RecognizerKind::Group,
            _ => self.as_leaf().map_or(RecognizerKind::Group, |l| l.kind()),
        }
    }

    /// Current referee state.
    pub fn state(&self) -> RefereeState {
        self.base().state()
    }

    /// The leaf recognizer, unless this is a group.
    pub fn as_leaf(&self) -> Option<&dyn GestureRecognizer> {
        match self {
            Self::Click(r) => Some(r),
            Self::LongPress(r) => Some(r),
            Self::Pan(r) => Some(r),
            Self::Pinch(r) => Some(r),
            Self::Rotation(r) => Some(r),
            Self::Swipe(r) => Some(r),
            Self::Group(_) => None,
        }
    }

    /// The leaf recognizer, unless this is a group.
    pub fn as_leaf_mut(&mut self) -> Option<&mut dyn GestureRecognizer> {
        match self {
            Self::Click(r) => Some(r),
            Self::LongPress(r) => Some(r),
            Self::Pan(r) => Some(r),
            Self::Pinch(r) => Some(r),
            Self::Rotation(r) => Some(r),
            Self::Swipe(r) => Some(r),
            Self::Group(_) => None,
        }
    }

    /// The group, if this is one.
    pub fn as_group(&self) -> Option<&RecognizerGroup> {
        match self {
            Self::Group(g) => Some(g),
            _ => None,
        }
    }

    pub(crate) fn as_group_mut(&mut self) -> Option<&mut RecognizerGroup> {
        match self {
            Self::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Snapshot for callbacks and judges.
    pub fn gesture_event(&self) -> GestureEvent {
        match self.as_leaf() {
            Some(leaf) => leaf.gesture_event(),
            None => self.base().make_event(),
        }
    }

    /// Leaf-level configuration check; groups are compared by the tree.
    pub(crate) fn leaf_config_matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Click(a), Self::Click(b)) => a.config_matches(b),
            (Self::LongPress(a), Self::LongPress(b)) => a.config_matches(b),
            (Self::Pan(a), Self::Pan(b)) => a.config_matches(b),
            (Self::Pinch(a), Self::Pinch(b)) => a.config_matches(b),
            (Self::Rotation(a), Self::Rotation(b)) => a.config_matches(b),
            (Self::Swipe(a), Self::Swipe(b)) => a.config_matches(b),
            _ => false,
        }
    }

    pub(crate) fn leaf_reconcile_from(&mut self, other: &Self) -> bool {
        match (self, other) {
            (Self::Click(a), Self::Click(b)) => a.reconcile_from(b),
            (Self::LongPress(a), Self::LongPress(b)) => a.reconcile_from(b),
            (Self::Pan(a), Self::Pan(b)) => a.reconcile_from(b),
            (Self::Pinch(a), Self::Pinch(b)) => a.reconcile_from(b),
            (Self::Rotation(a), Self::Rotation(b)) => a.reconcile_from(b),
            (Self::Swipe(a), Self::Swipe(b)) => a.reconcile_from(b),
            _ => false,
        }
    }
}

impl From<ClickRecognizer> for Recognizer {
    fn from(r: ClickRecognizer) -> Self {
        Self::Click(r)
    }
}

impl From<LongPressRecognizer> for Recognizer {
    fn from(r: LongPressRecognizer) -> Self {
        Self::LongPress(r)
    }
}

impl From<PanRecognizer> for Recognizer {
    fn from(r: PanRecognizer) -> Self {
        Self::Pan(r)
    }
}

impl From<PinchRecognizer> for Recognizer {
    fn from(r: PinchRecognizer) -> Self {
        Self::Pinch(r)
    }
}

impl From<RotationRecognizer> for Recognizer {
    fn from(r: RotationRecognizer) -> Self {
        Self::Rotation(r)
    }
}

impl From<SwipeRecognizer> for Recognizer {
    fn from(r: SwipeRecognizer) -> Self {
        Self::Swipe(r)
    }
}

impl From<RecognizerGroup> for Recognizer {
    fn from(g: RecognizerGroup) -> Self {
        Self::Group(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use kurbo::{Affine, Rect, Vec2};

    struct Node;
    impl FrameNode for Node {
        fn global_to_local(&self) -> Affine {
            Affine::translate(Vec2::new(-100.0, -100.0))
        }
        fn hit_region(&self) -> Rect {
            Rect::new(0.0, 0.0, 40.0, 40.0)
        }
        fn pattern_name(&self) -> &str {
            "Node"
        }
    }

    #[test]
    fn hit_region_grows_by_slop() {
        let mut base = RecognizerBase::new(1);
        assert!(base.is_point_in_region(Point::new(-500.0, 0.0), 0.0));
        let node: Rc<dyn FrameNode> = Rc::new(Node);
        base.attach_frame_node(&node);
        assert!(base.is_point_in_region(Point::new(120.0, 120.0), 0.0));
        assert!(!base.is_point_in_region(Point::new(145.0, 120.0), 0.0));
        assert!(base.is_point_in_region(Point::new(145.0, 120.0), 10.0));
        assert!(base.is_point_in_region(Point::new(145.0, 120.0), f64::INFINITY));
    }

    #[test]
    fn frame_node_is_held_weakly() {
        let mut base = RecognizerBase::new(1);
        let node: Rc<dyn FrameNode> = Rc::new(Node);
        base.attach_frame_node(&node);
        assert!(base.frame_node().is_some());
        drop(node);
        assert!(base.frame_node().is_none());
    }

    #[test]
    fn event_snapshot_uses_local_coordinates() {
        let mut base = RecognizerBase::new(1);
        let node: Rc<dyn FrameNode> = Rc::new(Node);
        base.attach_frame_node(&node);
        let down = TouchEvent::down(0, Point::new(110.0, 130.0), 7);
        base.touch_points.insert_down(&down);
        base.record_touch(&down);
        let ev = base.make_event();
        assert_eq!(ev.time, 7);
        assert_eq!(ev.global_location, Point::new(110.0, 130.0));
        assert_eq!(ev.local_location, Point::new(10.0, 30.0));
        assert_eq!(ev.fingers.len(), 1);
        assert_eq!(ev.scale, 1.0);
    }

    #[test]
    fn reset_keeps_configuration() {
        let mut base = RecognizerBase::new(3);
        base.set_priority(GesturePriority::High);
        base.set_state(RefereeState::Succeed);
        base.touch_points.insert_down(&TouchEvent::down(0, Point::ZERO, 0));
        base.reset();
        assert_eq!(base.state(), RefereeState::Ready);
        assert_eq!(base.touch_points().active_count(), 0);
        assert_eq!(base.fingers(), 3);
        assert_eq!(base.priority(), GesturePriority::High);
    }
}
