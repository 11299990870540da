// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pan recognition.
//!
//! The pan tracks the centroid of its active fingers. Centroid deltas accumulate into an
//! average displacement; once that displacement reaches the configured distance along an
//! allowed direction, the pan is accepted and starts reporting updates. When a finger goes
//! down or up the centroid is re-based so the pan does not jump.

use kurbo::{Point, Vec2};

use super::{Context, GestureRecognizer, RecognizerBase};
use crate::event::GestureEvent;
use crate::settings::{GestureSettings, clamp_fingers};
use crate::types::{
    AxisAction, AxisEvent, GestureDisposal, PanDirection, RecognizerKind, RefereeState, SourceType,
    TouchEvent,
};

/// Outcome of testing an accumulated displacement against a pan's direction and distance.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PanAcceptResult {
    /// The pan occurred.
    Accept,
    /// Not enough movement yet.
    Detecting,
    /// The movement went the wrong way.
    Reject,
}

/// Pan recognizer.
#[derive(Debug)]
pub struct PanRecognizer {
    base: RecognizerBase,
    direction: PanDirection,
    distance: f64,
    average_distance: Vec2,
    delta: Vec2,
    last_centroid: Option<Point>,
    ended: bool,
}

impl PanRecognizer {
    /// Create a pan recognizer.
    ///
    /// A negative `distance` uses the settings' default for the input source.
    pub fn new(fingers: i32, direction: PanDirection, distance: f64) -> Self {
        Self {
            base: RecognizerBase::new(clamp_fingers(fingers)),
            direction,
            distance,
            average_distance: Vec2::ZERO,
            delta: Vec2::ZERO,
            last_centroid: None,
            ended: false,
        }
    }

    /// Allowed directions.
    pub fn direction(&self) -> PanDirection {
        self.direction
    }

    /// Configured distance; negative means the default.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Displacement accumulated since the gesture began.
    pub fn offset(&self) -> Vec2 {
        self.average_distance
    }

    /// Distance that must be covered for `source`.
    pub fn resolved_distance(&self, settings: &GestureSettings, source: SourceType) -> f64 {
        if self.distance >= 0.0 {
            self.distance
        } else if source == SourceType::Mouse {
            settings.pan_mouse_distance
        } else {
            settings.pan_distance
        }
    }

    /// Test the accumulated displacement against the direction mask and `distance`.
    pub fn is_pan_gesture_accept(&self, distance: f64) -> PanAcceptResult {
        let d = self.average_distance;
        if self.direction == PanDirection::ALL {
            return if d.hypot() >= distance && d.hypot() > 0.0 {
                PanAcceptResult::Accept
            } else {
                PanAcceptResult::Detecting
            };
        }
        let horizontal = self.direction.intersects(PanDirection::HORIZONTAL);
        let vertical = self.direction.intersects(PanDirection::VERTICAL);
        let (value, positive, negative) = if horizontal && (!vertical || d.x.abs() >= d.y.abs()) {
            (d.x, PanDirection::RIGHT, PanDirection::LEFT)
        } else if vertical {
            (d.y, PanDirection::DOWN, PanDirection::UP)
        } else {
            return PanAcceptResult::Detecting;
        };
        if value == 0.0 || value.abs() < distance {
            return PanAcceptResult::Detecting;
        }
        let moved = if value > 0.0 { positive } else { negative };
        if self.direction.contains(moved) {
            PanAcceptResult::Accept
        } else {
            PanAcceptResult::Reject
        }
    }

    fn rebase(&mut self) {
        self.last_centroid = self.base.touch_points.centroid();
    }

    fn check_accept(&mut self, source: SourceType, cx: &mut Context<'_>) {
        let distance = self.resolved_distance(cx.settings(), source);
        match self.is_pan_gesture_accept(distance) {
            PanAcceptResult::Accept => cx.adjudicate(GestureDisposal::Accept),
            PanAcceptResult::Reject => {
                log::debug!("pan {:?} moved against {:?}", cx.id(), self.direction);
                cx.adjudicate(GestureDisposal::Reject);
            }
            PanAcceptResult::Detecting => {}
        }
    }

    fn end(&mut self) {
        if !self.ended {
            self.ended = true;
            let event = self.gesture_event();
            self.base.callbacks.fire_end(&event);
        }
    }
}

impl GestureRecognizer for PanRecognizer {
    fn base(&self) -> &RecognizerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RecognizerBase {
        &mut self.base
    }

    fn kind(&self) -> RecognizerKind {
        RecognizerKind::Pan
    }

    fn handle_touch_down(&mut self, event: &TouchEvent, cx: &mut Context<'_>) {
        if !self.base.track_down(event, cx) {
            return;
        }
        self.rebase();
        if self.base.state() == RefereeState::Ready && self.base.has_enough_fingers() {
            self.base.set_state(RefereeState::Detecting);
        }
    }

    fn handle_touch_move(&mut self, event: &TouchEvent, cx: &mut Context<'_>) {
        if !self.base.touch_points.update(event) {
            return;
        }
        let Some(centroid) = self.base.touch_points.centroid() else {
            return;
        };
        self.delta = self.last_centroid.map_or(Vec2::ZERO, |last| centroid - last);
        self.last_centroid = Some(centroid);
        if !self.base.has_enough_fingers() {
            return;
        }
        self.average_distance += self.delta;
        match self.base.state() {
            RefereeState::Detecting => self.check_accept(event.source_type, cx),
            RefereeState::Succeed if !self.ended => {
                let event = self.gesture_event();
                self.base.callbacks.fire_update(&event);
            }
            _ => {}
        }
    }

    fn handle_touch_up(&mut self, event: &TouchEvent, cx: &mut Context<'_>) {
        if !self.base.touch_points.lift(event) {
            return;
        }
        self.rebase();
        if self.base.has_enough_fingers() {
            return;
        }
        match self.base.state() {
            RefereeState::Succeed => self.end(),
            RefereeState::Ready => {}
            _ => {
                log::debug!("pan {:?} lost its fingers before moving far enough", cx.id());
                cx.adjudicate(GestureDisposal::Reject);
            }
        }
    }

    fn handle_axis_event(&mut self, event: &AxisEvent, cx: &mut Context<'_>) {
        match event.action {
            AxisAction::Begin | AxisAction::None => {
                if self.base.state() == RefereeState::Ready {
                    self.average_distance = Vec2::ZERO;
                    self.base.set_state(RefereeState::Detecting);
                }
                if event.action == AxisAction::None {
                    self.handle_axis_event(
                        &AxisEvent {
                            action: AxisAction::Update,
                            ..event.clone()
                        },
                        cx,
                    );
                }
            }
            AxisAction::Update => {
                self.delta = Vec2::new(event.horizontal_axis, event.vertical_axis);
                self.average_distance += self.delta;
                match self.base.state() {
                    RefereeState::Detecting => self.check_accept(event.source_type, cx),
                    RefereeState::Succeed if !self.ended => {
                        let event = self.gesture_event();
                        self.base.callbacks.fire_update(&event);
                    }
                    _ => {}
                }
            }
            AxisAction::End => {
                if self.base.state() == RefereeState::Succeed {
                    self.end();
                } else {
                    cx.adjudicate(GestureDisposal::Reject);
                }
            }
            AxisAction::Cancel => cx.adjudicate(GestureDisposal::Reject),
        }
    }

    fn on_accepted(&mut self, _cx: &mut Context<'_>) {
        self.ended = false;
        let event = self.gesture_event();
        self.base.callbacks.fire_start(&event);
    }

    fn on_rejected(&mut self, _cx: &mut Context<'_>) {
        if self.base.state() == RefereeState::Succeed && !self.ended {
            self.ended = true;
            let event = self.gesture_event();
            self.base.callbacks.fire_cancel(&event);
        }
    }

    fn on_reset_status(&mut self) {
        self.average_distance = Vec2::ZERO;
        self.delta = Vec2::ZERO;
        self.last_centroid = None;
        self.ended = false;
    }

    fn gesture_event(&self) -> GestureEvent {
        GestureEvent {
            offset: self.average_distance,
            delta: self.delta,
            ..self.base.make_event()
        }
    }

    fn config_matches(&self, other: &Self) -> bool {
        self.base.fingers() == other.base.fingers()
            && self.direction == other.direction
            && self.distance == other.distance
            && self.base.priority_mask() == other.base.priority_mask()
    }

    fn copy_live_state(&mut self, other: &Self) {
        self.average_distance = other.average_distance;
        self.delta = other.delta;
        self.last_centroid = other.last_centroid;
        self.ended = other.ended;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::RecognizerTree;
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    fn pan_with(direction: PanDirection, distance: f64) -> PanRecognizer {
        PanRecognizer::new(1, direction, distance)
    }

    fn accept_for(direction: PanDirection, d: Vec2) -> PanAcceptResult {
        let mut pan = pan_with(direction, 10.0);
        pan.average_distance = d;
        pan.is_pan_gesture_accept(10.0)
    }

    #[test]
    fn direction_rules() {
        use PanAcceptResult::*;
        assert_eq!(accept_for(PanDirection::ALL, Vec2::new(6.0, 8.0)), Accept);
        assert_eq!(accept_for(PanDirection::ALL, Vec2::new(3.0, 4.0)), Detecting);
        assert_eq!(accept_for(PanDirection::LEFT, Vec2::new(-12.0, 0.0)), Accept);
        assert_eq!(accept_for(PanDirection::LEFT, Vec2::new(12.0, 0.0)), Reject);
        assert_eq!(accept_for(PanDirection::HORIZONTAL, Vec2::new(0.0, 40.0)), Detecting);
        assert_eq!(accept_for(PanDirection::VERTICAL, Vec2::new(0.0, -40.0)), Accept);
        assert_eq!(
            accept_for(PanDirection::LEFT | PanDirection::UP, Vec2::new(30.0, -5.0)),
            Reject
        );
        assert_eq!(
            accept_for(PanDirection::LEFT | PanDirection::UP, Vec2::new(3.0, -20.0)),
            Accept
        );
        assert_eq!(accept_for(PanDirection::empty(), Vec2::new(50.0, 50.0)), Detecting);
    }

    #[test]
    fn negative_distance_uses_source_default() {
        let pan = pan_with(PanDirection::ALL, -1.0);
        let settings = GestureSettings::default();
        assert_eq!(pan.resolved_distance(&settings, SourceType::Touch), 5.0);
        assert_eq!(pan.resolved_distance(&settings, SourceType::Mouse), 1.0);
    }

    #[test]
    fn accepts_after_distance_and_reports_updates() {
        let mut tree = RecognizerTree::default();
        let mut pan = pan_with(PanDirection::ALL, 10.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let cb = pan.base_mut().callbacks_mut();
        let s = seen.clone();
        cb.on_action_start = Some(Box::new(move |e| s.borrow_mut().push(("start", e.offset.x))));
        let s = seen.clone();
        cb.on_action_update = Some(Box::new(move |e| s.borrow_mut().push(("update", e.offset.x))));
        let s = seen.clone();
        cb.on_action_end = Some(Box::new(move |e| s.borrow_mut().push(("end", e.offset.x))));
        let id = tree.insert(pan);

        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[id]);
        tree.handle_touch_event(&TouchEvent::moved(0, Point::new(5.0, 0.0), 10), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Detecting));
        tree.handle_touch_event(&TouchEvent::moved(0, Point::new(15.0, 0.0), 20), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Succeed));
        tree.handle_touch_event(&TouchEvent::moved(0, Point::new(20.0, 0.0), 30), &[]);
        tree.handle_touch_event(&TouchEvent::up(0, Point::new(20.0, 0.0), 40), &[]);
        assert_eq!(
            &*seen.borrow(),
            &[("start", 15.0), ("update", 20.0), ("end", 20.0)]
        );
    }

    #[test]
    fn second_finger_does_not_jump() {
        let mut tree = RecognizerTree::default();
        let id = tree.insert(pan_with(PanDirection::ALL, 50.0));
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[id]);
        tree.handle_touch_event(&TouchEvent::down(1, Point::new(100.0, 0.0), 5), &[id]);
        tree.handle_touch_event(&TouchEvent::moved(1, Point::new(102.0, 0.0), 10), &[]);
        let Some(crate::recognizer::Recognizer::Pan(pan)) = tree.get(id) else {
            panic!("pan expected");
        };
        assert!((pan.offset().x - 1.0).abs() < 1e-9);
        assert_eq!(pan.base().state(), RefereeState::Detecting);
    }

    #[test]
    fn cancel_after_success_stops_updates() {
        let mut tree = RecognizerTree::default();
        let mut pan = pan_with(PanDirection::ALL, 1.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let cb = pan.base_mut().callbacks_mut();
        let s = seen.clone();
        cb.on_action_update = Some(Box::new(move |_| s.borrow_mut().push("update")));
        let s = seen.clone();
        cb.on_action_cancel = Some(Box::new(move |_| s.borrow_mut().push("cancel")));
        let id = tree.insert(pan);
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[id]);
        tree.handle_touch_event(&TouchEvent::moved(0, Point::new(5.0, 0.0), 5), &[]);
        tree.handle_touch_event(&TouchEvent::moved(0, Point::new(8.0, 0.0), 6), &[]);
        tree.handle_touch_event(&TouchEvent::cancel(0, Point::new(8.0, 0.0), 7), &[]);
        tree.handle_touch_event(&TouchEvent::moved(0, Point::new(30.0, 0.0), 8), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Fail));
        assert_eq!(&*seen.borrow(), &["update", "cancel"]);
    }

    #[test]
    fn axis_stream_pans() {
        let mut tree = RecognizerTree::default();
        let id = tree.insert(pan_with(PanDirection::VERTICAL, -1.0));
        let at = Point::new(5.0, 5.0);
        tree.handle_axis_event(&AxisEvent::new(AxisAction::Begin, 0, at, 0), &[id]);
        tree.handle_axis_event(
            &AxisEvent::new(AxisAction::Update, 0, at, 5).with_axes(0.0, 3.0),
            &[],
        );
        assert_eq!(tree.state(id), Some(RefereeState::Succeed));
        tree.handle_axis_event(&AxisEvent::new(AxisAction::End, 0, at, 10), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Succeed));
    }
}
