// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rotation recognition.
//!
//! The angle of the line through the first two active fingers is sampled on every move. Each
//! step is wrapped into `(-180, 180]` with [`change_value_range`] before it is added to the
//! resultant, so the accumulated angle stays continuous when the line crosses the ±180° seam.

use super::{Context, GestureRecognizer, RecognizerBase};
use crate::event::GestureEvent;
use crate::settings::clamp_multi_fingers;
use crate::types::{
    AxisAction, AxisEvent, GestureDisposal, RecognizerKind, RefereeState, TouchEvent,
};

/// Wrap an angle in degrees into `(-180, 180]`.
///
/// Idempotent for every finite input.
///
/// ```
/// use understory_gesture::recognizer::change_value_range;
///
/// assert_eq!(change_value_range(190.0), -170.0);
/// assert_eq!(change_value_range(-180.0), 180.0);
/// assert_eq!(change_value_range(720.0 + 45.0), 45.0);
/// ```
pub fn change_value_range(angle: f64) -> f64 {
    let mut result = angle % 360.0;
    if result <= -180.0 {
        result += 360.0;
    }
    if result > 180.0 {
        result -= 360.0;
    }
    result
}

/// Rotation recognizer.
#[derive(Debug)]
pub struct RotationRecognizer {
    base: RecognizerBase,
    angle: f64,
    last_angle: f64,
    resultant_angle: f64,
    angle_sign_changed: bool,
    ended: bool,
}

impl RotationRecognizer {
    /// Create a rotation recognizer for 2 to 5 fingers.
    ///
    /// An `angle` of zero or less, or above 360, uses the settings' default.
    pub fn new(fingers: i32, angle: f64) -> Self {
        Self {
            base: RecognizerBase::new(clamp_multi_fingers(fingers)),
            angle,
            last_angle: 0.0,
            resultant_angle: 0.0,
            angle_sign_changed: false,
            ended: false,
        }
    }

    /// Configured threshold in degrees.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Rotation accumulated since the fingers gathered, in degrees.
    pub fn resultant_angle(&self) -> f64 {
        self.resultant_angle
    }

    /// Whether the last update was held back as sign-flip jitter.
    pub fn angle_sign_changed(&self) -> bool {
        self.angle_sign_changed
    }

    fn threshold(&self, cx: &Context<'_>) -> f64 {
        if self.angle <= 0.0 || self.angle > 360.0 {
            cx.settings().rotation_angle
        } else {
            self.angle
        }
    }

    /// Angle of the line from the first to the second active finger, in degrees.
    fn compute_angle(&self) -> Option<f64> {
        let ids = self.base.touch_points.active_ids();
        let (&a, &b) = (ids.first()?, ids.get(1)?);
        let p0 = self.base.touch_points.get(a)?.position;
        let p1 = self.base.touch_points.get(b)?.position;
        Some((p1 - p0).atan2().to_degrees())
    }

    fn rebase(&mut self) {
        if let Some(angle) = self.compute_angle() {
            self.last_angle = angle;
        }
    }

    fn report(&mut self, previous: f64, cx: &Context<'_>) {
        let jitter = cx.settings().rotation_jitter;
        if previous * self.resultant_angle < 0.0 && self.resultant_angle.abs() < jitter {
            self.angle_sign_changed = true;
            return;
        }
        self.angle_sign_changed = false;
        let event = self.gesture_event();
        self.base.callbacks.fire_update(&event);
    }

    fn end(&mut self) {
        if !self.ended {
            self.ended = true;
            let event = self.gesture_event();
            self.base.callbacks.fire_end(&event);
        }
    }
}

impl GestureRecognizer for RotationRecognizer {
    fn base(&self) -> &RecognizerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RecognizerBase {
        &mut self.base
    }

    fn kind(&self) -> RecognizerKind {
        RecognizerKind::Rotation
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
        if !self.base.touch_points.update(event) || !self.base.has_enough_fingers() {
            return;
        }
        let Some(current) = self.compute_angle() else {
            return;
        };
        let step = change_value_range(current - self.last_angle);
        self.last_angle = current;
        let previous = self.resultant_angle;
        self.resultant_angle += step;
        match self.base.state() {
            RefereeState::Detecting => {
                if self.resultant_angle.abs() >= self.threshold(cx) {
                    cx.adjudicate(GestureDisposal::Accept);
                }
            }
            RefereeState::Succeed if !self.ended => self.report(previous, cx),
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
                log::debug!(
                    "rotation {:?} lost a finger at {}°",
                    cx.id(),
                    self.resultant_angle
                );
                cx.adjudicate(GestureDisposal::Reject);
            }
        }
    }

    fn handle_axis_event(&mut self, event: &AxisEvent, cx: &mut Context<'_>) {
        if !event.is_rotation_event {
            return;
        }
        match event.action {
            AxisAction::Begin => {
                if self.base.state() == RefereeState::Ready {
                    self.base.set_state(RefereeState::Detecting);
                    self.resultant_angle = 0.0;
                }
            }
            AxisAction::Update | AxisAction::None => {
                let previous = self.resultant_angle;
                self.resultant_angle = event.rotate_axis_angle;
                match self.base.state() {
                    RefereeState::Detecting => {
                        if self.resultant_angle.abs() >= self.threshold(cx) {
                            cx.adjudicate(GestureDisposal::Accept);
                        }
                    }
                    RefereeState::Succeed if !self.ended => self.report(previous, cx),
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
        self.last_angle = 0.0;
        self.resultant_angle = 0.0;
        self.angle_sign_changed = false;
        self.ended = false;
    }

    fn gesture_event(&self) -> GestureEvent {
        GestureEvent {
            angle: self.resultant_angle,
            ..self.base.make_event()
        }
    }

    fn config_matches(&self, other: &Self) -> bool {
        self.base.fingers() == other.base.fingers()
            && self.angle == other.angle
            && self.base.priority_mask() == other.base.priority_mask()
    }

    fn copy_live_state(&mut self, other: &Self) {
        self.last_angle = other.last_angle;
        self.resultant_angle = other.resultant_angle;
        self.angle_sign_changed = other.angle_sign_changed;
        self.ended = other.ended;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::RecognizerTree;
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use core::cell::Cell;
    use kurbo::Point;

    fn two_fingers(tree: &mut RecognizerTree, angle: f64) -> crate::arena::RecognizerId {
        let id = tree.insert(RotationRecognizer::new(2, angle));
        tree.handle_touch_event(&TouchEvent::down(0, Point::new(0.0, 0.0), 0), &[id]);
        tree.handle_touch_event(&TouchEvent::down(1, Point::new(100.0, 0.0), 0), &[id]);
        id
    }

    #[test]
    fn wraps_into_half_open_range() {
        assert_eq!(change_value_range(180.0), 180.0);
        assert_eq!(change_value_range(-180.0), 180.0);
        assert_eq!(change_value_range(181.0), -179.0);
        assert_eq!(change_value_range(-181.0), 179.0);
        assert_eq!(change_value_range(-540.0), 180.0);
        assert_eq!(change_value_range(30.0), 30.0);
    }

    #[test]
    fn small_rotation_fails_on_lift() {
        let mut tree = RecognizerTree::default();
        let id = two_fingers(&mut tree, 60.0);
        tree.handle_touch_event(&TouchEvent::moved(1, Point::new(100.0, 30.0), 10), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Detecting));
        tree.handle_touch_event(&TouchEvent::up(0, Point::new(0.0, 0.0), 20), &[]);
        tree.handle_touch_event(&TouchEvent::up(1, Point::new(100.0, 30.0), 20), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Fail));
    }

    #[test]
    fn large_rotation_succeeds() {
        let mut tree = RecognizerTree::default();
        let id = two_fingers(&mut tree, 60.0);
        tree.handle_touch_event(&TouchEvent::moved(1, Point::new(0.0, 100.0), 10), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Succeed));
        tree.handle_touch_event(&TouchEvent::up(0, Point::new(0.0, 0.0), 20), &[]);
        tree.handle_touch_event(&TouchEvent::up(1, Point::new(0.0, 100.0), 20), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Succeed));
    }

    #[test]
    fn accumulates_across_the_seam() {
        let mut tree = RecognizerTree::default();
        let id = tree.insert(RotationRecognizer::new(2, 360.0));
        tree.handle_touch_event(&TouchEvent::down(0, Point::new(0.0, 0.0), 0), &[id]);
        tree.handle_touch_event(&TouchEvent::down(1, Point::new(-100.0, 1.0), 0), &[id]);
        tree.handle_touch_event(&TouchEvent::moved(1, Point::new(-100.0, -1.0), 10), &[]);
        let Some(crate::recognizer::Recognizer::Rotation(r)) = tree.get(id) else {
            panic!("rotation expected");
        };
        assert!(r.resultant_angle().abs() < 2.0);
        assert_eq!(r.base().state(), RefereeState::Detecting);
    }

    #[test]
    fn sign_flip_near_zero_is_held_back() {
        let mut tree = RecognizerTree::default();
        let mut rot = RotationRecognizer::new(2, 1.0);
        let updates = Rc::new(Cell::new(0));
        let u = updates.clone();
        rot.base_mut().callbacks_mut().on_action_update =
            Some(Box::new(move |_| u.set(u.get() + 1)));
        let id = tree.insert(rot);
        tree.handle_touch_event(&TouchEvent::down(0, Point::new(0.0, 0.0), 0), &[id]);
        tree.handle_touch_event(&TouchEvent::down(1, Point::new(100.0, 0.0), 0), &[id]);
        // ~1.15° accepts.
        tree.handle_touch_event(&TouchEvent::moved(1, Point::new(100.0, 2.0), 10), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Succeed));
        // Back to ~-0.29°: crosses zero inside the jitter band.
        tree.handle_touch_event(&TouchEvent::moved(1, Point::new(100.0, -0.5), 20), &[]);
        assert_eq!(updates.get(), 0);
        // Further to ~-2.3°: reported.
        tree.handle_touch_event(&TouchEvent::moved(1, Point::new(100.0, -4.0), 30), &[]);
        assert_eq!(updates.get(), 1);
    }

    #[test]
    fn axis_rotation_needs_rotation_stream() {
        let mut tree = RecognizerTree::default();
        let id = tree.insert(RotationRecognizer::new(2, 10.0));
        let at = Point::ZERO;
        tree.handle_axis_event(&AxisEvent::new(AxisAction::Begin, 0, at, 0), &[id]);
        assert_eq!(tree.state(id), Some(RefereeState::Ready));

        let id = tree.insert(RotationRecognizer::new(2, 10.0));
        tree.handle_axis_event(
            &AxisEvent::new(AxisAction::Begin, 1, at, 0).with_rotation(0.0),
            &[id],
        );
        tree.handle_axis_event(
            &AxisEvent::new(AxisAction::Update, 1, at, 5).with_rotation(12.0),
            &[],
        );
        assert_eq!(tree.state(id), Some(RefereeState::Succeed));
    }

    #[test]
    fn cancel_after_success_fires_cancel_once() {
        let mut tree = RecognizerTree::default();
        let mut rot = RotationRecognizer::new(2, 60.0);
        let ends = Rc::new(Cell::new(0));
        let cancels = Rc::new(Cell::new(0));
        let (e, c) = (ends.clone(), cancels.clone());
        let callbacks = rot.base_mut().callbacks_mut();
        callbacks.on_action_end = Some(Box::new(move |_| e.set(e.get() + 1)));
        callbacks.on_action_cancel = Some(Box::new(move |_| c.set(c.get() + 1)));
        let id = tree.insert(rot);
        tree.handle_touch_event(&TouchEvent::down(0, Point::new(0.0, 0.0), 0), &[id]);
        tree.handle_touch_event(&TouchEvent::down(1, Point::new(100.0, 0.0), 0), &[id]);
        tree.handle_touch_event(&TouchEvent::moved(1, Point::new(0.0, 100.0), 10), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Succeed));

        tree.handle_touch_event(&TouchEvent::cancel(1, Point::new(0.0, 100.0), 20), &[]);
        tree.handle_touch_event(&TouchEvent::cancel(0, Point::new(0.0, 0.0), 20), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Fail));
        assert_eq!((ends.get(), cancels.get()), (0, 1));
    }
}
