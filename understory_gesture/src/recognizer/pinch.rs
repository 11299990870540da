// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pinch recognition.

use kurbo::Point;

use super::{Context, GestureRecognizer, RecognizerBase};
use crate::event::GestureEvent;
use crate::settings::clamp_multi_fingers;
use crate::types::{
    AxisAction, AxisEvent, GestureDisposal, RecognizerKind, RefereeState, TouchEvent,
};

/// Pinch recognizer.
///
/// The spread of the active fingers is their mean distance from their centroid. The pinch is
/// accepted once the spread changed by at least `distance` since the fingers gathered; the
/// reported scale is the current spread over the initial one.
#[derive(Debug)]
pub struct PinchRecognizer {
    base: RecognizerBase,
    distance: f64,
    initial_dev: f64,
    current_dev: f64,
    scale: f64,
    pinch_center: Point,
    ended: bool,
}

impl PinchRecognizer {
    /// Create a pinch recognizer for 2 to 5 fingers.
    ///
    /// A `distance` of zero or less uses the settings' default.
    pub fn new(fingers: i32, distance: f64) -> Self {
        Self {
            base: RecognizerBase::new(clamp_multi_fingers(fingers)),
            distance,
            initial_dev: 0.0,
            current_dev: 0.0,
            scale: 1.0,
            pinch_center: Point::ZERO,
            ended: false,
        }
    }

    /// Configured distance; zero or less means the default.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Current scale relative to the spread the fingers gathered with.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    fn compute_dev(&self) -> f64 {
        let Some(center) = self.base.touch_points.centroid() else {
            return 0.0;
        };
        let mut sum = 0.0;
        let mut n = 0.0;
        for p in self.base.touch_points.active_points() {
            sum += p.position.distance(center);
            n += 1.0;
        }
        if n > 0.0 { sum / n } else { 0.0 }
    }

    fn update_scale(&mut self) {
        if self.initial_dev > 0.0 {
            self.scale = self.current_dev / self.initial_dev;
        }
        if let Some(center) = self.base.touch_points.centroid() {
            self.pinch_center = center;
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

impl GestureRecognizer for PinchRecognizer {
    fn base(&self) -> &RecognizerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RecognizerBase {
        &mut self.base
    }

    fn kind(&self) -> RecognizerKind {
        RecognizerKind::Pinch
    }

    fn handle_touch_down(&mut self, event: &TouchEvent, cx: &mut Context<'_>) {
        if !self.base.track_down(event, cx) {
            return;
        }
        if !self.base.has_enough_fingers() {
            return;
        }
        match self.base.state() {
            RefereeState::Ready => {
                self.base.set_state(RefereeState::Detecting);
                self.initial_dev = self.compute_dev();
                self.current_dev = self.initial_dev;
            }
            RefereeState::Detecting => {
                self.initial_dev = self.compute_dev();
                self.current_dev = self.initial_dev;
            }
            _ => {}
        }
    }

    fn handle_touch_move(&mut self, event: &TouchEvent, cx: &mut Context<'_>) {
        if !self.base.touch_points.update(event) || !self.base.has_enough_fingers() {
            return;
        }
        self.current_dev = self.compute_dev();
        match self.base.state() {
            RefereeState::Detecting => {
                let threshold = if self.distance > 0.0 {
                    self.distance
                } else {
                    cx.settings().pinch_distance
                };
                if (self.current_dev - self.initial_dev).abs() >= threshold {
                    cx.adjudicate(GestureDisposal::Accept);
                }
            }
            RefereeState::Succeed if !self.ended => {
                self.update_scale();
                let event = self.gesture_event();
                self.base.callbacks.fire_update(&event);
            }
            _ => {}
        }
    }

    fn handle_touch_up(&mut self, event: &TouchEvent, cx: &mut Context<'_>) {
        if !self.base.touch_points.lift(event) || self.base.has_enough_fingers() {
            return;
        }
        match self.base.state() {
            RefereeState::Succeed => self.end(),
            RefereeState::Ready => {}
            _ => {
                log::debug!("pinch {:?} lost a finger before spreading far enough", cx.id());
                cx.adjudicate(GestureDisposal::Reject);
            }
        }
    }

    fn handle_axis_event(&mut self, event: &AxisEvent, cx: &mut Context<'_>) {
        match event.action {
            AxisAction::Begin => {
                if self.base.state() == RefereeState::Ready {
                    self.base.set_state(RefereeState::Detecting);
                    self.scale = 1.0;
                }
            }
            AxisAction::Update | AxisAction::None => {
                self.scale = event.pinch_axis_scale;
                self.pinch_center = event.position;
                match self.base.state() {
                    RefereeState::Detecting if self.scale != 1.0 => {
                        cx.adjudicate(GestureDisposal::Accept);
                    }
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
        if self.base.touch_points.active_count() > 0 {
            self.update_scale();
        }
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
        self.initial_dev = 0.0;
        self.current_dev = 0.0;
        self.scale = 1.0;
        self.pinch_center = Point::ZERO;
        self.ended = false;
    }

    fn gesture_event(&self) -> GestureEvent {
        GestureEvent {
            scale: self.scale,
            pinch_center: self.base.to_local(self.pinch_center),
            ..self.base.make_event()
        }
    }

    fn config_matches(&self, other: &Self) -> bool {
        self.base.fingers() == other.base.fingers()
            && self.distance == other.distance
            && self.base.priority_mask() == other.base.priority_mask()
    }

    fn copy_live_state(&mut self, other: &Self) {
        self.initial_dev = other.initial_dev;
        self.current_dev = other.current_dev;
        self.scale = other.scale;
        self.pinch_center = other.pinch_center;
        self.ended = other.ended;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::Recognizer;
    use crate::tree::RecognizerTree;
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use core::cell::Cell;

    #[test]
    fn fingers_clamp_to_two_through_five() {
        assert_eq!(PinchRecognizer::new(1, 5.0).base().fingers(), 2);
        assert_eq!(PinchRecognizer::new(6, 5.0).base().fingers(), 2);
        assert_eq!(PinchRecognizer::new(3, 5.0).base().fingers(), 3);
    }

    #[test]
    fn spreading_accepts_and_scales() {
        let mut tree = RecognizerTree::default();
        let id = tree.insert(PinchRecognizer::new(2, 10.0));
        tree.handle_touch_event(&TouchEvent::down(0, Point::new(0.0, 0.0), 0), &[id]);
        tree.handle_touch_event(&TouchEvent::down(1, Point::new(100.0, 0.0), 0), &[id]);
        tree.handle_touch_event(&TouchEvent::moved(1, Point::new(110.0, 0.0), 10), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Detecting));
        tree.handle_touch_event(&TouchEvent::moved(1, Point::new(120.0, 0.0), 20), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Succeed));
        tree.handle_touch_event(&TouchEvent::moved(1, Point::new(200.0, 0.0), 30), &[]);
        let Some(Recognizer::Pinch(pinch)) = tree.get(id) else {
            panic!("pinch expected");
        };
        assert!((pinch.scale() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn lifting_while_detecting_fails_and_forgets_the_finger() {
        let mut tree = RecognizerTree::default();
        let id = tree.insert(PinchRecognizer::new(2, 10.0));
        tree.handle_touch_event(&TouchEvent::down(0, Point::new(0.0, 0.0), 0), &[id]);
        tree.handle_touch_event(&TouchEvent::down(1, Point::new(100.0, 0.0), 0), &[id]);
        tree.handle_touch_event(&TouchEvent::up(1, Point::new(100.0, 0.0), 10), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Fail));
        let Some(Recognizer::Pinch(pinch)) = tree.get(id) else {
            panic!("pinch expected");
        };
        assert_eq!(pinch.base().touch_points().active_ids(), &[0]);
    }

    #[test]
    fn axis_scale_pinches() {
        let mut tree = RecognizerTree::default();
        let id = tree.insert(PinchRecognizer::new(2, 0.0));
        let at = Point::new(1.0, 1.0);
        tree.handle_axis_event(&AxisEvent::new(AxisAction::Begin, 0, at, 0), &[id]);
        tree.handle_axis_event(
            &AxisEvent::new(AxisAction::Update, 0, at, 5).with_pinch_scale(1.2),
            &[],
        );
        assert_eq!(tree.state(id), Some(RefereeState::Succeed));
    }

    #[test]
    fn cancel_after_success_fires_cancel_once() {
        let mut tree = RecognizerTree::default();
        let mut pinch = PinchRecognizer::new(2, 10.0);
        let starts = Rc::new(Cell::new(0));
        let ends = Rc::new(Cell::new(0));
        let cancels = Rc::new(Cell::new(0));
        let (s, e, c) = (starts.clone(), ends.clone(), cancels.clone());
        let callbacks = pinch.base_mut().callbacks_mut();
        callbacks.on_action_start = Some(Box::new(move |_| s.set(s.get() + 1)));
        callbacks.on_action_end = Some(Box::new(move |_| e.set(e.get() + 1)));
        callbacks.on_action_cancel = Some(Box::new(move |_| c.set(c.get() + 1)));
        let id = tree.insert(pinch);
        tree.handle_touch_event(&TouchEvent::down(0, Point::new(0.0, 0.0), 0), &[id]);
        tree.handle_touch_event(&TouchEvent::down(1, Point::new(100.0, 0.0), 0), &[id]);
        tree.handle_touch_event(&TouchEvent::moved(1, Point::new(150.0, 0.0), 10), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Succeed));

        tree.handle_touch_event(&TouchEvent::cancel(1, Point::new(150.0, 0.0), 20), &[]);
        tree.handle_touch_event(&TouchEvent::cancel(0, Point::new(0.0, 0.0), 20), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Fail));
        assert_eq!((starts.get(), ends.get(), cancels.get()), (1, 0, 1));
    }
}
