// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Swipe recognition.

use kurbo::{Point, Vec2};

use super::{Context, GestureRecognizer, RecognizerBase, change_value_range};
use crate::event::GestureEvent;
use crate::settings::clamp_fingers;
use crate::types::{
    AxisAction, AxisEvent, GestureDisposal, RecognizerKind, RefereeState, SwipeDirection,
    TouchEvent,
};

/// Angular tolerance around an axis, in degrees.
const AXIS_TOLERANCE: f64 = 45.0;

/// Swipe recognizer.
///
/// A swipe is decided when the fingers lift: the mean speed since they gathered must exceed
/// `speed` and the motion must stay within 45° of an allowed axis the whole way.
#[derive(Debug)]
pub struct SwipeRecognizer {
    base: RecognizerBase,
    direction: SwipeDirection,
    speed: f64,
    down_time: u64,
    down_location: Point,
    prev_angle: Option<f64>,
    result_speed: f64,
    result_angle: f64,
    axis_offset: Vec2,
}

impl SwipeRecognizer {
    /// Create a swipe recognizer. A `speed` of zero or less uses the settings' default.
    pub fn new(fingers: i32, direction: SwipeDirection, speed: f64) -> Self {
        Self {
            base: RecognizerBase::new(clamp_fingers(fingers)),
            direction,
            speed,
            down_time: 0,
            down_location: Point::ZERO,
            prev_angle: None,
            result_speed: 0.0,
            result_angle: 0.0,
            axis_offset: Vec2::ZERO,
        }
    }

    /// Allowed axes.
    pub fn direction(&self) -> SwipeDirection {
        self.direction
    }

    /// Configured speed threshold; zero or less means the default.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Whether `angle` (degrees, as from `atan2`) follows an allowed axis and stays within
    /// tolerance of the previous sample's angle, measured across the ±180° seam.
    pub fn check_angle(&self, angle: f64) -> bool {
        if let Some(prev) = self.prev_angle
            && change_value_range(angle - prev).abs() > AXIS_TOLERANCE
        {
            return false;
        }
        if self.direction.contains(SwipeDirection::ALL) {
            return true;
        }
        let a = angle.abs();
        if self.direction.contains(SwipeDirection::HORIZONTAL)
            && (a <= AXIS_TOLERANCE || a >= 180.0 - AXIS_TOLERANCE)
        {
            return true;
        }
        self.direction.contains(SwipeDirection::VERTICAL)
            && (AXIS_TOLERANCE..=180.0 - AXIS_TOLERANCE).contains(&a)
    }

    fn threshold(&self, cx: &Context<'_>) -> f64 {
        if self.speed > 0.0 {
            self.speed
        } else {
            cx.settings().swipe_speed
        }
    }

    fn decide(&mut self, offset: Vec2, now: u64, cx: &mut Context<'_>) {
        let elapsed = now.saturating_sub(self.down_time).max(1);
        #[allow(
            clippy::cast_precision_loss,
            reason = "Gesture durations are far below 2^52 milliseconds."
        )]
        let elapsed = elapsed as f64;
        self.result_speed = offset.hypot() / elapsed * 1000.0;
        self.result_angle = if offset.hypot() > 0.0 {
            offset.atan2().to_degrees()
        } else {
            0.0
        };
        if self.result_speed > self.threshold(cx) && self.check_angle(self.result_angle) {
            cx.adjudicate(GestureDisposal::Accept);
        } else {
            log::debug!(
                "swipe {:?} too slow or off-axis: {} px/s at {}°",
                cx.id(),
                self.result_speed,
                self.result_angle
            );
            cx.adjudicate(GestureDisposal::Reject);
        }
    }
}

impl GestureRecognizer for SwipeRecognizer {
    fn base(&self) -> &RecognizerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RecognizerBase {
        &mut self.base
    }

    fn kind(&self) -> RecognizerKind {
        RecognizerKind::Swipe
    }

    fn handle_touch_down(&mut self, event: &TouchEvent, cx: &mut Context<'_>) {
        if self.base.state() == RefereeState::Succeed || !self.base.track_down(event, cx) {
            return;
        }
        if self.base.state() == RefereeState::Ready && self.base.has_enough_fingers() {
            self.base.set_state(RefereeState::Detecting);
            self.down_time = event.time;
            self.down_location = self.base.touch_points.centroid().unwrap_or(event.position);
            self.prev_angle = None;
        }
    }

    fn handle_touch_move(&mut self, event: &TouchEvent, cx: &mut Context<'_>) {
        if !self.base.touch_points.update(event) || self.base.state() != RefereeState::Detecting {
            return;
        }
        let Some(centroid) = self.base.touch_points.centroid() else {
            return;
        };
        let offset = centroid - self.down_location;
        if offset.hypot() == 0.0 {
            return;
        }
        let angle = offset.atan2().to_degrees();
        if !self.check_angle(angle) {
            log::debug!("swipe {:?} left its axis at {angle}°", cx.id());
            cx.adjudicate(GestureDisposal::Reject);
            return;
        }
        self.prev_angle = Some(angle);
    }

    fn handle_touch_up(&mut self, event: &TouchEvent, cx: &mut Context<'_>) {
        if !self.base.touch_points.is_active(event.id) {
            return;
        }
        self.base.touch_points.update(event);
        let centroid = self.base.touch_points.centroid();
        self.base.touch_points.lift(event);
        if self.base.state() != RefereeState::Detecting {
            return;
        }
        let offset = centroid.map_or(Vec2::ZERO, |c| c - self.down_location);
        self.decide(offset, event.time, cx);
    }

    fn handle_axis_event(&mut self, event: &AxisEvent, cx: &mut Context<'_>) {
        match event.action {
            AxisAction::Begin => {
                if self.base.state() == RefereeState::Ready {
                    self.base.set_state(RefereeState::Detecting);
                    self.down_time = event.time;
                    self.axis_offset = Vec2::ZERO;
                    self.prev_angle = None;
                }
            }
            AxisAction::Update | AxisAction::None => {
                if self.base.state() == RefereeState::Detecting {
                    self.axis_offset += Vec2::new(event.horizontal_axis, event.vertical_axis);
                }
            }
            AxisAction::End => {
                if self.base.state() == RefereeState::Detecting {
                    self.decide(self.axis_offset, event.time, cx);
                }
            }
            AxisAction::Cancel => cx.adjudicate(GestureDisposal::Reject),
        }
    }

    fn on_accepted(&mut self, _cx: &mut Context<'_>) {
        let event = self.gesture_event();
        self.base.callbacks.fire_action(&event);
    }

    fn on_reset_status(&mut self) {
        self.down_time = 0;
        self.down_location = Point::ZERO;
        self.prev_angle = None;
        self.result_speed = 0.0;
        self.result_angle = 0.0;
        self.axis_offset = Vec2::ZERO;
    }

    fn gesture_event(&self) -> GestureEvent {
        GestureEvent {
            angle: self.result_angle,
            speed: self.result_speed,
            ..self.base.make_event()
        }
    }

    fn config_matches(&self, other: &Self) -> bool {
        self.base.fingers() == other.base.fingers()
            && self.direction == other.direction
            && self.speed == other.speed
            && self.base.priority_mask() == other.base.priority_mask()
    }

    fn copy_live_state(&mut self, other: &Self) {
        self.down_time = other.down_time;
        self.down_location = other.down_location;
        self.prev_angle = other.prev_angle;
        self.result_speed = other.result_speed;
        self.result_angle = other.result_angle;
        self.axis_offset = other.axis_offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::RecognizerTree;
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use core::cell::Cell;

    fn swipe(tree: &mut RecognizerTree, end_time: u64) -> crate::arena::RecognizerId {
        let id = tree.insert(SwipeRecognizer::new(1, SwipeDirection::HORIZONTAL, 100.0));
        tree.handle_touch_event(&TouchEvent::down(0, Point::new(0.0, 0.0), 0), &[id]);
        tree.handle_touch_event(
            &TouchEvent::moved(0, Point::new(100.0, 2.0), end_time / 2),
            &[],
        );
        tree.handle_touch_event(&TouchEvent::up(0, Point::new(200.0, 4.0), end_time), &[]);
        id
    }

    #[test]
    fn fast_horizontal_swipe_succeeds() {
        let mut tree = RecognizerTree::default();
        let id = swipe(&mut tree, 100);
        assert_eq!(tree.state(id), Some(RefereeState::Succeed));
    }

    #[test]
    fn slow_swipe_fails() {
        let mut tree = RecognizerTree::default();
        let id = swipe(&mut tree, 10_000);
        assert_eq!(tree.state(id), Some(RefereeState::Fail));
    }

    #[test]
    fn angle_bands() {
        let mut h = SwipeRecognizer::new(1, SwipeDirection::HORIZONTAL, 0.0);
        assert!(h.check_angle(10.0));
        assert!(h.check_angle(-170.0));
        assert!(!h.check_angle(80.0));
        let v = SwipeRecognizer::new(1, SwipeDirection::VERTICAL, 0.0);
        assert!(v.check_angle(90.0));
        assert!(v.check_angle(-100.0));
        assert!(!v.check_angle(5.0));
        let none = SwipeRecognizer::new(1, SwipeDirection::empty(), 0.0);
        assert!(!none.check_angle(0.0));
        let mut all = SwipeRecognizer::new(1, SwipeDirection::ALL, 0.0);
        assert!(all.check_angle(33.0));
        all.prev_angle = Some(0.0);
        assert!(!all.check_angle(60.0));
        h.prev_angle = Some(179.0);
        assert!(h.check_angle(-179.0));
        h.prev_angle = Some(170.0);
        assert!(!h.check_angle(-100.0));
    }

    #[test]
    fn vertical_motion_rejects_horizontal_swipe_early() {
        let mut tree = RecognizerTree::default();
        let id = tree.insert(SwipeRecognizer::new(1, SwipeDirection::HORIZONTAL, 100.0));
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[id]);
        tree.handle_touch_event(&TouchEvent::moved(0, Point::new(0.0, 50.0), 10), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Fail));
    }

    #[test]
    fn axis_swipe_reports_speed() {
        let mut tree = RecognizerTree::default();
        let mut sw = SwipeRecognizer::new(1, SwipeDirection::VERTICAL, 0.0);
        let speed = Rc::new(Cell::new(0.0));
        let s = speed.clone();
        sw.base_mut().callbacks_mut().on_action = Some(Box::new(move |e| s.set(e.speed)));
        let id = tree.insert(sw);
        let at = Point::ZERO;
        tree.handle_axis_event(&AxisEvent::new(AxisAction::Begin, 0, at, 0), &[id]);
        tree.handle_axis_event(
            &AxisEvent::new(AxisAction::Update, 0, at, 50).with_axes(0.0, 60.0),
            &[],
        );
        tree.handle_axis_event(&AxisEvent::new(AxisAction::End, 0, at, 100), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Succeed));
        assert!((speed.get() - 600.0).abs() < 1e-9);
    }

    #[test]
    fn leftward_swipe_survives_jitter_across_the_seam() {
        let mut tree = RecognizerTree::default();
        let id = tree.insert(SwipeRecognizer::new(1, SwipeDirection::HORIZONTAL, 100.0));
        tree.handle_touch_event(&TouchEvent::down(0, Point::new(0.0, 0.0), 0), &[id]);
        tree.handle_touch_event(&TouchEvent::moved(0, Point::new(-100.0, 1.0), 50), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Detecting));
        tree.handle_touch_event(&TouchEvent::up(0, Point::new(-200.0, -1.0), 100), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Succeed));
    }

    #[test]
    fn swipe_is_discrete_and_never_cancels() {
        let mut tree = RecognizerTree::default();
        let mut sw = SwipeRecognizer::new(1, SwipeDirection::HORIZONTAL, 100.0);
        let actions = Rc::new(Cell::new(0));
        let closings = Rc::new(Cell::new(0));
        let (a, e, c) = (actions.clone(), closings.clone(), closings.clone());
        let callbacks = sw.base_mut().callbacks_mut();
        callbacks.on_action = Some(Box::new(move |_| a.set(a.get() + 1)));
        callbacks.on_action_end = Some(Box::new(move |_| e.set(e.get() + 1)));
        callbacks.on_action_cancel = Some(Box::new(move |_| c.set(c.get() + 1)));
        let id = tree.insert(sw);
        tree.handle_touch_event(&TouchEvent::down(0, Point::new(0.0, 0.0), 0), &[id]);
        tree.handle_touch_event(&TouchEvent::up(0, Point::new(200.0, 0.0), 100), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Succeed));

        tree.reject_member(id);
        assert_eq!(tree.state(id), Some(RefereeState::Fail));
        assert_eq!((actions.get(), closings.get()), (1, 0));
    }
}
