// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tap/click recognition with multi-finger and multi-tap support.
//!
//! A tap completes when exactly the configured number of fingers went down (within the
//! multi-finger timeout) and all of them lifted without exceeding the slop. After `count`
//! taps, each starting within the multi-tap timeout of the previous one, the recognizer
//! accepts. Intermediate taps leave it [`Pending`](crate::types::RefereeState::Pending).

use kurbo::Point;

use super::{Context, DeadlineKind, GestureRecognizer, RecognizerBase};
use crate::event::AccessibilityEventType;
use crate::settings::clamp_fingers;
use crate::types::{GestureDisposal, RecognizerKind, RefereeState, TouchEvent};

/// Tap/click recognizer.
#[derive(Debug)]
pub struct ClickRecognizer {
    base: RecognizerBase,
    count: i32,
    distance_threshold: f64,
    tapped_count: i32,
    equals_to_fingers: bool,
    current_touch_points_num: i32,
    focus: Point,
    first_tap_focus: Option<Point>,
}

impl ClickRecognizer {
    /// Create a recognizer for `count` taps of `fingers` fingers.
    ///
    /// `fingers` outside `[1, MAX_FINGERS]` becomes `1`. `count` is kept as given; a count
    /// of zero or less never completes. A `distance_threshold` of zero or less means movement
    /// is not limited beyond the default slops.
    pub fn new(fingers: i32, count: i32, distance_threshold: f64) -> Self {
        Self {
            base: RecognizerBase::new(clamp_fingers(fingers)),
            count,
            distance_threshold: if distance_threshold <= 0.0 {
                f64::INFINITY
            } else {
                distance_threshold
            },
            tapped_count: 0,
            equals_to_fingers: false,
            current_touch_points_num: 0,
            focus: Point::ZERO,
            first_tap_focus: None,
        }
    }

    /// Required number of taps.
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Movement limit; infinite when unlimited.
    pub fn distance_threshold(&self) -> f64 {
        self.distance_threshold
    }

    /// Taps completed so far in this occurrence.
    pub fn tapped_count(&self) -> i32 {
        self.tapped_count
    }

    /// Whether the configured number of fingers landed during the current tap.
    pub fn equals_to_fingers(&self) -> bool {
        self.equals_to_fingers
    }

    /// Centroid of the fingers of the current tap.
    pub fn focus(&self) -> Point {
        self.focus
    }

    fn slop(&self, cx: &Context<'_>) -> f64 {
        if self.tapped_count > 0 {
            cx.settings().multi_tap_slop.min(self.distance_threshold)
        } else if self.distance_threshold.is_finite() || self.count <= 1 {
            self.distance_threshold
        } else {
            cx.settings().tap_slop
        }
    }

    fn exceed_slop(&self, cx: &Context<'_>) -> bool {
        self.base.touch_points.max_displacement() > self.slop(cx)
    }

    fn reject(&self, cx: &mut Context<'_>, why: &str) {
        log::debug!("click {:?} rejected: {why}", cx.id());
        cx.adjudicate(GestureDisposal::Reject);
    }
}

impl GestureRecognizer for ClickRecognizer {
    fn base(&self) -> &RecognizerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RecognizerBase {
        &mut self.base
    }

    fn kind(&self) -> RecognizerKind {
        RecognizerKind::Click
    }

    fn handle_touch_down(&mut self, event: &TouchEvent, cx: &mut Context<'_>) {
        if self.base.state() == RefereeState::Succeed {
            return;
        }
        if !self
            .base
            .is_point_in_region(event.position, self.distance_threshold)
        {
            self.reject(cx, "down outside the hit region");
            return;
        }
        if self.base.touch_points.insert_down(event) {
            self.current_touch_points_num += 1;
        }
        if self.current_touch_points_num > self.base.fingers() {
            if self.base.is_limit_finger_count() {
                self.reject(cx, "too many fingers");
            }
            return;
        }
        if self.base.state() == RefereeState::Ready {
            self.base.set_state(RefereeState::Detecting);
        }
        cx.cancel(DeadlineKind::Tap);
        if self.base.fingers() > 1 && self.current_touch_points_num == 1 {
            cx.schedule(DeadlineKind::Finger, cx.settings().multi_finger_timeout);
        }
        if self.current_touch_points_num == self.base.fingers() {
            self.equals_to_fingers = true;
            cx.cancel(DeadlineKind::Finger);
            self.focus = self.base.touch_points.centroid().unwrap_or(event.position);
            if self.tapped_count > 0
                && let Some(first) = self.first_tap_focus
                && first.distance(self.focus) > cx.settings().multi_tap_slop
            {
                self.reject(cx, "next tap too far from the first");
            }
        }
    }

    fn handle_touch_move(&mut self, event: &TouchEvent, cx: &mut Context<'_>) {
        if self.base.state() == RefereeState::Succeed || !self.base.touch_points.update(event) {
            return;
        }
        if self.exceed_slop(cx) {
            self.reject(cx, "moved beyond slop");
        }
    }

    fn handle_touch_up(&mut self, event: &TouchEvent, cx: &mut Context<'_>) {
        if !self.base.touch_points.is_active(event.id) {
            return;
        }
        if self.base.state() == RefereeState::Succeed {
            self.base.touch_points.lift(event);
            return;
        }
        self.base.touch_points.update(event);
        let exceeded = self.exceed_slop(cx);
        self.base.touch_points.lift(event);
        if exceeded {
            self.reject(cx, "moved beyond slop");
            return;
        }
        if self.base.touch_points.active_count() > 0 {
            return;
        }
        if !self.equals_to_fingers {
            self.reject(cx, "finger count not reached");
            return;
        }
        self.tapped_count += 1;
        self.equals_to_fingers = false;
        self.current_touch_points_num = 0;
        self.first_tap_focus.get_or_insert(self.focus);
        log::trace!(
            "click {:?} tap {}/{}",
            cx.id(),
            self.tapped_count,
            self.count
        );
        if self.tapped_count == self.count {
            cx.adjudicate(GestureDisposal::Accept);
        } else if self.tapped_count < self.count {
            cx.schedule(DeadlineKind::Tap, cx.settings().multi_tap_timeout);
            cx.adjudicate(GestureDisposal::Pending);
        } else {
            self.reject(cx, "tap count can never be reached");
        }
    }

    fn handle_overdue_deadline(&mut self, kind: DeadlineKind, cx: &mut Context<'_>) {
        match kind {
            DeadlineKind::Finger if !self.equals_to_fingers => {
                self.reject(cx, "fingers did not land in time");
            }
            DeadlineKind::Tap if self.tapped_count < self.count => {
                self.reject(cx, "next tap did not start in time");
            }
            _ => {}
        }
    }

    fn on_accepted(&mut self, cx: &mut Context<'_>) {
        cx.cancel(DeadlineKind::Tap);
        cx.cancel(DeadlineKind::Finger);
        let event = self.gesture_event();
        self.base.callbacks.fire_action(&event);
        self.base
            .callbacks
            .fire_accessibility(AccessibilityEventType::Click);
    }

    fn on_reset_status(&mut self) {
        self.tapped_count = 0;
        self.equals_to_fingers = false;
        self.current_touch_points_num = 0;
        self.focus = Point::ZERO;
        self.first_tap_focus = None;
    }

    fn config_matches(&self, other: &Self) -> bool {
        self.base.fingers() == other.base.fingers()
            && self.count == other.count
            && self.distance_threshold == other.distance_threshold
            && self.base.priority_mask() == other.base.priority_mask()
    }

    fn copy_live_state(&mut self, other: &Self) {
        self.tapped_count = other.tapped_count;
        self.equals_to_fingers = other.equals_to_fingers;
        self.current_touch_points_num = other.current_touch_points_num;
        self.focus = other.focus;
        self.first_tap_focus = other.first_tap_focus;
    }
}
