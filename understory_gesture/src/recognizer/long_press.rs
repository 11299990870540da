// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Long press recognition.

use super::{Context, DeadlineKind, GestureRecognizer, RecognizerBase};
use crate::event::AccessibilityEventType;
use crate::settings::clamp_fingers;
use crate::types::{GestureDisposal, RecognizerKind, RefereeState, TouchEvent};

/// Long press recognizer.
///
/// Accepts once the configured fingers have been held for `duration` milliseconds without
/// moving beyond the long-press slop. With `repeat`, the action fires again every repeat
/// interval while the fingers stay down.
#[derive(Debug)]
pub struct LongPressRecognizer {
    base: RecognizerBase,
    duration: i32,
    repeat: bool,
    ended: bool,
}

impl LongPressRecognizer {
    /// Create a recognizer. A `duration` of zero or less uses the settings' default.
    pub fn new(fingers: i32, repeat: bool, duration: i32) -> Self {
        Self {
            base: RecognizerBase::new(clamp_fingers(fingers)),
            duration,
            repeat,
            ended: false,
        }
    }

    /// Configured hold time; zero or less means the default.
    pub fn duration(&self) -> i32 {
        self.duration
    }

    /// Whether the action repeats while held.
    pub fn repeat(&self) -> bool {
        self.repeat
    }

    fn hold_time(&self, cx: &Context<'_>) -> u64 {
        u64::try_from(self.duration)
            .ok()
            .filter(|&d| d > 0)
            .unwrap_or(cx.settings().long_press_duration)
    }

    fn fire(&mut self, repeat: bool) {
        let mut event = self.gesture_event();
        event.repeat = repeat;
        self.base.callbacks.fire_action(&event);
    }
}

impl GestureRecognizer for LongPressRecognizer {
    fn base(&self) -> &RecognizerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RecognizerBase {
        &mut self.base
    }

    fn kind(&self) -> RecognizerKind {
        RecognizerKind::LongPress
    }

    fn handle_touch_down(&mut self, event: &TouchEvent, cx: &mut Context<'_>) {
        if self.base.state() == RefereeState::Succeed {
            return;
        }
        if !self.base.track_down(event, cx) {
            return;
        }
        if self.base.state() == RefereeState::Ready {
            self.base.set_state(RefereeState::Detecting);
        }
        if self.base.touch_points.active_count() == self.base.finger_count() {
            let delay = self.hold_time(cx);
            cx.schedule(DeadlineKind::LongPress, delay);
        }
    }

    fn handle_touch_move(&mut self, event: &TouchEvent, cx: &mut Context<'_>) {
        if !self.base.touch_points.update(event) || self.base.state() == RefereeState::Succeed {
            return;
        }
        if self.base.touch_points.max_displacement() > cx.settings().long_press_slop {
            log::debug!("long press {:?} moved beyond slop", cx.id());
            cx.adjudicate(GestureDisposal::Reject);
        }
    }

    fn handle_touch_up(&mut self, event: &TouchEvent, cx: &mut Context<'_>) {
        if !self.base.touch_points.lift(event) {
            return;
        }
        if self.base.state() == RefereeState::Succeed {
            if self.base.touch_points.active_count() == 0 && !self.ended {
                self.ended = true;
                cx.cancel(DeadlineKind::Repeat);
                let event = self.gesture_event();
                self.base.callbacks.fire_end(&event);
            }
        } else {
            log::debug!("long press {:?} lifted early", cx.id());
            cx.adjudicate(GestureDisposal::Reject);
        }
    }

    fn handle_overdue_deadline(&mut self, kind: DeadlineKind, cx: &mut Context<'_>) {
        match kind {
            DeadlineKind::LongPress => {
                if self.base.state() == RefereeState::Detecting && self.base.has_enough_fingers() {
                    cx.adjudicate(GestureDisposal::Accept);
                }
            }
            DeadlineKind::Repeat => {
                if self.repeat && self.base.state() == RefereeState::Succeed {
                    self.fire(true);
                    cx.schedule(
                        DeadlineKind::Repeat,
                        cx.settings().long_press_repeat_interval,
                    );
                }
            }
            _ => {}
        }
    }

    fn on_accepted(&mut self, cx: &mut Context<'_>) {
        self.ended = false;
        cx.cancel(DeadlineKind::LongPress);
        self.fire(false);
        self.base
            .callbacks
            .fire_accessibility(AccessibilityEventType::LongPress);
        if self.repeat {
            cx.schedule(
                DeadlineKind::Repeat,
                cx.settings().long_press_repeat_interval,
            );
        }
    }

    fn on_rejected(&mut self, _cx: &mut Context<'_>) {
        if self.base.state() == RefereeState::Succeed && !self.ended {
            self.ended = true;
            let event = self.gesture_event();
            self.base.callbacks.fire_cancel(&event);
        }
    }

    fn on_reset_status(&mut self) {
        self.ended = false;
    }

    fn config_matches(&self, other: &Self) -> bool {
        self.base.fingers() == other.base.fingers()
            && self.duration == other.duration
            && self.repeat == other.repeat
            && self.base.priority_mask() == other.base.priority_mask()
    }

    fn copy_live_state(&mut self, other: &Self) {
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
    use kurbo::Point;

    fn recording(lp: &mut LongPressRecognizer) -> Rc<RefCell<Vec<(&'static str, bool)>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let cb = lp.base_mut().callbacks_mut();
        let l = log.clone();
        cb.on_action = Some(Box::new(move |e| l.borrow_mut().push(("action", e.repeat))));
        let l = log.clone();
        cb.on_action_end = Some(Box::new(move |_| l.borrow_mut().push(("end", false))));
        let l = log.clone();
        cb.on_action_cancel = Some(Box::new(move |_| l.borrow_mut().push(("cancel", false))));
        log
    }

    #[test]
    fn zero_duration_uses_default() {
        let mut tree = RecognizerTree::default();
        let id = tree.insert(LongPressRecognizer::new(1, false, 0));
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[id]);
        tree.advance_to(499);
        assert_eq!(tree.state(id), Some(RefereeState::Detecting));
        tree.advance_to(500);
        assert_eq!(tree.state(id), Some(RefereeState::Succeed));
    }

    #[test]
    fn early_lift_fails() {
        let mut tree = RecognizerTree::default();
        let id = tree.insert(LongPressRecognizer::new(1, false, 300));
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[id]);
        tree.handle_touch_event(&TouchEvent::up(0, Point::ZERO, 100), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Fail));
        tree.advance_to(1000);
        assert_eq!(tree.state(id), Some(RefereeState::Fail));
    }

    #[test]
    fn movement_beyond_slop_fails() {
        let mut tree = RecognizerTree::default();
        let id = tree.insert(LongPressRecognizer::new(1, false, 300));
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[id]);
        tree.handle_touch_event(&TouchEvent::moved(0, Point::new(20.0, 0.0), 50), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Fail));
    }

    #[test]
    fn repeat_fires_until_lift() {
        let mut tree = RecognizerTree::default();
        let mut lp = LongPressRecognizer::new(1, true, 200);
        let log = recording(&mut lp);
        let id = tree.insert(lp);
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[id]);
        tree.advance_to(200);
        tree.advance_to(500);
        tree.advance_to(800);
        tree.handle_touch_event(&TouchEvent::up(0, Point::ZERO, 900), &[]);
        tree.advance_to(2000);
        assert_eq!(
            &*log.borrow(),
            &[
                ("action", false),
                ("action", true),
                ("action", true),
                ("end", false)
            ]
        );
    }

    #[test]
    fn cancel_after_success_fires_cancel() {
        let mut tree = RecognizerTree::default();
        let mut lp = LongPressRecognizer::new(1, false, 100);
        let log = recording(&mut lp);
        let id = tree.insert(lp);
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[id]);
        tree.advance_to(150);
        tree.handle_touch_event(&TouchEvent::cancel(0, Point::ZERO, 160), &[]);
        assert_eq!(tree.state(id), Some(RefereeState::Fail));
        assert_eq!(&*log.borrow(), &[("action", false), ("cancel", false)]);
    }

    #[test]
    fn ended_press_is_not_cancelled_afterwards() {
        let mut tree = RecognizerTree::default();
        let mut lp = LongPressRecognizer::new(1, false, 100);
        let log = recording(&mut lp);
        let id = tree.insert(lp);
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[id]);
        tree.advance_to(150);
        tree.handle_touch_event(&TouchEvent::up(0, Point::ZERO, 160), &[]);
        tree.reject_member(id);
        assert_eq!(tree.state(id), Some(RefereeState::Fail));
        assert_eq!(&*log.borrow(), &[("action", false), ("end", false)]);
    }
}
