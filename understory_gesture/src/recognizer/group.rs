// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recognizer groups: sequence, parallel and exclusive composition.
//!
//! ## Overview
//!
//! A [`RecognizerGroup`] is a node whose children are other nodes of the same
//! [`RecognizerTree`]. The group stands in the referee's scope for all of them: children report
//! their verdicts to the group, and the group reports its own verdict upward.
//!
//! - [`GroupMode::Exclusive`]: children compete, earlier children first. The first child to be
//!   accepted wins and the others fail. A later child that wants to accept while an earlier one
//!   is still pending waits (`SucceedBlocked`) until the earlier one fails.
//! - [`GroupMode::Sequence`]: children must succeed one after another. Only the current child
//!   receives new input; when it succeeds the next one takes over, starting with a Down for
//!   every finger still on the screen. Children that already succeeded keep receiving the Up
//!   or Cancel of the fingers they track. Between children the next one must see a Down
//!   within the sequence timeout.
//! - [`GroupMode::Parallel`]: every child receives every sample and succeeds on its own.
//!
//! The composition logic needs access to the children, so it is implemented on the tree.

use alloc::vec::Vec;

use super::{DeadlineKind, RecognizerBase};
use crate::arena::RecognizerId;
use crate::recognizer::Recognizer;
use crate::tree::RecognizerTree;
use crate::types::{
    AxisAction, AxisEvent, GestureDisposal, RefereeState, TouchEvent, TouchType,
};

/// How a group combines its children.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GroupMode {
    /// Children succeed in order.
    Sequence,
    /// Children succeed independently.
    Parallel,
    /// At most one child succeeds.
    Exclusive,
    /// Reserved marker; cannot form a group.
    Begin,
    /// Reserved marker; cannot form a group.
    End,
}

/// Position of a sequence group among its children.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SequenceCursor {
    /// No Down seen yet.
    #[default]
    NotStarted,
    /// Index of the child currently receiving input.
    Active(usize),
    /// The last child has been handed the win.
    Exhausted,
}

/// A node combining other nodes.
#[derive(Debug)]
pub struct RecognizerGroup {
    base: RecognizerBase,
    mode: GroupMode,
    children: Vec<Option<RecognizerId>>,
    cursor: SequenceCursor,
    active_child: Option<RecognizerId>,
    pending_accepts: Vec<RecognizerId>,
}

impl RecognizerGroup {
    /// Create an empty group. [`GroupMode::Begin`] and [`GroupMode::End`] yield `None`.
    pub fn new(mode: GroupMode) -> Option<Self> {
        match mode {
            GroupMode::Begin | GroupMode::End => None,
            _ => Some(Self {
                base: RecognizerBase::new(1),
                mode,
                children: Vec::new(),
                cursor: SequenceCursor::NotStarted,
                active_child: None,
                pending_accepts: Vec::new(),
            }),
        }
    }

    /// Shared state.
    pub fn base(&self) -> &RecognizerBase {
        &self.base
    }

    /// Shared state.
    pub fn base_mut(&mut self) -> &mut RecognizerBase {
        &mut self.base
    }

    /// Composition mode.
    pub fn mode(&self) -> GroupMode {
        self.mode
    }

    /// Child slots in order. Removed children leave `None`.
    pub fn children(&self) -> &[Option<RecognizerId>] {
        &self.children
    }

    /// Sequence position. Always [`SequenceCursor::NotStarted`] for other modes.
    pub fn cursor(&self) -> SequenceCursor {
        self.cursor
    }

    /// The child that claimed an exclusive group.
    pub fn active_child(&self) -> Option<RecognizerId> {
        self.active_child
    }

    /// Whether `id` is one of the children.
    pub fn existed(&self, id: RecognizerId) -> bool {
        self.children.contains(&Some(id))
    }

    pub(crate) fn live_children(&self) -> Vec<RecognizerId> {
        self.children.iter().flatten().copied().collect()
    }

    pub(crate) fn push_child(&mut self, id: RecognizerId) {
        self.children.push(Some(id));
    }

    pub(crate) fn detach(&mut self, id: RecognizerId) {
        for slot in &mut self.children {
            if *slot == Some(id) {
                *slot = None;
            }
        }
        if self.active_child == Some(id) {
            self.active_child = None;
        }
        self.pending_accepts.retain(|c| *c != id);
    }

    pub(crate) fn reset_composition(&mut self) {
        self.cursor = SequenceCursor::NotStarted;
        self.active_child = None;
        self.pending_accepts.clear();
    }

    /// Take over `other`'s in-flight state. Child ids are mapped by position.
    pub(crate) fn copy_live_state(&mut self, other: &Self) {
        self.base.copy_live_state(&other.base);
        self.cursor = other.cursor;
        let map = |id: RecognizerId| {
            other
                .children
                .iter()
                .position(|c| *c == Some(id))
                .and_then(|i| self.children.get(i).copied().flatten())
        };
        self.active_child = other.active_child.and_then(map);
        self.pending_accepts = other.pending_accepts.iter().filter_map(|&c| map(c)).collect();
    }

    fn current_child(&self) -> Option<RecognizerId> {
        let live = self.live_children();
        match self.cursor {
            SequenceCursor::NotStarted => None,
            SequenceCursor::Active(i) => live.get(i).copied(),
            SequenceCursor::Exhausted => live.last().copied(),
        }
    }
}

impl RecognizerTree {
    fn group(&self, id: RecognizerId) -> Option<&RecognizerGroup> {
        self.get(id).and_then(Recognizer::as_group)
    }

    pub(crate) fn group_mut(&mut self, id: RecognizerId) -> Option<&mut RecognizerGroup> {
        self.get_mut(id).and_then(Recognizer::as_group_mut)
    }

    fn state_of(&self, id: RecognizerId) -> RefereeState {
        self.state(id).unwrap_or(RefereeState::Fail)
    }

    /// Children that should see the current sample.
    fn forward_targets(&self, id: RecognizerId) -> Vec<RecognizerId> {
        let Some(group) = self.group(id) else {
            return Vec::new();
        };
        match group.mode {
            GroupMode::Sequence => group.current_child().into_iter().collect(),
            _ => group
                .live_children()
                .into_iter()
                .filter(|&c| self.state_of(c) != RefereeState::Fail)
                .collect(),
        }
    }

    /// Earlier sequence children that succeeded and still track `touch_id`.
    fn sequence_holders(&self, id: RecognizerId, touch_id: i32) -> Vec<RecognizerId> {
        let Some(group) = self.group(id) else {
            return Vec::new();
        };
        let live = group.live_children();
        let done = match group.cursor {
            SequenceCursor::NotStarted => 0,
            SequenceCursor::Active(i) => i,
            SequenceCursor::Exhausted => live.len().saturating_sub(1),
        };
        live.into_iter()
            .take(done)
            .filter(|&c| {
                self.state_of(c) == RefereeState::Succeed
                    && self
                        .get(c)
                        .is_some_and(|r| r.base().touch_points().is_active(touch_id))
            })
            .collect()
    }

    /// Replay the fingers held on the group as Down samples into the next sequence child.
    fn hand_over_fingers(&mut self, id: RecognizerId, next: RecognizerId) {
        let Some(group) = self.group(id) else {
            return;
        };
        let clock = self.clock;
        let held: Vec<TouchEvent> = group
            .base
            .touch_points
            .active_points()
            .map(|p| TouchEvent {
                kind: TouchType::Down,
                time: clock,
                ..p.clone()
            })
            .collect();
        for event in held {
            log::trace!("sequence {id:?} hands touch {} to {next:?}", event.id);
            self.deliver_touch(next, &event);
        }
    }

    pub(crate) fn group_deliver_touch(&mut self, id: RecognizerId, event: &TouchEvent) {
        let mode = {
            let Some(group) = self.group_mut(id) else {
                return;
            };
            let base = &mut group.base;
            if !base.is_enabled() {
                return;
            }
            if base.state() == RefereeState::Fail {
                if matches!(event.kind, TouchType::Up | TouchType::Cancel) {
                    base.touch_points.lift(event);
                }
                return;
            }
            base.record_touch(event);
            match event.kind {
                TouchType::Down => {
                    base.touch_points.insert_down(event);
                    if base.state() == RefereeState::Ready {
                        base.set_state(RefereeState::Detecting);
                    }
                    if group.mode == GroupMode::Sequence
                        && group.cursor == SequenceCursor::NotStarted
                    {
                        group.cursor = SequenceCursor::Active(0);
                    }
                }
                TouchType::Move => {
                    base.touch_points.update(event);
                }
                TouchType::Up | TouchType::Cancel => {
                    base.touch_points.lift(event);
                }
                TouchType::Unknown => return,
            }
            group.mode
        };
        if mode == GroupMode::Sequence && event.kind == TouchType::Down {
            self.cancel_deadline(id, DeadlineKind::Sequence);
        }
        let mut targets = Vec::new();
        if mode == GroupMode::Sequence
            && matches!(event.kind, TouchType::Up | TouchType::Cancel)
        {
            targets = self.sequence_holders(id, event.id);
        }
        targets.extend(self.forward_targets(id));
        for child in targets {
            self.deliver_touch(child, event);
        }
        if mode == GroupMode::Sequence && event.kind == TouchType::Up {
            self.maybe_schedule_sequence_timeout(id);
        }
    }

    pub(crate) fn group_deliver_axis(&mut self, id: RecognizerId, event: &AxisEvent) {
        {
            let Some(group) = self.group_mut(id) else {
                return;
            };
            let base = &mut group.base;
            if !base.is_enabled() || base.state() == RefereeState::Fail {
                return;
            }
            base.record_axis(event);
            if event.action == AxisAction::Begin {
                if base.state() == RefereeState::Ready {
                    base.set_state(RefereeState::Detecting);
                }
                if group.mode == GroupMode::Sequence
                    && group.cursor == SequenceCursor::NotStarted
                {
                    group.cursor = SequenceCursor::Active(0);
                }
            }
        }
        for child in self.forward_targets(id) {
            self.deliver_axis(child, event);
        }
    }

    fn maybe_schedule_sequence_timeout(&mut self, id: RecognizerId) {
        let Some(group) = self.group(id) else {
            return;
        };
        if group.base.touch_points.active_count() > 0 || group.base.state().is_terminal() {
            return;
        }
        let SequenceCursor::Active(i) = group.cursor else {
            return;
        };
        if i == 0 {
            return;
        }
        let waiting = group
            .current_child()
            .is_some_and(|c| self.state_of(c) == RefereeState::Ready);
        if waiting {
            let at = self.clock.saturating_add(self.settings.sequence_timeout);
            self.schedule_deadline(id, DeadlineKind::Sequence, at);
        }
    }

    pub(crate) fn group_handle_deadline(&mut self, id: RecognizerId, kind: DeadlineKind) {
        if kind == DeadlineKind::Sequence && !self.state_of(id).is_terminal() {
            log::debug!("sequence {id:?} timed out waiting for its next gesture");
            self.apply_disposal(id, GestureDisposal::Reject);
        }
    }

    fn earlier_sibling_pending(&self, children: &[RecognizerId], child: RecognizerId) -> bool {
        children
            .iter()
            .take_while(|&&c| c != child)
            .any(|&c| self.state_of(c) == RefereeState::Pending)
    }

    /// Route a child's verdict through its group.
    pub(crate) fn group_on_child_disposal(
        &mut self,
        id: RecognizerId,
        child: RecognizerId,
        disposal: GestureDisposal,
    ) {
        let Some(mode) = self.group(id).map(RecognizerGroup::mode) else {
            return;
        };
        if self.state_of(id) == RefereeState::Fail {
            if disposal != GestureDisposal::Reject {
                self.reject_member(child);
            }
            return;
        }
        match mode {
            GroupMode::Exclusive => self.exclusive_on_child(id, child, disposal),
            GroupMode::Sequence => self.sequence_on_child(id, child, disposal),
            GroupMode::Parallel => self.parallel_on_child(id, child, disposal),
            GroupMode::Begin | GroupMode::End => {}
        }
    }

    fn exclusive_on_child(
        &mut self,
        id: RecognizerId,
        child: RecognizerId,
        disposal: GestureDisposal,
    ) {
        let children = self
            .group(id)
            .map(RecognizerGroup::live_children)
            .unwrap_or_default();
        match disposal {
            GestureDisposal::Accept => {
                if self.state_of(id) == RefereeState::Succeed {
                    if self
                        .group(id)
                        .and_then(|g| g.active_child)
                        .is_none_or(|a| a == child)
                    {
                        self.accept_member(child);
                    }
                    return;
                }
                if self.earlier_sibling_pending(&children, child) {
                    self.set_state(child, RefereeState::SucceedBlocked);
                    return;
                }
                if let Some(group) = self.group_mut(id) {
                    group.active_child = Some(child);
                }
                self.set_state(child, RefereeState::Pending);
                for other in children.iter().copied().filter(|&c| c != child) {
                    self.reject_member(other);
                }
                self.apply_disposal(id, GestureDisposal::Accept);
            }
            GestureDisposal::Pending => {
                let state = if self.earlier_sibling_pending(&children, child) {
                    RefereeState::PendingBlocked
                } else {
                    RefereeState::Pending
                };
                self.set_state(child, state);
                self.apply_disposal(id, GestureDisposal::Pending);
            }
            GestureDisposal::Reject => {
                self.reject_member(child);
                let blocked = children.iter().copied().find(|&c| {
                    matches!(
                        self.state_of(c),
                        RefereeState::SucceedBlocked | RefereeState::PendingBlocked
                    )
                });
                if let Some(next) = blocked {
                    let retry = if self.state_of(next) == RefereeState::SucceedBlocked {
                        GestureDisposal::Accept
                    } else {
                        GestureDisposal::Pending
                    };
                    self.exclusive_on_child(id, next, retry);
                }
                if children.iter().all(|&c| self.state_of(c) == RefereeState::Fail) {
                    self.apply_disposal(id, GestureDisposal::Reject);
                }
            }
            GestureDisposal::None => {}
        }
    }

    fn sequence_on_child(
        &mut self,
        id: RecognizerId,
        child: RecognizerId,
        disposal: GestureDisposal,
    ) {
        let Some(group) = self.group(id) else {
            return;
        };
        let children = group.live_children();
        let cursor = group.cursor;
        match disposal {
            GestureDisposal::Accept => {
                let SequenceCursor::Active(i) = cursor else {
                    return;
                };
                if children.get(i) != Some(&child) {
                    log::trace!("sequence {id:?} ignores {child:?}: not its turn");
                    return;
                }
                if i + 1 < children.len() {
                    self.accept_member(child);
                    if let Some(group) = self.group_mut(id) {
                        group.cursor = SequenceCursor::Active(i + 1);
                    }
                    self.apply_disposal(id, GestureDisposal::Pending);
                    self.hand_over_fingers(id, children[i + 1]);
                } else {
                    self.set_state(child, RefereeState::Pending);
                    self.apply_disposal(id, GestureDisposal::Accept);
                }
            }
            GestureDisposal::Pending => {
                self.set_state(child, RefereeState::Pending);
                self.apply_disposal(id, GestureDisposal::Pending);
            }
            GestureDisposal::Reject => {
                self.reject_member(child);
                self.apply_disposal(id, GestureDisposal::Reject);
            }
            GestureDisposal::None => {}
        }
    }

    fn parallel_on_child(
        &mut self,
        id: RecognizerId,
        child: RecognizerId,
        disposal: GestureDisposal,
    ) {
        match disposal {
            GestureDisposal::Accept => {
                if self.state_of(id) == RefereeState::Succeed {
                    self.accept_member(child);
                    return;
                }
                if let Some(group) = self.group_mut(id)
                    && !group.pending_accepts.contains(&child)
                {
                    group.pending_accepts.push(child);
                }
                self.set_state(child, RefereeState::Pending);
                self.apply_disposal(id, GestureDisposal::Accept);
            }
            GestureDisposal::Pending => {
                self.set_state(child, RefereeState::Pending);
                self.apply_disposal(id, GestureDisposal::Pending);
            }
            GestureDisposal::Reject => {
                self.reject_member(child);
                let all_failed = self.group(id).is_some_and(|g| {
                    g.live_children()
                        .iter()
                        .all(|&c| self.state_of(c) == RefereeState::Fail)
                });
                if all_failed {
                    self.apply_disposal(id, GestureDisposal::Reject);
                }
            }
            GestureDisposal::None => {}
        }
    }

    /// Hand the group's win down to the children that earned it.
    pub(crate) fn group_on_accepted(&mut self, id: RecognizerId) {
        let Some(group) = self.group(id) else {
            return;
        };
        match group.mode {
            GroupMode::Exclusive => {
                let winner = group.active_child.or_else(|| {
                    group.live_children().into_iter().find(|&c| {
                        matches!(
                            self.state_of(c),
                            RefereeState::SucceedBlocked | RefereeState::Pending
                        )
                    })
                });
                if let Some(child) = winner {
                    self.accept_member(child);
                }
            }
            GroupMode::Sequence => {
                let current = group.current_child();
                if let Some(group) = self.group_mut(id) {
                    group.cursor = SequenceCursor::Exhausted;
                }
                if let Some(child) = current {
                    self.accept_member(child);
                }
            }
            GroupMode::Parallel => {
                let accepted = self
                    .group_mut(id)
                    .map(|g| core::mem::take(&mut g.pending_accepts))
                    .unwrap_or_default();
                for child in accepted {
                    self.accept_member(child);
                }
            }
            GroupMode::Begin | GroupMode::End => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::{
        ClickRecognizer, GestureRecognizer, LongPressRecognizer, PanRecognizer,
    };
    use crate::types::PanDirection;
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;
    use kurbo::Point;

    fn group(
        tree: &mut RecognizerTree,
        mode: GroupMode,
        children: &[RecognizerId],
    ) -> RecognizerId {
        let g = tree.insert(RecognizerGroup::new(mode).unwrap());
        tree.add_children(g, children);
        g
    }

    #[test]
    fn begin_and_end_modes_cannot_form_groups() {
        assert!(RecognizerGroup::new(GroupMode::Begin).is_none());
        assert!(RecognizerGroup::new(GroupMode::End).is_none());
    }

    #[test]
    fn sequence_fails_when_long_press_is_not_held() {
        let mut tree = RecognizerTree::default();
        let tap = tree.insert(ClickRecognizer::new(1, 1, 0.0));
        let press = tree.insert(LongPressRecognizer::new(1, false, 500));
        let seq = group(&mut tree, GroupMode::Sequence, &[tap, press]);

        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[seq]);
        tree.handle_touch_event(&TouchEvent::up(0, Point::ZERO, 50), &[]);
        assert_eq!(tree.state(tap), Some(RefereeState::Succeed));
        assert_eq!(tree.state(seq), Some(RefereeState::Pending));
        let cursor = tree.get(seq).and_then(Recognizer::as_group).unwrap().cursor();
        assert_eq!(cursor, SequenceCursor::Active(1));

        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 100), &[seq]);
        tree.handle_touch_event(&TouchEvent::up(0, Point::ZERO, 300), &[]);
        assert_eq!(tree.state(press), Some(RefereeState::Fail));
        assert_eq!(tree.state(seq), Some(RefereeState::Fail));
    }

    #[test]
    fn sequence_succeeds_when_long_press_is_held() {
        let mut tree = RecognizerTree::default();
        let tap = tree.insert(ClickRecognizer::new(1, 1, 0.0));
        let mut press = LongPressRecognizer::new(1, false, 500);
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        press.base_mut().callbacks_mut().on_action = Some(Box::new(move |_| f.set(true)));
        let press = tree.insert(press);
        let seq = group(&mut tree, GroupMode::Sequence, &[tap, press]);

        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[seq]);
        tree.handle_touch_event(&TouchEvent::up(0, Point::ZERO, 50), &[]);
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 100), &[seq]);
        tree.advance_to(700);
        assert_eq!(tree.state(press), Some(RefereeState::Succeed));
        assert_eq!(tree.state(seq), Some(RefereeState::Succeed));
        assert!(fired.get());
        tree.handle_touch_event(&TouchEvent::up(0, Point::ZERO, 800), &[]);
        assert!(tree.referee().scope(0).is_none());
    }

    /// Count END and CANCEL callbacks of `press`.
    fn closings(press: &mut LongPressRecognizer) -> (Rc<Cell<u32>>, Rc<Cell<u32>>) {
        let ends = Rc::new(Cell::new(0));
        let cancels = Rc::new(Cell::new(0));
        let (e, c) = (ends.clone(), cancels.clone());
        let callbacks = press.base_mut().callbacks_mut();
        callbacks.on_action_end = Some(Box::new(move |_| e.set(e.get() + 1)));
        callbacks.on_action_cancel = Some(Box::new(move |_| c.set(c.get() + 1)));
        (ends, cancels)
    }

    #[test]
    fn held_finger_carries_from_long_press_into_pan() {
        let mut tree = RecognizerTree::default();
        let mut press = LongPressRecognizer::new(1, false, 500);
        let (ends, cancels) = closings(&mut press);
        let press = tree.insert(press);
        let pan = tree.insert(PanRecognizer::new(1, PanDirection::ALL, 5.0));
        let seq = group(&mut tree, GroupMode::Sequence, &[press, pan]);

        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[seq]);
        tree.advance_to(600);
        assert_eq!(tree.state(press), Some(RefereeState::Succeed));
        assert_eq!(tree.state(pan), Some(RefereeState::Detecting));

        tree.handle_touch_event(&TouchEvent::moved(0, Point::new(30.0, 0.0), 610), &[]);
        tree.handle_touch_event(&TouchEvent::moved(0, Point::new(60.0, 0.0), 620), &[]);
        assert_eq!(tree.state(pan), Some(RefereeState::Succeed));
        assert_eq!(tree.state(seq), Some(RefereeState::Succeed));

        tree.handle_touch_event(&TouchEvent::up(0, Point::new(60.0, 0.0), 630), &[]);
        tree.advance_to(5000);
        assert_eq!((ends.get(), cancels.get()), (1, 0));
        assert!(tree.referee().scope(0).is_none());
    }

    #[test]
    fn succeeded_long_press_still_sees_its_finger_lift() {
        let mut tree = RecognizerTree::default();
        let mut press = LongPressRecognizer::new(1, false, 500);
        let (ends, cancels) = closings(&mut press);
        let press = tree.insert(press);
        let tap = tree.insert(ClickRecognizer::new(1, 1, 0.0));
        let seq = group(&mut tree, GroupMode::Sequence, &[press, tap]);

        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[seq]);
        tree.advance_to(600);
        tree.handle_touch_event(&TouchEvent::up(0, Point::ZERO, 650), &[]);
        tree.advance_to(5000);
        assert_eq!((ends.get(), cancels.get()), (1, 0));
    }

    #[test]
    fn ended_long_press_does_not_cancel_when_the_sequence_fails_later() {
        let mut tree = RecognizerTree::default();
        let mut press = LongPressRecognizer::new(1, false, 500);
        let (ends, cancels) = closings(&mut press);
        let press = tree.insert(press);
        let double = tree.insert(ClickRecognizer::new(1, 2, 0.0));
        let seq = group(&mut tree, GroupMode::Sequence, &[press, double]);

        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[seq]);
        tree.advance_to(600);
        tree.handle_touch_event(&TouchEvent::up(0, Point::ZERO, 650), &[]);
        assert_eq!(ends.get(), 1);
        assert_eq!(tree.state(double), Some(RefereeState::Pending));

        tree.advance_to(5000);
        assert_eq!(tree.state(seq), Some(RefereeState::Fail));
        assert_eq!(tree.state(press), Some(RefereeState::Fail));
        assert_eq!((ends.get(), cancels.get()), (1, 0));
    }

    #[test]
    fn every_held_finger_carries_into_the_next_child() {
        let mut tree = RecognizerTree::default();
        let mut press = LongPressRecognizer::new(2, false, 500);
        let (ends, cancels) = closings(&mut press);
        let press = tree.insert(press);
        let pan = tree.insert(PanRecognizer::new(2, PanDirection::ALL, 5.0));
        let seq = group(&mut tree, GroupMode::Sequence, &[press, pan]);

        tree.handle_touch_event(&TouchEvent::down(0, Point::new(0.0, 0.0), 0), &[seq]);
        tree.handle_touch_event(&TouchEvent::down(1, Point::new(50.0, 0.0), 0), &[seq]);
        tree.advance_to(600);
        assert_eq!(tree.state(press), Some(RefereeState::Succeed));

        tree.handle_touch_event(&TouchEvent::moved(0, Point::new(30.0, 0.0), 610), &[]);
        tree.handle_touch_event(&TouchEvent::moved(1, Point::new(80.0, 0.0), 610), &[]);
        assert_eq!(tree.state(pan), Some(RefereeState::Succeed));
        let active = tree.get(pan).map(|r| r.base().touch_points().active_count());
        assert_eq!(active, Some(2));

        tree.handle_touch_event(&TouchEvent::up(0, Point::new(30.0, 0.0), 620), &[]);
        assert_eq!(ends.get(), 0);
        tree.handle_touch_event(&TouchEvent::up(1, Point::new(80.0, 0.0), 620), &[]);
        assert_eq!((ends.get(), cancels.get()), (1, 0));
    }

    #[test]
    fn sequence_timeout_saturates_near_the_end_of_time() {
        let mut tree = RecognizerTree::default();
        let tap = tree.insert(ClickRecognizer::new(1, 1, 0.0));
        let press = tree.insert(LongPressRecognizer::new(1, false, 500));
        let seq = group(&mut tree, GroupMode::Sequence, &[tap, press]);
        let t = u64::MAX - 100;
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, t), &[seq]);
        tree.handle_touch_event(&TouchEvent::up(0, Point::ZERO, t + 50), &[]);
        assert_eq!(tree.state(seq), Some(RefereeState::Pending));
        assert_eq!(tree.next_deadline(), Some(u64::MAX));
        tree.advance_to(u64::MAX);
        assert_eq!(tree.state(seq), Some(RefereeState::Fail));
    }

    #[test]
    fn sequence_times_out_between_gestures() {
        let mut tree = RecognizerTree::default();
        let tap = tree.insert(ClickRecognizer::new(1, 1, 0.0));
        let press = tree.insert(LongPressRecognizer::new(1, false, 500));
        let seq = group(&mut tree, GroupMode::Sequence, &[tap, press]);
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[seq]);
        tree.handle_touch_event(&TouchEvent::up(0, Point::ZERO, 50), &[]);
        tree.advance_to(50 + 300);
        assert_eq!(tree.state(seq), Some(RefereeState::Fail));
        assert_eq!(tree.state(press), Some(RefereeState::Fail));
    }

    #[test]
    fn exclusive_group_lets_one_child_win() {
        let mut tree = RecognizerTree::default();
        let tap = tree.insert(ClickRecognizer::new(1, 1, 0.0));
        let pan = tree.insert(PanRecognizer::new(1, PanDirection::ALL, 5.0));
        let ex = group(&mut tree, GroupMode::Exclusive, &[tap, pan]);
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[ex]);
        tree.handle_touch_event(&TouchEvent::moved(0, Point::new(30.0, 0.0), 10), &[]);
        assert_eq!(tree.state(tap), Some(RefereeState::Fail));
        assert_eq!(tree.state(pan), Some(RefereeState::Succeed));
        assert_eq!(tree.state(ex), Some(RefereeState::Succeed));
        let winner = tree.get(ex).and_then(Recognizer::as_group).unwrap().active_child();
        assert_eq!(winner, Some(pan));
    }

    #[test]
    fn exclusive_later_child_waits_for_pending_earlier_child() {
        let mut tree = RecognizerTree::default();
        let double = tree.insert(ClickRecognizer::new(1, 2, 0.0));
        let single = tree.insert(ClickRecognizer::new(1, 1, 0.0));
        let ex = group(&mut tree, GroupMode::Exclusive, &[double, single]);
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[ex]);
        tree.handle_touch_event(&TouchEvent::up(0, Point::ZERO, 20), &[]);
        assert_eq!(tree.state(double), Some(RefereeState::Pending));
        assert_eq!(tree.state(single), Some(RefereeState::SucceedBlocked));
        tree.advance_to(400);
        assert_eq!(tree.state(double), Some(RefereeState::Fail));
        assert_eq!(tree.state(single), Some(RefereeState::Succeed));
        assert_eq!(tree.state(ex), Some(RefereeState::Succeed));
    }

    #[test]
    fn parallel_children_succeed_together() {
        let mut tree = RecognizerTree::default();
        let tap = tree.insert(ClickRecognizer::new(1, 1, 0.0));
        let other = tree.insert(ClickRecognizer::new(1, 1, 0.0));
        let par = group(&mut tree, GroupMode::Parallel, &[tap, other]);
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[par]);
        tree.handle_touch_event(&TouchEvent::up(0, Point::ZERO, 20), &[]);
        assert_eq!(tree.state(par), Some(RefereeState::Succeed));
        assert_eq!(tree.state(tap), Some(RefereeState::Succeed));
        assert_eq!(tree.state(other), Some(RefereeState::Succeed));
    }

    #[test]
    fn parallel_group_fails_when_every_child_fails() {
        let mut tree = RecognizerTree::default();
        let a = tree.insert(ClickRecognizer::new(1, 1, 5.0));
        let b = tree.insert(ClickRecognizer::new(1, 1, 5.0));
        let par = group(&mut tree, GroupMode::Parallel, &[a, b]);
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[par]);
        tree.handle_touch_event(&TouchEvent::moved(0, Point::new(50.0, 0.0), 10), &[]);
        assert_eq!(tree.state(par), Some(RefereeState::Fail));
    }

    #[test]
    fn nested_groups_forward_input() {
        let mut tree = RecognizerTree::default();
        let tap = tree.insert(ClickRecognizer::new(1, 1, 0.0));
        let inner = group(&mut tree, GroupMode::Parallel, &[tap]);
        let outer = group(&mut tree, GroupMode::Exclusive, &[inner]);
        tree.handle_touch_event(&TouchEvent::down(0, Point::ZERO, 0), &[outer]);
        tree.handle_touch_event(&TouchEvent::up(0, Point::ZERO, 10), &[]);
        assert_eq!(
            vec![tree.state(outer), tree.state(inner), tree.state(tap)],
            vec![Some(RefereeState::Succeed); 3]
        );
    }
}
