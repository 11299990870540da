// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The recognizer tree: storage, dispatch, and the logical clock.
//!
//! ## Overview
//!
//! [`RecognizerTree`] owns every recognizer and group, the [referee](crate::referee), the
//! injected [`GestureSettings`], and a queue of pending deadlines. Hosts feed it input with
//! [`RecognizerTree::handle_touch_event`] / [`RecognizerTree::handle_axis_event`] and move
//! time forward with [`RecognizerTree::advance_to`].
//!
//! ## Dispatch
//!
//! - On Down, the host passes the top-level recognizers hit by the touch, innermost first.
//!   They become the members of the scope for that touch id.
//! - Every sample of that touch id is delivered to the scope's members in order.
//! - After each member handled the sample, the verdicts it requested are applied before the
//!   next member sees the sample.
//! - After Up or Cancel, the scope is closed (or closed later, if a member is still pending).
//!
//! Deadlines due at or before a sample's timestamp fire before the sample is delivered.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::arena::{Arena, RecognizerId};
use crate::recognizer::{
    Context, DeadlineKind, GestureRecognizer, Recognizer, Request, dispatch_axis, dispatch_touch,
};
use crate::referee::GestureReferee;
use crate::settings::GestureSettings;
use crate::types::{
    AxisAction, AxisEvent, GestureMask, GesturePriority, RecognizerKind, RefereeState, SourceType,
    TouchEvent, TouchType,
};

#[derive(Clone, Debug, PartialEq, Eq)]
struct Deadline {
    at: u64,
    seq: u64,
    id: RecognizerId,
    kind: DeadlineKind,
}

/// Recognizers, groups, referee and clock of one gesture host.
///
/// ```
/// use kurbo::Point;
/// use understory_gesture::recognizer::ClickRecognizer;
/// use understory_gesture::tree::RecognizerTree;
/// use understory_gesture::types::{RefereeState, TouchEvent};
///
/// let mut tree = RecognizerTree::default();
/// let tap = tree.insert(ClickRecognizer::new(1, 1, 0.0));
/// tree.handle_touch_event(&TouchEvent::down(0, Point::new(4.0, 4.0), 0), &[tap]);
/// tree.handle_touch_event(&TouchEvent::up(0, Point::new(4.0, 4.0), 30), &[]);
/// assert_eq!(tree.state(tap), Some(RefereeState::Succeed));
/// ```
#[derive(Debug)]
pub struct RecognizerTree {
    pub(crate) arena: Arena,
    pub(crate) referee: GestureReferee,
    pub(crate) settings: GestureSettings,
    pub(crate) clock: u64,
    deadlines: Vec<Deadline>,
    next_seq: u64,
    pub(crate) requests: VecDeque<Request>,
    source: Option<SourceType>,
}

impl Default for RecognizerTree {
    fn default() -> Self {
        Self::new(GestureSettings::default())
    }
}

impl RecognizerTree {
    /// Create an empty tree using `settings`.
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            arena: Arena::default(),
            referee: GestureReferee::default(),
            settings,
            clock: 0,
            deadlines: Vec::new(),
            next_seq: 0,
            requests: VecDeque::new(),
            source: None,
        }
    }

    /// Thresholds in use.
    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    /// Current logical time in milliseconds.
    pub fn now(&self) -> u64 {
        self.clock
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the tree holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The referee's scopes and links.
    pub fn referee(&self) -> &GestureReferee {
        &self.referee
    }

    /// Add a recognizer or group as a new top-level node.
    pub fn insert(&mut self, recognizer: impl Into<Recognizer>) -> RecognizerId {
        let id = self.arena.insert(recognizer.into());
        log::trace!("inserted {id:?}");
        id
    }

    /// Append `children` to `group`.
    ///
    /// Children that are stale, already have a parent, already belong to the group, or are
    /// ancestors of the group are skipped. Returns the number of children added.
    pub fn add_children(&mut self, group: RecognizerId, children: &[RecognizerId]) -> usize {
        let mut added = 0;
        for &child in children {
            if child == group || !self.arena.is_alive(child) || self.is_ancestor(child, group) {
                continue;
            }
            if self.parent(child).is_some() {
                log::warn!("{child:?} already belongs to a group");
                continue;
            }
            let Some(g) = self.group_mut(group) else {
                return added;
            };
            if g.existed(child) {
                continue;
            }
            g.push_child(child);
            if let Some(slot) = self.arena.get_mut(child) {
                slot.parent = Some(group);
            }
            added += 1;
        }
        added
    }

    /// Remove a node and, for groups, its whole subtree.
    ///
    /// The node's entry in its parent group is left as an empty slot.
    pub fn remove(&mut self, id: RecognizerId) -> bool {
        if !self.arena.is_alive(id) {
            return false;
        }
        if let Some(parent) = self.parent(id)
            && let Some(g) = self.group_mut(parent)
        {
            g.detach(id);
        }
        self.remove_subtree(id);
        true
    }

    fn remove_subtree(&mut self, id: RecognizerId) {
        self.cancel_all_deadlines(id);
        self.referee.forget(id);
        if let Some(slot) = self.arena.remove(id)
            && let Recognizer::Group(group) = slot.recognizer
        {
            for child in group.live_children() {
                self.remove_subtree(child);
            }
        }
    }

    /// Borrow a node.
    pub fn get(&self, id: RecognizerId) -> Option<&Recognizer> {
        self.arena.get(id).map(|s| &s.recognizer)
    }

    /// Borrow a node mutably, e.g. to install callbacks.
    pub fn get_mut(&mut self, id: RecognizerId) -> Option<&mut Recognizer> {
        self.arena.get_mut(id).map(|s| &mut s.recognizer)
    }

    /// Referee state of a node.
    pub fn state(&self, id: RecognizerId) -> Option<RefereeState> {
        self.get(id).map(Recognizer::state)
    }

    /// Enclosing group of a node.
    pub fn parent(&self, id: RecognizerId) -> Option<RecognizerId> {
        self.arena.get(id)?.parent
    }

    pub(crate) fn top_level(&self, mut id: RecognizerId) -> RecognizerId {
        while let Some(parent) = self.parent(id) {
            id = parent;
        }
        id
    }

    fn is_ancestor(&self, candidate: RecognizerId, mut id: RecognizerId) -> bool {
        while let Some(parent) = self.parent(id) {
            if parent == candidate {
                return true;
            }
            id = parent;
        }
        false
    }

    pub(crate) fn priority(&self, id: RecognizerId) -> GesturePriority {
        self.get(id)
            .map_or(GesturePriority::Low, |r| r.base().priority())
    }

    pub(crate) fn kind(&self, id: RecognizerId) -> Option<RecognizerKind> {
        self.get(id).map(Recognizer::kind)
    }

    pub(crate) fn set_state(&mut self, id: RecognizerId, state: RefereeState) {
        if let Some(r) = self.get_mut(id) {
            r.base_mut().set_state(state);
        }
    }

    /// Run `f` on a leaf with a context bound to it.
    pub(crate) fn with_leaf<R>(
        &mut self,
        id: RecognizerId,
        f: impl FnOnce(&mut dyn GestureRecognizer, &mut Context<'_>) -> R,
    ) -> Option<R> {
        let Self {
            arena,
            settings,
            requests,
            clock,
            ..
        } = self;
        let leaf = arena.get_mut(id)?.recognizer.as_leaf_mut()?;
        let mut cx = Context::new(id, settings, *clock, requests);
        Some(f(leaf, &mut cx))
    }

    /// Deliver a touch sample.
    ///
    /// `targets` is only read for Down samples: the top-level recognizers hit by the touch,
    /// innermost first.
    pub fn handle_touch_event(&mut self, event: &TouchEvent, targets: &[RecognizerId]) {
        self.advance_to(event.time);
        match event.kind {
            TouchType::Unknown => return,
            TouchType::Down => {
                self.clean_stale_scopes(event.source_type);
                self.open_scope(event.id, targets);
            }
            _ => {}
        }
        let members = self.scope_members(event.id);
        if members.is_empty() {
            log::trace!("no scope for touch {}", event.id);
        }
        for id in members {
            self.deliver_touch(id, event);
        }
        self.check_states(event.id);
        if matches!(event.kind, TouchType::Up | TouchType::Cancel) {
            self.clean_gesture_scope(event.id);
        }
    }

    /// Deliver an axis sample.
    ///
    /// `targets` is read when the stream begins (or when no scope exists for its id yet).
    pub fn handle_axis_event(&mut self, event: &AxisEvent, targets: &[RecognizerId]) {
        self.advance_to(event.time);
        if event.action == AxisAction::Begin || self.referee.scope(event.id).is_none() {
            self.open_scope(event.id, targets);
        }
        for id in self.scope_members(event.id) {
            self.deliver_axis(id, event);
        }
        self.check_states(event.id);
        if matches!(
            event.action,
            AxisAction::End | AxisAction::Cancel | AxisAction::None
        ) {
            self.clean_gesture_scope(event.id);
        }
    }

    fn scope_members(&self, touch_id: i32) -> Vec<RecognizerId> {
        self.referee
            .scope(touch_id)
            .map(|s| s.members().to_vec())
            .unwrap_or_default()
    }

    fn clean_stale_scopes(&mut self, source: SourceType) {
        if let Some(previous) = self.source
            && previous != source
            && !self.referee.is_empty()
        {
            log::debug!("input source changed from {previous:?} to {source:?}; cleaning scopes");
            self.clean_all();
        }
        self.source = Some(source);
    }

    fn open_scope(&mut self, touch_id: i32, targets: &[RecognizerId]) {
        let mut members: Vec<RecognizerId> = Vec::new();
        for &id in targets {
            let Some(slot) = self.arena.get(id) else {
                log::warn!("stale target {id:?}");
                continue;
            };
            if slot.parent.is_some() {
                log::warn!("{id:?} is not a top-level recognizer");
                continue;
            }
            if slot.recognizer.base().priority_mask() == GestureMask::IgnoreInternal {
                members.clear();
            }
            if !members.contains(&id) {
                members.push(id);
            }
        }
        members.sort_by_key(|&id| self.priority(id) != GesturePriority::High);
        for id in members {
            if self.get(id).is_some_and(|r| r.base().is_finished()) {
                self.reset_status(id);
            }
            self.add_gesture_to_scope(touch_id, id);
        }
        self.referee.reopen(touch_id);
    }

    pub(crate) fn deliver_touch(&mut self, id: RecognizerId, event: &TouchEvent) {
        match self.kind(id) {
            None => {}
            Some(RecognizerKind::Group) => self.group_deliver_touch(id, event),
            Some(_) => {
                self.with_leaf(id, |leaf, cx| dispatch_touch(leaf, event, cx));
                self.run_requests();
            }
        }
    }

    pub(crate) fn deliver_axis(&mut self, id: RecognizerId, event: &AxisEvent) {
        match self.kind(id) {
            None => {}
            Some(RecognizerKind::Group) => self.group_deliver_axis(id, event),
            Some(_) => {
                self.with_leaf(id, |leaf, cx| dispatch_axis(leaf, event, cx));
                self.run_requests();
            }
        }
    }

    /// Apply queued verdicts and deadline changes in order.
    pub(crate) fn run_requests(&mut self) {
        while let Some(request) = self.requests.pop_front() {
            match request {
                Request::Adjudicate(id, disposal) => self.apply_disposal(id, disposal),
                Request::Schedule { id, kind, at } => self.schedule_deadline(id, kind, at),
                Request::Cancel { id, kind } => self.cancel_deadline(id, kind),
            }
        }
    }

    pub(crate) fn schedule_deadline(&mut self, id: RecognizerId, kind: DeadlineKind, at: u64) {
        if self.state(id).is_none_or(|s| s == RefereeState::Fail) {
            return;
        }
        self.cancel_deadline(id, kind);
        log::trace!("{id:?} {kind:?} deadline at {at}");
        self.deadlines.push(Deadline {
            at,
            seq: self.next_seq,
            id,
            kind,
        });
        self.next_seq += 1;
    }

    pub(crate) fn cancel_deadline(&mut self, id: RecognizerId, kind: DeadlineKind) {
        self.deadlines.retain(|d| d.id != id || d.kind != kind);
    }

    pub(crate) fn cancel_all_deadlines(&mut self, id: RecognizerId) {
        self.deadlines.retain(|d| d.id != id);
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.deadlines.iter().map(|d| d.at).min()
    }

    /// Move the clock to `now`, firing every deadline due at or before it in time order.
    ///
    /// The clock never moves backwards.
    pub fn advance_to(&mut self, now: u64) {
        while let Some(index) = self
            .deadlines
            .iter()
            .enumerate()
            .filter(|(_, d)| d.at <= now)
            .min_by_key(|(_, d)| (d.at, d.seq))
            .map(|(i, _)| i)
        {
            let deadline = self.deadlines.remove(index);
            self.clock = self.clock.max(deadline.at);
            log::debug!("{:?} {:?} deadline fired", deadline.id, deadline.kind);
            self.fire_deadline(deadline.id, deadline.kind);
        }
        self.clock = self.clock.max(now);
    }

    fn fire_deadline(&mut self, id: RecognizerId, kind: DeadlineKind) {
        match self.kind(id) {
            None => return,
            Some(RecognizerKind::Group) => self.group_handle_deadline(id, kind),
            Some(_) => {
                self.with_leaf(id, |leaf, cx| leaf.handle_overdue_deadline(kind, cx));
            }
        }
        self.run_requests();
        self.reset_status_in_handle_overdue_deadline(id);
    }

    pub(crate) fn accept_member(&mut self, id: RecognizerId) {
        let Some(state) = self.state(id) else {
            return;
        };
        if state == RefereeState::Succeed {
            return;
        }
        self.set_state(id, RefereeState::Succeed);
        log::debug!("{id:?} succeeded");
        if self.kind(id) == Some(RecognizerKind::Group) {
            self.group_on_accepted(id);
        } else {
            self.with_leaf(id, |leaf, cx| leaf.on_accepted(cx));
        }
    }

    pub(crate) fn reject_member(&mut self, id: RecognizerId) {
        let Some(state) = self.state(id) else {
            return;
        };
        if state == RefereeState::Fail {
            return;
        }
        self.cancel_all_deadlines(id);
        log::debug!("{id:?} failed from {state:?}");
        if self.kind(id) == Some(RecognizerKind::Group) {
            let children = self
                .get(id)
                .and_then(Recognizer::as_group)
                .map(|g| g.live_children())
                .unwrap_or_default();
            for child in children {
                self.reject_member(child);
            }
            self.set_state(id, RefereeState::Fail);
        } else {
            self.with_leaf(id, |leaf, cx| {
                leaf.on_rejected(cx);
                leaf.base_mut().set_state(RefereeState::Fail);
            });
        }
    }

    pub(crate) fn begin_referee(&mut self, id: RecognizerId, touch_id: i32) {
        let Some(r) = self.get_mut(id) else {
            return;
        };
        let base = r.base_mut();
        base.sessions.insert(touch_id);
        base.finished = false;
        let children = r.as_group().map(|g| g.live_children()).unwrap_or_default();
        for child in children {
            self.begin_referee(child, touch_id);
        }
    }

    pub(crate) fn finish_referee(&mut self, id: RecognizerId, touch_id: i32) {
        let Some(r) = self.get_mut(id) else {
            return;
        };
        let base = r.base_mut();
        base.sessions.remove(&touch_id);
        base.finished = base.sessions.is_empty();
        let children = r.as_group().map(|g| g.live_children()).unwrap_or_default();
        for child in children {
            self.finish_referee(child, touch_id);
        }
    }

    /// Return a node (and its subtree) to `Ready`, dropping per-occurrence state.
    pub fn reset_status(&mut self, id: RecognizerId) {
        self.cancel_all_deadlines(id);
        let children = match self.get_mut(id) {
            None => return,
            Some(Recognizer::Group(g)) => {
                g.base_mut().reset();
                g.reset_composition();
                g.live_children()
            }
            Some(r) => {
                r.base_mut().reset();
                if let Some(leaf) = r.as_leaf_mut() {
                    leaf.on_reset_status();
                }
                Vec::new()
            }
        };
        log::trace!("{id:?} reset");
        for child in children {
            self.reset_status(child);
        }
    }

    /// Reset a node whose occurrence is over.
    ///
    /// Nodes that succeeded, failed or are still detecting are reset once no finger is down
    /// on them; anything else is left alone.
    pub fn clean_recognizer_state(&mut self, id: RecognizerId) {
        let Some(r) = self.get(id) else {
            return;
        };
        let base = r.base();
        if matches!(
            base.state(),
            RefereeState::Succeed | RefereeState::Fail | RefereeState::Detecting
        ) && base.touch_points().active_count() == 0
        {
            self.reset_status(id);
        }
    }

    /// Move the in-flight state of `old` into `new` when both carry the same configuration.
    ///
    /// Groups match when their mode and mask are equal and their children match pairwise, in
    /// order. On success a top-level `old` is replaced by `new` in the referee's scopes and
    /// links. On mismatch nothing changes and `false` is returned.
    pub fn reconcile(&mut self, new: RecognizerId, old: RecognizerId) -> bool {
        if new == old || !self.reconcilable(new, old) {
            log::debug!("{new:?} cannot take over {old:?}");
            return false;
        }
        self.apply_reconcile(new, old);
        if self.parent(new).is_none() && self.parent(old).is_none() {
            self.referee.replace_member(old, new);
        }
        true
    }

    fn reconcilable(&self, new: RecognizerId, old: RecognizerId) -> bool {
        let (Some(n), Some(o)) = (self.get(new), self.get(old)) else {
            return false;
        };
        match (n.as_group(), o.as_group()) {
            (Some(ng), Some(og)) => {
                ng.mode() == og.mode()
                    && ng.base().priority_mask() == og.base().priority_mask()
                    && ng.children().len() == og.children().len()
                    && ng
                        .children()
                        .iter()
                        .zip(og.children())
                        .all(|pair| match pair {
                            (Some(a), Some(b)) => self.reconcilable(*a, *b),
                            (None, None) => true,
                            _ => false,
                        })
            }
            (None, None) => n.leaf_config_matches(o),
            _ => false,
        }
    }

    fn apply_reconcile(&mut self, new: RecognizerId, old: RecognizerId) {
        self.cancel_all_deadlines(new);
        for deadline in self.deadlines.iter_mut().filter(|d| d.id == old) {
            deadline.id = new;
        }
        let Some((n, o)) = self.arena.pair_mut(new, old) else {
            return;
        };
        let pairs: Vec<(RecognizerId, RecognizerId)> = match (&mut n.recognizer, &o.recognizer) {
            (Recognizer::Group(ng), Recognizer::Group(og)) => {
                ng.copy_live_state(og);
                ng.children()
                    .iter()
                    .zip(og.children())
                    .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                    .collect()
            }
            (nr, or) => {
                nr.leaf_reconcile_from(or);
                Vec::new()
            }
        };
        for (a, b) in pairs {
            self.apply_reconcile(a, b);
        }
    }
}
