// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture referee: per-touch scopes and arbitration.
//!
//! ## Overview
//!
//! Every touch id that went Down opens a [`GestureScope`] whose members are the top-level
//! recognizers hit by that touch, innermost first (High priority ones moved to the front).
//! Members report verdicts through [`RecognizerTree::adjudicate`]:
//!
//! - **Accept**: the member wins unless an earlier member of one of its scopes is still
//!   `Pending`, in which case it waits as `SucceedBlocked`. A winner fails every other
//!   non-Parallel member of its scopes.
//! - **Pending**: the member wants to win later (e.g. the first tap of a double tap). It waits as
//!   `PendingBlocked` behind an earlier pending member.
//! - **Reject**: the member fails, and the first blocked member of its scopes gets to retry.
//!
//! Members with [`GesturePriority::Parallel`] never block others and are never failed by
//! another member's win.
//!
//! A scope closes after its touch lifts, unless a member is still pending; it then closes as
//! soon as nothing is pending any more.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::arena::{Arena, RecognizerId};
use crate::event::RecognizerInfo;
use crate::recognizer::Request;
use crate::tree::RecognizerTree;
use crate::types::{GestureDisposal, GestureJudgeResult, GesturePriority, RefereeState};

fn state_in(arena: &Arena, id: RecognizerId) -> Option<RefereeState> {
    arena.get(id).map(|s| s.recognizer.state())
}

/// Members arbitrated together for one touch id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GestureScope {
    touch_id: i32,
    members: Vec<RecognizerId>,
    has_gesture_accepted: bool,
    delay_close: bool,
}

impl GestureScope {
    /// Create an empty scope for `touch_id`.
    pub fn new(touch_id: i32) -> Self {
        Self {
            touch_id,
            members: Vec::new(),
            has_gesture_accepted: false,
            delay_close: false,
        }
    }

    /// Touch id of the scope.
    pub fn touch_id(&self) -> i32 {
        self.touch_id
    }

    /// Members in arbitration order.
    pub fn members(&self) -> &[RecognizerId] {
        &self.members
    }

    /// Append a member. Returns `false` if it was already present.
    pub fn add_member(&mut self, id: RecognizerId) -> bool {
        if self.existed(id) {
            return false;
        }
        self.members.push(id);
        true
    }

    /// Remove a member. Returns `false` if it was absent.
    pub fn remove_member(&mut self, id: RecognizerId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != id);
        self.members.len() != before
    }

    /// Whether `id` is a member.
    pub fn existed(&self, id: RecognizerId) -> bool {
        self.members.contains(&id)
    }

    /// Whether any member has been accepted in this scope.
    pub fn has_gesture_accepted(&self) -> bool {
        self.has_gesture_accepted
    }

    /// Whether the touch lifted while a member was still pending.
    pub fn is_delay_close(&self) -> bool {
        self.delay_close
    }

    /// Whether an earlier, non-Parallel member is `Pending`.
    pub(crate) fn check_need_blocked(&self, id: RecognizerId, arena: &Arena) -> bool {
        for &member in &self.members {
            if member == id {
                return false;
            }
            let Some(slot) = arena.get(member) else {
                continue;
            };
            if slot.recognizer.state() == RefereeState::Pending
                && slot.recognizer.base().priority() != GesturePriority::Parallel
            {
                return true;
            }
        }
        false
    }

    /// First member waiting behind a pending one.
    pub(crate) fn unblock_gesture(&self, arena: &Arena) -> Option<RecognizerId> {
        self.members.iter().copied().find(|&m| {
            matches!(
                state_in(arena, m),
                Some(RefereeState::PendingBlocked | RefereeState::SucceedBlocked)
            )
        })
    }

    /// Whether any member is pending, blocked or not.
    pub(crate) fn is_pending(&self, arena: &Arena) -> bool {
        self.members.iter().any(|&m| {
            matches!(
                state_in(arena, m),
                Some(RefereeState::Pending | RefereeState::PendingBlocked)
            )
        })
    }

    /// Whether every live member reached a terminal state.
    pub(crate) fn query_all_done(&self, arena: &Arena) -> bool {
        self.members
            .iter()
            .filter_map(|&m| state_in(arena, m))
            .all(RefereeState::is_terminal)
    }
}

/// Recognizers the host declared as related to a touch, reported to judges as "others".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseLinks {
    links: BTreeMap<i32, Vec<RecognizerId>>,
}

impl ResponseLinks {
    /// Linked recognizers for `touch_id`.
    pub fn get(&self, touch_id: i32) -> &[RecognizerId] {
        self.links.get(&touch_id).map_or(&[][..], Vec::as_slice)
    }

    /// Whether no touch has links.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub(crate) fn set(&mut self, touch_id: i32, ids: &[RecognizerId]) {
        let mut list: Vec<RecognizerId> = Vec::with_capacity(ids.len());
        for &id in ids {
            if !list.contains(&id) {
                list.push(id);
            }
        }
        self.links.insert(touch_id, list);
    }

    pub(crate) fn remove(&mut self, touch_id: i32) {
        self.links.remove(&touch_id);
    }

    pub(crate) fn clear(&mut self) {
        self.links.clear();
    }
}

/// Scopes and response links of a [`RecognizerTree`].
#[derive(Clone, Debug, Default)]
pub struct GestureReferee {
    scopes: BTreeMap<i32, GestureScope>,
    links: ResponseLinks,
}

impl GestureReferee {
    /// Scope of `touch_id`.
    pub fn scope(&self, touch_id: i32) -> Option<&GestureScope> {
        self.scopes.get(&touch_id)
    }

    /// All open scopes, by touch id.
    pub fn scopes(&self) -> impl Iterator<Item = &GestureScope> {
        self.scopes.values()
    }

    /// Whether no scope is open.
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Response links.
    pub fn response_links(&self) -> &ResponseLinks {
        &self.links
    }

    fn touch_ids_with(&self, id: RecognizerId) -> Vec<i32> {
        self.scopes
            .values()
            .filter(|s| s.existed(id))
            .map(GestureScope::touch_id)
            .collect()
    }

    pub(crate) fn reopen(&mut self, touch_id: i32) {
        if let Some(scope) = self.scopes.get_mut(&touch_id) {
            scope.delay_close = false;
        }
    }

    /// Drop every reference to a removed node.
    pub(crate) fn forget(&mut self, id: RecognizerId) {
        for scope in self.scopes.values_mut() {
            scope.remove_member(id);
        }
        for list in self.links.links.values_mut() {
            list.retain(|m| *m != id);
        }
    }

    pub(crate) fn replace_member(&mut self, old: RecognizerId, new: RecognizerId) {
        for scope in self.scopes.values_mut() {
            for member in &mut scope.members {
                if *member == old {
                    *member = new;
                }
            }
        }
        for list in self.links.links.values_mut() {
            for member in list.iter_mut() {
                if *member == old {
                    *member = new;
                }
            }
        }
    }
}

impl RecognizerTree {
    /// Report a verdict for `id` and apply its consequences.
    ///
    /// Verdicts on a failed node are ignored, as are Accept and Pending on a node that already
    /// succeeded. An Accept vetoed by the node's judge becomes a Reject.
    pub fn adjudicate(&mut self, id: RecognizerId, disposal: GestureDisposal) {
        self.requests.push_back(Request::Adjudicate(id, disposal));
        self.run_requests();
    }

    pub(crate) fn apply_disposal(&mut self, id: RecognizerId, disposal: GestureDisposal) {
        let Some(slot) = self.arena.get(id) else {
            return;
        };
        let state = slot.recognizer.state();
        let parent = slot.parent;
        if state == RefereeState::Fail
            || disposal == GestureDisposal::None
            || (state == RefereeState::Succeed && disposal != GestureDisposal::Reject)
        {
            return;
        }
        let disposal = if disposal == GestureDisposal::Accept && self.judge_rejects(id) {
            log::debug!("{id:?} vetoed by its judge");
            GestureDisposal::Reject
        } else {
            disposal
        };
        if let Some(r) = self.get_mut(id) {
            r.base_mut().set_disposal(disposal);
        }
        log::trace!("{id:?} reports {disposal:?}");
        if let Some(parent) = parent {
            self.group_on_child_disposal(parent, id, disposal);
            return;
        }
        match disposal {
            GestureDisposal::Accept => self.handle_accept(id),
            GestureDisposal::Pending => self.handle_pending(id),
            GestureDisposal::Reject => self.handle_reject(id),
            GestureDisposal::None => {}
        }
    }

    fn is_blocked(&self, id: RecognizerId) -> bool {
        self.referee
            .scopes
            .values()
            .any(|s| s.existed(id) && s.check_need_blocked(id, &self.arena))
    }

    fn handle_accept(&mut self, id: RecognizerId) {
        if self.state(id).is_none_or(RefereeState::is_terminal) {
            return;
        }
        if self.is_blocked(id) {
            log::debug!("{id:?} waits behind a pending gesture");
            self.set_state(id, RefereeState::SucceedBlocked);
            return;
        }
        let parallel = self.priority(id) == GesturePriority::Parallel;
        for touch_id in self.referee.touch_ids_with(id) {
            let Some(scope) = self.referee.scopes.get_mut(&touch_id) else {
                continue;
            };
            scope.has_gesture_accepted = true;
            if parallel {
                continue;
            }
            let others: Vec<RecognizerId> = scope
                .members
                .iter()
                .copied()
                .filter(|&m| m != id)
                .collect();
            for other in others {
                if self.priority(other) != GesturePriority::Parallel {
                    self.reject_member(other);
                }
            }
        }
        self.accept_member(id);
        self.close_finished_scopes();
    }

    fn handle_pending(&mut self, id: RecognizerId) {
        if self.state(id).is_none_or(RefereeState::is_terminal) {
            return;
        }
        let state = if self.is_blocked(id) {
            RefereeState::PendingBlocked
        } else {
            RefereeState::Pending
        };
        self.set_state(id, state);
    }

    fn handle_reject(&mut self, id: RecognizerId) {
        self.reject_member(id);
        for touch_id in self.referee.touch_ids_with(id) {
            let next = self
                .referee
                .scopes
                .get(&touch_id)
                .and_then(|s| s.unblock_gesture(&self.arena));
            match next.and_then(|n| Some((n, self.state(n)?))) {
                Some((n, RefereeState::SucceedBlocked)) => self.handle_accept(n),
                Some((n, RefereeState::PendingBlocked)) => self.handle_pending(n),
                _ => {}
            }
        }
        self.close_finished_scopes();
    }

    /// Settle states after a sample was delivered to every member of a scope.
    ///
    /// A non-Parallel winner fails the members that are still undecided, and a blocked winner
    /// is accepted once every other member failed or runs in parallel.
    pub fn check_states(&mut self, touch_id: i32) {
        let Some(members) = self.referee.scope(touch_id).map(|s| s.members.clone()) else {
            return;
        };
        let non_parallel =
            |tree: &Self, m: RecognizerId| tree.priority(m) != GesturePriority::Parallel;
        let has_winner = members
            .iter()
            .any(|&m| self.state(m) == Some(RefereeState::Succeed) && non_parallel(self, m));
        if has_winner {
            for &m in &members {
                if matches!(
                    self.state(m),
                    Some(RefereeState::Ready | RefereeState::Detecting)
                ) && non_parallel(self, m)
                {
                    self.reject_member(m);
                }
            }
        }
        for &m in &members {
            if self.state(m) != Some(RefereeState::SucceedBlocked) {
                continue;
            }
            let alone = members.iter().all(|&o| {
                o == m
                    || self.state(o).is_none_or(|s| s == RefereeState::Fail)
                    || !non_parallel(self, o)
            });
            if alone {
                self.handle_accept(m);
            }
        }
        self.run_requests();
    }

    /// Add a top-level node to the scope of `touch_id`, opening the scope if needed.
    pub fn add_gesture_to_scope(&mut self, touch_id: i32, id: RecognizerId) -> bool {
        if !self.arena.is_alive(id) || self.parent(id).is_some() {
            return false;
        }
        let added = self
            .referee
            .scopes
            .entry(touch_id)
            .or_insert_with(|| GestureScope::new(touch_id))
            .add_member(id);
        self.begin_referee(id, touch_id);
        added
    }

    /// Close the scope of `touch_id`, or mark it for closing once no member is pending.
    pub fn clean_gesture_scope(&mut self, touch_id: i32) {
        let Some(scope) = self.referee.scopes.get_mut(&touch_id) else {
            return;
        };
        if scope.is_pending(&self.arena) {
            log::trace!("scope {touch_id} closes once pending gestures settle");
            scope.delay_close = true;
            return;
        }
        self.close_scope(touch_id);
    }

    fn close_scope(&mut self, touch_id: i32) {
        let Some(scope) = self.referee.scopes.remove(&touch_id) else {
            return;
        };
        log::debug!("scope {touch_id} closed");
        for member in scope.members {
            self.finish_referee(member, touch_id);
        }
        self.referee.links.remove(touch_id);
    }

    fn close_finished_scopes(&mut self) {
        let ready: Vec<i32> = self
            .referee
            .scopes
            .values()
            .filter(|s| s.delay_close && !s.is_pending(&self.arena))
            .map(GestureScope::touch_id)
            .collect();
        for touch_id in ready {
            self.close_scope(touch_id);
        }
    }

    /// Close every scope and drop every response link.
    pub fn clean_all(&mut self) {
        let touch_ids: Vec<i32> = self.referee.scopes.keys().copied().collect();
        for touch_id in touch_ids {
            self.close_scope(touch_id);
        }
        self.referee.links.clear();
    }

    /// Whether a member has been accepted in the scope of `touch_id`.
    pub fn has_gesture_accepted(&self, touch_id: i32) -> bool {
        self.referee
            .scope(touch_id)
            .is_some_and(GestureScope::has_gesture_accepted)
    }

    /// Whether every member of the scope of `touch_id` succeeded or failed.
    pub fn query_all_done(&self, touch_id: i32) -> bool {
        self.referee
            .scope(touch_id)
            .is_none_or(|s| s.query_all_done(&self.arena))
    }

    /// Declare the recognizers related to `touch_id`, replacing earlier links.
    pub fn set_response_link_recognizers(&mut self, touch_id: i32, ids: &[RecognizerId]) {
        self.referee.links.set(touch_id, ids);
    }

    /// Linked recognizers for `touch_id`.
    pub fn response_links(&self, touch_id: i32) -> &[RecognizerId] {
        self.referee.links.get(touch_id)
    }

    pub(crate) fn reset_status_in_handle_overdue_deadline(&mut self, id: RecognizerId) {
        let top = self.top_level(id);
        for touch_id in self.referee.touch_ids_with(top) {
            if self.query_all_done(touch_id) {
                self.referee.links.remove(touch_id);
            }
        }
    }

    fn judge_rejects(&self, id: RecognizerId) -> bool {
        let Some(r) = self.get(id) else {
            return false;
        };
        let base = r.base();
        let Some(target) = base.target_component() else {
            return false;
        };
        let kind = r.kind();
        let info = base.gesture_info(kind);
        let event = r.gesture_event();
        let current = base.recognizer_info(id, kind);
        let others = self.judge_others(id);
        target.judge(&info, &event, &current, &others) == GestureJudgeResult::Reject
    }

    fn judge_others(&self, id: RecognizerId) -> Vec<RecognizerInfo> {
        let top = self.top_level(id);
        let mut seen: Vec<RecognizerId> = Vec::new();
        for touch_id in self.referee.touch_ids_with(top) {
            let linked = self.referee.links.get(touch_id);
            let candidates = if linked.is_empty() {
                self.referee
                    .scope(touch_id)
                    .map_or(&[][..], GestureScope::members)
            } else {
                linked
            };
            for &c in candidates {
                if c != id && c != top && !seen.contains(&c) {
                    seen.push(c);
                }
            }
        }
        seen.into_iter()
            .filter_map(|c| {
                let r = self.get(c)?;
                Some(r.base().recognizer_info(c, r.kind()))
            })
            .collect()
    }
}
