// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot storage for recognizer nodes.
//!
//! Recognizers and groups live in one arena and refer to each other by [`RecognizerId`].
//! Groups own their children by id; children name their parent by id. No node holds a
//! pointer to another, so removing a node can never leave a dangling reference: stale ids
//! simply stop resolving.

use alloc::vec::Vec;

use crate::recognizer::Recognizer;

/// Identifier for a recognizer node (generational).
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `RecognizerId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `RecognizerId`.
///
/// Stale ids never alias a different live recognizer because the generation must match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct RecognizerId(pub(crate) u32, pub(crate) u32);

impl RecognizerId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
pub(crate) struct Slot {
    generation: u32,
    pub(crate) parent: Option<RecognizerId>,
    pub(crate) recognizer: Recognizer,
}

#[derive(Debug, Default)]
pub(crate) struct Arena {
    slots: Vec<Option<Slot>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
}

impl Arena {
    pub(crate) fn insert(&mut self, recognizer: Recognizer) -> RecognizerId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.slots.push(None);
            self.generations.push(1);
            (self.slots.len() - 1, 1)
        };
        self.slots[idx] = Some(Slot {
            generation,
            parent: None,
            recognizer,
        });
        #[allow(
            clippy::cast_possible_truncation,
            reason = "RecognizerId uses 32-bit indices by design."
        )]
        RecognizerId::new(idx as u32, generation)
    }

    pub(crate) fn remove(&mut self, id: RecognizerId) -> Option<Slot> {
        if !self.is_alive(id) {
            return None;
        }
        let slot = self.slots[id.idx()].take();
        self.free_list.push(id.idx());
        slot
    }

    pub(crate) fn is_alive(&self, id: RecognizerId) -> bool {
        self.slots
            .get(id.idx())
            .and_then(|s| s.as_ref())
            .is_some_and(|s| s.generation == id.1)
    }

    pub(crate) fn get(&self, id: RecognizerId) -> Option<&Slot> {
        self.slots
            .get(id.idx())
            .and_then(|s| s.as_ref())
            .filter(|s| s.generation == id.1)
    }

    pub(crate) fn get_mut(&mut self, id: RecognizerId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.idx())
            .and_then(|s| s.as_mut())
            .filter(|s| s.generation == id.1)
    }

    /// Borrow two distinct live slots at once.
    pub(crate) fn pair_mut(
        &mut self,
        a: RecognizerId,
        b: RecognizerId,
    ) -> Option<(&mut Slot, &mut Slot)> {
        if a.idx() == b.idx() || !self.is_alive(a) || !self.is_alive(b) {
            return None;
        }
        let (lo, hi, swapped) = if a.idx() < b.idx() {
            (a.idx(), b.idx(), false)
        } else {
            (b.idx(), a.idx(), true)
        };
        let (head, tail) = self.slots.split_at_mut(hi);
        let first = head[lo].as_mut()?;
        let second = tail[0].as_mut()?;
        if swapped {
            Some((second, first))
        } else {
            Some((first, second))
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}
