// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-recognizer finger bookkeeping.
//!
//! A [`TouchPointStore`] maps each finger id to its latest sample and to the sample it went down
//! with, and keeps the ordered set of fingers that are currently down. Every recognizer owns one;
//! no recognizer reads another's store.
//!
//! ```
//! use kurbo::Point;
//! use understory_gesture::touch_points::TouchPointStore;
//! use understory_gesture::types::TouchEvent;
//!
//! let mut store = TouchPointStore::new();
//! store.insert_down(&TouchEvent::down(0, Point::new(0.0, 0.0), 0));
//! store.insert_down(&TouchEvent::down(1, Point::new(10.0, 0.0), 0));
//! assert_eq!(store.centroid(), Some(Point::new(5.0, 0.0)));
//! store.lift(&TouchEvent::up(0, Point::new(0.0, 0.0), 5));
//! assert_eq!(store.active_ids(), &[1]);
//! ```

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use kurbo::{Point, Vec2};

use crate::types::TouchEvent;

/// Finger id → sample bookkeeping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TouchPointStore {
    points: BTreeMap<i32, TouchEvent>,
    down_points: BTreeMap<i32, TouchEvent>,
    active: Vec<i32>,
}

impl TouchPointStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a Down sample.
    ///
    /// A repeated Down for an id that is already active overwrites its samples without counting
    /// the finger twice. Returns `true` if the finger became active.
    pub fn insert_down(&mut self, event: &TouchEvent) -> bool {
        self.points.insert(event.id, event.clone());
        self.down_points.insert(event.id, event.clone());
        if self.active.contains(&event.id) {
            false
        } else {
            self.active.push(event.id);
            true
        }
    }

    /// Record a Move sample for an active finger.
    ///
    /// Returns `false` (and records nothing) for ids that are not down.
    pub fn update(&mut self, event: &TouchEvent) -> bool {
        if !self.active.contains(&event.id) {
            return false;
        }
        self.points.insert(event.id, event.clone());
        true
    }

    /// Record an Up sample and drop the finger from the active set immediately.
    ///
    /// An Up for an id that never went down is a no-op and returns `false`.
    pub fn lift(&mut self, event: &TouchEvent) -> bool {
        let Some(pos) = self.active.iter().position(|&id| id == event.id) else {
            return false;
        };
        self.active.remove(pos);
        self.points.insert(event.id, event.clone());
        true
    }

    /// Drop every finger.
    pub fn clear(&mut self) {
        self.points.clear();
        self.down_points.clear();
        self.active.clear();
    }

    /// Ids of the fingers currently down, in the order they went down.
    pub fn active_ids(&self) -> &[i32] {
        &self.active
    }

    /// Number of fingers currently down.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Whether `id` is currently down.
    pub fn is_active(&self, id: i32) -> bool {
        self.active.contains(&id)
    }

    /// Latest sample of `id` (also kept after it lifted, until cleared).
    pub fn get(&self, id: i32) -> Option<&TouchEvent> {
        self.points.get(&id)
    }

    /// Down sample of `id`.
    pub fn down(&self, id: i32) -> Option<&TouchEvent> {
        self.down_points.get(&id)
    }

    /// Latest samples of the active fingers, in the order they went down.
    pub fn active_points(&self) -> impl Iterator<Item = &TouchEvent> + '_ {
        self.active.iter().filter_map(|id| self.points.get(id))
    }

    /// Mean window position of the active fingers.
    pub fn centroid(&self) -> Option<Point> {
        mean(self.active_points().map(|e| e.position))
    }

    /// Mean window position the active fingers went down at.
    pub fn down_centroid(&self) -> Option<Point> {
        mean(self.active.iter().filter_map(|id| self.down_points.get(id)).map(|e| e.position))
    }

    /// Displacement of `id` from where it went down.
    pub fn displacement(&self, id: i32) -> Option<Vec2> {
        Some(self.points.get(&id)?.position - self.down_points.get(&id)?.position)
    }

    /// Largest displacement of any active finger from where it went down.
    pub fn max_displacement(&self) -> f64 {
        self.active
            .iter()
            .filter_map(|&id| self.displacement(id))
            .map(|d| d.hypot())
            .fold(0.0, f64::max)
    }
}

fn mean(points: impl Iterator<Item = Point>) -> Option<Point> {
    let mut sum = Vec2::ZERO;
    let mut n = 0_u32;
    for p in points {
        sum += p.to_vec2();
        n += 1;
    }
    (n > 0).then(|| (sum / f64::from(n)).to_point())
}
