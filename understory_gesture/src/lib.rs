// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_gesture --heading-base-level=0

//! Understory Gesture: deterministic, `no_std` gesture recognizers and a gesture referee.
//!
//! ## Overview
//!
//! This crate turns raw touch and axis samples into gestures: tap, long press, pan, pinch,
//! rotation and swipe, plus sequence, parallel and exclusive groups of them.
//! It does not perform hit testing or run timers.
//! Instead, the host tells the [`RecognizerTree`](crate::tree::RecognizerTree) which recognizers a
//! touch hit when it goes down, and moves the tree's logical clock forward.
//!
//! ## Recognizers
//!
//! Each recognizer is an independent state machine (`Ready → Detecting → Pending → Succeed`, or
//! `Fail` at any point). Leaves live in [`recognizer`]; groups live in
//! [`recognizer::group`]. All of them are nodes of one
//! [`RecognizerTree`](crate::tree::RecognizerTree) and are addressed by
//! [`RecognizerId`](crate::arena::RecognizerId).
//!
//! ## Arbitration
//!
//! Recognizers hit by the same touch compete in a [`GestureScope`](crate::referee::GestureScope).
//! The [referee](crate::referee) resolves their verdicts: the first accepted recognizer wins and
//! the others fail, unless an earlier one is still pending (e.g. a double tap waiting for its
//! second tap), in which case the later one waits.
//! Application judges on a [`TargetComponent`](crate::event::TargetComponent) may veto a win.
//!
//! ## Time
//!
//! Timestamps are milliseconds on a logical clock. Deadlines (multi-tap timeout, long-press
//! duration, sequence timeout, ...) fire when a later sample arrives or when the host calls
//! [`RecognizerTree::advance_to`](crate::tree::RecognizerTree::advance_to).
//! Thresholds come from an injected [`GestureSettings`](crate::settings::GestureSettings).
//!
//! ## Configuration
//!
//! [`Gesture`](crate::gesture::Gesture) values describe recognizers declaratively; they can be
//! instantiated in a tree and encoded to a compact binary form with the [`codec`].
//!
//! ## Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use kurbo::Point;
//! use understory_gesture::recognizer::{GestureRecognizer, PanRecognizer, ClickRecognizer};
//! use understory_gesture::tree::RecognizerTree;
//! use understory_gesture::types::{PanDirection, RefereeState, TouchEvent};
//!
//! let mut tree = RecognizerTree::default();
//! let tap = tree.insert(ClickRecognizer::new(1, 1, 10.0));
//!
//! let mut pan = PanRecognizer::new(1, PanDirection::HORIZONTAL, 10.0);
//! let offset = Rc::new(Cell::new(0.0));
//! let seen = offset.clone();
//! pan.base_mut().callbacks_mut().on_action_update =
//!     Some(Box::new(move |e| seen.set(e.offset.x)));
//! let pan = tree.insert(pan);
//!
//! // The touch hit both; the tap is innermost.
//! tree.handle_touch_event(&TouchEvent::down(0, Point::new(0.0, 0.0), 0), &[tap, pan]);
//! tree.handle_touch_event(&TouchEvent::moved(0, Point::new(15.0, 0.0), 16), &[]);
//! tree.handle_touch_event(&TouchEvent::moved(0, Point::new(40.0, 0.0), 32), &[]);
//! tree.handle_touch_event(&TouchEvent::up(0, Point::new(40.0, 0.0), 48), &[]);
//!
//! assert_eq!(tree.state(tap), Some(RefereeState::Fail));
//! assert_eq!(tree.state(pan), Some(RefereeState::Succeed));
//! assert_eq!(offset.get(), 40.0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod arena;
pub mod codec;
pub mod event;
pub mod gesture;
pub mod recognizer;
pub mod referee;
pub mod settings;
pub mod touch_points;
pub mod tree;
pub mod types;
