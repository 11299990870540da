// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture groups from configuration.
//!
//! Describe an exclusive group of a double tap and a single tap, encode it, decode it again,
//! and play a double tap and a single tap against the instantiated tree.
//!
//! Run:
//! - `cargo run -p understory_demos --example gesture_group`

use kurbo::Point;
use understory_gesture::arena::RecognizerId;
use understory_gesture::gesture::{Gesture, GestureGroup, LongPressGesture, TapGesture};
use understory_gesture::recognizer::GroupMode;
use understory_gesture::tree::RecognizerTree;
use understory_gesture::types::TouchEvent;

fn describe(tree: &RecognizerTree, id: RecognizerId, depth: usize) {
    let Some(r) = tree.get(id) else { return };
    println!("{:indent$}{:?} {:?}", "", r.kind(), r.state(), indent = depth * 2);
    if let Some(group) = r.as_group() {
        for child in group.children().iter().flatten() {
            describe(tree, *child, depth + 1);
        }
    }
}

fn tap(tree: &mut RecognizerTree, target: RecognizerId, at: u64) {
    let p = Point::new(30.0, 30.0);
    tree.handle_touch_event(&TouchEvent::down(0, p, at), &[target]);
    tree.handle_touch_event(&TouchEvent::up(0, p, at + 50), &[]);
}

fn main() {
    let config = Gesture::Group(GestureGroup::new(
        GroupMode::Exclusive,
        vec![
            TapGesture::new(1, 2).into(),
            TapGesture::new(1, 1).into(),
            LongPressGesture::new(1, false, 500).into(),
        ],
    ));

    let mut buf = vec![0_u8; config.serialized_size()];
    let written = match config.serialize(&mut buf) {
        Ok(n) => n,
        Err(err) => {
            eprintln!("encode failed: {err}");
            return;
        }
    };
    println!("encoded {written} bytes");

    let decoded = match Gesture::deserialize(&buf) {
        Ok((gesture, read)) => {
            println!("decoded {read} bytes, equal: {}", gesture == config);
            gesture
        }
        Err(err) => {
            eprintln!("decode failed: {err} (code {})", err.code());
            return;
        }
    };

    // A truncated record is rejected.
    if let Err(err) = Gesture::deserialize(&buf[..written - 1]) {
        println!("truncated: {err}");
    }

    let mut tree = RecognizerTree::default();
    let Some(root) = decoded.create_recognizer(&mut tree) else {
        eprintln!("group mode cannot be instantiated");
        return;
    };

    println!("double tap:");
    tap(&mut tree, root, 0);
    tap(&mut tree, root, 150);
    tree.advance_to(1_000);
    describe(&tree, root, 1);

    println!("single tap:");
    tap(&mut tree, root, 2_000);
    tree.advance_to(3_000);
    describe(&tree, root, 1);
}
