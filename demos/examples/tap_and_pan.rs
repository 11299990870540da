// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tap versus pan.
//!
//! One touch hits both a tap and a horizontal pan. A short press recognizes the tap; a drag
//! past the pan distance hands the touch to the pan and fails the tap.
//!
//! Run:
//! - `cargo run -p understory_demos --example tap_and_pan`

use kurbo::Point;
use understory_gesture::arena::RecognizerId;
use understory_gesture::recognizer::{ClickRecognizer, GestureRecognizer, PanRecognizer};
use understory_gesture::tree::RecognizerTree;
use understory_gesture::types::{PanDirection, TouchEvent};

fn build(tree: &mut RecognizerTree) -> (RecognizerId, RecognizerId) {
    let mut tap = ClickRecognizer::new(1, 1, 10.0);
    tap.base_mut().set_tag("tap");
    tap.base_mut().callbacks_mut().on_action = Some(Box::new(|e| {
        println!(
            "  tap at ({:.0}, {:.0})",
            e.global_location.x, e.global_location.y
        );
    }));

    let mut pan = PanRecognizer::new(1, PanDirection::HORIZONTAL, 10.0);
    pan.base_mut().set_tag("pan");
    let cb = pan.base_mut().callbacks_mut();
    cb.on_action_start = Some(Box::new(|e| println!("  pan start dx={:.1}", e.offset.x)));
    cb.on_action_update = Some(Box::new(|e| println!("  pan update dx={:.1}", e.offset.x)));
    cb.on_action_end = Some(Box::new(|e| println!("  pan end dx={:.1}", e.offset.x)));

    (tree.insert(tap), tree.insert(pan))
}

fn report(tree: &RecognizerTree, ids: &[RecognizerId]) {
    for &id in ids {
        if let Some(r) = tree.get(id) {
            println!(
                "  {:<4} -> {:?}",
                r.base().tag().unwrap_or("?"),
                r.state()
            );
        }
    }
}

fn main() {
    let mut tree = RecognizerTree::default();
    let (tap, pan) = build(&mut tree);
    let targets = [tap, pan];

    println!("press and release:");
    tree.handle_touch_event(&TouchEvent::down(0, Point::new(20.0, 20.0), 0), &targets);
    tree.handle_touch_event(&TouchEvent::moved(0, Point::new(22.0, 20.0), 16), &[]);
    tree.handle_touch_event(&TouchEvent::up(0, Point::new(22.0, 20.0), 60), &[]);
    report(&tree, &targets);

    println!("drag:");
    let mut t = 500;
    tree.handle_touch_event(&TouchEvent::down(0, Point::new(20.0, 20.0), t), &targets);
    for step in 1..=5 {
        t += 16;
        let x = 20.0 + 8.0 * f64::from(step);
        tree.handle_touch_event(&TouchEvent::moved(0, Point::new(x, 21.0), t), &[]);
    }
    tree.handle_touch_event(&TouchEvent::up(0, Point::new(60.0, 21.0), t + 16), &[]);
    report(&tree, &targets);
}
