// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests over generated touch streams.

use kurbo::Point;
use proptest::prelude::*;
use understory_gesture::arena::RecognizerId;
use understory_gesture::recognizer::{
    ClickRecognizer, GroupMode, LongPressRecognizer, PanRecognizer, PinchRecognizer, Recognizer,
    RecognizerGroup, RotationRecognizer, change_value_range,
};
use understory_gesture::tree::RecognizerTree;
use understory_gesture::types::{PanDirection, RefereeState, TouchEvent};

#[derive(Clone, Debug)]
struct Step {
    finger: i32,
    lift: bool,
    x: f64,
    y: f64,
}

fn steps() -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec(
        (0_i32..5, any::<bool>(), -300.0_f64..300.0, -300.0_f64..300.0)
            .prop_map(|(finger, lift, x, y)| Step { finger, lift, x, y }),
        1..40,
    )
}

/// Play `steps` against `target`, then lift every finger still down.
fn play(tree: &mut RecognizerTree, target: RecognizerId, steps: &[Step]) {
    let mut down: Vec<i32> = Vec::new();
    let mut t = 0;
    for s in steps {
        t += 16;
        let at = Point::new(s.x, s.y);
        if !down.contains(&s.finger) {
            down.push(s.finger);
            tree.handle_touch_event(&TouchEvent::down(s.finger, at, t), &[target]);
        } else if s.lift {
            down.retain(|f| *f != s.finger);
            tree.handle_touch_event(&TouchEvent::up(s.finger, at, t), &[]);
        } else {
            tree.handle_touch_event(&TouchEvent::moved(s.finger, at, t), &[]);
        }
    }
    for finger in down {
        t += 16;
        tree.handle_touch_event(&TouchEvent::up(finger, Point::ZERO, t), &[]);
    }
    tree.advance_to(t + 10_000);
}

fn active_after(recognizer: impl Into<Recognizer>, steps: &[Step]) -> usize {
    let mut tree = RecognizerTree::default();
    let id = tree.insert(recognizer);
    play(&mut tree, id, steps);
    tree.get(id)
        .map_or(usize::MAX, |r| r.base().touch_points().active_count())
}

proptest! {
    /// Every finger that went down is forgotten once it lifted.
    #[test]
    fn fingers_balance_for_continuous_gestures(steps in steps(), fingers in 1_i32..4) {
        prop_assert_eq!(active_after(PanRecognizer::new(fingers, PanDirection::ALL, 5.0), &steps), 0);
        prop_assert_eq!(active_after(PinchRecognizer::new(fingers + 1, 5.0), &steps), 0);
        prop_assert_eq!(active_after(RotationRecognizer::new(fingers + 1, 10.0), &steps), 0);
    }

    /// Normalized angles are a fixed point of normalization.
    #[test]
    fn angle_normalization_is_idempotent(x in -1.0e7_f64..1.0e7) {
        let once = change_value_range(x);
        prop_assert!(once > -180.0 && once <= 180.0);
        prop_assert_eq!(change_value_range(once), once);
    }

    /// At most one child of an exclusive group wins a session.
    #[test]
    fn exclusive_group_has_at_most_one_winner(steps in steps(), kinds in prop::collection::vec(0_u8..4, 2..5)) {
        let mut tree = RecognizerTree::default();
        let children: Vec<RecognizerId> = kinds
            .iter()
            .map(|k| match k {
                0 => tree.insert(ClickRecognizer::new(1, 1, 0.0)),
                1 => tree.insert(ClickRecognizer::new(1, 2, 30.0)),
                2 => tree.insert(LongPressRecognizer::new(1, false, 200)),
                _ => tree.insert(PanRecognizer::new(1, PanDirection::ALL, 5.0)),
            })
            .collect();
        let group = tree.insert(RecognizerGroup::new(GroupMode::Exclusive).unwrap());
        tree.add_children(group, &children);
        play(&mut tree, group, &steps);
        let winners = children
            .iter()
            .filter(|&&c| {
                matches!(
                    tree.state(c),
                    Some(RefereeState::Succeed | RefereeState::SucceedBlocked)
                )
            })
            .count();
        prop_assert!(winners <= 1, "{winners} children won");
    }
}
