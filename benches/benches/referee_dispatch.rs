// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Point;
use understory_gesture::arena::RecognizerId;
use understory_gesture::recognizer::{
    ClickRecognizer, GroupMode, LongPressRecognizer, PanRecognizer, PinchRecognizer,
    RecognizerGroup, RotationRecognizer,
};
use understory_gesture::tree::RecognizerTree;
use understory_gesture::types::{PanDirection, TouchEvent};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// A drag of `moves` samples with some jitter, starting at `origin`.
fn gen_drag(rng: &mut Rng, finger: i32, origin: Point, moves: usize, t0: u64) -> Vec<TouchEvent> {
    let mut out = Vec::with_capacity(moves + 2);
    out.push(TouchEvent::down(finger, origin, t0));
    let mut p = origin;
    for i in 0..moves {
        p.x += 4.0 + rng.next_f64();
        p.y += rng.next_f64() - 0.5;
        out.push(TouchEvent::moved(finger, p, t0 + 8 * (i as u64 + 1)));
    }
    out.push(TouchEvent::up(finger, p, t0 + 8 * (moves as u64 + 1)));
    out
}

/// `n` competing top-level recognizers: taps, long presses and pans.
fn competing(tree: &mut RecognizerTree, n: usize) -> Vec<RecognizerId> {
    (0..n)
        .map(|i| match i % 3 {
            0 => tree.insert(ClickRecognizer::new(1, 1 + (i % 2) as i32, 0.0)),
            1 => tree.insert(LongPressRecognizer::new(1, false, 500)),
            _ => tree.insert(PanRecognizer::new(1, PanDirection::ALL, 5.0)),
        })
        .collect()
}

fn run(tree: &mut RecognizerTree, targets: &[RecognizerId], events: &[TouchEvent]) {
    for e in events {
        tree.handle_touch_event(e, targets);
    }
}

fn bench_flat_scope(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat_scope");
    let mut rng = Rng::new(0x5eed);
    let events = gen_drag(&mut rng, 0, Point::new(10.0, 10.0), 64, 0);
    for &n in &[2usize, 8, 32] {
        group.throughput(Throughput::Elements(events.len() as u64));
        group.bench_function(format!("drag_members_n{}", n), |b| {
            b.iter_batched(
                || {
                    let mut tree = RecognizerTree::default();
                    let targets = competing(&mut tree, n);
                    (tree, targets)
                },
                |(mut tree, targets)| {
                    run(&mut tree, &targets, &events);
                    black_box(tree.referee().is_empty());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_taps(c: &mut Criterion) {
    let mut group = c.benchmark_group("taps");
    let mut events = Vec::new();
    for i in 0..64u64 {
        let t = i * 400;
        events.push(TouchEvent::down(0, Point::new(5.0, 5.0), t));
        events.push(TouchEvent::up(0, Point::new(5.0, 5.0), t + 40));
    }
    group.throughput(Throughput::Elements(events.len() as u64));
    group.bench_function("double_vs_single_tap", |b| {
        b.iter_batched(
            || {
                let mut tree = RecognizerTree::default();
                let double = tree.insert(ClickRecognizer::new(1, 2, 0.0));
                let single = tree.insert(ClickRecognizer::new(1, 1, 0.0));
                (tree, vec![double, single])
            },
            |(mut tree, targets)| {
                run(&mut tree, &targets, &events);
                tree.advance_to(64 * 400 + 1_000);
                black_box(tree.now());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_nested_groups(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_groups");
    let mut rng = Rng::new(42);
    let mut events = gen_drag(&mut rng, 0, Point::new(0.0, 0.0), 32, 0);
    let mut second = gen_drag(&mut rng, 1, Point::new(200.0, 0.0), 32, 4);
    // Interleave the two fingers by timestamp.
    events.append(&mut second);
    events.sort_by_key(|e| e.time);
    for &depth in &[1usize, 4, 8] {
        group.throughput(Throughput::Elements(events.len() as u64));
        group.bench_function(format!("two_finger_depth{}", depth), |b| {
            b.iter_batched(
                || {
                    let mut tree = RecognizerTree::default();
                    let pinch = tree.insert(PinchRecognizer::new(2, 5.0));
                    let rotation = tree.insert(RotationRecognizer::new(2, 15.0));
                    let mut top = tree.insert(RecognizerGroup::new(GroupMode::Parallel).unwrap());
                    tree.add_children(top, &[pinch, rotation]);
                    for _ in 1..depth {
                        let outer =
                            tree.insert(RecognizerGroup::new(GroupMode::Exclusive).unwrap());
                        tree.add_children(outer, &[top]);
                        top = outer;
                    }
                    (tree, vec![top])
                },
                |(mut tree, targets)| {
                    run(&mut tree, &targets, &events);
                    black_box(tree.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_flat_scope, bench_taps, bench_nested_groups);
criterion_main!(benches);
