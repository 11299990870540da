// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tunable thresholds shared by every recognizer in a [`RecognizerTree`](crate::tree::RecognizerTree).
//!
//! Settings are injected when the tree is built and reach recognizers through their
//! per-call [`Context`](crate::recognizer::Context); nothing in this crate reads process-wide state.

/// Largest finger count a recognizer may require.
pub const MAX_FINGERS: i32 = 10;

/// Finger count used when a configured count is out of range.
pub const DEFAULT_FINGERS: i32 = 1;

/// Gesture thresholds and timeouts.
///
/// Distances are in pixels, durations in milliseconds, angles in degrees and speeds in
/// pixels per second.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureSettings {
    /// Maximum incidental movement of a single tap.
    pub tap_slop: f64,
    /// Maximum distance between the focus points of consecutive taps of a multi-tap.
    pub multi_tap_slop: f64,
    /// Time allowed between consecutive taps of a multi-tap.
    pub multi_tap_timeout: u64,
    /// Time allowed for all fingers of a multi-finger tap to land.
    pub multi_finger_timeout: u64,
    /// Default hold time of a long press.
    pub long_press_duration: u64,
    /// Maximum incidental movement while holding a long press.
    pub long_press_slop: f64,
    /// Interval between repeated long-press actions.
    pub long_press_repeat_interval: u64,
    /// Default pan distance for touch input.
    pub pan_distance: f64,
    /// Default pan distance for mouse input.
    pub pan_mouse_distance: f64,
    /// Default pinch distance.
    pub pinch_distance: f64,
    /// Default rotation angle.
    pub rotation_angle: f64,
    /// Rotation below this magnitude that flips sign is held back as jitter.
    pub rotation_jitter: f64,
    /// Default swipe speed.
    pub swipe_speed: f64,
    /// Time allowed between the children of a sequence group.
    pub sequence_timeout: u64,
    /// Log every input sample at `trace` level.
    pub trace_input: bool,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            tap_slop: 20.0,
            multi_tap_slop: 100.0,
            multi_tap_timeout: 300,
            multi_finger_timeout: 300,
            long_press_duration: 500,
            long_press_slop: 15.0,
            long_press_repeat_interval: 300,
            pan_distance: 5.0,
            pan_mouse_distance: 1.0,
            pinch_distance: 5.0,
            rotation_angle: 1.0,
            rotation_jitter: 0.5,
            swipe_speed: 100.0,
            sequence_timeout: 300,
            trace_input: false,
        }
    }
}

/// Clamp a configured finger count into `[1, MAX_FINGERS]`.
///
/// Out-of-range values become [`DEFAULT_FINGERS`].
pub fn clamp_fingers(fingers: i32) -> i32 {
    if fingers <= 0 || fingers > MAX_FINGERS {
        DEFAULT_FINGERS
    } else {
        fingers
    }
}

/// Clamp a configured finger count for two-finger gestures into `[2, 5]`.
///
/// Out-of-range values become `2`.
pub fn clamp_multi_fingers(fingers: i32) -> i32 {
    if (2..=5).contains(&fingers) { fingers } else { 2 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingers_clamp_to_default() {
        assert_eq!(clamp_fingers(0), 1);
        assert_eq!(clamp_fingers(-3), 1);
        assert_eq!(clamp_fingers(11), 1);
        assert_eq!(clamp_fingers(10), 10);
        assert_eq!(clamp_fingers(3), 3);
    }

    #[test]
    fn multi_fingers_clamp() {
        assert_eq!(clamp_multi_fingers(1), 2);
        assert_eq!(clamp_multi_fingers(6), 2);
        assert_eq!(clamp_multi_fingers(4), 4);
    }
}
