//! Frame arithmetic for tweens
//!
//! Durations are converted into a frame budget assuming 60 steps per second,
//! whatever the actual pacing of the scheduler turns out to be.

use std::time::Duration;

/// Default tween duration when none is given
pub const DEFAULT_DURATION: Duration = Duration::from_millis(400);

/// Steps budgeted per second of duration
pub const FRAMES_PER_SECOND: f64 = 60.0;

/// Nominal interval between steps at a given frame rate
///
/// A frame rate of 0 falls back to 60 fps.
#[inline]
pub fn frame_interval(frame_rate: u32) -> Duration {
    let rate = if frame_rate == 0 { 60 } else { frame_rate };
    Duration::from_secs_f64(1.0 / rate as f64)
}

/// Number of frames a tween of `duration` spans, never less than one
#[inline]
pub fn duration_in_frames(duration: Duration) -> f64 {
    let millis = duration.as_nanos() as f64 / 1_000_000.0;
    (millis * FRAMES_PER_SECOND / 1000.0).max(1.0)
}

/// Linear interpolation between two values
///
/// # Arguments
/// * `from` - Start value
/// * `to` - End value
/// * `t` - Interpolation factor, usually eased progress
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}
