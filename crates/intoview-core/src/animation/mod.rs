//! Property animation engine
//!
//! Tweens the numeric properties of a record toward target values, one step
//! per scheduler tick, with eased progress.
//!
//! # Layers
//!
//! - `timing` - frame budget and interpolation arithmetic
//! - `scheduler` - pluggable step pacing (frame, timer, blocking timer, immediate, manual)
//! - `tween` - lazy snapshot sequence and the in-place `animate` driver
//!
//! # Usage
//!
//! ```ignore
//! use intoview_core::animation::{animate, AnimateOptions, FrameScheduler, TweenValues};
//!
//! let scheduler = Rc::new(FrameScheduler::new());
//! let source = Rc::new(RefCell::new(TweenValues::from([("x".to_string(), 0.0)])));
//! let target = TweenValues::from([("x".to_string(), 100.0)]);
//!
//! let handle = animate(source.clone(), &target, AnimateOptions::new()
//!     .with_duration(Duration::from_millis(200))
//!     .with_scheduler(scheduler.clone()));
//!
//! // In the render loop
//! scheduler.tick();
//! ```

pub mod scheduler;
pub mod timing;
pub mod tween;

pub use scheduler::{
    default_scheduler, select_scheduler, BlockingTimerScheduler, CallbackScheduler,
    CallbackSchedulerBuilder, FrameCallback, FrameHandle, FrameScheduler, ImmediateScheduler,
    ManualScheduler, Scheduler, TimerScheduler,
};
pub use tween::{animate, AnimateOptions, AnimationHandle, TweenFrames, TweenValues, Tweenable};
