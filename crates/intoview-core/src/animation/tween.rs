//! Property tweening
//!
//! Two ways to drive a tween:
//!
//! - [`TweenFrames`] is a pure iterator of interpolated snapshots; the
//!   caller decides when and where to apply each one.
//! - [`animate`] steps a [`TweenFrames`] on a [`Scheduler`] and writes every
//!   snapshot into a caller-owned record. Mutating that record in place is
//!   the only side effect of an animation and the way callers observe it.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use super::scheduler::{default_scheduler, FrameHandle, Scheduler};
use super::timing::{duration_in_frames, lerp, DEFAULT_DURATION};
use crate::easing::{Easing, EasingFn};

/// Numeric values keyed by property name
pub type TweenValues = BTreeMap<String, f64>;

/// A record whose numeric properties can be tweened
pub trait Tweenable {
    /// Current value of `key`, `None` when the record has no such property
    fn value(&self, key: &str) -> Option<f64>;

    fn set_value(&mut self, key: &str, value: f64);
}

impl Tweenable for BTreeMap<String, f64> {
    fn value(&self, key: &str) -> Option<f64> {
        self.get(key).copied()
    }

    fn set_value(&mut self, key: &str, value: f64) {
        self.insert(key.to_string(), value);
    }
}

impl Tweenable for HashMap<String, f64> {
    fn value(&self, key: &str) -> Option<f64> {
        self.get(key).copied()
    }

    fn set_value(&mut self, key: &str, value: f64) {
        self.insert(key.to_string(), value);
    }
}

/// Per-key start and end value
#[derive(Debug, Clone)]
struct Channel {
    key: String,
    start: f64,
    end: f64,
}

/// Lazy sequence of interpolated snapshots from a start record to a target
///
/// Only keys present in the target are tweened; a target key the source lacks
/// starts from `0.0`. Each snapshot is eased progress `frame / frames`
/// applied to every key. The final snapshot always lands on progress 1, so
/// the sequence ends exactly at the target. A zero duration yields that final
/// snapshot alone.
pub struct TweenFrames {
    channels: Vec<Channel>,
    easing: EasingFn,
    frame: u32,
    duration_in_frames: f64,
    instant: bool,
    finished: bool,
}

impl TweenFrames {
    pub fn new<S: Tweenable + ?Sized>(
        source: &S,
        target: &TweenValues,
        duration: Duration,
        easing: &Easing,
    ) -> Self {
        let channels = target
            .iter()
            .map(|(key, &end)| Channel {
                key: key.clone(),
                start: source.value(key).unwrap_or(0.0),
                end,
            })
            .collect();

        Self {
            channels,
            easing: easing.resolve(),
            frame: 0,
            duration_in_frames: duration_in_frames(duration),
            instant: duration.is_zero(),
            finished: false,
        }
    }

    /// Frames the tween spans, never less than one
    pub fn duration_in_frames(&self) -> f64 {
        self.duration_in_frames
    }

    /// Snapshots produced so far
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// The last snapshot has been produced
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.key.as_str())
    }
}

impl Iterator for TweenFrames {
    type Item = TweenValues;

    fn next(&mut self) -> Option<TweenValues> {
        if self.finished {
            return None;
        }

        let is_last = self.instant || f64::from(self.frame + 1) > self.duration_in_frames;
        let progress = if is_last {
            1.0
        } else {
            f64::from(self.frame) / self.duration_in_frames
        };
        let t = (self.easing)(progress);
        self.frame += 1;
        self.finished = is_last;

        Some(
            self.channels
                .iter()
                .map(|c| (c.key.clone(), lerp(c.start, c.end, t)))
                .collect(),
        )
    }
}

impl fmt::Debug for TweenFrames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenFrames")
            .field("channels", &self.channels)
            .field("frame", &self.frame)
            .field("duration_in_frames", &self.duration_in_frames)
            .field("finished", &self.finished)
            .finish()
    }
}

/// Options for [`animate`]
pub struct AnimateOptions<S> {
    /// Defaults to 400 ms
    pub duration: Option<Duration>,
    pub easing: Easing,
    /// Called with the source after every step except the last
    pub step: Option<Box<dyn FnMut(&S)>>,
    /// Called once with the source, on a later turn than the last step
    pub done: Option<Box<dyn FnOnce(&S)>>,
    /// Defaults to [`default_scheduler`]
    pub scheduler: Option<Rc<dyn Scheduler>>,
}

impl<S> Default for AnimateOptions<S> {
    fn default() -> Self {
        Self {
            duration: None,
            easing: Easing::default(),
            step: None,
            done: None,
            scheduler: None,
        }
    }
}

impl<S> AnimateOptions<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_easing(mut self, easing: impl Into<Easing>) -> Self {
        self.easing = easing.into();
        self
    }

    pub fn with_scheduler(mut self, scheduler: Rc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn on_step(mut self, step: impl FnMut(&S) + 'static) -> Self {
        self.step = Some(Box::new(step));
        self
    }

    pub fn on_done(mut self, done: impl FnOnce(&S) + 'static) -> Self {
        self.done = Some(Box::new(done));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TweenStatus {
    Running,
    Finished,
    Cancelled,
}

/// State shared between a running tween and its handle
struct Lifecycle {
    scheduler: Rc<dyn Scheduler>,
    pending: Cell<Option<FrameHandle>>,
    status: Cell<TweenStatus>,
}

struct TweenState<S> {
    source: Rc<RefCell<S>>,
    frames: TweenFrames,
    step: Option<Box<dyn FnMut(&S)>>,
    done: Option<Box<dyn FnOnce(&S)>>,
    lifecycle: Rc<Lifecycle>,
}

/// Handle to a running animation
#[derive(Clone)]
pub struct AnimationHandle {
    lifecycle: Rc<Lifecycle>,
}

impl AnimationHandle {
    /// Stop scheduling further steps
    ///
    /// Values already written to the source stay as they are. Calling this
    /// again, or after the animation finished, does nothing.
    pub fn cancel(&self) {
        if self.lifecycle.status.get() != TweenStatus::Running {
            return;
        }
        self.lifecycle.status.set(TweenStatus::Cancelled);
        if let Some(handle) = self.lifecycle.pending.take() {
            self.lifecycle.scheduler.cancel(handle);
        }
        tracing::debug!("Animation cancelled");
    }

    pub fn is_finished(&self) -> bool {
        self.lifecycle.status.get() == TweenStatus::Finished
    }

    pub fn is_cancelled(&self) -> bool {
        self.lifecycle.status.get() == TweenStatus::Cancelled
    }
}

impl fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("status", &self.lifecycle.status.get())
            .field("pending", &self.lifecycle.pending.get())
            .finish()
    }
}

/// Tween the numeric properties of `source` toward `target`
///
/// The first step is queued on the scheduler immediately. Every step writes
/// the next snapshot into `source`; see [`TweenFrames`] for the frame math.
pub fn animate<S: Tweenable + 'static>(
    source: Rc<RefCell<S>>,
    target: &TweenValues,
    options: AnimateOptions<S>,
) -> AnimationHandle {
    let AnimateOptions {
        duration,
        easing,
        step,
        done,
        scheduler,
    } = options;

    let duration = duration.unwrap_or(DEFAULT_DURATION);
    let frames = TweenFrames::new(&*source.borrow(), target, duration, &easing);
    tracing::debug!(
        keys = ?frames.keys().collect::<Vec<_>>(),
        frames = frames.duration_in_frames(),
        easing = ?easing,
        "Animation started"
    );

    let lifecycle = Rc::new(Lifecycle {
        scheduler: scheduler.unwrap_or_else(default_scheduler),
        pending: Cell::new(None),
        status: Cell::new(TweenStatus::Running),
    });

    let state = Rc::new(RefCell::new(TweenState {
        source,
        frames,
        step,
        done,
        lifecycle: Rc::clone(&lifecycle),
    }));
    schedule_step(&state);

    AnimationHandle { lifecycle }
}

fn schedule_step<S: Tweenable + 'static>(state: &Rc<RefCell<TweenState<S>>>) {
    let lifecycle = Rc::clone(&state.borrow().lifecycle);
    let next_state = Rc::clone(state);
    let handle = lifecycle
        .scheduler
        .next(Box::new(move || run_step(&next_state)));

    // A synchronous scheduler may already have run the whole tween.
    if lifecycle.status.get() == TweenStatus::Running {
        lifecycle.pending.set(Some(handle));
    }
}

fn run_step<S: Tweenable + 'static>(state: &Rc<RefCell<TweenState<S>>>) {
    let mut guard = state.borrow_mut();
    let st = &mut *guard;
    if st.lifecycle.status.get() != TweenStatus::Running {
        return;
    }
    st.lifecycle.pending.set(None);

    let Some(values) = st.frames.next() else {
        return;
    };
    {
        let mut source = st.source.borrow_mut();
        for (key, value) in &values {
            source.set_value(key, *value);
        }
    }
    tracing::trace!(frame = st.frames.frame(), values = ?values, "Animation step");

    if st.frames.is_finished() {
        st.lifecycle.status.set(TweenStatus::Finished);
        tracing::debug!(frames = st.frames.frame(), "Animation finished");
        if let Some(done) = st.done.take() {
            let source = Rc::clone(&st.source);
            let scheduler = Rc::clone(&st.lifecycle.scheduler);
            drop(guard);
            scheduler.defer(Box::new(move || done(&source.borrow())));
        }
        return;
    }

    drop(guard);
    schedule_step(state);

    let mut guard = state.borrow_mut();
    let st = &mut *guard;
    if let Some(step) = st.step.as_mut() {
        step(&st.source.borrow());
    }
}
