//! Step schedulers that pace tweens.
//!
//! A [`Scheduler`] runs a callback "at the next tick" and can cancel a
//! callback it has not run yet. What a tick means is up to the
//! implementation:
//!
//! - [`FrameScheduler`] - the host calls [`FrameScheduler::tick`] once per rendered frame
//! - [`TimerScheduler`] - a tokio timer at a fixed interval (needs a `LocalSet`)
//! - [`BlockingTimerScheduler`] - sleeps the calling thread between steps
//! - [`ImmediateScheduler`] - runs callbacks synchronously
//! - [`ManualScheduler`] - deterministic, driven step by step from tests
//! - [`CallbackScheduler`] - assembled from a pair of host-supplied functions
//!
//! [`select_scheduler`] picks frame pacing when the host can provide it and
//! falls back to [`BlockingTimerScheduler`] otherwise, which works with or
//! without a runtime. Hosts running inside a `LocalSet` can pass a
//! [`TimerScheduler`] explicitly to keep the thread free between steps.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::timing::frame_interval;
use crate::{Error, Result};

/// Work queued on a scheduler
pub type FrameCallback = Box<dyn FnOnce()>;

/// Opaque handle of a scheduled callback, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Runs callbacks at the next animation tick
pub trait Scheduler {
    /// Queue `callback` for the next tick
    fn next(&self, callback: FrameCallback) -> FrameHandle;

    /// Drop a queued callback; unknown or already-run handles are ignored
    fn cancel(&self, handle: FrameHandle);

    /// Run `callback` on a later turn, after the current call stack unwinds
    fn defer(&self, callback: FrameCallback) {
        let _ = self.next(callback);
    }
}

/// FIFO of pending callbacks shared by the queue-driven schedulers
#[derive(Default)]
struct CallbackQueue {
    next_id: Cell<u64>,
    frames: RefCell<VecDeque<(FrameHandle, FrameCallback)>>,
    deferred: RefCell<VecDeque<FrameCallback>>,
}

impl CallbackQueue {
    fn push(&self, callback: FrameCallback) -> FrameHandle {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let handle = FrameHandle(id);
        self.frames.borrow_mut().push_back((handle, callback));
        handle
    }

    fn remove(&self, handle: FrameHandle) {
        self.frames.borrow_mut().retain(|(queued, _)| *queued != handle);
    }

    fn push_deferred(&self, callback: FrameCallback) {
        self.deferred.borrow_mut().push_back(callback);
    }

    /// Run the frame callbacks queued before this call; returns how many ran
    fn run_frames(&self) -> usize {
        let batch: Vec<_> = self.frames.borrow_mut().drain(..).collect();
        let count = batch.len();
        for (_, callback) in batch {
            callback();
        }
        count
    }

    /// Run deferred callbacks until none are left, including ones they queue
    fn run_deferred(&self) -> usize {
        let mut count = 0;
        loop {
            let next = self.deferred.borrow_mut().pop_front();
            match next {
                Some(callback) => {
                    callback();
                    count += 1;
                }
                None => return count,
            }
        }
    }

    fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    fn pending_deferred(&self) -> usize {
        self.deferred.borrow().len()
    }
}

/// Frame-paced scheduler driven by the host's render loop
///
/// Callbacks queued while a tick is running land on the following tick, so
/// a tween advances exactly one step per frame.
#[derive(Default)]
pub struct FrameScheduler {
    queue: CallbackQueue,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one frame: run queued frame callbacks, then deferred ones
    ///
    /// Returns the number of frame callbacks that ran.
    pub fn tick(&self) -> usize {
        let ran = self.queue.run_frames();
        self.queue.run_deferred();
        ran
    }

    /// Nothing is waiting for a future tick
    pub fn is_idle(&self) -> bool {
        self.queue.pending_frames() == 0 && self.queue.pending_deferred() == 0
    }
}

impl Scheduler for FrameScheduler {
    fn next(&self, callback: FrameCallback) -> FrameHandle {
        self.queue.push(callback)
    }

    fn cancel(&self, handle: FrameHandle) {
        self.queue.remove(handle);
    }

    fn defer(&self, callback: FrameCallback) {
        self.queue.push_deferred(callback);
    }
}

/// Timer-paced scheduler on the tokio runtime
///
/// Callbacks are not `Send`, so every callback is spawned with
/// [`tokio::task::spawn_local`]; the scheduler must be used from within a
/// [`tokio::task::LocalSet`].
pub struct TimerScheduler {
    interval: Duration,
    next_id: Cell<u64>,
    tasks: Rc<RefCell<HashMap<FrameHandle, JoinHandle<()>>>>,
}

impl TimerScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_id: Cell::new(0),
            tasks: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Timer scheduler paced at `frame_rate` steps per second
    pub fn with_frame_rate(frame_rate: u32) -> Self {
        Self::new(frame_interval(frame_rate))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Callbacks scheduled but not yet run
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }
}

impl Default for TimerScheduler {
    fn default() -> Self {
        Self::with_frame_rate(60)
    }
}

impl Scheduler for TimerScheduler {
    fn next(&self, callback: FrameCallback) -> FrameHandle {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let handle = FrameHandle(id);

        let interval = self.interval;
        let tasks = Rc::clone(&self.tasks);
        let task = tokio::task::spawn_local(async move {
            tokio::time::sleep(interval).await;
            tasks.borrow_mut().remove(&handle);
            callback();
        });
        self.tasks.borrow_mut().insert(handle, task);
        handle
    }

    fn cancel(&self, handle: FrameHandle) {
        if let Some(task) = self.tasks.borrow_mut().remove(&handle) {
            task.abort();
        }
    }

    fn defer(&self, callback: FrameCallback) {
        tokio::task::spawn_local(async move {
            tokio::task::yield_now().await;
            callback();
        });
    }
}

/// Clears the draining flag even when a callback panics
struct DrainGuard<'a>(&'a Cell<bool>);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Synchronous queue runner shared by the schedulers that run on the
/// calling thread
///
/// Callbacks scheduled from within a running callback are queued and run
/// once it returns, so long tweens do not recurse.
#[derive(Default)]
struct Trampoline {
    queue: CallbackQueue,
    draining: Cell<bool>,
}

impl Trampoline {
    /// Run everything queued, sleeping `pace` before each frame callback
    fn drain(&self, pace: Duration) {
        if self.draining.replace(true) {
            return;
        }
        let _guard = DrainGuard(&self.draining);
        loop {
            let frame = self.queue.frames.borrow_mut().pop_front();
            if let Some((_, callback)) = frame {
                if !pace.is_zero() {
                    std::thread::sleep(pace);
                }
                callback();
                continue;
            }
            if self.queue.run_deferred() == 0 {
                break;
            }
        }
    }
}

/// Runs callbacks synchronously, inside the call that scheduled them
#[derive(Default)]
pub struct ImmediateScheduler {
    trampoline: Trampoline,
}

impl ImmediateScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for ImmediateScheduler {
    fn next(&self, callback: FrameCallback) -> FrameHandle {
        let handle = self.trampoline.queue.push(callback);
        self.trampoline.drain(Duration::ZERO);
        handle
    }

    fn cancel(&self, handle: FrameHandle) {
        self.trampoline.queue.remove(handle);
    }

    fn defer(&self, callback: FrameCallback) {
        self.trampoline.queue.push_deferred(callback);
        self.trampoline.drain(Duration::ZERO);
    }
}

/// Timer-paced scheduler that blocks the calling thread
///
/// Each step runs after sleeping one interval, so a whole tween completes
/// inside the call that started it. Needs no runtime; inside an async task
/// it holds the worker thread for the length of the tween.
pub struct BlockingTimerScheduler {
    interval: Duration,
    trampoline: Trampoline,
}

impl BlockingTimerScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            trampoline: Trampoline::default(),
        }
    }

    /// Blocking timer paced at `frame_rate` steps per second
    pub fn with_frame_rate(frame_rate: u32) -> Self {
        Self::new(frame_interval(frame_rate))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for BlockingTimerScheduler {
    fn default() -> Self {
        Self::with_frame_rate(60)
    }
}

impl Scheduler for BlockingTimerScheduler {
    fn next(&self, callback: FrameCallback) -> FrameHandle {
        let handle = self.trampoline.queue.push(callback);
        self.trampoline.drain(self.interval);
        handle
    }

    fn cancel(&self, handle: FrameHandle) {
        self.trampoline.queue.remove(handle);
    }

    fn defer(&self, callback: FrameCallback) {
        self.trampoline.queue.push_deferred(callback);
        self.trampoline.drain(self.interval);
    }
}

/// Deterministic scheduler for tests
///
/// Nothing runs until the test asks for it. Frame callbacks and deferred
/// callbacks are kept apart so a test can observe the gap between a tween's
/// last step and its completion callback.
#[derive(Default)]
pub struct ManualScheduler {
    queue: CallbackQueue,
    frames_run: Cell<usize>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the frame callbacks currently queued; returns how many ran
    pub fn run_frame(&self) -> usize {
        let ran = self.queue.run_frames();
        self.frames_run.set(self.frames_run.get() + ran);
        ran
    }

    /// Run pending deferred callbacks; returns how many ran
    pub fn run_deferred(&self) -> usize {
        self.queue.run_deferred()
    }

    /// Alternate frames and deferred callbacks until both queues are empty
    ///
    /// Gives up after `max_frames` frames; returns the frames run.
    pub fn run_until_idle(&self, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames {
            let ran = self.run_frame();
            let deferred = self.run_deferred();
            if ran == 0 && deferred == 0 {
                break;
            }
            frames += usize::from(ran > 0);
        }
        frames
    }

    pub fn pending_frames(&self) -> usize {
        self.queue.pending_frames()
    }

    pub fn pending_deferred(&self) -> usize {
        self.queue.pending_deferred()
    }

    /// Total frame callbacks run so far
    pub fn frames_run(&self) -> usize {
        self.frames_run.get()
    }
}

impl Scheduler for ManualScheduler {
    fn next(&self, callback: FrameCallback) -> FrameHandle {
        self.queue.push(callback)
    }

    fn cancel(&self, handle: FrameHandle) {
        self.queue.remove(handle);
    }

    fn defer(&self, callback: FrameCallback) {
        self.queue.push_deferred(callback);
    }
}

type NextFn = Box<dyn Fn(FrameCallback) -> FrameHandle>;
type CancelFn = Box<dyn Fn(FrameHandle)>;

/// Scheduler assembled from host-supplied functions
pub struct CallbackScheduler {
    next: NextFn,
    cancel: CancelFn,
}

impl CallbackScheduler {
    pub fn builder() -> CallbackSchedulerBuilder {
        CallbackSchedulerBuilder::default()
    }
}

impl Scheduler for CallbackScheduler {
    fn next(&self, callback: FrameCallback) -> FrameHandle {
        (self.next)(callback)
    }

    fn cancel(&self, handle: FrameHandle) {
        (self.cancel)(handle)
    }
}

/// Builder for [`CallbackScheduler`]; both functions are required
#[derive(Default)]
pub struct CallbackSchedulerBuilder {
    next: Option<NextFn>,
    cancel: Option<CancelFn>,
}

impl CallbackSchedulerBuilder {
    pub fn next(mut self, f: impl Fn(FrameCallback) -> FrameHandle + 'static) -> Self {
        self.next = Some(Box::new(f));
        self
    }

    pub fn cancel(mut self, f: impl Fn(FrameHandle) + 'static) -> Self {
        self.cancel = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Result<CallbackScheduler> {
        let next = self.next.ok_or_else(|| {
            Error::InvalidScheduler("scheduler is supposed to have next(callback) function".to_string())
        })?;
        let cancel = self.cancel.ok_or_else(|| {
            Error::InvalidScheduler("scheduler is supposed to have cancel(handle) function".to_string())
        })?;
        Ok(CallbackScheduler { next, cancel })
    }
}

/// Pick a scheduler from what the host can offer
///
/// `detect_frame_pacing` is supplied by the host; when it returns a
/// frame-paced scheduler that one is used, otherwise steps are paced by a
/// [`BlockingTimerScheduler`] at `frame_rate`.
pub fn select_scheduler<F>(detect_frame_pacing: F, frame_rate: u32) -> Rc<dyn Scheduler>
where
    F: FnOnce() -> Option<Rc<dyn Scheduler>>,
{
    match detect_frame_pacing() {
        Some(scheduler) => {
            tracing::debug!("Using frame-paced scheduler");
            scheduler
        }
        None => {
            tracing::debug!(frame_rate, "Frame pacing unavailable, using blocking timer");
            Rc::new(BlockingTimerScheduler::with_frame_rate(frame_rate))
        }
    }
}

/// Scheduler used when an animation does not name one
pub fn default_scheduler() -> Rc<dyn Scheduler> {
    select_scheduler(|| None, 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> FrameCallback) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let make = {
            let log = Rc::clone(&log);
            move |label: &'static str| -> FrameCallback {
                let log = Rc::clone(&log);
                Box::new(move || log.borrow_mut().push(label))
            }
        };
        (log, make)
    }

    #[test]
    fn test_frame_scheduler_runs_one_batch_per_tick() {
        let scheduler = Rc::new(FrameScheduler::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_log = Rc::clone(&log);
        let inner_scheduler = Rc::clone(&scheduler);
        scheduler.next(Box::new(move || {
            inner_log.borrow_mut().push(1);
            let log = Rc::clone(&inner_log);
            inner_scheduler.next(Box::new(move || log.borrow_mut().push(2)));
        }));

        assert_eq!(scheduler.tick(), 1);
        assert_eq!(*log.borrow(), vec![1]);
        assert!(!scheduler.is_idle());
        assert_eq!(scheduler.tick(), 1);
        assert_eq!(*log.borrow(), vec![1, 2]);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_frame_scheduler_runs_deferred_after_frames() {
        let scheduler = FrameScheduler::new();
        let (log, make) = recorder();
        scheduler.defer(make("deferred"));
        scheduler.next(make("frame"));
        scheduler.tick();
        assert_eq!(*log.borrow(), vec!["frame", "deferred"]);
    }

    #[test]
    fn test_cancel_removes_pending_callback() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        let first = scheduler.next(make("first"));
        scheduler.next(make("second"));
        scheduler.cancel(first);
        scheduler.cancel(first);
        assert_eq!(scheduler.run_frame(), 1);
        assert_eq!(*log.borrow(), vec!["second"]);
        assert_eq!(scheduler.frames_run(), 1);
    }

    #[test]
    fn test_manual_scheduler_keeps_deferred_separate() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        scheduler.defer(make("deferred"));
        assert_eq!(scheduler.run_frame(), 0);
        assert!(log.borrow().is_empty());
        assert_eq!(scheduler.pending_deferred(), 1);
        assert_eq!(scheduler.run_deferred(), 1);
        assert_eq!(*log.borrow(), vec!["deferred"]);
    }

    #[test]
    fn test_immediate_scheduler_trampolines() {
        let scheduler = Rc::new(ImmediateScheduler::new());
        let count = Rc::new(Cell::new(0));

        fn chain(scheduler: Rc<ImmediateScheduler>, count: Rc<Cell<u32>>) {
            let next_scheduler = Rc::clone(&scheduler);
            scheduler.next(Box::new(move || {
                count.set(count.get() + 1);
                if count.get() < 10_000 {
                    chain(next_scheduler, count);
                }
            }));
        }

        chain(Rc::clone(&scheduler), Rc::clone(&count));
        assert_eq!(count.get(), 10_000);
    }

    #[test]
    fn test_immediate_scheduler_recovers_from_panicking_callback() {
        let scheduler = ImmediateScheduler::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            scheduler.next(Box::new(|| panic!("step failed")));
        }));
        assert!(result.is_err());

        let (log, make) = recorder();
        scheduler.next(make("after"));
        scheduler.defer(make("deferred"));
        assert_eq!(*log.borrow(), vec!["after", "deferred"]);
    }

    #[test]
    fn test_blocking_timer_paces_steps() {
        let scheduler = Rc::new(BlockingTimerScheduler::new(Duration::from_millis(5)));
        let count = Rc::new(Cell::new(0));

        fn chain(scheduler: Rc<BlockingTimerScheduler>, count: Rc<Cell<u32>>) {
            let next_scheduler = Rc::clone(&scheduler);
            scheduler.next(Box::new(move || {
                count.set(count.get() + 1);
                if count.get() < 4 {
                    chain(next_scheduler, count);
                }
            }));
        }

        let started = std::time::Instant::now();
        chain(Rc::clone(&scheduler), Rc::clone(&count));
        assert_eq!(count.get(), 4);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_blocking_timer_cancel_and_frame_rate() {
        let scheduler = BlockingTimerScheduler::with_frame_rate(0);
        assert_eq!(scheduler.interval(), frame_interval(60));
        // Unknown handles are ignored.
        scheduler.cancel(FrameHandle::new(42));
    }

    #[test]
    fn test_default_scheduler_works_without_runtime() {
        let scheduler = default_scheduler();
        let (log, make) = recorder();
        scheduler.next(make("frame"));
        scheduler.defer(make("deferred"));
        assert_eq!(*log.borrow(), vec!["frame", "deferred"]);
    }

    #[tokio::test]
    async fn test_default_scheduler_works_without_local_set() {
        let scheduler = default_scheduler();
        let (log, make) = recorder();
        scheduler.next(make("frame"));
        assert_eq!(*log.borrow(), vec!["frame"]);
    }

    #[test]
    fn test_callback_scheduler_requires_both_functions() {
        let missing_cancel = CallbackScheduler::builder()
            .next(|_| FrameHandle::new(1))
            .build();
        assert!(matches!(missing_cancel, Err(Error::InvalidScheduler(_))));

        let missing_next = CallbackScheduler::builder().cancel(|_| {}).build();
        assert!(matches!(missing_next, Err(Error::InvalidScheduler(_))));
    }

    #[test]
    fn test_callback_scheduler_delegates() {
        let manual = Rc::new(ManualScheduler::new());
        let next_target = Rc::clone(&manual);
        let cancel_target = Rc::clone(&manual);
        let scheduler = CallbackScheduler::builder()
            .next(move |cb| next_target.next(cb))
            .cancel(move |handle| cancel_target.cancel(handle))
            .build()
            .unwrap();

        let (log, make) = recorder();
        let handle = scheduler.next(make("a"));
        scheduler.next(make("b"));
        scheduler.cancel(handle);
        // Default defer goes through next().
        scheduler.defer(make("c"));
        manual.run_frame();
        assert_eq!(*log.borrow(), vec!["b", "c"]);
    }

    #[test]
    fn test_select_scheduler_prefers_frame_pacing() {
        let frame = Rc::new(FrameScheduler::new());
        let host = Rc::clone(&frame);
        let selected = select_scheduler(move || Some(host as Rc<dyn Scheduler>), 60);

        let (log, make) = recorder();
        selected.next(make("tick"));
        frame.tick();
        assert_eq!(*log.borrow(), vec!["tick"]);
    }

    #[tokio::test]
    async fn test_timer_scheduler_fires_after_interval() {
        tokio::time::pause();
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let scheduler = TimerScheduler::with_frame_rate(60);
                let (log, make) = recorder();
                scheduler.next(make("kept"));
                let dropped = scheduler.next(make("cancelled"));
                scheduler.cancel(dropped);
                assert_eq!(scheduler.pending(), 1);

                tokio::time::sleep(Duration::from_millis(50)).await;
                assert_eq!(*log.borrow(), vec!["kept"]);
                assert_eq!(scheduler.pending(), 0);
            })
            .await;
    }

    #[tokio::test]
    async fn test_timer_scheduler_defers_to_later_turn() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let scheduler = TimerScheduler::default();
                let (log, make) = recorder();
                scheduler.defer(make("deferred"));
                assert!(log.borrow().is_empty());
                tokio::task::yield_now().await;
                tokio::task::yield_now().await;
                tokio::time::sleep(Duration::from_millis(1)).await;
                assert_eq!(*log.borrow(), vec!["deferred"]);
            })
            .await;
    }
}
