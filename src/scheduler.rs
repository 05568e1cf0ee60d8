//! Single-threaded task scheduling.
//!
//! The browser runs every effect on one event-dispatch thread, interleaving
//! work only at timer and animation-frame callbacks. [`Scheduler`] names
//! those two queues so effects can be driven by the real window
//! (`browser::BrowserScheduler`) or by [`ManualScheduler`] in tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub type TaskId = u64;

pub trait Scheduler {
    /// Milliseconds on the scheduler's clock.
    fn now(&self) -> f64;

    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskId;

    /// Queues `task` for the next frame; it receives the frame timestamp.
    fn request_frame(&self, task: Box<dyn FnOnce(f64)>) -> TaskId;

    /// Cancelling a task that already ran is a no-op.
    fn cancel(&self, id: TaskId);
}

struct TimerLoopInner {
    scheduler: Rc<dyn Scheduler>,
    step: RefCell<Box<dyn FnMut() -> Option<u32>>>,
    pending: Cell<Option<TaskId>>,
    finished: Cell<bool>,
}

impl TimerLoopInner {
    fn arm(this: &Rc<Self>, delay_ms: u32) {
        let next = Rc::clone(this);
        let id = this
            .scheduler
            .set_timeout(delay_ms, Box::new(move || Self::fire(next)));
        this.pending.set(Some(id));
    }

    fn fire(this: Rc<Self>) {
        this.pending.set(None);
        if this.finished.get() {
            return;
        }

        let next_delay = {
            let mut step = this.step.borrow_mut();
            (*step)()
        };
        match next_delay {
            Some(delay_ms) if !this.finished.get() => Self::arm(&this, delay_ms),
            _ => this.finished.set(true),
        }
    }

    fn cancel(&self) {
        self.finished.set(true);
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel(id);
        }
    }
}

/// A self-rescheduling timer. Each step returns the delay before the next
/// step, or `None` to finish. Dropping the handle cancels the loop unless it
/// was detached.
pub struct TimerLoop {
    inner: Option<Rc<TimerLoopInner>>,
}

impl TimerLoop {
    pub fn start(
        scheduler: Rc<dyn Scheduler>,
        first_delay_ms: u32,
        step: impl FnMut() -> Option<u32> + 'static,
    ) -> Self {
        let inner = Rc::new(TimerLoopInner {
            scheduler,
            step: RefCell::new(Box::new(step)),
            pending: Cell::new(None),
            finished: Cell::new(false),
        });
        TimerLoopInner::arm(&inner, first_delay_ms);

        Self { inner: Some(inner) }
    }

    /// Fixed-period repetition, the `setInterval` shape.
    pub fn every(
        scheduler: Rc<dyn Scheduler>,
        period_ms: u32,
        mut tick: impl FnMut() + 'static,
    ) -> Self {
        Self::start(scheduler, period_ms, move || {
            tick();
            Some(period_ms)
        })
    }

    pub fn cancel(&self) {
        if let Some(inner) = &self.inner {
            inner.cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|inner| !inner.finished.get())
    }

    /// Lets the loop run to its natural end without keeping the handle.
    pub fn detach(mut self) {
        self.inner.take();
    }
}

impl Drop for TimerLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct FrameLoopInner {
    scheduler: Rc<dyn Scheduler>,
    step: RefCell<Box<dyn FnMut(f64) -> bool>>,
    pending: Cell<Option<TaskId>>,
    finished: Cell<bool>,
}

impl FrameLoopInner {
    fn arm(this: &Rc<Self>) {
        let next = Rc::clone(this);
        let id = this
            .scheduler
            .request_frame(Box::new(move |timestamp| Self::fire(next, timestamp)));
        this.pending.set(Some(id));
    }

    fn fire(this: Rc<Self>, timestamp: f64) {
        this.pending.set(None);
        if this.finished.get() {
            return;
        }

        let keep_going = {
            let mut step = this.step.borrow_mut();
            (*step)(timestamp)
        };
        if keep_going && !this.finished.get() {
            Self::arm(&this);
        } else {
            this.finished.set(true);
        }
    }

    fn cancel(&self) {
        self.finished.set(true);
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel(id);
        }
    }
}

/// Per-frame repetition; the step returns `false` to stop.
pub struct FrameLoop {
    inner: Option<Rc<FrameLoopInner>>,
}

impl FrameLoop {
    pub fn start(scheduler: Rc<dyn Scheduler>, step: impl FnMut(f64) -> bool + 'static) -> Self {
        let inner = Rc::new(FrameLoopInner {
            scheduler,
            step: RefCell::new(Box::new(step)),
            pending: Cell::new(None),
            finished: Cell::new(false),
        });
        FrameLoopInner::arm(&inner);

        Self { inner: Some(inner) }
    }

    pub fn cancel(&self) {
        if let Some(inner) = &self.inner {
            inner.cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|inner| !inner.finished.get())
    }

    pub fn detach(mut self) {
        self.inner.take();
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct PendingTimer {
    id: TaskId,
    due: f64,
    task: Box<dyn FnOnce()>,
}

struct PendingFrame {
    id: TaskId,
    task: Box<dyn FnOnce(f64)>,
}

/// Deterministic clock with explicit timer and frame queues.
pub struct ManualScheduler {
    now: Cell<f64>,
    next_id: Cell<TaskId>,
    timers: RefCell<Vec<PendingTimer>>,
    frames: RefCell<Vec<PendingFrame>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            now: Cell::new(0.0),
            next_id: Cell::new(1),
            timers: RefCell::new(Vec::new()),
            frames: RefCell::new(Vec::new()),
        }
    }

    fn allocate_id(&self) -> TaskId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Moves the clock forward, running every timer that falls due on the
    /// way in due order. Timers scheduled by those tasks also run if they
    /// fall inside the window.
    pub fn advance(&self, ms: f64) {
        let target = self.now.get() + ms;

        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let position = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)))
                    .map(|(position, _)| position);
                position.map(|position| timers.remove(position))
            };

            let Some(timer) = next else {
                break;
            };
            self.now.set(timer.due.max(self.now.get()));
            (timer.task)();
        }

        self.now.set(target);
    }

    /// Runs the frame callbacks queued before this call. Callbacks queued
    /// while the frame runs wait for the next frame. Timers are not fired.
    pub fn run_frame(&self, timestamp: f64) {
        self.now.set(timestamp.max(self.now.get()));
        let batch: Vec<TaskId> = self.frames.borrow().iter().map(|frame| frame.id).collect();

        for id in batch {
            let frame = {
                let mut frames = self.frames.borrow_mut();
                frames
                    .iter()
                    .position(|frame| frame.id == id)
                    .map(|position| frames.remove(position))
            };
            if let Some(frame) = frame {
                (frame.task)(timestamp);
            }
        }
    }

    pub fn run_frames(&self, count: usize, frame_ms: f64) {
        for _ in 0..count {
            self.run_frame(self.now.get() + frame_ms);
        }
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskId {
        let id = self.allocate_id();
        self.timers.borrow_mut().push(PendingTimer {
            id,
            due: self.now.get() + f64::from(delay_ms),
            task,
        });
        id
    }

    fn request_frame(&self, task: Box<dyn FnOnce(f64)>) -> TaskId {
        let id = self.allocate_id();
        self.frames.borrow_mut().push(PendingFrame { id, task });
        id
    }

    fn cancel(&self, id: TaskId) {
        // Removed tasks drop after the borrows end; they may own loop handles
        // whose drop calls back into `cancel`.
        let _timer = {
            let mut timers = self.timers.borrow_mut();
            timers
                .iter()
                .position(|timer| timer.id == id)
                .map(|position| timers.remove(position))
        };
        let _frame = {
            let mut frames = self.frames.borrow_mut();
            frames
                .iter()
                .position(|frame| frame.id == id)
                .map(|position| frames.remove(position))
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> (Rc<ManualScheduler>, Rc<dyn Scheduler>) {
        let manual = Rc::new(ManualScheduler::new());
        let shared: Rc<dyn Scheduler> = manual.clone();
        (manual, shared)
    }

    #[test]
    fn timers_fire_in_due_order() {
        let (manual, shared) = scheduler();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (delay, label) in [(300, "c"), (100, "a"), (200, "b"), (100, "a2")] {
            let order = order.clone();
            shared.set_timeout(delay, Box::new(move || order.borrow_mut().push(label)));
        }

        manual.advance(250.0);
        assert_eq!(*order.borrow(), vec!["a", "a2", "b"]);
        manual.advance(50.0);
        assert_eq!(*order.borrow(), vec!["a", "a2", "b", "c"]);
        assert_eq!(manual.now(), 300.0);
    }

    #[test]
    fn cancelled_timer_never_runs() {
        let (manual, shared) = scheduler();
        let ran = Rc::new(Cell::new(false));

        let flag = ran.clone();
        let id = shared.set_timeout(10, Box::new(move || flag.set(true)));
        shared.cancel(id);
        manual.advance(100.0);

        assert!(!ran.get());
        assert_eq!(manual.pending_timers(), 0);
    }

    #[test]
    fn timer_loop_reschedules_with_returned_delay() {
        let (manual, shared) = scheduler();
        let fired_at = Rc::new(RefCell::new(Vec::new()));

        let clock = manual.clone();
        let log = fired_at.clone();
        let _handle = TimerLoop::start(shared, 100, move || {
            log.borrow_mut().push(clock.now());
            Some(50)
        });

        manual.advance(260.0);
        assert_eq!(*fired_at.borrow(), vec![100.0, 150.0, 200.0, 250.0]);
    }

    #[test]
    fn timer_loop_finishes_when_step_returns_none() {
        let (manual, shared) = scheduler();
        let count = Rc::new(Cell::new(0));

        let counter = count.clone();
        let handle = TimerLoop::start(shared, 10, move || {
            counter.set(counter.get() + 1);
            (counter.get() < 3).then_some(10)
        });

        manual.advance(1_000.0);
        assert_eq!(count.get(), 3);
        assert!(!handle.is_active());
        assert_eq!(manual.pending_timers(), 0);
    }

    #[test]
    fn dropping_timer_loop_cancels_it() {
        let (manual, shared) = scheduler();
        let count = Rc::new(Cell::new(0));

        let counter = count.clone();
        let handle = TimerLoop::every(shared, 100, move || counter.set(counter.get() + 1));
        manual.advance(250.0);
        drop(handle);
        manual.advance(1_000.0);

        assert_eq!(count.get(), 2);
        assert_eq!(manual.pending_timers(), 0);
    }

    #[test]
    fn detached_timer_loop_keeps_running() {
        let (manual, shared) = scheduler();
        let count = Rc::new(Cell::new(0));

        let counter = count.clone();
        TimerLoop::start(shared, 10, move || {
            counter.set(counter.get() + 1);
            (counter.get() < 2).then_some(10)
        })
        .detach();
        manual.advance(100.0);

        assert_eq!(count.get(), 2);
    }

    #[test]
    fn frame_loop_runs_once_per_frame_until_stopped() {
        let (manual, shared) = scheduler();
        let stamps = Rc::new(RefCell::new(Vec::new()));

        let log = stamps.clone();
        let handle = FrameLoop::start(shared, move |timestamp| {
            log.borrow_mut().push(timestamp);
            log.borrow().len() < 3
        });

        manual.run_frames(5, 16.0);
        assert_eq!(*stamps.borrow(), vec![16.0, 32.0, 48.0]);
        assert!(!handle.is_active());
        assert_eq!(manual.pending_frames(), 0);
    }

    #[test]
    fn cancelled_frame_loop_stops_immediately() {
        let (manual, shared) = scheduler();
        let count = Rc::new(Cell::new(0));

        let counter = count.clone();
        let handle = FrameLoop::start(shared, move |_| {
            counter.set(counter.get() + 1);
            true
        });
        manual.run_frames(2, 16.0);
        handle.cancel();
        manual.run_frames(2, 16.0);

        assert_eq!(count.get(), 2);
        assert_eq!(manual.pending_frames(), 0);
    }
}
