//! Delayed continuations for the single-threaded tick loop
//!
//! A task is registered with a wake-up rule (seconds, ticks or a predicate)
//! and a continuation that receives the host context mutably once it is due.
//! Nothing here blocks: `advance` is called once per tick by the host and runs
//! whatever became due, in registration order.
//!
//! Registration takes the [`FrameTime`] of the tick doing the registering.
//! Delays are measured from that tick, and a task never runs in the tick it
//! was registered in, even with a zero delay.

use crate::time::FrameTime;

/// Cancellation token for a scheduled task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskToken(u64);

impl TaskToken {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Continuation type
pub type Continuation<C> = Box<dyn FnOnce(&mut C) + Send>;

/// Predicate type for condition-based wake-ups
pub type WakePredicate<C> = Box<dyn FnMut(&C) -> bool + Send>;

enum Wake<C> {
    /// Absolute time in seconds
    At(f64),
    /// Absolute frame number
    Frame(u64),
    When(WakePredicate<C>),
}

struct Task<C> {
    token: TaskToken,
    /// Frame the task was registered in
    since: u64,
    wake: Wake<C>,
    run: Continuation<C>,
}

/// Scheduler for delayed work against a context `C`
pub struct Scheduler<C> {
    tasks: Vec<Task<C>>,
    next_token: u64,
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_token: 1,
        }
    }

    fn insert(&mut self, time: &FrameTime, wake: Wake<C>, run: Continuation<C>) -> TaskToken {
        let token = TaskToken(self.next_token);
        self.next_token += 1;
        self.tasks.push(Task {
            token,
            since: time.frame,
            wake,
            run,
        });
        token
    }

    /// Run `f` once `delay` seconds have passed since `time`
    pub fn schedule_after<F>(&mut self, time: &FrameTime, delay: f32, f: F) -> TaskToken
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        let at = time.total_time + delay.max(0.0) as f64;
        self.insert(time, Wake::At(at), Box::new(f))
    }

    /// Run `f` `ticks` frames after `time`
    pub fn schedule_after_ticks<F>(&mut self, time: &FrameTime, ticks: u64, f: F) -> TaskToken
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        let frame = time.frame + ticks.max(1);
        self.insert(time, Wake::Frame(frame), Box::new(f))
    }

    /// Run `f` on the first later tick where `predicate` holds
    pub fn schedule_when<P, F>(&mut self, time: &FrameTime, predicate: P, f: F) -> TaskToken
    where
        P: FnMut(&C) -> bool + Send + 'static,
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.insert(time, Wake::When(Box::new(predicate)), Box::new(f))
    }

    /// Cancel a pending task. Returns false if it already ran or never existed.
    pub fn cancel(&mut self, token: TaskToken) -> bool {
        match self.tasks.iter().position(|t| t.token == token) {
            Some(index) => {
                self.tasks.remove(index);
                log::trace!("Cancelled scheduled task {}", token.0);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, token: TaskToken) -> bool {
        self.tasks.iter().any(|t| t.token == token)
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Drop every pending task without running it
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Run every task that is due at `time`
    ///
    /// Returns the number of continuations that ran.
    pub fn advance(&mut self, ctx: &mut C, time: &FrameTime) -> usize {
        let (now, frame) = (time.total_time, time.frame);

        let mut due = Vec::new();
        let mut pending = Vec::with_capacity(self.tasks.len());
        for mut task in self.tasks.drain(..) {
            let ready = task.since < frame
                && match &mut task.wake {
                    Wake::At(at) => *at <= now,
                    Wake::Frame(f) => *f <= frame,
                    Wake::When(predicate) => predicate(ctx),
                };
            if ready {
                due.push(task);
            } else {
                pending.push(task);
            }
        }
        self.tasks = pending;

        let ran = due.len();
        for task in due {
            log::trace!("Running scheduled task {} at frame {}", task.token.0, frame);
            (task.run)(ctx);
        }
        ran
    }
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}
