//! # strike_core - Strike Core
//!
//! Small shared primitives used by the pool and AI crates:
//! - **Identifiers**: stable template names and generational instance ids
//! - **Frame timing**: tick counter and per-tick context
//! - **Scheduling**: delayed continuations with cancellation tokens
//! - **Event channels**: per-tick event queues drained by their owner
//!
//! Everything assumes a single logical update thread. Types that mutate take
//! `&mut self`, so structural changes cannot overlap within one tick.

pub mod channel;
pub mod id;
pub mod schedule;
pub mod time;

pub use channel::*;
pub use id::*;
pub use schedule::*;
pub use time::*;

pub mod prelude {
    pub use crate::channel::EventChannel;
    pub use crate::id::{Id, IdGenerator, StableId};
    pub use crate::schedule::{Scheduler, TaskToken};
    pub use crate::time::{FrameClock, FrameTime};
}
