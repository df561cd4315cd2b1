//! Frame timing and per-tick context

/// Context for the current tick
///
/// Handed to every per-tick hook. `frame` is the identity of the tick: two
/// calls that see the same `frame` happen within the same logical update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Current frame number
    pub frame: u64,
    /// Delta time since last frame
    pub delta_time: f32,
    /// Total time since start
    pub total_time: f64,
}

impl FrameTime {
    /// A tick at `frame` reached with a constant `delta_time`
    pub fn at(frame: u64, delta_time: f32) -> Self {
        Self {
            frame,
            delta_time,
            total_time: frame as f64 * delta_time as f64,
        }
    }
}

/// Frame clock advancing the tick counter
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    frame: u64,
    total_time: f64,
    delta_time: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame and return its context
    pub fn tick(&mut self, delta_time: f32) -> FrameTime {
        self.frame += 1;
        self.delta_time = delta_time.max(0.0);
        self.total_time += self.delta_time as f64;
        self.now()
    }

    /// Context of the current frame without advancing
    pub fn now(&self) -> FrameTime {
        FrameTime {
            frame: self.frame,
            delta_time: self.delta_time,
            total_time: self.total_time,
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}
