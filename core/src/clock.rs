use web_time::Instant;

use crate::Seconds;

/// Monotonic frame time measured from the moment the clock was created.
#[derive(Copy, Clone, Debug)]
pub struct FrameClock {
    origin: Instant,
}

impl FrameClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }

    pub fn now(&self) -> Seconds {
        self.origin.elapsed().as_secs_f32()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::start()
    }
}
