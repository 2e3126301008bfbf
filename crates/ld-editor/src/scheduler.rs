//! Frame scheduler: decides which inbound frames get drawn.
//!
//! Final frames always render and leave the scheduler untouched.
//! Intermediate frames render on the first run, or once more than the
//! sample interval has passed since the last rendered intermediate frame;
//! everything else is dropped.

use ld_core::config::ClientConfig;
use ld_core::protocol::FrameMessage;

#[derive(Debug, Clone)]
pub struct FrameScheduler {
    /// Minimum gap between rendered intermediate frames, in ms.
    sample_interval_ms: f64,
    last_render_ms: f64,
    first_run: bool,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl FrameScheduler {
    pub fn new(sample_interval_ms: f64) -> Self {
        Self {
            sample_interval_ms,
            last_render_ms: 0.0,
            first_run: true,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.sample_interval_ms)
    }

    /// Whether `frame`, arriving at `now_ms`, should be rendered.
    pub fn admit(&mut self, frame: &FrameMessage, now_ms: f64) -> bool {
        if frame.is_final() {
            log::trace!("admit final frame at {now_ms}ms");
            return true;
        }
        if self.first_run || now_ms - self.last_render_ms > self.sample_interval_ms {
            self.first_run = false;
            self.last_render_ms = now_ms;
            log::trace!("admit intermediate frame at {now_ms}ms");
            true
        } else {
            log::trace!(
                "drop intermediate frame at {now_ms}ms ({}ms since last render)",
                now_ms - self.last_render_ms
            );
            false
        }
    }

    pub fn is_first_run(&self) -> bool {
        self.first_run
    }
}
