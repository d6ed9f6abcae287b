use log::info;
use std::time::{Duration, Instant};

/// Scoped timer that logs the elapsed wall time of a run when dropped.
pub struct RunTimer {
    label: &'static str,
    started: Instant,
}

impl RunTimer {
    /// Start timing `label`.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            started: Instant::now(),
        }
    }
}

impl Drop for RunTimer {
    fn drop(&mut self) {
        info!("{}", elapsed_message(self.label, self.started.elapsed()));
    }
}

fn elapsed_message(label: &str, elapsed: Duration) -> String {
    format!("Elapsed: {:.4} s ({})", elapsed.as_secs_f64(), label)
}
