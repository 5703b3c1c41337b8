/// LogThrottle lets a diagnostic fire at most once per interval.
///
/// Time is supplied by the caller in milliseconds, usually the detector
/// frame timestamp, so the throttle follows the stream rather than the
/// wall clock.
#[derive(Debug, Clone)]
pub struct LogThrottle {
    interval_ms: u64,
    last_ms: Option<u64>,
}

impl LogThrottle {
    pub fn new(interval_ms: u64) -> Self {
        LogThrottle { interval_ms, last_ms: None }
    }

    pub fn should_log(&mut self, now_ms: u64) -> bool {
        match self.last_ms {
            Some(last) if now_ms.saturating_sub(last) < self.interval_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }
}
