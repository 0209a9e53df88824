use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Lookups slower than this are logged at warn level.
const SLOW_LOOKUP: Duration = Duration::from_secs(5);

/// A simple wall-clock timer for logging how long a fixture lookup took.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        debug!("⏱  Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let took = self.elapsed();
        if took >= SLOW_LOOKUP {
            warn!("⏱  Slow: {} (took {:.2?})", self.label, took);
        } else {
            debug!("⏱  Finished: {} (took {:.2?})", self.label, took);
        }
    }
}

/// Strip a bot command down to its name: "/start@fixture_bot arg" → "start".
pub fn command_name(text: &str) -> Option<&str> {
    let word = text.split_whitespace().next()?;
    let cmd = word.strip_prefix('/')?;
    let name = cmd.split('@').next().unwrap_or(cmd);
    if name.is_empty() { None } else { Some(name) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_name() {
        assert_eq!(command_name("/start"), Some("start"));
        assert_eq!(command_name(" /help@fixture_bot now"), Some("help"));
        assert_eq!(command_name("start"), None);
        assert_eq!(command_name("/"), None);
        assert_eq!(command_name(""), None);
    }

    #[test]
    fn test_timer_measures() {
        let t = Timer::start("noop");
        assert!(t.elapsed() < SLOW_LOOKUP);
    }
}
