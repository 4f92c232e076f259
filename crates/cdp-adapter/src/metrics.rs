use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdapterMetricsSnapshot {
    pub commands: u64,
    pub command_success: u64,
    pub command_failures: u64,
    pub command_latency_total_us: u64,
    pub pages_opened: u64,
}

static COMMANDS: AtomicU64 = AtomicU64::new(0);
static COMMAND_SUCCESS: AtomicU64 = AtomicU64::new(0);
static COMMAND_FAILURES: AtomicU64 = AtomicU64::new(0);
static COMMAND_LATENCY_TOTAL_US: AtomicU64 = AtomicU64::new(0);
static PAGES_OPENED: AtomicU64 = AtomicU64::new(0);

pub fn record_command() {
    COMMANDS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_command_success(latency: Duration) {
    COMMAND_SUCCESS.fetch_add(1, Ordering::Relaxed);
    COMMAND_LATENCY_TOTAL_US.fetch_add(latency.as_micros() as u64, Ordering::Relaxed);
}

pub fn record_command_failure() {
    COMMAND_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn record_page_opened() {
    PAGES_OPENED.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> AdapterMetricsSnapshot {
    AdapterMetricsSnapshot {
        commands: COMMANDS.load(Ordering::Relaxed),
        command_success: COMMAND_SUCCESS.load(Ordering::Relaxed),
        command_failures: COMMAND_FAILURES.load(Ordering::Relaxed),
        command_latency_total_us: COMMAND_LATENCY_TOTAL_US.load(Ordering::Relaxed),
        pages_opened: PAGES_OPENED.load(Ordering::Relaxed),
    }
}

impl AdapterMetricsSnapshot {
    pub fn average_latency_ms(&self) -> f64 {
        if self.command_success == 0 {
            return 0.0;
        }
        self.command_latency_total_us as f64 / self.command_success as f64 / 1_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_only_grow() {
        let before = snapshot();
        record_command();
        record_command_success(Duration::from_millis(2));
        record_command_failure();
        let after = snapshot();
        assert!(after.commands > before.commands);
        assert!(after.command_success > before.command_success);
        assert!(after.command_failures > before.command_failures);
        assert!(after.command_latency_total_us >= before.command_latency_total_us + 2_000);
    }

    #[test]
    fn average_latency_handles_empty_snapshot() {
        assert_eq!(AdapterMetricsSnapshot::default().average_latency_ms(), 0.0);
        let snap = AdapterMetricsSnapshot {
            command_success: 2,
            command_latency_total_us: 4_000,
            ..Default::default()
        };
        assert_eq!(snap.average_latency_ms(), 2.0);
    }
}
