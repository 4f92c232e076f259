//! Session metrics: everything one persona session reports.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Aggregate outcome of one persona session.
///
/// Created when the session starts, mutated only by the session that owns it and
/// finalized exactly once when it ends.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionMetrics {
    pub agent_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_s: Option<f64>,
    pub resolved: bool,
    pub attempts_made: u32,
    pub play_clicks: u32,
    pub clear_uses: u32,
    pub commands_placed: u32,
    pub script_errors: u32,
}

impl SessionMetrics {
    pub fn start(agent_name: impl Into<String>) -> Self {
        Self::start_at(agent_name, Utc::now())
    }

    pub fn start_at(agent_name: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            agent_name: agent_name.into(),
            started_at,
            finished_at: None,
            duration_s: None,
            resolved: false,
            attempts_made: 0,
            play_clicks: 0,
            clear_uses: 0,
            commands_placed: 0,
            script_errors: 0,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Stamp the end time and derived duration. Later calls leave the first stamp intact.
    pub fn finalize_at(&mut self, finished_at: DateTime<Utc>, attempts_made: u32) {
        if self.is_finalized() {
            return;
        }
        let elapsed_ms = (finished_at - self.started_at).num_milliseconds().max(0);
        self.finished_at = Some(finished_at);
        self.duration_s = Some((elapsed_ms as f64 / 10.0).round() / 100.0);
        self.attempts_made = attempts_made;
    }

    pub fn finalize(&mut self, attempts_made: u32) {
        self.finalize_at(Utc::now(), attempts_made);
    }

    /// Every field as `(key, value)`, in declaration order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        fn optional<T: ToString>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "None".to_string())
        }

        vec![
            ("agent_name", self.agent_name.clone()),
            ("started_at", self.started_at.to_rfc3339()),
            (
                "finished_at",
                optional(&self.finished_at.map(|at| at.to_rfc3339())),
            ),
            ("duration_s", optional(&self.duration_s)),
            ("resolved", self.resolved.to_string()),
            ("attempts_made", self.attempts_made.to_string()),
            ("play_clicks", self.play_clicks.to_string()),
            ("clear_uses", self.clear_uses.to_string()),
            ("commands_placed", self.commands_placed.to_string()),
            ("script_errors", self.script_errors.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 20, 14, 0, 0).unwrap()
    }

    #[test]
    fn finalize_computes_rounded_duration_once() {
        let mut metrics = SessionMetrics::start_at("Overconfident", t0());
        metrics.finalize_at(t0() + Duration::milliseconds(12_345), 1);
        assert_eq!(metrics.duration_s, Some(12.35));
        assert_eq!(metrics.attempts_made, 1);

        metrics.finalize_at(t0() + Duration::seconds(99), 7);
        assert_eq!(metrics.duration_s, Some(12.35));
        assert_eq!(metrics.attempts_made, 1);
    }

    #[test]
    fn fields_cover_every_metric_in_order() {
        let metrics = SessionMetrics::start_at("Novice_Explorer", t0());
        let keys: Vec<&str> = metrics.fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "agent_name",
                "started_at",
                "finished_at",
                "duration_s",
                "resolved",
                "attempts_made",
                "play_clicks",
                "clear_uses",
                "commands_placed",
                "script_errors"
            ]
        );
        assert_eq!(metrics.fields()[2].1, "None");
    }
}
