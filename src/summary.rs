//! Run-level summary: `summary.csv` next to the per-agent logs, and a console table.

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use std::path::{Path, PathBuf};

use crate::metrics::SessionMetrics;

pub const SUMMARY_FILE: &str = "summary.csv";

/// Write one CSV row per session, header included.
pub fn write_csv(dir: &Path, sessions: &[SessionMetrics]) -> Result<PathBuf> {
    let path = dir.join(SUMMARY_FILE);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for metrics in sessions {
        writer
            .serialize(metrics)
            .with_context(|| format!("Failed to write row for {}", metrics.agent_name))?;
    }
    writer.flush().context("Failed to flush summary")?;
    Ok(path)
}

/// Console table of the sessions, timestamps left out.
pub fn render_table(sessions: &[SessionMetrics]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Agent", "Resolved", "Attempts", "Plays", "Clears", "Placed", "Errors", "Duration",
        ]);

    for m in sessions {
        table.add_row(vec![
            Cell::new(&m.agent_name),
            Cell::new(if m.resolved { "yes" } else { "no" }),
            Cell::new(m.attempts_made),
            Cell::new(m.play_clicks),
            Cell::new(m.clear_uses),
            Cell::new(m.commands_placed),
            Cell::new(m.script_errors),
            Cell::new(
                m.duration_s
                    .map(|d| format!("{:.2}s", d))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample(name: &str, resolved: bool) -> SessionMetrics {
        let start = Utc.with_ymd_and_hms(2025, 5, 20, 14, 0, 0).unwrap();
        let mut m = SessionMetrics::start_at(name, start);
        m.resolved = resolved;
        m.commands_placed = 4;
        m.finalize_at(start + chrono::Duration::seconds(3), 1);
        m
    }

    #[test]
    fn csv_has_header_and_one_row_per_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            &[sample("Overconfident", false), sample("Methodical_F1", true)],
        )
        .unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "agent_name,started_at,finished_at,duration_s,resolved,attempts_made,play_clicks,clear_uses,commands_placed,script_errors"
        );
        assert!(lines[1].starts_with("Overconfident,"));
        assert!(lines[2].contains(",3.0,true,1,0,0,4,0"));
    }

    #[test]
    fn table_lists_every_agent_without_timestamps() {
        let rendered = render_table(&[sample("Overconfident", false)]);
        assert!(rendered.contains("Overconfident"));
        assert!(rendered.contains("3.00s"));
        assert!(!rendered.contains("2025-05-20"));
    }
}
