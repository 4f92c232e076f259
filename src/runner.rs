//! Sequential persona runner
//!
//! One timestamped directory per run, one page per persona, personas strictly one after
//! another. A persona that cannot get a log file or a page is reported as a failed session
//! and the run continues with the next one.

use action_primitives::PageSource;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::controller::run_session;
use crate::errors::SessionError;
use crate::metrics::SessionMetrics;
use crate::persona::PersonaDefinition;
use crate::session_log::{LogLevel, SessionLog};
use crate::summary;

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_dir: PathBuf,
    pub summary_csv: PathBuf,
    pub sessions: Vec<SessionMetrics>,
}

/// Create `<root>/<YYYYmmdd-HHMMSS>` and return it.
pub fn create_run_dir(root: &Path, now: DateTime<Local>) -> Result<PathBuf> {
    let dir = root.join(now.format("%Y%m%d-%H%M%S").to_string());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create run directory {}", dir.display()))?;
    Ok(dir)
}

/// Random source for the persona at `index`: derived from the base seed when there is
/// one, otherwise from entropy.
pub fn session_rng(seed: Option<u64>, index: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
        None => StdRng::from_entropy(),
    }
}

/// Run `personas` in order against pages from `source`, then shut the source down.
pub async fn run_personas(
    source: &dyn PageSource,
    personas: &[PersonaDefinition],
    config: &Config,
) -> Result<RunReport> {
    let outcome = match create_run_dir(&config.log_root, Local::now()) {
        Ok(run_dir) => run_in(source, personas, config, run_dir).await,
        Err(err) => Err(err),
    };
    if let Err(err) = source.shutdown().await {
        warn!(?err, "failed to shut down the page source");
    }
    outcome
}

/// Open `log_<agent>.txt` inside the run directory.
pub fn open_log(run_dir: &Path, agent: &str) -> Result<SessionLog, SessionError> {
    Ok(SessionLog::create(run_dir, agent)?)
}

async fn run_in(
    source: &dyn PageSource,
    personas: &[PersonaDefinition],
    config: &Config,
    run_dir: PathBuf,
) -> Result<RunReport> {
    info!("Writing logs to {}", run_dir.display());

    let mut sessions = Vec::with_capacity(personas.len());
    for (index, persona) in personas.iter().enumerate() {
        info!(
            "=== Persona {}/{}: {} ===",
            index + 1,
            personas.len(),
            persona.name
        );
        let metrics = match open_log(&run_dir, &persona.name) {
            Ok(log) => run_on_page(source, persona, config, index, log).await,
            Err(err) => {
                error!(agent = %persona.name, %err, "could not create the session log");
                let log = SessionLog::from_writer(&persona.name, std::io::sink());
                unavailable_session(log, &persona.name, err.to_string())
            }
        };

        info!(
            agent = %metrics.agent_name,
            resolved = metrics.resolved,
            attempts = metrics.attempts_made,
            errors = metrics.script_errors,
            "persona finished"
        );
        sessions.push(metrics);

        if index + 1 < personas.len() && config.pause_between_personas_secs > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(config.pause_between_personas_secs))
                .await;
        }
    }

    let summary_csv = summary::write_csv(&run_dir, &sessions)?;
    Ok(RunReport {
        run_dir,
        summary_csv,
        sessions,
    })
}

async fn run_on_page(
    source: &dyn PageSource,
    persona: &PersonaDefinition,
    config: &Config,
    index: usize,
    log: SessionLog,
) -> SessionMetrics {
    match source.open_page().await {
        Ok(page) => {
            let mut rng = session_rng(config.seed, index);
            let metrics = run_session(&*page, persona, config, log, &mut rng).await;
            if let Err(err) = page.close().await {
                warn!(agent = %persona.name, ?err, "failed to close page");
            }
            metrics
        }
        Err(err) => {
            error!(agent = %persona.name, %err, "could not open a page");
            unavailable_session(log, &persona.name, format!("No page available: {}", err))
        }
    }
}

fn unavailable_session(mut log: SessionLog, agent: &str, reason: String) -> SessionMetrics {
    let mut metrics = SessionMetrics::start(agent);
    metrics.script_errors = 1;
    log.record(0, LogLevel::FatalError, reason);
    metrics.finalize(0);
    log.record(
        0,
        LogLevel::SessionEnd,
        "AGENT SESSION FINISHED. Resolved: false. Attempts: 0.",
    );
    log.write_metrics(&metrics);
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona;
    use crate::scripted::{ScriptedEnvironment, ScriptedPages};
    use crate::session_log::log_file_name;
    use chrono::TimeZone;
    use rand::Rng;

    #[test]
    fn run_dir_is_named_after_the_start_time() {
        let root = tempfile::tempdir().unwrap();
        let now = Local.with_ymd_and_hms(2025, 5, 20, 14, 3, 9).unwrap();
        let dir = create_run_dir(root.path(), now).unwrap();
        assert_eq!(dir, root.path().join("20250520-140309"));
        assert!(dir.is_dir());
    }

    #[test]
    fn seeded_rngs_differ_per_persona_and_repeat_per_run() {
        let a: u64 = session_rng(Some(10), 0).gen();
        let b: u64 = session_rng(Some(10), 1).gen();
        let again: u64 = session_rng(Some(10), 0).gen();
        assert_ne!(a, b);
        assert_eq!(a, again);
    }

    #[tokio::test]
    async fn every_persona_gets_a_log_and_a_summary_row() {
        let root = tempfile::tempdir().unwrap();
        let config = Config {
            log_root: root.path().to_path_buf(),
            seed: Some(3),
            ..Config::instant()
        };
        let pages = ScriptedPages::from_template(ScriptedEnvironment::new());
        let personas = persona::catalogue();

        let report = run_personas(&pages, &personas, &config).await.unwrap();
        assert_eq!(report.sessions.len(), 6);
        assert_eq!(pages.pages_opened(), 6);
        assert!(pages.is_shut_down());
        for persona in &personas {
            let log = report.run_dir.join(format!("log_{}.txt", persona.name));
            let text = std::fs::read_to_string(log).unwrap();
            assert!(text.contains("--- END OF METRICS ---"));
        }
        let csv = std::fs::read_to_string(&report.summary_csv).unwrap();
        assert_eq!(csv.lines().count(), 7);
    }

    #[tokio::test]
    async fn blocked_log_file_fails_that_persona_and_the_run_goes_on() {
        let root = tempfile::tempdir().unwrap();
        let config = Config {
            log_root: root.path().to_path_buf(),
            seed: Some(3),
            ..Config::instant()
        };
        let personas = persona::catalogue();
        let run_dir = root.path().join("run");
        let blocked = run_dir.join(log_file_name(&personas[1].name));
        std::fs::create_dir_all(&blocked).unwrap();

        assert!(matches!(
            open_log(&run_dir, &personas[1].name),
            Err(SessionError::Log(_))
        ));

        let pages = ScriptedPages::from_template(ScriptedEnvironment::new());
        let report = run_in(&pages, &personas, &config, run_dir).await.unwrap();
        assert_eq!(report.sessions.len(), 6);
        assert_eq!(pages.pages_opened(), 5);

        let failed = &report.sessions[1];
        assert!(!failed.resolved);
        assert_eq!(failed.attempts_made, 0);
        assert_eq!(failed.script_errors, 1);

        let csv = std::fs::read_to_string(&report.summary_csv).unwrap();
        assert_eq!(csv.lines().count(), 7);
    }
}
