//! Append-only text log for one persona session.
//!
//! Line format: `<elapsed>s [<LEVEL>] - <agent> (Attempt <n>): <message>`. Every line is also
//! emitted as a `tracing` event so the console shows the same story.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{error, info, warn};

use crate::metrics::SessionMetrics;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    ScriptError,
    FatalError,
    LevelSolved,
    LevelFailed,
    SessionEnd,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::ScriptError => "SCRIPT_ERROR",
            LogLevel::FatalError => "FATAL_ERROR",
            LogLevel::LevelSolved => "LEVEL_SOLVED",
            LogLevel::LevelFailed => "LEVEL_FAILED",
            LogLevel::SessionEnd => "SESSION_END",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn format_line(
    elapsed_secs: f64,
    level: LogLevel,
    agent: &str,
    attempt: u32,
    message: &str,
) -> String {
    format!(
        "{:.2}s [{}] - {} (Attempt {}): {}",
        elapsed_secs, level, agent, attempt, message
    )
}

/// File name used for an agent's log inside the run directory.
pub fn log_file_name(agent: &str) -> String {
    format!("log_{}.txt", agent.replace(' ', "_"))
}

pub struct SessionLog {
    agent: String,
    started: Instant,
    path: Option<PathBuf>,
    sink: Box<dyn Write + Send>,
}

impl SessionLog {
    /// Create `log_<agent>.txt` in `dir`, truncating any previous file.
    pub fn create(dir: &Path, agent: &str) -> io::Result<Self> {
        let path = dir.join(log_file_name(agent));
        let file = File::create(&path)?;
        let mut log = Self::from_writer(agent, BufWriter::new(file));
        log.path = Some(path);
        log.write_header()?;
        Ok(log)
    }

    pub fn from_writer(agent: &str, sink: impl Write + Send + 'static) -> Self {
        Self {
            agent: agent.replace(' ', "_"),
            started: Instant::now(),
            path: None,
            sink: Box::new(sink),
        }
    }

    fn write_header(&mut self) -> io::Result<()> {
        writeln!(self.sink, "--- LOG START FOR AGENT: {} ---", self.agent)?;
        self.sink.flush()
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn record(&mut self, attempt: u32, level: LogLevel, message: impl AsRef<str>) {
        let message = message.as_ref();
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            level,
            &self.agent,
            attempt,
            message,
        );

        match level {
            LogLevel::Warning => warn!(agent = %self.agent, attempt, "{}", message),
            LogLevel::ScriptError | LogLevel::FatalError => {
                error!(agent = %self.agent, attempt, level = %level, "{}", message)
            }
            _ => info!(agent = %self.agent, attempt, level = %level, "{}", message),
        }

        if let Err(err) = writeln!(self.sink, "{}", line).and_then(|_| self.sink.flush()) {
            warn!(agent = %self.agent, ?err, "failed to append to session log");
        }
    }

    /// Append the `key: value` block with every metric.
    pub fn write_metrics(&mut self, metrics: &SessionMetrics) {
        let result = (|| -> io::Result<()> {
            writeln!(self.sink)?;
            writeln!(self.sink, "--- FINAL METRICS ---")?;
            for (key, value) in metrics.fields() {
                writeln!(self.sink, "  {}: {}", key, value)?;
            }
            writeln!(self.sink, "--- END OF METRICS ---")?;
            self.sink.flush()
        })();
        if let Err(err) = result {
            warn!(agent = %self.agent, ?err, "failed to write final metrics block");
        }
    }
}
