//! CargoBot usability personas
//!
//! Scripted personas that play the CargoBot puzzle game in a real browser, each with its
//! own pacing, mistakes and attempt budget, and leave behind a log and metrics per session.

pub mod agent;
pub mod attempt;
pub mod cli;
pub mod config;
pub mod controller;
pub mod errors;
pub mod game;
pub mod metrics;
pub mod persona;
pub mod runner;
pub mod scripted;
pub mod session_log;
pub mod strategy;
pub mod summary;

pub use attempt::AttemptRecord;
pub use config::{load_config, Config, Timeouts};
pub use controller::run_session;
pub use errors::{AttemptError, SessionError};
pub use game::{Command, SlotGroup};
pub use metrics::SessionMetrics;
pub use persona::PersonaDefinition;
pub use runner::{run_personas, RunReport};
pub use scripted::{EnvCall, ScriptedEnvironment, ScriptedPages};
pub use session_log::{LogLevel, SessionLog};
