//! Session-scoped game actions
//!
//! An `Agent` binds one environment, one persona and one random source for the lifetime of
//! a session, and turns game-level intents (place, run, clear, observe) into bounded
//! primitive calls while keeping the attempt record, metrics and log in step.

use action_primitives::{ActionError, ActionPrimitives};
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

use crate::attempt::AttemptRecord;
use crate::config::Config;
use crate::errors::AttemptError;
use crate::game::{self, Command, SlotGroup, TARGET_LEVEL};
use crate::metrics::SessionMetrics;
use crate::persona::PersonaDefinition;
use crate::session_log::{LogLevel, SessionLog};

/// Pause before the first setup click, after a page load.
const AFTER_LOAD_SECS: f64 = 1.5;
/// Pause between two setup clicks.
const BETWEEN_SETUP_SECS: f64 = 0.3;
/// Pause once the level is on screen.
const AFTER_LEVEL_SECS: f64 = 2.5;
/// Pause after a clear.
const AFTER_CLEAR_SECS: f64 = 0.3;
/// Pause after each placement, further scaled by the persona pace.
const AFTER_PLACEMENT_SECS: f64 = 0.1;

pub struct Agent<'a, R: Rng + ?Sized> {
    env: &'a dyn ActionPrimitives,
    persona: &'a PersonaDefinition,
    config: &'a Config,
    rng: &'a mut R,
    log: SessionLog,
    metrics: SessionMetrics,
    record: AttemptRecord,
    attempt: u32,
}

impl<'a, R: Rng + ?Sized> Agent<'a, R> {
    pub fn new(
        env: &'a dyn ActionPrimitives,
        persona: &'a PersonaDefinition,
        config: &'a Config,
        rng: &'a mut R,
        log: SessionLog,
    ) -> Self {
        Self {
            env,
            persona,
            config,
            rng,
            metrics: SessionMetrics::start(persona.name.clone()),
            log,
            record: AttemptRecord::new(),
            attempt: 0,
        }
    }

    pub fn record(&self) -> &AttemptRecord {
        &self.record
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut SessionMetrics {
        &mut self.metrics
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }

    pub fn rng(&mut self) -> &mut R {
        self.rng
    }

    pub fn log(&mut self, level: LogLevel, message: impl AsRef<str>) {
        self.log.record(self.attempt, level, message);
    }

    /// Pause like a person would: `base × pace × U(0.7, 1.3) × time_scale` seconds.
    pub async fn think(&mut self, base_secs: f64) {
        let jitter: f64 = self.rng.gen_range(0.7..1.3);
        let secs = base_secs * self.persona.pace * jitter * self.config.time_scale;
        if secs.is_finite() && secs > 0.0 {
            sleep(Duration::from_secs_f64(secs)).await;
        }
    }

    /// Load the game and click through to the target level.
    pub async fn navigate_to_level(&mut self) -> Result<(), ActionError> {
        self.log(
            LogLevel::Info,
            format!("Navigating to level {}...", TARGET_LEVEL),
        );
        let timeouts = self.config.timeouts;
        self.env
            .navigate(&self.config.base_url, timeouts.navigation())
            .await?;
        self.think(AFTER_LOAD_SECS).await;

        self.env
            .click(&game::start_button(), timeouts.setup_control())
            .await?;
        self.think(BETWEEN_SETUP_SECS).await;
        self.env
            .click(&game::easy_pack(), timeouts.setup_control())
            .await?;
        self.think(BETWEEN_SETUP_SECS).await;
        self.env
            .click(&game::target_level(), timeouts.setup_control())
            .await?;

        let url = self
            .env
            .current_url()
            .await
            .unwrap_or_else(|| "unknown".to_string());
        self.log(
            LogLevel::Info,
            format!("Navigation to '{}' complete. URL: {}", TARGET_LEVEL, url),
        );
        self.think(AFTER_LEVEL_SECS).await;
        Ok(())
    }

    /// Drag `command` from the palette into `group[index]`.
    ///
    /// The index is checked before the environment is touched. Source and slot must each
    /// become visible within the placement timeout, and the drag itself is bounded too.
    pub async fn place(
        &mut self,
        command: Command,
        group: SlotGroup,
        index: usize,
    ) -> Result<(), AttemptError> {
        AttemptRecord::check_slot(group, index)?;

        let source = command.palette();
        let slot = group.slot(index);
        let timeout = self.config.timeouts.placement();
        self.log(
            LogLevel::Info,
            format!("Dragging '{}' ({}) to slot '{}'", command, source, slot),
        );

        let env = self.env;
        let result = async {
            env.wait_visible(&source, timeout).await?;
            env.wait_visible(&slot, timeout).await?;
            env.drag_to(&source, &slot, timeout).await
        }
        .await;

        if let Err(err) = result {
            self.log(
                LogLevel::ScriptError,
                format!("Failed to drag '{}' to '{}': {}", command, slot, err),
            );
            return Err(err.into());
        }

        self.record.place(group, index, command)?;
        self.metrics.commands_placed += 1;
        self.log(
            LogLevel::Info,
            format!("Placed '{}' in {}[{}].", command, group, index),
        );
        self.think(AFTER_PLACEMENT_SECS * self.persona.pace).await;
        Ok(())
    }

    pub async fn press_play(&mut self) -> Result<(), ActionError> {
        self.log(LogLevel::Info, "Clicking Play...");
        self.env
            .click(&game::play_button(), self.config.timeouts.play())
            .await?;
        self.metrics.play_clicks += 1;
        self.record.record_run();
        self.log(LogLevel::Info, "Play clicked.");
        Ok(())
    }

    /// Clear the board. Never fails: a missing confirmation dialog is normal and other
    /// problems are logged as warnings. The attempt record is reset either way.
    pub async fn clear_board(&mut self) {
        self.log(LogLevel::Info, "Clicking Clear...");
        let timeouts = self.config.timeouts;
        let env = self.env;

        match env.click(&game::clear_button(), timeouts.clear()).await {
            Ok(()) => {
                self.log(LogLevel::Info, "Clear button clicked.");
                match env
                    .click(&game::clear_confirm(), timeouts.clear_confirm())
                    .await
                {
                    Ok(()) => self.log(LogLevel::Info, "Confirmed 'CLEAR' in the dialog."),
                    Err(err) if err.is_timeout() => {
                        self.log(LogLevel::Info, "Clear confirmation did not appear (OK).")
                    }
                    Err(err) => self.log(
                        LogLevel::Warning,
                        format!("Problem confirming clear: {}", err),
                    ),
                }
            }
            Err(err) => self.log(
                LogLevel::Warning,
                format!("Problem clicking clear: {}", err),
            ),
        }

        self.metrics.clear_uses += 1;
        self.record.reset();
        self.think(AFTER_CLEAR_SECS).await;
    }

    /// Watch the program run for `window_secs`, then look for the success banner.
    ///
    /// A banner that does not show up within the probe timeout is an unresolved outcome,
    /// not an error.
    pub async fn observe(&mut self, window_secs: f64) -> Result<bool, ActionError> {
        self.log(
            LogLevel::Info,
            format!(
                "Watching the run for {}s to check for success...",
                window_secs
            ),
        );
        self.think(window_secs).await;

        match self
            .env
            .wait_visible(&game::success_banner(), self.config.timeouts.success_probe())
            .await
        {
            Ok(()) => {
                self.log(LogLevel::LevelSolved, "'YOU GOT IT' screen detected!");
                Ok(true)
            }
            Err(err) if err.is_timeout() => {
                self.log(LogLevel::LevelFailed, "'YOU GOT IT' screen not detected.");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Finalize the metrics, close the log with the metrics block and hand the metrics back.
    pub fn finish(mut self) -> SessionMetrics {
        self.metrics.finalize(self.attempt);
        let summary = format!(
            "AGENT SESSION FINISHED. Resolved: {}. Attempts: {}. Duration: {}s",
            self.metrics.resolved,
            self.metrics.attempts_made,
            self.metrics.duration_s.unwrap_or_default()
        );
        self.log(LogLevel::SessionEnd, summary);
        self.log.write_metrics(&self.metrics);
        self.metrics
    }
}
