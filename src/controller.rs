//! Attempt controller
//!
//! Drives one persona session: navigation, an initial clear, then up to `max_attempts`
//! attempts with a clear between unresolved ones. The session always ends with finalized
//! metrics and a closed log, whatever happened on the way.

use action_primitives::ActionPrimitives;
use rand::Rng;

use crate::agent::Agent;
use crate::config::Config;
use crate::errors::SessionError;
use crate::metrics::SessionMetrics;
use crate::persona::PersonaDefinition;
use crate::session_log::{LogLevel, SessionLog};
use crate::strategy;

pub async fn run_session<R: Rng + ?Sized>(
    env: &dyn ActionPrimitives,
    persona: &PersonaDefinition,
    config: &Config,
    log: SessionLog,
    rng: &mut R,
) -> SessionMetrics {
    let mut agent = Agent::new(env, persona, config, rng, log);
    agent.log(
        LogLevel::Info,
        format!(
            "Starting session (pace {}, up to {} attempts).",
            persona.pace, persona.max_attempts
        ),
    );

    if let Err(err) = agent
        .navigate_to_level()
        .await
        .map_err(SessionError::Navigation)
    {
        agent.metrics_mut().script_errors += 1;
        agent.log(LogLevel::FatalError, err.to_string());
        return agent.finish();
    }

    agent.clear_board().await;

    while agent.attempt() < persona.max_attempts {
        let attempt = agent.begin_attempt();
        let remaining = attempt < persona.max_attempts;
        agent.log(
            LogLevel::Info,
            format!("--- Attempt {} of {} ---", attempt, persona.max_attempts),
        );

        match strategy::run_attempt(&mut agent, &persona.plan).await {
            Ok(true) => {
                agent.metrics_mut().resolved = true;
                agent.log(LogLevel::Info, "Level solved. Stopping.");
                break;
            }
            Ok(false) if remaining => {
                agent.log(LogLevel::Info, "Not solved. Clearing for the next attempt.");
                agent.clear_board().await;
            }
            Ok(false) => {
                agent.log(LogLevel::Info, "No attempts left without solving the level.");
            }
            Err(err) => {
                agent.metrics_mut().script_errors += 1;
                agent.log(
                    LogLevel::ScriptError,
                    format!("Attempt {} aborted: {}", attempt, err),
                );
                if remaining {
                    agent.clear_board().await;
                }
            }
        }
    }

    agent.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona;
    use crate::scripted::ScriptedEnvironment;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    async fn session(
        env: &ScriptedEnvironment,
        persona: &PersonaDefinition,
        seed: u64,
    ) -> (SessionMetrics, String) {
        let buffer = SharedBuffer::default();
        let log = SessionLog::from_writer(&persona.name, buffer.clone());
        let mut rng = StdRng::seed_from_u64(seed);
        let metrics = run_session(env, persona, &Config::instant(), log, &mut rng).await;
        (metrics, buffer.text())
    }

    #[tokio::test]
    async fn unreachable_game_is_fatal_with_zero_attempts() {
        let env = ScriptedEnvironment::new().unreachable();
        let (metrics, text) = session(&env, &persona::novice_explorer(), 1).await;
        assert!(!metrics.resolved);
        assert_eq!(metrics.attempts_made, 0);
        assert_eq!(metrics.script_errors, 1);
        assert_eq!(metrics.clear_uses, 0);
        assert!(metrics.is_finalized());
        assert!(text.contains("[FATAL_ERROR]"));
        assert!(text.contains("--- FINAL METRICS ---"));
    }

    #[tokio::test]
    async fn resolved_session_stops_after_first_attempt() {
        let env = ScriptedEnvironment::new().win_on_play(1);
        let (metrics, text) = session(&env, &persona::perfect_student(), 1).await;
        assert!(metrics.resolved);
        assert_eq!(metrics.attempts_made, 1);
        assert_eq!(metrics.commands_placed, 29);
        assert_eq!(metrics.play_clicks, 1);
        assert_eq!(metrics.clear_uses, 1);
        assert_eq!(metrics.script_errors, 0);
        assert!(text.contains("[LEVEL_SOLVED]"));
        assert!(text.contains("[SESSION_END]"));
    }

    #[tokio::test]
    async fn solved_attempt_ends_the_session_with_budget_left() {
        let env = ScriptedEnvironment::new().win_on_play(1);
        let persona = persona::impulsive_random();
        assert!(persona.max_attempts > 1);
        let (metrics, text) = session(&env, &persona, 4).await;
        assert!(metrics.resolved);
        assert_eq!(metrics.attempts_made, 1);
        assert_eq!(metrics.play_clicks, 1);
        assert_eq!(metrics.clear_uses, 1);
        assert_eq!(text.matches("[LEVEL_SOLVED]").count(), 1);
        assert!(!text.contains("(Attempt 2)"));
    }

    #[tokio::test]
    async fn unresolved_attempts_clear_between_but_not_after_the_last() {
        let env = ScriptedEnvironment::new();
        let (metrics, text) = session(&env, &persona::novice_explorer(), 1).await;
        assert!(!metrics.resolved);
        assert_eq!(metrics.attempts_made, 2);
        assert_eq!(metrics.commands_placed, 3);
        assert_eq!(metrics.play_clicks, 2);
        // initial clear plus one between the two attempts
        assert_eq!(metrics.clear_uses, 2);
        assert_eq!(text.matches("[LEVEL_FAILED]").count(), 2);
    }

    #[tokio::test]
    async fn drag_failure_counts_once_and_moves_on() {
        let env = ScriptedEnvironment::new().fail_drag(2);
        let (metrics, text) = session(&env, &persona::methodical_f1(), 1).await;
        assert_eq!(metrics.attempts_made, 2);
        assert_eq!(metrics.script_errors, 1);
        assert!(!metrics.resolved);
        assert_eq!(metrics.clear_uses, 2);
        assert!(text.contains("(Attempt 1): Attempt 1 aborted"));
        assert!(text.contains("(Attempt 2): --- Attempt 2 of 2 ---"));
    }

    #[tokio::test]
    async fn attempts_never_exceed_the_budget() {
        for persona in persona::catalogue() {
            let env = ScriptedEnvironment::new();
            let (metrics, _) = session(&env, &persona, 9).await;
            assert!(metrics.attempts_made <= persona.max_attempts);
            assert!(metrics.clear_uses >= 1);
            assert!(metrics.duration_s.is_some());
        }
    }
}
