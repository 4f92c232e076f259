//! Persona sessions end to end against the scripted page.

use cargobot_personas::persona::{self, PersonaDefinition, PersonaPlan, PlanStep, RunPolicy};
use cargobot_personas::{
    game, run_personas, run_session, Command, Config, EnvCall, ScriptedEnvironment,
    ScriptedPages, SessionLog, SessionMetrics, SlotGroup,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

async fn play(env: &ScriptedEnvironment, persona: &PersonaDefinition, seed: u64) -> SessionMetrics {
    let dir = tempfile::tempdir().unwrap();
    let log = SessionLog::create(dir.path(), &persona.name).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    run_session(env, persona, &Config::instant(), log, &mut rng).await
}

#[tokio::test]
async fn reference_solution_solves_on_first_try() {
    let env = ScriptedEnvironment::new().win_on_play(1);
    let metrics = play(&env, &persona::perfect_student(), 0).await;

    assert!(metrics.resolved);
    assert_eq!(metrics.attempts_made, 1);
    assert_eq!(metrics.commands_placed, 29);
    assert_eq!(metrics.play_clicks, 1);
    assert_eq!(metrics.script_errors, 0);

    let drags: Vec<EnvCall> = env
        .calls()
        .into_iter()
        .filter(|c| matches!(c, EnvCall::Drag { .. }))
        .collect();
    assert_eq!(
        drags.last(),
        Some(&EnvCall::Drag {
            source: "#tool_prog3".into(),
            target: "#reg_4_4".into()
        })
    );
}

#[tokio::test]
async fn setup_clicks_run_in_order_before_the_first_clear() {
    let env = ScriptedEnvironment::new();
    play(&env, &persona::overconfident(), 0).await;

    let clicks: Vec<String> = env
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            EnvCall::Click(target) => Some(target),
            _ => None,
        })
        .take(5)
        .collect();
    assert_eq!(
        clicks,
        vec![
            "#click2start".to_string(),
            "#pack_easy p".to_string(),
            "#level_0".to_string(),
            "#btn_clear".to_string(),
            game::clear_confirm().to_string(),
        ]
    );
    assert_eq!(
        env.calls().first(),
        Some(&EnvCall::Navigate(Config::default().base_url))
    );
}

#[tokio::test]
async fn missing_setup_control_is_fatal() {
    let env = ScriptedEnvironment::new().missing(&game::easy_pack());
    let metrics = play(&env, &persona::impulsive_random(), 0).await;

    assert_eq!(metrics.attempts_made, 0);
    assert_eq!(metrics.script_errors, 1);
    assert_eq!(metrics.play_clicks, 0);
    assert!(!env.calls().iter().any(|c| matches!(c, EnvCall::Drag { .. })));
}

#[tokio::test]
async fn impulsive_persona_uses_its_whole_budget_when_never_solving() {
    let env = ScriptedEnvironment::new().without_clear_modal();
    let metrics = play(&env, &persona::impulsive_random(), 11).await;

    assert!(!metrics.resolved);
    assert_eq!(metrics.attempts_made, 4);
    assert_eq!(metrics.play_clicks, 4);
    // initial clear plus three between attempts
    assert_eq!(metrics.clear_uses, 4);
    assert!(metrics.commands_placed >= 16);
}

#[tokio::test]
async fn out_of_range_plan_aborts_the_attempt_without_touching_the_page() {
    let broken = PersonaDefinition::new(
        "Broken Plan",
        1.0,
        2,
        PersonaPlan {
            steps: vec![PlanStep::Place {
                group: SlotGroup::F4,
                start: 4,
                commands: vec![Command::Grab, Command::Grab],
            }],
            run_policy: RunPolicy::Always,
            observe_secs: 1.0,
        },
    );
    let env = ScriptedEnvironment::new();
    let metrics = play(&env, &broken, 0).await;

    assert_eq!(metrics.agent_name, "Broken_Plan");
    assert_eq!(metrics.attempts_made, 2);
    assert_eq!(metrics.script_errors, 2);
    assert_eq!(metrics.commands_placed, 2);
    assert_eq!(metrics.play_clicks, 0);
    assert!(!env
        .calls()
        .iter()
        .any(|c| matches!(c, EnvCall::WaitVisible(t) if t == "#reg_4_5")));
}

#[tokio::test]
async fn same_seed_gives_the_same_session() {
    let persona = persona::confused_caller();
    let first = ScriptedEnvironment::new();
    let second = ScriptedEnvironment::new();
    play(&first, &persona, 42).await;
    play(&second, &persona, 42).await;
    assert_eq!(first.calls(), second.calls());
}

#[tokio::test]
async fn full_run_writes_logs_and_summary() {
    let root = tempfile::tempdir().unwrap();
    let config = Config {
        log_root: root.path().to_path_buf(),
        seed: Some(7),
        ..Config::instant()
    };
    let pages = ScriptedPages::from_template(ScriptedEnvironment::new().win_on_play(1));
    let personas = vec![persona::perfect_student(), persona::novice_explorer()];

    let report = run_personas(&pages, &personas, &config).await.unwrap();

    assert!(report.run_dir.starts_with(root.path()));
    assert!(report.sessions.iter().all(|m| m.resolved));
    let log = std::fs::read_to_string(
        report
            .run_dir
            .join("log_Perfect_Student_Reference_Solution.txt"),
    )
    .unwrap();
    assert!(log.starts_with("--- LOG START FOR AGENT: Perfect_Student_Reference_Solution ---"));
    assert!(log.contains("[LEVEL_SOLVED]"));
    assert!(log.contains("  resolved: true"));

    let csv = std::fs::read_to_string(report.summary_csv).unwrap();
    assert!(csv.lines().nth(2).unwrap().starts_with("Novice_Explorer,"));
}

#[tokio::test]
async fn single_unresolved_attempt_has_no_errors() {
    let env = ScriptedEnvironment::new();
    let metrics = play(&env, &persona::overconfident(), 0).await;

    assert!(!metrics.resolved);
    assert_eq!(metrics.attempts_made, 1);
    assert_eq!(metrics.script_errors, 0);
    assert_eq!(metrics.commands_placed, 4);
}

#[tokio::test]
async fn error_on_first_attempt_then_success_on_retry() {
    let env = ScriptedEnvironment::new().fail_drag(1).win_on_play(1);
    let metrics = play(&env, &persona::methodical_f1(), 0).await;

    assert!(metrics.resolved);
    assert_eq!(metrics.attempts_made, 2);
    assert!(metrics.script_errors >= 1);
    assert_eq!(metrics.play_clicks, 1);
    assert_eq!(metrics.commands_placed, 8);
}
