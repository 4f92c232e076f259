//! Persona catalogue
//!
//! A persona is data: pacing, an attempt budget and a declarative plan that the strategy
//! executor interprets once per attempt.

use rand::Rng;

use crate::game::{Command, SlotGroup};
use Command::{Call, Grab, Left, Right};
use SlotGroup::{F1, F2, F3, F4};

/// How many commands a random fill places.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Count {
    Exactly(usize),
    /// Uniform draw, both ends inclusive
    Between(usize, usize),
    /// One value on the first attempt, another afterwards
    ByAttempt { first: usize, later: usize },
}

impl Count {
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R, attempt: u32) -> usize {
        match *self {
            Count::Exactly(n) => n,
            Count::Between(lo, hi) if lo >= hi => lo,
            Count::Between(lo, hi) => rng.gen_range(lo..=hi),
            Count::ByAttempt { first, later } => {
                if attempt <= 1 {
                    first
                } else {
                    later
                }
            }
        }
    }
}

/// Chance to end a random fill by calling another function and filling that one too.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TailCall {
    pub chance: f64,
    pub callee: SlotGroup,
    pub count: Count,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlanStep {
    /// Log a line
    Announce(String),
    /// Fixed commands into consecutive slots starting at `start`
    Place {
        group: SlotGroup,
        start: usize,
        commands: Vec<Command>,
    },
    /// Random basic commands into slots `0..count`, optional pause after each
    RandomFill {
        group: SlotGroup,
        count: Count,
        pause_secs: Option<f64>,
        tail_call: Option<TailCall>,
    },
    /// On `on_attempt` only: run and observe; if unresolved, clear and replay placements
    Probe { on_attempt: u32, observe_secs: f64 },
    /// Place a call to `callee` somewhere in `caller`, possibly forgetting or misplacing it
    CallPlacement {
        caller: SlotGroup,
        callee: SlotGroup,
        forget_chance: f64,
        misplace_chance: f64,
        misplace_within: usize,
    },
}

/// Whether the run button is pressed after placing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPolicy {
    Always,
    /// Nothing placed: the attempt is unresolved without running
    SkipWhenEmpty,
    /// Nothing placed: skip the run but still observe
    ObserveWhenEmpty,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PersonaPlan {
    pub steps: Vec<PlanStep>,
    pub run_policy: RunPolicy,
    pub observe_secs: f64,
}

/// Immutable persona description
#[derive(Clone, Debug, PartialEq)]
pub struct PersonaDefinition {
    pub name: String,
    /// Multiplier on every pause this persona takes
    pub pace: f64,
    pub max_attempts: u32,
    pub plan: PersonaPlan,
}

impl PersonaDefinition {
    pub fn new(name: impl Into<String>, pace: f64, max_attempts: u32, plan: PersonaPlan) -> Self {
        Self {
            name: name.into().replace(' ', "_"),
            pace,
            max_attempts,
            plan,
        }
    }
}

/// Fills all four functions with the reference solution of the level.
pub fn perfect_student() -> PersonaDefinition {
    PersonaDefinition::new(
        "Perfect_Student_Reference_Solution",
        0.3,
        1,
        PersonaPlan {
            steps: vec![
                PlanStep::Announce("Applying reference solution (F1->F2->F4->F3)...".into()),
                PlanStep::Place {
                    group: F1,
                    start: 0,
                    commands: vec![Grab, Right, Grab, Left, Grab, Right, Grab, Call(F2)],
                },
                PlanStep::Place {
                    group: F2,
                    start: 0,
                    commands: vec![Left, Grab, Right, Grab, Left, Grab, Right, Call(F4)],
                },
                PlanStep::Place {
                    group: F3,
                    start: 0,
                    commands: vec![Right, Grab, Left, Grab, Right, Grab, Left, Call(F1)],
                },
                PlanStep::Place {
                    group: F4,
                    start: 0,
                    commands: vec![Right, Grab, Left, Grab, Call(F3)],
                },
            ],
            run_policy: RunPolicy::Always,
            observe_secs: 60.0,
        },
    )
}

/// Cautious: one random command on the first attempt, two on the next, thinking between.
pub fn novice_explorer() -> PersonaDefinition {
    PersonaDefinition::new(
        "Novice_Explorer",
        1.8,
        2,
        PersonaPlan {
            steps: vec![
                PlanStep::Announce("Explorer: trying a command or two in F1".into()),
                PlanStep::RandomFill {
                    group: F1,
                    count: Count::ByAttempt { first: 1, later: 2 },
                    pause_secs: Some(1.0),
                    tail_call: None,
                },
            ],
            run_policy: RunPolicy::SkipWhenEmpty,
            observe_secs: 7.0,
        },
    )
}

/// Fast trial and error: fills most of F1 at random, occasionally calls F2.
pub fn impulsive_random() -> PersonaDefinition {
    PersonaDefinition::new(
        "Impulsive_Random",
        0.7,
        4,
        PersonaPlan {
            steps: vec![
                PlanStep::Announce("Impulsive: filling F1 at random".into()),
                PlanStep::RandomFill {
                    group: F1,
                    count: Count::Between(4, 8),
                    pause_secs: None,
                    tail_call: Some(TailCall {
                        chance: 0.15,
                        callee: F2,
                        count: Count::Between(1, 3),
                    }),
                },
            ],
            run_policy: RunPolicy::ObserveWhenEmpty,
            observe_secs: 15.0,
        },
    )
}

/// Builds a long program in F1 only, testing the first three moves on its first attempt.
pub fn methodical_f1() -> PersonaDefinition {
    PersonaDefinition::new(
        "Methodical_F1",
        1.2,
        2,
        PersonaPlan {
            steps: vec![
                PlanStep::Announce("Methodical: building everything in F1".into()),
                PlanStep::Place {
                    group: F1,
                    start: 0,
                    commands: vec![Grab, Right, Grab],
                },
                PlanStep::Probe {
                    on_attempt: 1,
                    observe_secs: 5.0,
                },
                PlanStep::Place {
                    group: F1,
                    start: 3,
                    commands: vec![Left, Grab, Right, Right, Grab],
                },
            ],
            run_policy: RunPolicy::Always,
            observe_secs: 20.0,
        },
    )
}

/// Uses F1 and F2 but gets the call between them wrong more often than not.
pub fn confused_caller() -> PersonaDefinition {
    PersonaDefinition::new(
        "Confused_Caller",
        1.5,
        2,
        PersonaPlan {
            steps: vec![
                PlanStep::Announce("Confused: mixing F1 and F2".into()),
                PlanStep::RandomFill {
                    group: F1,
                    count: Count::Between(2, 4),
                    pause_secs: None,
                    tail_call: None,
                },
                PlanStep::RandomFill {
                    group: F2,
                    count: Count::Between(2, 4),
                    pause_secs: None,
                    tail_call: None,
                },
                PlanStep::CallPlacement {
                    caller: F1,
                    callee: F2,
                    forget_chance: 0.4,
                    misplace_chance: 0.7,
                    misplace_within: 3,
                },
            ],
            run_policy: RunPolicy::Always,
            observe_secs: 15.0,
        },
    )
}

/// Believes four moves are enough.
pub fn overconfident() -> PersonaDefinition {
    PersonaDefinition::new(
        "Overconfident",
        0.5,
        1,
        PersonaPlan {
            steps: vec![
                PlanStep::Announce("Overconfident: this takes three steps!".into()),
                PlanStep::Place {
                    group: F1,
                    start: 0,
                    commands: vec![Grab, Right, Right, Grab],
                },
            ],
            run_policy: RunPolicy::Always,
            observe_secs: 8.0,
        },
    )
}

/// Every compiled-in persona, in run order.
pub fn catalogue() -> Vec<PersonaDefinition> {
    vec![
        perfect_student(),
        novice_explorer(),
        impulsive_random(),
        methodical_f1(),
        confused_caller(),
        overconfident(),
    ]
}

/// Look a persona up by name, ignoring case and treating spaces as underscores.
pub fn find(name: &str) -> Option<PersonaDefinition> {
    let wanted = name.trim().replace(' ', "_");
    catalogue()
        .into_iter()
        .find(|persona| persona.name.eq_ignore_ascii_case(&wanted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn catalogue_keeps_run_order_and_budgets() {
        let summary: Vec<(String, u32)> = catalogue()
            .into_iter()
            .map(|p| (p.name, p.max_attempts))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Perfect_Student_Reference_Solution".to_string(), 1),
                ("Novice_Explorer".to_string(), 2),
                ("Impulsive_Random".to_string(), 4),
                ("Methodical_F1".to_string(), 2),
                ("Confused_Caller".to_string(), 2),
                ("Overconfident".to_string(), 1),
            ]
        );
    }

    #[test]
    fn fixed_placements_fit_their_groups() {
        for persona in catalogue() {
            for step in &persona.plan.steps {
                if let PlanStep::Place {
                    group,
                    start,
                    commands,
                } = step
                {
                    assert!(
                        start + commands.len() <= group.capacity(),
                        "{} overflows {}",
                        persona.name,
                        group
                    );
                }
            }
        }
    }

    #[test]
    fn counts_draw_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let n = Count::Between(4, 8).draw(&mut rng, 1);
            assert!((4..=8).contains(&n));
        }
        assert_eq!(Count::Between(3, 3).draw(&mut rng, 1), 3);
        assert_eq!(Count::ByAttempt { first: 1, later: 2 }.draw(&mut rng, 1), 1);
        assert_eq!(Count::ByAttempt { first: 1, later: 2 }.draw(&mut rng, 2), 2);
    }

    #[test]
    fn find_is_lenient_about_case_and_spaces() {
        assert_eq!(find("methodical f1").map(|p| p.name), Some("Methodical_F1".into()));
        assert!(find("speedrunner").is_none());
    }
}
