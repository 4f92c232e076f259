//! Plan executor
//!
//! Runs one attempt of a persona by interpreting its `PersonaPlan`. The executor owns no
//! state between attempts; everything it learns lives in the agent.

use rand::Rng;

use crate::agent::Agent;
use crate::errors::AttemptError;
use crate::game::{Command, SlotGroup};
use crate::persona::{Count, PersonaPlan, PlanStep, RunPolicy, TailCall};
use crate::session_log::LogLevel;

/// One successful placement of the current attempt.
type Placement = (SlotGroup, usize, Command);

/// Execute one attempt and report whether the level was solved.
///
/// Any placement or run failure aborts the attempt with an error; the caller decides what
/// that costs.
pub async fn run_attempt<R: Rng + ?Sized>(
    agent: &mut Agent<'_, R>,
    plan: &PersonaPlan,
) -> Result<bool, AttemptError> {
    let attempt = agent.attempt();
    let mut placed: Vec<Placement> = Vec::new();

    for step in &plan.steps {
        match step {
            PlanStep::Announce(text) => agent.log(LogLevel::Info, text),
            PlanStep::Place {
                group,
                start,
                commands,
            } => {
                for (offset, command) in commands.iter().enumerate() {
                    place(agent, &mut placed, *command, *group, start + offset).await?;
                }
            }
            PlanStep::RandomFill {
                group,
                count,
                pause_secs,
                tail_call,
            } => {
                random_fill(agent, &mut placed, *group, *count, *pause_secs, *tail_call).await?;
            }
            PlanStep::Probe {
                on_attempt,
                observe_secs,
            } if *on_attempt == attempt => {
                agent.log(
                    LogLevel::Info,
                    format!("Testing the first {} moves before going on.", placed.len()),
                );
                agent.press_play().await?;
                if agent.observe(*observe_secs).await? {
                    return Ok(true);
                }
                agent.clear_board().await;
                agent.log(
                    LogLevel::Info,
                    format!("Rebuilding {} placements after clearing.", placed.len()),
                );
                for (group, index, command) in placed.clone() {
                    agent.place(command, group, index).await?;
                }
            }
            PlanStep::Probe { .. } => {}
            PlanStep::CallPlacement {
                caller,
                callee,
                forget_chance,
                misplace_chance,
                misplace_within,
            } => {
                let call = Command::Call(*callee);
                if agent.rng().gen::<f64>() < *forget_chance {
                    agent.log(
                        LogLevel::Info,
                        format!("Forgot to call {} from {}.", callee, caller),
                    );
                } else if agent.rng().gen::<f64>() < *misplace_chance {
                    let bound = (*misplace_within).min(caller.last_slot());
                    let index = agent.rng().gen_range(0..=bound);
                    agent.log(
                        LogLevel::Info,
                        format!("Calling {} from {}[{}], mid-program.", callee, caller, index),
                    );
                    place(agent, &mut placed, call, *caller, index).await?;
                } else {
                    place(agent, &mut placed, call, *caller, caller.last_slot()).await?;
                }
            }
        }
    }

    let program = SlotGroup::ALL
        .iter()
        .filter(|group| agent.record().program(**group).iter().any(Option::is_some))
        .map(|group| format!("{} [{}]", group, agent.record().describe(*group)))
        .collect::<Vec<_>>()
        .join(" ");
    if !program.is_empty() {
        agent.log(LogLevel::Info, format!("Program: {}", program));
    }

    let nothing_placed = agent.record().placements() == 0;
    match plan.run_policy {
        RunPolicy::SkipWhenEmpty if nothing_placed => {
            agent.log(LogLevel::Info, "Nothing placed; not running.");
            return Ok(false);
        }
        RunPolicy::ObserveWhenEmpty if nothing_placed => {
            agent.log(LogLevel::Info, "Nothing placed; skipping the run.");
        }
        _ => agent.press_play().await?,
    }

    Ok(agent.observe(plan.observe_secs).await?)
}

async fn place<R: Rng + ?Sized>(
    agent: &mut Agent<'_, R>,
    placed: &mut Vec<Placement>,
    command: Command,
    group: SlotGroup,
    index: usize,
) -> Result<(), AttemptError> {
    agent.place(command, group, index).await?;
    placed.push((group, index, command));
    Ok(())
}

fn random_basic<R: Rng + ?Sized>(rng: &mut R) -> Command {
    Command::BASIC[rng.gen_range(0..Command::BASIC.len())]
}

async fn random_fill<R: Rng + ?Sized>(
    agent: &mut Agent<'_, R>,
    placed: &mut Vec<Placement>,
    group: SlotGroup,
    count: Count,
    pause_secs: Option<f64>,
    tail_call: Option<TailCall>,
) -> Result<(), AttemptError> {
    let attempt = agent.attempt();
    let total = count.draw(agent.rng(), attempt).min(group.capacity());

    for index in 0..total {
        let tail = tail_call
            .filter(|tc| index == group.last_slot() && agent.rng().gen::<f64>() < tc.chance);

        match tail {
            Some(tc) => {
                place(agent, placed, Command::Call(tc.callee), group, index).await?;
                let callee_total = tc
                    .count
                    .draw(agent.rng(), attempt)
                    .min(tc.callee.capacity());
                for callee_index in 0..callee_total {
                    let command = random_basic(agent.rng());
                    place(agent, placed, command, tc.callee, callee_index).await?;
                }
            }
            None => {
                let command = random_basic(agent.rng());
                place(agent, placed, command, group, index).await?;
            }
        }

        if let Some(secs) = pause_secs {
            agent.think(secs).await;
        }
    }
    Ok(())
}
