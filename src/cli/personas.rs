use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::persona::{self, PersonaDefinition, RunPolicy};

/// Print the compiled-in personas in run order.
pub fn cmd_personas() -> Result<()> {
    println!("{}", render(&persona::catalogue()));
    Ok(())
}

pub fn render(personas: &[PersonaDefinition]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Persona", "Pace", "Attempts", "Observe", "Runs when empty",
    ]);
    for p in personas {
        let runs_when_empty = match p.plan.run_policy {
            RunPolicy::Always => "run",
            RunPolicy::SkipWhenEmpty => "skip",
            RunPolicy::ObserveWhenEmpty => "observe only",
        };
        table.add_row(vec![
            p.name.clone(),
            format!("{:.1}", p.pace),
            p.max_attempts.to_string(),
            format!("{}s", p.plan.observe_secs),
            runs_when_empty.to_string(),
        ]);
    }
    table.to_string()
}
