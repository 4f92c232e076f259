use action_primitives::{BrowserPages, VisibilityWait};
use anyhow::{bail, Context, Result};
use cdp_adapter::{CdpAdapter, CdpConfig};
use clap::Args;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::persona::{self, PersonaDefinition};
use crate::runner;
use crate::scripted::ScriptedPages;
use crate::summary;

#[derive(Args, Clone, Debug, Default)]
pub struct RunArgs {
    /// Only run these personas (repeatable, case-insensitive)
    #[arg(short, long = "persona", value_name = "NAME")]
    pub personas: Vec<String>,

    /// Base seed for persona randomness
    #[arg(long)]
    pub seed: Option<u64>,

    /// Hide the browser window
    #[arg(long)]
    pub headless: bool,

    /// Rehearse against the in-process scripted page instead of Chromium
    #[arg(long)]
    pub dry_run: bool,
}

/// Resolve `--persona` filters against the catalogue, keeping catalogue order.
pub fn select_personas(filters: &[String]) -> Result<Vec<PersonaDefinition>> {
    if filters.is_empty() {
        return Ok(persona::catalogue());
    }

    let mut wanted = Vec::with_capacity(filters.len());
    for filter in filters {
        match persona::find(filter) {
            Some(found) => wanted.push(found.name),
            None => bail!("Unknown persona '{}'; see `personas`", filter),
        }
    }
    Ok(persona::catalogue()
        .into_iter()
        .filter(|p| wanted.contains(&p.name))
        .collect())
}

pub async fn cmd_run(args: RunArgs, config: &Config) -> Result<()> {
    let mut config = config.clone();
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.headless {
        config.headless = true;
    }
    if args.dry_run {
        config.time_scale = 0.0;
        config.pause_between_personas_secs = 0.0;
    }

    let personas = select_personas(&args.personas)?;
    info!(
        "Running {} persona(s) against {}",
        personas.len(),
        config.base_url
    );

    let report = if args.dry_run {
        let pages = ScriptedPages::new();
        runner::run_personas(&pages, &personas, &config).await?
    } else {
        let pages = launch_browser(&config).await?;
        let report = runner::run_personas(&pages, &personas, &config).await;
        let stats = cdp_adapter::metrics::snapshot();
        info!(
            commands = stats.commands,
            failures = stats.command_failures,
            pages = stats.pages_opened,
            avg_latency_ms = stats.average_latency_ms(),
            "browser command statistics"
        );
        report?
    };

    println!("{}", summary::render_table(&report.sessions));
    println!("Logs: {}", report.run_dir.display());
    println!("Summary: {}", report.summary_csv.display());
    Ok(())
}

async fn launch_browser(config: &Config) -> Result<BrowserPages> {
    let mut cdp = CdpConfig::default();
    cdp.headless = config.headless;
    if let Some(path) = &config.chrome_executable {
        cdp.executable = path.clone();
    }
    if cdp.executable.as_os_str().is_empty() {
        bail!("No Chrome or Chromium executable found; set CARGOBOT_CHROME or chrome_executable");
    }

    let adapter = CdpAdapter::launch(cdp)
        .await
        .context("Failed to launch the browser")?;
    Ok(BrowserPages::new(Arc::new(adapter), VisibilityWait::default()))
}
