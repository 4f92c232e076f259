//! Runner configuration
//!
//! Defaults reproduce the compiled-in behavior; a YAML file can override any field.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::game::DEFAULT_BASE_URL;

/// Top-level configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page that hosts the game
    pub base_url: String,
    /// Parent of the timestamped run directories
    pub log_root: PathBuf,
    /// Hide the browser window
    pub headless: bool,
    /// Multiplier on every pacing pause; 0 disables pauses
    pub time_scale: f64,
    /// Pause between two personas
    pub pause_between_personas_secs: f64,
    /// Base seed for persona randomness; entropy when absent
    pub seed: Option<u64>,
    /// Browser binary; detected when absent
    pub chrome_executable: Option<PathBuf>,
    pub timeouts: Timeouts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            log_root: PathBuf::from("agent_run_logs"),
            headless: false,
            time_scale: 1.0,
            pause_between_personas_secs: 3.0,
            seed: None,
            chrome_executable: None,
            timeouts: Timeouts::default(),
        }
    }
}

/// Bounded waits, in milliseconds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub navigation_ms: u64,
    pub setup_control_ms: u64,
    pub placement_ms: u64,
    pub play_ms: u64,
    pub clear_ms: u64,
    pub clear_confirm_ms: u64,
    pub success_probe_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation_ms: 60_000,
            setup_control_ms: 15_000,
            placement_ms: 5_000,
            play_ms: 5_000,
            clear_ms: 7_000,
            clear_confirm_ms: 3_000,
            success_probe_ms: 1_000,
        }
    }
}

impl Timeouts {
    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn setup_control(&self) -> Duration {
        Duration::from_millis(self.setup_control_ms)
    }

    pub fn placement(&self) -> Duration {
        Duration::from_millis(self.placement_ms)
    }

    pub fn play(&self) -> Duration {
        Duration::from_millis(self.play_ms)
    }

    pub fn clear(&self) -> Duration {
        Duration::from_millis(self.clear_ms)
    }

    pub fn clear_confirm(&self) -> Duration {
        Duration::from_millis(self.clear_confirm_ms)
    }

    pub fn success_probe(&self) -> Duration {
        Duration::from_millis(self.success_probe_ms)
    }
}

impl Config {
    /// Configuration with every pause disabled.
    pub fn instant() -> Self {
        Self {
            time_scale: 0.0,
            pause_between_personas_secs: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.time_scale.is_finite() && self.time_scale >= 0.0,
            "time_scale must be a non-negative number, got {}",
            self.time_scale
        );
        anyhow::ensure!(
            self.pause_between_personas_secs.is_finite() && self.pause_between_personas_secs >= 0.0,
            "pause_between_personas_secs must be a non-negative number"
        );
        anyhow::ensure!(!self.base_url.trim().is_empty(), "base_url cannot be empty");
        Ok(())
    }
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
}

/// Resolve and load the configuration file.
///
/// Priority: explicit path > ./config/config.yaml > <config dir>/cargobot-personas/config.yaml.
/// A missing file falls back to defaults.
pub async fn load_config(config_path: Option<&Path>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.to_path_buf(),
        None => {
            let local_config = PathBuf::from("config/config.yaml");
            if local_config.exists() {
                local_config
            } else {
                let mut path = dirs::config_dir().context("Failed to get config directory")?;
                path.push("cargobot-personas");
                path.push("config.yaml");
                path
            }
        }
    };

    if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .await
            .context("Failed to read config file")?;

        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        info!("Loaded configuration from: {}", config_path.display());
        Ok(LoadedConfig {
            config,
            path: config_path,
        })
    } else {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        Ok(LoadedConfig {
            config: Config::default(),
            path: config_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_compiled_constants() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://i4ds.github.io/CargoBot/");
        assert_eq!(config.log_root, PathBuf::from("agent_run_logs"));
        assert_eq!(config.timeouts.navigation(), Duration::from_secs(60));
        assert_eq!(config.timeouts.clear_confirm(), Duration::from_secs(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let yaml = "headless: true\ntime_scale: 0.5\ntimeouts:\n  placement_ms: 2500\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.headless);
        assert_eq!(config.time_scale, 0.5);
        assert_eq!(config.timeouts.placement_ms, 2_500);
        assert_eq!(config.timeouts.play_ms, 5_000);
        assert_eq!(config.pause_between_personas_secs, 3.0);
    }

    #[test]
    fn negative_time_scale_is_rejected() {
        let config = Config {
            time_scale: -1.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn explicit_file_is_loaded_and_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "seed: 42\nlog_root: /tmp/runs\n").unwrap();
        let loaded = load_config(Some(&path)).await.unwrap();
        assert_eq!(loaded.config.seed, Some(42));
        assert_eq!(loaded.config.log_root, PathBuf::from("/tmp/runs"));

        let missing = dir.path().join("absent.yaml");
        let loaded = load_config(Some(&missing)).await.unwrap();
        assert_eq!(loaded.config, Config::default());
        assert_eq!(loaded.path, missing);
    }
}
