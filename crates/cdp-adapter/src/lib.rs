//! Chromium DevTools Protocol adapter.
//!
//! Launches a Chromium instance through `chromiumoxide`, hands out page handles and exposes the
//! few raw capabilities the persona runner needs: navigation, element queries evaluated in the
//! page, and synthetic mouse input. Higher layers turn these into bounded, retry-free actions.

use std::{env, path::PathBuf};
use which::which;

pub mod ids {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    /// Unique identifier for the browser instance managed by the adapter.
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
    pub struct BrowserId(pub Uuid);

    /// Unique identifier for a page/tab.
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
    pub struct PageId(pub Uuid);

    impl BrowserId {
        pub fn new() -> Self {
            Self(Uuid::new_v4())
        }
    }

    impl Default for BrowserId {
        fn default() -> Self {
            Self::new()
        }
    }

    impl PageId {
        pub fn new() -> Self {
            Self(Uuid::new_v4())
        }
    }

    impl Default for PageId {
        fn default() -> Self {
            Self::new()
        }
    }
}

pub mod error {
    use serde::{Deserialize, Serialize};
    use std::fmt;
    use thiserror::Error;

    /// High-level error categories surfaced by the adapter.
    #[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
    pub enum AdapterErrorKind {
        #[error("navigation timed out")]
        NavTimeout,
        #[error("browser launch failed")]
        Launch,
        #[error("cdp i/o failure")]
        CdpIo,
        #[error("target element not found")]
        TargetNotFound,
        #[error("internal error")]
        Internal,
    }

    /// Enriched error metadata passed back to higher layers.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AdapterError {
        pub kind: AdapterErrorKind,
        pub hint: Option<String>,
        pub retriable: bool,
    }

    impl fmt::Display for AdapterError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.kind)?;
            if let Some(hint) = &self.hint {
                write!(f, ": {}", hint)?;
            }
            Ok(())
        }
    }

    impl std::error::Error for AdapterError {}

    impl AdapterError {
        pub fn new(kind: AdapterErrorKind) -> Self {
            Self {
                kind,
                hint: None,
                retriable: false,
            }
        }

        pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
            self.hint = Some(hint.into());
            self
        }

        pub fn retriable(mut self, flag: bool) -> Self {
            self.retriable = flag;
            self
        }
    }

    impl From<chromiumoxide::error::CdpError> for AdapterError {
        fn from(err: chromiumoxide::error::CdpError) -> Self {
            AdapterError::new(AdapterErrorKind::CdpIo)
                .with_hint(err.to_string())
                .retriable(true)
        }
    }
}

pub mod config {
    use crate::detect_chrome_executable;
    use serde::{Deserialize, Serialize};
    use std::{
        env,
        path::{Path, PathBuf},
    };

    /// Configuration for launching and tuning the adapter.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CdpConfig {
        pub executable: PathBuf,
        pub user_data_dir: PathBuf,
        pub headless: bool,
        pub window_width: u32,
        pub window_height: u32,
        /// Intermediate pointer moves between press and release when dragging.
        pub drag_steps: u32,
    }

    impl Default for CdpConfig {
        fn default() -> Self {
            Self {
                executable: default_chrome_path(),
                user_data_dir: default_profile_dir(),
                headless: resolve_headless_default(),
                window_width: 1280,
                window_height: 900,
                drag_steps: 8,
            }
        }
    }

    fn resolve_headless_default() -> bool {
        // CARGOBOT_HEADLESS: "1", "true", "yes", "on" hides the window
        match env::var("CARGOBOT_HEADLESS") {
            Ok(value) => {
                let lower = value.to_ascii_lowercase();
                matches!(lower.as_str(), "1" | "true" | "yes" | "on")
            }
            Err(_) => false,
        }
    }

    fn default_chrome_path() -> PathBuf {
        detect_chrome_executable().unwrap_or_default()
    }

    fn default_profile_dir() -> PathBuf {
        if let Ok(path) = env::var("CARGOBOT_CHROME_PROFILE") {
            return PathBuf::from(path);
        }

        let default = Path::new("./.cargobot-profile");
        default.into()
    }
}

pub(crate) fn detect_chrome_executable() -> Option<PathBuf> {
    if let Ok(raw) = env::var("CARGOBOT_CHROME") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let candidate = PathBuf::from(trimmed);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    for name in chrome_executable_names() {
        if let Ok(path) = which(name) {
            return Some(path);
        }
    }

    let skip_defaults = env::var("CARGOBOT_SKIP_OS_PATHS")
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false);

    if !skip_defaults {
        for candidate in os_specific_chrome_paths() {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}

fn chrome_executable_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["chrome.exe", "chromium.exe", "msedge.exe"]
    }

    #[cfg(any(target_os = "macos", target_os = "linux", target_os = "freebsd"))]
    {
        &[
            "google-chrome-stable",
            "google-chrome",
            "chromium",
            "chromium-browser",
        ]
    }

    #[cfg(not(any(
        target_os = "windows",
        target_os = "macos",
        target_os = "linux",
        target_os = "freebsd"
    )))]
    {
        &["chrome"]
    }
}

fn os_specific_chrome_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let mut paths = Vec::new();
        for root in windows_search_roots() {
            paths.push(root.join("Google/Chrome/Application/chrome.exe"));
            paths.push(root.join("Chromium/Application/chrome.exe"));
            paths.push(root.join("Microsoft/Edge/Application/msedge.exe"));
        }
        paths
    }

    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ]
    }

    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
    {
        vec![
            PathBuf::from("/usr/bin/google-chrome-stable"),
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/chromium-browser"),
            PathBuf::from("/usr/bin/chromium"),
        ]
    }

    #[cfg(not(any(
        target_os = "windows",
        target_os = "macos",
        target_os = "linux",
        target_os = "freebsd"
    )))]
    {
        Vec::new()
    }
}

#[cfg(target_os = "windows")]
fn windows_search_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    for key in ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"] {
        if let Ok(value) = env::var(key) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                roots.push(PathBuf::from(trimmed));
            }
        }
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::{chrome_executable_names, detect_chrome_executable};
    use std::{env, fs};
    use tempfile::tempdir;

    // Both detection tests mutate process-wide env vars, so they run as one test.
    #[test]
    fn detects_chrome_from_env_then_path() {
        let dir = tempdir().unwrap();

        let exe_path = dir.path().join("my-chrome");
        fs::write(&exe_path, b"").unwrap();
        let original_env = env::var("CARGOBOT_CHROME").ok();
        env::set_var("CARGOBOT_CHROME", exe_path.to_string_lossy().to_string());
        assert_eq!(detect_chrome_executable(), Some(exe_path));

        let name = chrome_executable_names()
            .first()
            .expect("chrome executable names must not be empty");
        let on_path = dir.path().join(name);
        fs::write(&on_path, b"").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o755);
            fs::set_permissions(&on_path, perms).unwrap();
        }
        let original_path = env::var("PATH").ok();
        let skip_flag = env::var("CARGOBOT_SKIP_OS_PATHS").ok();
        env::set_var("CARGOBOT_CHROME", "");
        env::set_var("CARGOBOT_SKIP_OS_PATHS", "1");
        env::set_var("PATH", dir.path());
        let detected = detect_chrome_executable();

        if let Some(value) = original_path {
            env::set_var("PATH", value);
        }
        match original_env {
            Some(value) => env::set_var("CARGOBOT_CHROME", value),
            None => env::remove_var("CARGOBOT_CHROME"),
        }
        match skip_flag {
            Some(value) => env::set_var("CARGOBOT_SKIP_OS_PATHS", value),
            None => env::remove_var("CARGOBOT_SKIP_OS_PATHS"),
        }
        assert_eq!(detected, Some(on_path));
    }
}

pub mod adapter;
pub mod commands;
pub mod metrics;

pub use adapter::{CdpAdapter, PageHandle};
pub use commands::{Anchor, MouseAction, QuerySpec};
pub use config::CdpConfig;
pub use error::{AdapterError, AdapterErrorKind};
pub use ids::{BrowserId, PageId};
pub use metrics::AdapterMetricsSnapshot;
