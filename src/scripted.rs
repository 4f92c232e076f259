//! In-memory stand-in for the browser
//!
//! `ScriptedEnvironment` answers every primitive from a small script instead of a page.
//! It backs `--dry-run` and the session tests: every call is recorded, drags can be made to
//! fail by call number, and the success banner appears after a chosen play click.

use action_primitives::{ActionError, ActionPrimitives, PageSource, Selector};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::game;

/// A primitive call as seen by the environment, selectors rendered as text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvCall {
    Navigate(String),
    WaitVisible(String),
    Click(String),
    Drag { source: String, target: String },
    Close,
}

#[derive(Clone, Debug)]
struct Script {
    unreachable: bool,
    clear_modal: bool,
    missing: HashSet<String>,
    failing_drags: HashSet<usize>,
    win_on_play: Option<usize>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            unreachable: false,
            clear_modal: true,
            missing: HashSet::new(),
            failing_drags: HashSet::new(),
            win_on_play: None,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<EnvCall>,
    url: Option<String>,
    drags: usize,
    plays: usize,
    solved: bool,
}

#[derive(Debug, Default)]
pub struct ScriptedEnvironment {
    script: Script,
    state: Mutex<State>,
}

impl ScriptedEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigation always times out.
    pub fn unreachable(mut self) -> Self {
        self.script.unreachable = true;
        self
    }

    /// The clear confirmation dialog never shows up.
    pub fn without_clear_modal(mut self) -> Self {
        self.script.clear_modal = false;
        self
    }

    /// `selector` never becomes visible.
    pub fn missing(mut self, selector: &Selector) -> Self {
        self.script.missing.insert(selector.to_string());
        self
    }

    /// The `n`-th drag of the session (1-based) fails.
    pub fn fail_drag(mut self, n: usize) -> Self {
        self.script.failing_drags.insert(n);
        self
    }

    /// The success banner appears once the `n`-th play click (1-based) happened.
    pub fn win_on_play(mut self, n: usize) -> Self {
        self.script.win_on_play = Some(n);
        self
    }

    pub fn calls(&self) -> Vec<EnvCall> {
        self.state.lock().calls.clone()
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            state: Mutex::new(State::default()),
        }
    }

    fn visible(&self, state: &State, target: &str) -> bool {
        if target == game::success_banner().to_string() {
            return state.solved;
        }
        if target == game::clear_confirm().to_string() {
            return self.script.clear_modal;
        }
        !self.script.missing.contains(target)
    }
}

fn not_visible(target: &str, timeout: Duration) -> ActionError {
    ActionError::WaitTimeout(format!(
        "'{}' not visible within {}ms",
        target,
        timeout.as_millis()
    ))
}

#[async_trait]
impl ActionPrimitives for ScriptedEnvironment {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), ActionError> {
        let mut state = self.state.lock();
        state.calls.push(EnvCall::Navigate(url.to_string()));
        if self.script.unreachable {
            return Err(ActionError::NavTimeout(format!(
                "{} did not load within {}ms",
                url,
                timeout.as_millis()
            )));
        }
        state.url = Some(url.to_string());
        Ok(())
    }

    async fn wait_visible(&self, target: &Selector, timeout: Duration) -> Result<(), ActionError> {
        let target = target.to_string();
        let mut state = self.state.lock();
        state.calls.push(EnvCall::WaitVisible(target.clone()));
        if self.visible(&state, &target) {
            Ok(())
        } else {
            Err(not_visible(&target, timeout))
        }
    }

    async fn click(&self, target: &Selector, timeout: Duration) -> Result<(), ActionError> {
        let target = target.to_string();
        let mut state = self.state.lock();
        state.calls.push(EnvCall::Click(target.clone()));
        if !self.visible(&state, &target) {
            return Err(not_visible(&target, timeout));
        }

        if target == game::play_button().to_string() {
            state.plays += 1;
            if self.script.win_on_play == Some(state.plays) {
                state.solved = true;
            }
        } else if target == game::clear_button().to_string() {
            state.solved = false;
        }
        Ok(())
    }

    async fn drag_to(
        &self,
        source: &Selector,
        target: &Selector,
        _timeout: Duration,
    ) -> Result<(), ActionError> {
        let mut state = self.state.lock();
        state.drags += 1;
        state.calls.push(EnvCall::Drag {
            source: source.to_string(),
            target: target.to_string(),
        });
        if self.script.failing_drags.contains(&state.drags) {
            return Err(ActionError::CdpIo(format!(
                "drag {} from {} to {} was rejected",
                state.drags, source, target
            )));
        }
        Ok(())
    }

    async fn current_url(&self) -> Option<String> {
        self.state.lock().url.clone()
    }

    async fn close(&self) -> Result<(), ActionError> {
        self.state.lock().calls.push(EnvCall::Close);
        Ok(())
    }
}

/// Hands out a fresh `ScriptedEnvironment` per session, all following one script.
#[derive(Clone, Default)]
pub struct ScriptedPages {
    script: Script,
    opened: Arc<Mutex<usize>>,
    shut_down: Arc<Mutex<bool>>,
}

impl ScriptedPages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every page follows the script of `template`.
    pub fn from_template(template: ScriptedEnvironment) -> Self {
        Self {
            script: template.script,
            ..Self::default()
        }
    }

    pub fn pages_opened(&self) -> usize {
        *self.opened.lock()
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shut_down.lock()
    }
}

#[async_trait]
impl PageSource for ScriptedPages {
    async fn open_page(&self) -> Result<Box<dyn ActionPrimitives>, ActionError> {
        *self.opened.lock() += 1;
        Ok(Box::new(ScriptedEnvironment::with_script(
            self.script.clone(),
        )))
    }

    async fn shutdown(&self) -> Result<(), ActionError> {
        *self.shut_down.lock() = true;
        Ok(())
    }
}
