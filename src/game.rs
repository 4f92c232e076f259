//! CargoBot page model: controls, programmable slot groups and palette commands.

use action_primitives::Selector;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_BASE_URL: &str = "https://i4ds.github.io/CargoBot/";

/// Level reached by the setup clicks.
pub const TARGET_LEVEL: &str = "#level_0";

pub fn start_button() -> Selector {
    Selector::css("#click2start")
}

pub fn easy_pack() -> Selector {
    Selector::css("#pack_easy p")
}

pub fn target_level() -> Selector {
    Selector::css(TARGET_LEVEL)
}

pub fn play_button() -> Selector {
    Selector::css("#play")
}

pub fn clear_button() -> Selector {
    Selector::css("#btn_clear")
}

pub fn clear_confirm() -> Selector {
    Selector::css("p#custom_modal_btn_clear_text").with_text("CLEAR")
}

pub fn success_banner() -> Selector {
    Selector::text("YOU GOT IT")
}

/// One of the four programmable functions of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotGroup {
    F1,
    F2,
    F3,
    F4,
}

impl SlotGroup {
    pub const ALL: [SlotGroup; 4] = [SlotGroup::F1, SlotGroup::F2, SlotGroup::F3, SlotGroup::F4];

    /// 1-based function number used by the page ids.
    pub fn number(self) -> usize {
        match self {
            SlotGroup::F1 => 1,
            SlotGroup::F2 => 2,
            SlotGroup::F3 => 3,
            SlotGroup::F4 => 4,
        }
    }

    pub fn capacity(self) -> usize {
        match self {
            SlotGroup::F4 => 5,
            _ => 8,
        }
    }

    pub fn last_slot(self) -> usize {
        self.capacity() - 1
    }

    /// Selector of the slot; callers must check `index < capacity()` first.
    pub fn slot(self, index: usize) -> Selector {
        Selector::css(format!("#reg_{}_{}", self.number(), index))
    }

    pub(crate) fn position(self) -> usize {
        self.number() - 1
    }
}

impl fmt::Display for SlotGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.number())
    }
}

/// A palette tool that can be dragged into a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Grab,
    Right,
    Left,
    Call(SlotGroup),
}

impl Command {
    /// Tools drawn from when a persona picks at random.
    pub const BASIC: [Command; 3] = [Command::Grab, Command::Right, Command::Left];

    pub fn palette(self) -> Selector {
        match self {
            Command::Grab => Selector::css("#tool_grab"),
            Command::Right => Selector::css("#tool_right"),
            Command::Left => Selector::css("#tool_left"),
            Command::Call(group) => Selector::css(format!("#tool_prog{}", group.number())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Grab => f.write_str("Grab"),
            Command::Right => f.write_str("Right"),
            Command::Left => f.write_str("Left"),
            Command::Call(group) => write!(f, "Call {}", group),
        }
    }
}
