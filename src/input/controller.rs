use serde::{Deserialize, Serialize};

use super::keys::{Key, KeyboardState};
use crate::config::InputConfig;
use crate::render::FillMode;

/// When a held toggle key flips the fill mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleTrigger {
    /// Every poll while the key is held.
    #[default]
    Level,
    /// Once per press, on the released -> pressed transition.
    Edge,
}

/// Fill mode plus the toggle key state seen by the previous poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleState {
    pub mode: FillMode,
    pub was_pressed: bool,
}

impl ToggleState {
    pub fn new(mode: FillMode) -> Self {
        Self {
            mode,
            was_pressed: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputController {
    close_key: Key,
    toggle_key: Key,
    trigger: ToggleTrigger,
}

impl InputController {
    pub fn new(close_key: Key, toggle_key: Key, trigger: ToggleTrigger) -> Self {
        Self {
            close_key,
            toggle_key,
            trigger,
        }
    }

    pub fn from_config(config: &InputConfig) -> Self {
        Self::new(config.close_key, config.toggle_key, config.toggle_trigger)
    }

    pub fn poll_close(&self, keys: &KeyboardState) -> bool {
        keys.is_pressed(self.close_key)
    }

    pub fn poll_mode_toggle(&self, keys: &KeyboardState, previous: ToggleState) -> ToggleState {
        let pressed = keys.is_pressed(self.toggle_key);
        let fire = match self.trigger {
            ToggleTrigger::Edge => pressed && !previous.was_pressed,
            ToggleTrigger::Level => pressed,
        };

        ToggleState {
            mode: if fire {
                previous.mode.toggled()
            } else {
                previous.mode
            },
            was_pressed: pressed,
        }
    }
}

impl Default for InputController {
    fn default() -> Self {
        Self::new(Key::Escape, Key::Space, ToggleTrigger::default())
    }
}
