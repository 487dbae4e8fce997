use serde::{Deserialize, Serialize};

use crate::input::{Key, ToggleTrigger};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub close_key: Key,
    pub toggle_key: Key,
    pub toggle_trigger: ToggleTrigger,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            close_key: Key::Escape,
            toggle_key: Key::Space,
            toggle_trigger: ToggleTrigger::Level,
        }
    }
}
