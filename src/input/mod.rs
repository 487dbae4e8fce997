pub mod controller;
pub mod keys;

pub use controller::{InputController, ToggleState, ToggleTrigger};
pub use keys::{Key, KeyboardState};
