pub mod gl_window;

pub use gl_window::GlPlatform;

use crate::input::KeyboardState;
use crate::render::RenderError;

/// Window notifications the render loop reacts to on its next input step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    Resized { width: u32, height: u32 },
}

/// Window, key state and presentation for one graphics context.
pub trait Platform {
    fn size(&self) -> (u32, u32);
    fn keys(&self) -> &KeyboardState;
    fn should_close(&self) -> bool;
    fn set_should_close(&mut self, close: bool);
    /// Shows the finished frame. May block until vsync.
    fn present(&mut self) -> Result<(), RenderError>;
    /// Processes pending OS events, refreshing key state and the close flag.
    fn pump_events(&mut self) -> Vec<SurfaceEvent>;
    fn terminate(&mut self);
}
