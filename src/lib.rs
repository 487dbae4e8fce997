pub mod config;
pub mod engine;
pub mod input;
pub mod platform;
pub mod render;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use engine::{EngineStats, LoopPhase, RenderLoop};
pub use input::{InputController, Key, KeyboardState, ToggleTrigger};
pub use platform::{GlPlatform, Platform, SurfaceEvent};
pub use render::{
    FillMode, GeometryBuffer, GlApi, GraphicsApi, LinkedProgram, RenderContext, RenderError,
    ShaderProgramBuilder, ShaderSource, ShaderStage,
};
pub use utils::error::{InitError, InitPhase};
