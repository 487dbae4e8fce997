pub mod core;
pub mod input;
pub mod rendering;

pub use self::core::{AppConfig, ConfigError, ShaderConfig, WindowConfig};
pub use input::InputConfig;
pub use rendering::{GeometryPreset, RenderConfig};
