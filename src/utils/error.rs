use std::fmt;
use thiserror::Error;

/// Named steps of the startup protocol, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPhase {
    Window,
    Context,
    EntryPoints,
    ShaderSources,
    Pipeline,
    Geometry,
}

impl fmt::Display for InitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitPhase::Window => "window creation",
            InitPhase::Context => "context creation",
            InitPhase::EntryPoints => "driver entry-point loading",
            InitPhase::ShaderSources => "shader source loading",
            InitPhase::Pipeline => "pipeline setup",
            InitPhase::Geometry => "geometry upload",
        };
        f.write_str(name)
    }
}

/// A fatal startup failure. Nothing here is retried.
#[derive(Debug, Error)]
#[error("{phase} failed: {message}")]
pub struct InitError {
    pub phase: InitPhase,
    pub message: String,
}

impl InitError {
    pub fn new(phase: InitPhase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: message.into(),
        }
    }
}
