use serde::{Deserialize, Serialize};

use super::context::DrawCommand;

/// How primitives are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    Fill,
    Line,
}

impl FillMode {
    pub fn toggled(self) -> Self {
        match self {
            FillMode::Fill => FillMode::Line,
            FillMode::Line => FillMode::Fill,
        }
    }
}

impl Default for FillMode {
    fn default() -> Self {
        FillMode::Line
    }
}

/// The vertex array that is current for the next draw call, plus what it draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundGeometry {
    pub vertex_array: u32,
    pub command: DrawCommand,
}

/// Mirror of the binding state the driver holds for this context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
    pub program: Option<u32>,
    pub geometry: Option<BoundGeometry>,
    pub fill_mode: FillMode,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            program: None,
            geometry: None,
            // GL starts in FILL; the loop switches to LINE during INIT
            fill_mode: FillMode::Fill,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_self_inverse() {
        assert_eq!(FillMode::Line.toggled(), FillMode::Fill);
        assert_eq!(FillMode::Fill.toggled().toggled(), FillMode::Fill);
    }
}
