use serde::{Deserialize, Serialize};

use crate::render::{FillMode, MeshData};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub clear_color: [f32; 4],
    pub initial_fill_mode: FillMode,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 0.0],
            initial_fill_mode: FillMode::Line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryPreset {
    #[default]
    Square,
    Triangle,
}

impl GeometryPreset {
    pub fn mesh(self) -> MeshData {
        match self {
            GeometryPreset::Square => MeshData::square(),
            GeometryPreset::Triangle => MeshData::triangle(),
        }
    }
}
