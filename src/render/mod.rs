pub mod context;
pub mod gl_api;
pub mod mesh;
pub mod shaders;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{DrawCommand, DrawStats, GraphicsApi, RenderContext, RenderError};
pub use gl_api::GlApi;
pub use mesh::{GeometryBuffer, MeshData, VertexAttribute, VertexAttributeLayout};
pub use shaders::{
    CompiledShader, LinkedProgram, ShaderError, ShaderProgramBuilder, ShaderSource, ShaderStage,
};
pub use state::{FillMode, RenderState};
