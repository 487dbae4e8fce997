use std::ffi::CStr;

use log::debug;
use thiserror::Error;

use super::mesh::VertexAttribute;
use super::shaders::{LinkedProgram, ShaderStage};
use super::state::{BoundGeometry, FillMode, RenderState};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No geometry bound for draw call")]
    NoGeometryBound,
    #[error("No program bound for draw call")]
    NoProgramBound,
    #[error("Geometry {0} is still bound")]
    GeometryStillBound(u32),
    #[error("Render loop is not running")]
    NotRunning,
    #[error("Present failed: {0}")]
    Present(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    Vertex,
    Index,
}

/// Draw call covering a geometry's full index or vertex range, as triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCommand {
    Elements { count: usize },
    Arrays { count: usize },
}

impl DrawCommand {
    pub fn count(&self) -> usize {
        match *self {
            DrawCommand::Elements { count } | DrawCommand::Arrays { count } => count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawStats {
    pub elements: usize,
    pub triangles: usize,
}

/// Driver entry points used by the renderer.
///
/// Handles are raw driver names. `0` means "none" where the driver uses it that way
/// (`use_program(0)`, `bind_vertex_array(0)`).
pub trait GraphicsApi {
    fn create_shader(&mut self, stage: ShaderStage) -> u32;
    /// Submits source text and runs the compiler.
    fn compile_shader(&mut self, shader: u32, source: &CStr);
    fn shader_compile_status(&self, shader: u32) -> bool;
    fn shader_info_log(&self, shader: u32) -> String;
    fn delete_shader(&mut self, shader: u32);

    fn create_program(&mut self) -> u32;
    fn attach_shader(&mut self, program: u32, shader: u32);
    fn link_program(&mut self, program: u32);
    fn program_link_status(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32) -> String;
    fn use_program(&mut self, program: u32);
    fn delete_program(&mut self, program: u32);

    fn create_vertex_array(&mut self) -> u32;
    fn bind_vertex_array(&mut self, vertex_array: u32);
    fn delete_vertex_array(&mut self, vertex_array: u32);

    fn create_buffer(&mut self) -> u32;
    /// Binds `buffer` to `target` and uploads `data` as static draw data.
    fn upload_buffer(&mut self, target: BufferTarget, buffer: u32, data: &[u8]);
    fn delete_buffer(&mut self, buffer: u32);

    fn vertex_attrib_pointer(&mut self, attribute: &VertexAttribute, stride: usize);
    fn enable_vertex_attrib_array(&mut self, index: u32);

    fn polygon_mode(&mut self, mode: FillMode);
    fn clear_color(&mut self, rgba: [f32; 4]);
    fn clear(&mut self);
    fn viewport(&mut self, width: u32, height: u32);
    fn draw_elements(&mut self, count: usize);
    fn draw_arrays(&mut self, count: usize);
}

/// Owns the driver and the binding state that would otherwise be ambient.
pub struct RenderContext<A: GraphicsApi> {
    api: A,
    state: RenderState,
}

impl<A: GraphicsApi> RenderContext<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: RenderState::default(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Makes `program` current, whether or not it linked.
    pub fn use_program(&mut self, program: &LinkedProgram) {
        self.api.use_program(program.id());
        self.state.program = Some(program.id());
    }

    pub fn clear_program(&mut self) {
        self.api.use_program(0);
        self.state.program = None;
    }

    /// Replaces whatever geometry was current.
    pub(crate) fn bind_geometry(&mut self, vertex_array: u32, command: DrawCommand) {
        self.api.bind_vertex_array(vertex_array);
        self.state.geometry = Some(BoundGeometry {
            vertex_array,
            command,
        });
    }

    pub(crate) fn unbind_geometry(&mut self) {
        self.api.bind_vertex_array(0);
        self.state.geometry = None;
    }

    pub fn set_fill_mode(&mut self, mode: FillMode) {
        self.api.polygon_mode(mode);
        self.state.fill_mode = mode;
        debug!("Polygon mode set to {:?}", mode);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.api.viewport(width, height);
    }

    pub fn clear(&mut self, color: [f32; 4]) {
        self.api.clear_color(color);
        self.api.clear();
    }

    /// Issues one triangle draw for the bound geometry.
    pub fn draw(&mut self) -> Result<DrawStats, RenderError> {
        if self.state.program.is_none() {
            return Err(RenderError::NoProgramBound);
        }
        let bound = self.state.geometry.ok_or(RenderError::NoGeometryBound)?;

        match bound.command {
            DrawCommand::Elements { count } => self.api.draw_elements(count),
            DrawCommand::Arrays { count } => self.api.draw_arrays(count),
        }

        let elements = bound.command.count();
        Ok(DrawStats {
            elements,
            triangles: elements / 3,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::{Call, RecordingApi};

    #[test]
    fn test_draw_requires_geometry() {
        let mut ctx = RenderContext::new(RecordingApi::default());
        ctx.state.program = Some(1);
        assert!(matches!(ctx.draw(), Err(RenderError::NoGeometryBound)));
    }

    #[test]
    fn test_draw_requires_program() {
        let mut ctx = RenderContext::new(RecordingApi::default());
        ctx.bind_geometry(4, DrawCommand::Arrays { count: 3 });
        assert!(matches!(ctx.draw(), Err(RenderError::NoProgramBound)));
    }

    #[test]
    fn test_second_bind_replaces_first() {
        let mut ctx = RenderContext::new(RecordingApi::default());
        ctx.bind_geometry(1, DrawCommand::Arrays { count: 3 });
        ctx.bind_geometry(2, DrawCommand::Elements { count: 6 });

        let bound = ctx.state().geometry.unwrap();
        assert_eq!(bound.vertex_array, 2);
        assert_eq!(ctx.api().calls.last(), Some(&Call::BindVertexArray(2)));
    }

    #[test]
    fn test_clear_sets_color_then_clears() {
        let mut ctx = RenderContext::new(RecordingApi::default());
        ctx.clear([0.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            ctx.api().calls,
            vec![Call::ClearColor([0.0, 0.0, 0.0, 0.0]), Call::Clear]
        );
    }
}
