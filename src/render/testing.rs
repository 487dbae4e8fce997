//! Test doubles for the driver and the window.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::ffi::CStr;
use std::rc::Rc;

use super::context::{BufferTarget, GraphicsApi, RenderError};
use super::mesh::VertexAttribute;
use super::shaders::ShaderStage;
use super::state::FillMode;
use crate::input::{Key, KeyboardState};
use crate::platform::{Platform, SurfaceEvent};

pub const VERTEX_SRC: &str = "#version 330 core\n\
layout (location = 0) in vec3 aPos;\n\
void main() {\n\
    gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);\n\
}\n";

pub const FRAGMENT_SRC: &str = "#version 330 core\n\
out vec4 FragColor;\n\
void main() {\n\
    FragColor = vec4(1.0f, 0.5f, 0.2f, 1.0f);\n\
}\n";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage, u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    LinkProgram(u32),
    UseProgram(u32),
    DeleteProgram(u32),
    CreateVertexArray(u32),
    BindVertexArray(u32),
    DeleteVertexArray(u32),
    CreateBuffer(u32),
    UploadBuffer(BufferTarget, u32, usize),
    DeleteBuffer(u32),
    VertexAttribPointer(VertexAttribute, usize),
    EnableVertexAttribArray(u32),
    PolygonMode(FillMode),
    ClearColor([f32; 4]),
    Clear,
    Viewport(u32, u32),
    DrawElements(usize),
    DrawArrays(usize),
}

#[derive(Debug)]
struct FakeShader {
    stage: ShaderStage,
    compiled: bool,
}

#[derive(Debug, Default)]
struct FakeProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
}

/// Records every call and imitates the driver's compile and link checks.
///
/// Source compiles iff it declares `#version 330` and defines `void main(`.
#[derive(Debug, Default)]
pub struct RecordingApi {
    pub calls: Vec<Call>,
    next_id: u32,
    shaders: HashMap<u32, FakeShader>,
    programs: HashMap<u32, FakeProgram>,
    uploads: Vec<(BufferTarget, u32, Vec<u8>)>,
    pub deleted_shaders: Vec<u32>,
    pub deleted_programs: Vec<u32>,
    pub deleted_vertex_arrays: Vec<u32>,
    pub deleted_buffers: Vec<u32>,
    /// Shared so it can be read after the api has been moved away.
    pub program_deletions: Rc<Cell<usize>>,
}

impl RecordingApi {
    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn uploads(&self, target: BufferTarget) -> Vec<&Vec<u8>> {
        self.uploads
            .iter()
            .filter(|(t, _, _)| *t == target)
            .map(|(_, _, data)| data)
            .collect()
    }

    pub fn live_shaders(&self) -> Vec<u32> {
        self.shaders
            .keys()
            .copied()
            .filter(|id| !self.deleted_shaders.contains(id))
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn draw_calls(&self) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::DrawElements(_) | Call::DrawArrays(_)))
            .collect()
    }
}

impl GraphicsApi for RecordingApi {
    fn create_shader(&mut self, stage: ShaderStage) -> u32 {
        let id = self.next();
        self.shaders.insert(
            id,
            FakeShader {
                stage,
                compiled: false,
            },
        );
        self.calls.push(Call::CreateShader(stage, id));
        id
    }

    fn compile_shader(&mut self, shader: u32, source: &CStr) {
        let text = source.to_string_lossy();
        let valid = text.contains("#version 330") && text.contains("void main(");
        if let Some(fake) = self.shaders.get_mut(&shader) {
            fake.compiled = valid;
        }
        self.calls.push(Call::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.shaders.get(&shader).map_or(false, |s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            "0:1(1): error: syntax error, unexpected end of file".to_string()
        }
    }

    fn delete_shader(&mut self, shader: u32) {
        self.deleted_shaders.push(shader);
        self.calls.push(Call::DeleteShader(shader));
    }

    fn create_program(&mut self) -> u32 {
        let id = self.next();
        self.programs.insert(id, FakeProgram::default());
        self.calls.push(Call::CreateProgram(id));
        id
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        if let Some(fake) = self.programs.get_mut(&program) {
            fake.attached.push(shader);
        }
        self.calls.push(Call::AttachShader(program, shader));
    }

    fn link_program(&mut self, program: u32) {
        let stages: Vec<(ShaderStage, bool)> = self.programs[&program]
            .attached
            .iter()
            .filter_map(|id| self.shaders.get(id).map(|s| (s.stage, s.compiled)))
            .collect();

        let count = |stage: ShaderStage| stages.iter().filter(|(s, _)| *s == stage).count();
        let log = if stages.iter().any(|(_, compiled)| !compiled) {
            "error: linking with uncompiled/unspecialized shader".to_string()
        } else if count(ShaderStage::Vertex) != 1 || count(ShaderStage::Fragment) != 1 {
            "error: program needs exactly one vertex and one fragment shader".to_string()
        } else {
            String::new()
        };

        if let Some(fake) = self.programs.get_mut(&program) {
            fake.linked = log.is_empty();
            fake.log = log;
        }
        self.calls.push(Call::LinkProgram(program));
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.programs.get(&program).map_or(false, |p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&mut self, program: u32) {
        self.calls.push(Call::UseProgram(program));
    }

    fn delete_program(&mut self, program: u32) {
        self.deleted_programs.push(program);
        self.program_deletions.set(self.program_deletions.get() + 1);
        self.calls.push(Call::DeleteProgram(program));
    }

    fn create_vertex_array(&mut self) -> u32 {
        let id = self.next();
        self.calls.push(Call::CreateVertexArray(id));
        id
    }

    fn bind_vertex_array(&mut self, vertex_array: u32) {
        self.calls.push(Call::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&mut self, vertex_array: u32) {
        self.deleted_vertex_arrays.push(vertex_array);
        self.calls.push(Call::DeleteVertexArray(vertex_array));
    }

    fn create_buffer(&mut self) -> u32 {
        let id = self.next();
        self.calls.push(Call::CreateBuffer(id));
        id
    }

    fn upload_buffer(&mut self, target: BufferTarget, buffer: u32, data: &[u8]) {
        self.uploads.push((target, buffer, data.to_vec()));
        self.calls.push(Call::UploadBuffer(target, buffer, data.len()));
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.deleted_buffers.push(buffer);
        self.calls.push(Call::DeleteBuffer(buffer));
    }

    fn vertex_attrib_pointer(&mut self, attribute: &VertexAttribute, stride: usize) {
        self.calls.push(Call::VertexAttribPointer(*attribute, stride));
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.calls.push(Call::EnableVertexAttribArray(index));
    }

    fn polygon_mode(&mut self, mode: FillMode) {
        self.calls.push(Call::PolygonMode(mode));
    }

    fn clear_color(&mut self, rgba: [f32; 4]) {
        self.calls.push(Call::ClearColor(rgba));
    }

    fn clear(&mut self) {
        self.calls.push(Call::Clear);
    }

    fn viewport(&mut self, width: u32, height: u32) {
        self.calls.push(Call::Viewport(width, height));
    }

    fn draw_elements(&mut self, count: usize) {
        self.calls.push(Call::DrawElements(count));
    }

    fn draw_arrays(&mut self, count: usize) {
        self.calls.push(Call::DrawArrays(count));
    }
}

/// Window double. Each `pump_events` advances to the next scripted key snapshot.
#[derive(Debug, Default)]
pub struct ScriptedPlatform {
    keys: KeyboardState,
    script: VecDeque<KeyboardState>,
    events: VecDeque<Vec<SurfaceEvent>>,
    should_close: bool,
    size: (u32, u32),
    pub presents: usize,
    pub pumps: usize,
    pub terminations: usize,
    pub fail_present_at: Option<usize>,
}

impl ScriptedPlatform {
    pub fn new(size: (u32, u32)) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Key snapshot seen after the next pump, in order.
    pub fn then_keys(mut self, keys: &[Key]) -> Self {
        self.script.push_back(keys.iter().copied().collect());
        self
    }

    pub fn then_idle(self, frames: usize) -> Self {
        (0..frames).fold(self, |platform, _| platform.then_keys(&[]))
    }

    /// Events returned by the pump at `frame` (zero-based).
    pub fn with_events_at(mut self, frame: usize, events: Vec<SurfaceEvent>) -> Self {
        while self.events.len() <= frame {
            self.events.push_back(Vec::new());
        }
        self.events[frame] = events;
        self
    }
}

impl Platform for ScriptedPlatform {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn keys(&self) -> &KeyboardState {
        &self.keys
    }

    fn should_close(&self) -> bool {
        self.should_close
    }

    fn set_should_close(&mut self, close: bool) {
        self.should_close = close;
    }

    fn present(&mut self) -> Result<(), RenderError> {
        if self.fail_present_at == Some(self.presents) {
            return Err(RenderError::Present("surface lost".to_string()));
        }
        self.presents += 1;
        Ok(())
    }

    fn pump_events(&mut self) -> Vec<SurfaceEvent> {
        self.pumps += 1;
        if let Some(keys) = self.script.pop_front() {
            self.keys = keys;
        }
        let events = self.events.pop_front().unwrap_or_default();
        for event in &events {
            let SurfaceEvent::Resized { width, height } = *event;
            self.size = (width, height);
        }
        events
    }

    fn terminate(&mut self) {
        self.terminations += 1;
    }
}
