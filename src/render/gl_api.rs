use std::ffi::{c_void, CStr, CString};
use std::ptr;

use gl::types::*;

use super::context::{BufferTarget, GraphicsApi};
use super::mesh::{AttributeType, VertexAttribute};
use super::shaders::ShaderStage;
use super::state::FillMode;
use crate::utils::{InitError, InitPhase};

/// `gl` crate backend. Requires a current context on the calling thread.
pub struct GlApi {
    _private: (),
}

impl GlApi {
    /// Loads driver entry points through `loader` and checks the ones we use.
    pub fn load_with<F>(mut loader: F) -> Result<Self, InitError>
    where
        F: FnMut(&CStr) -> *const c_void,
    {
        gl::load_with(|symbol| match CString::new(symbol) {
            Ok(symbol) => loader(symbol.as_c_str()),
            Err(_) => ptr::null(),
        });

        let required = [
            ("glCreateShader", gl::CreateShader::is_loaded()),
            ("glLinkProgram", gl::LinkProgram::is_loaded()),
            ("glGenVertexArrays", gl::GenVertexArrays::is_loaded()),
            ("glBufferData", gl::BufferData::is_loaded()),
            ("glPolygonMode", gl::PolygonMode::is_loaded()),
            ("glDrawElements", gl::DrawElements::is_loaded()),
            ("glClear", gl::Clear::is_loaded()),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, loaded)| !loaded)
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(InitError::new(
                InitPhase::EntryPoints,
                format!("missing {}", missing.join(", ")),
            ));
        }

        Ok(Self { _private: () })
    }

    fn create_whitespace_cstring_with_len(len: usize) -> CString {
        let mut buffer: Vec<u8> = Vec::with_capacity(len + 1);
        buffer.extend([b' '].iter().cycle().take(len));
        // spaces contain no nul byte
        unsafe { CString::from_vec_unchecked(buffer) }
    }

    fn info_log(
        object: GLuint,
        get_iv: unsafe fn(GLuint, GLenum, *mut GLint),
        get_log: unsafe fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar),
    ) -> String {
        let mut len = 0;
        unsafe { get_iv(object, gl::INFO_LOG_LENGTH, &mut len) };
        if len <= 0 {
            return String::new();
        }

        let log = Self::create_whitespace_cstring_with_len(len as usize);
        unsafe { get_log(object, len, ptr::null_mut(), log.as_ptr() as *mut GLchar) };
        log.to_string_lossy().trim_end_matches(&['\0', ' '][..]).to_owned()
    }
}

fn attribute_type(kind: AttributeType) -> GLenum {
    match kind {
        AttributeType::Float => gl::FLOAT,
        AttributeType::Int => gl::INT,
        AttributeType::UnsignedInt => gl::UNSIGNED_INT,
        AttributeType::UnsignedByte => gl::UNSIGNED_BYTE,
    }
}

impl GraphicsApi for GlApi {
    fn create_shader(&mut self, stage: ShaderStage) -> u32 {
        let kind = match stage {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        };
        unsafe { gl::CreateShader(kind) }
    }

    fn compile_shader(&mut self, shader: u32, source: &CStr) {
        unsafe {
            gl::ShaderSource(shader, 1, &source.as_ptr(), ptr::null());
            gl::CompileShader(shader);
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        let mut success = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success) };
        success != 0
    }

    fn shader_info_log(&self, shader: u32) -> String {
        Self::info_log(shader, gl::GetShaderiv, gl::GetShaderInfoLog)
    }

    fn delete_shader(&mut self, shader: u32) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&mut self) -> u32 {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn link_program(&mut self, program: u32) {
        unsafe { gl::LinkProgram(program) };
    }

    fn program_link_status(&self, program: u32) -> bool {
        let mut success = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut success) };
        success != 0
    }

    fn program_info_log(&self, program: u32) -> String {
        Self::info_log(program, gl::GetProgramiv, gl::GetProgramInfoLog)
    }

    fn use_program(&mut self, program: u32) {
        unsafe { gl::UseProgram(program) };
    }

    fn delete_program(&mut self, program: u32) {
        unsafe { gl::DeleteProgram(program) };
    }

    fn create_vertex_array(&mut self) -> u32 {
        let mut vao = 0;
        unsafe { gl::GenVertexArrays(1, &mut vao) };
        vao
    }

    fn bind_vertex_array(&mut self, vertex_array: u32) {
        unsafe { gl::BindVertexArray(vertex_array) };
    }

    fn delete_vertex_array(&mut self, vertex_array: u32) {
        unsafe { gl::DeleteVertexArrays(1, &vertex_array) };
    }

    fn create_buffer(&mut self) -> u32 {
        let mut buffer = 0;
        unsafe { gl::GenBuffers(1, &mut buffer) };
        buffer
    }

    fn upload_buffer(&mut self, target: BufferTarget, buffer: u32, data: &[u8]) {
        let target = match target {
            BufferTarget::Vertex => gl::ARRAY_BUFFER,
            BufferTarget::Index => gl::ELEMENT_ARRAY_BUFFER,
        };
        unsafe {
            gl::BindBuffer(target, buffer);
            gl::BufferData(
                target,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const _,
                gl::STATIC_DRAW,
            );
        }
    }

    fn delete_buffer(&mut self, buffer: u32) {
        unsafe { gl::DeleteBuffers(1, &buffer) };
    }

    fn vertex_attrib_pointer(&mut self, attribute: &VertexAttribute, stride: usize) {
        let normalized = if attribute.normalized { gl::TRUE } else { gl::FALSE };
        unsafe {
            gl::VertexAttribPointer(
                attribute.index,
                attribute.components as GLint,
                attribute_type(attribute.kind),
                normalized,
                stride as GLsizei,
                attribute.offset as *const _,
            );
        }
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { gl::EnableVertexAttribArray(index) };
    }

    fn polygon_mode(&mut self, mode: FillMode) {
        let mode = match mode {
            FillMode::Fill => gl::FILL,
            FillMode::Line => gl::LINE,
        };
        unsafe { gl::PolygonMode(gl::FRONT_AND_BACK, mode) };
    }

    fn clear_color(&mut self, rgba: [f32; 4]) {
        unsafe { gl::ClearColor(rgba[0], rgba[1], rgba[2], rgba[3]) };
    }

    fn clear(&mut self) {
        unsafe { gl::Clear(gl::COLOR_BUFFER_BIT) };
    }

    fn viewport(&mut self, width: u32, height: u32) {
        unsafe { gl::Viewport(0, 0, width as GLsizei, height as GLsizei) };
    }

    fn draw_elements(&mut self, count: usize) {
        unsafe { gl::DrawElements(gl::TRIANGLES, count as GLsizei, gl::UNSIGNED_INT, ptr::null()) };
    }

    fn draw_arrays(&mut self, count: usize) {
        unsafe { gl::DrawArrays(gl::TRIANGLES, 0, count as GLsizei) };
    }
}
