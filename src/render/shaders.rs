// shaders.rs - shader stage compilation and program linking

use std::ffi::CString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use thiserror::Error;

use super::context::{GraphicsApi, RenderContext};

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("{stage} shader compilation failed: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("Program linking failed: {log}")]
    Link { log: String },
    #[error("Failed to read shader source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Source text for one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    stage: ShaderStage,
    text: String,
}

impl ShaderSource {
    pub fn new(stage: ShaderStage, text: impl Into<String>) -> Self {
        Self {
            stage,
            text: text.into(),
        }
    }

    /// Reads the whole file as source for `stage`.
    pub fn from_file(stage: ShaderStage, path: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("{} shader source from {}:\n{}", stage, path.display(), text);
        Ok(Self::new(stage, text))
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A compiled stage object. Only usable when `is_compiled()`.
#[derive(Debug)]
pub struct CompiledShader {
    id: u32,
    stage: ShaderStage,
    compiled: bool,
    log: String,
}

impl CompiledShader {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    pub fn log(&self) -> &str {
        &self.log
    }

    pub fn check(&self) -> Result<(), ShaderError> {
        if self.compiled {
            Ok(())
        } else {
            Err(ShaderError::Compile {
                stage: self.stage,
                log: self.log.clone(),
            })
        }
    }

}

/// A linked program. Draw-usable only when `is_linked()`.
#[derive(Debug)]
pub struct LinkedProgram {
    id: u32,
    linked: bool,
    log: String,
}

impl LinkedProgram {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn log(&self) -> &str {
        &self.log
    }

    pub fn check(&self) -> Result<(), ShaderError> {
        if self.linked {
            Ok(())
        } else {
            Err(ShaderError::Link {
                log: self.log.clone(),
            })
        }
    }

    pub fn destroy<A: GraphicsApi>(self, ctx: &mut RenderContext<A>) {
        if ctx.state().program == Some(self.id) {
            ctx.clear_program();
        }
        ctx.api_mut().delete_program(self.id);
    }
}

pub struct ShaderProgramBuilder;

impl ShaderProgramBuilder {
    /// Compiles one stage. A failed compile is a value, not an error.
    pub fn compile_stage<A: GraphicsApi>(
        ctx: &mut RenderContext<A>,
        source: &ShaderSource,
    ) -> CompiledShader {
        let api = ctx.api_mut();
        let id = api.create_shader(source.stage());

        let cstring = match CString::new(source.text()) {
            Ok(cstring) => cstring,
            Err(err) => {
                return CompiledShader {
                    id,
                    stage: source.stage(),
                    compiled: false,
                    log: format!("source contains a nul byte at {}", err.nul_position()),
                };
            }
        };

        api.compile_shader(id, &cstring);
        let compiled = api.shader_compile_status(id);
        let log = if compiled {
            String::new()
        } else {
            api.shader_info_log(id)
        };

        CompiledShader {
            id,
            stage: source.stage(),
            compiled,
            log,
        }
    }

    /// Attaches both stages to a new program and links it.
    ///
    /// The stages may arrive in either order. Linking is attempted even when a stage failed to compile, the driver then
    /// reports the failure. Both stage objects are deleted before returning.
    pub fn link<A: GraphicsApi>(
        ctx: &mut RenderContext<A>,
        vertex: CompiledShader,
        fragment: CompiledShader,
    ) -> LinkedProgram {
        let api = ctx.api_mut();
        let id = api.create_program();
        api.attach_shader(id, vertex.id);
        api.attach_shader(id, fragment.id);
        api.link_program(id);

        let mut linked = api.program_link_status(id);
        let mut log = if linked {
            String::new()
        } else {
            api.program_info_log(id)
        };

        let stages = [vertex.stage, fragment.stage];
        let count = |stage: ShaderStage| stages.iter().filter(|&&s| s == stage).count();
        if count(ShaderStage::Vertex) != 1 || count(ShaderStage::Fragment) != 1 {
            linked = false;
            let mismatch = format!(
                "program needs one vertex and one fragment stage, got {} and {}",
                stages[0], stages[1]
            );
            log = if log.is_empty() {
                mismatch
            } else {
                format!("{}\n{}", mismatch, log)
            };
        }

        api.delete_shader(vertex.id);
        api.delete_shader(fragment.id);

        LinkedProgram { id, linked, log }
    }

    /// Compiles and links both stages, reporting diagnostics to the log.
    ///
    /// Failures never stop the build; the returned program may be unusable.
    pub fn build<A: GraphicsApi>(
        ctx: &mut RenderContext<A>,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
    ) -> LinkedProgram {
        let vertex = Self::compile_stage(ctx, vertex);
        if let Err(err) = vertex.check() {
            error!("{}", err);
        }
        let fragment = Self::compile_stage(ctx, fragment);
        if let Err(err) = fragment.check() {
            error!("{}", err);
        }

        let program = Self::link(ctx, vertex, fragment);
        match program.check() {
            Ok(()) => info!("Linked shader program {}", program.id()),
            Err(err) => error!("{}", err),
        }
        program
    }
}
