use std::path::Path;

use log::{debug, info, warn};

use crate::{
    config::AppConfig,
    input::{InputController, ToggleState},
    platform::{Platform, SurfaceEvent},
    render::{
        DrawStats, FillMode, GeometryBuffer, GraphicsApi, LinkedProgram, MeshData, RenderContext,
        RenderError, ShaderProgramBuilder, ShaderSource, ShaderStage,
    },
    utils::{InitError, InitPhase},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Init,
    Running,
    ShuttingDown,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    pub fill_mode: FillMode,
    pub draw: DrawStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    pub frames: u64,
    pub draw_calls: u64,
    pub triangles: u64,
    pub mode_changes: u64,
}

/// Owns the context, the pipeline and the geometry, and drives frames until close.
pub struct RenderLoop<P: Platform, A: GraphicsApi> {
    platform: P,
    context: RenderContext<A>,
    program: Option<LinkedProgram>,
    geometry: Option<GeometryBuffer>,
    input: InputController,
    toggle: ToggleState,
    clear_color: [f32; 4],
    pending: Vec<SurfaceEvent>,
    phase: LoopPhase,
    stats: EngineStats,
}

impl<P: Platform, A: GraphicsApi> RenderLoop<P, A> {
    /// Reads both shader files, then builds the pipeline and the geometry.
    ///
    /// `platform` and `api` must already hold a current context.
    pub fn init(config: &AppConfig, platform: P, api: A) -> Result<Self, InitError> {
        let read = |stage: ShaderStage, path: &Path| {
            ShaderSource::from_file(stage, path)
                .map_err(|e| InitError::new(InitPhase::ShaderSources, e.to_string()))
        };
        let vertex = read(ShaderStage::Vertex, &config.shaders.vertex)?;
        let fragment = read(ShaderStage::Fragment, &config.shaders.fragment)?;
        Self::init_with_sources(config, platform, api, &vertex, &fragment)
    }

    pub fn init_with_sources(
        config: &AppConfig,
        platform: P,
        api: A,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
    ) -> Result<Self, InitError> {
        Self::init_with_mesh(config, platform, api, vertex, fragment, &config.geometry.mesh())
    }

    fn init_with_mesh(
        config: &AppConfig,
        platform: P,
        api: A,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
        mesh: &MeshData,
    ) -> Result<Self, InitError> {
        let mut context = RenderContext::new(api);
        let (width, height) = platform.size();
        context.set_viewport(width, height);

        debug!("Entering {}", InitPhase::Pipeline);
        let program = ShaderProgramBuilder::build(&mut context, vertex, fragment);
        if !program.is_linked() {
            warn!("Continuing with unusable program {}", program.id());
        }

        debug!("Entering {}", InitPhase::Geometry);
        if mesh.vertices.is_empty() {
            program.destroy(&mut context);
            return Err(InitError::new(InitPhase::Geometry, "mesh has no vertices"));
        }
        let geometry = GeometryBuffer::from_mesh(&mut context, mesh);

        let initial = config.render.initial_fill_mode;
        context.set_fill_mode(initial);

        info!(
            "Render loop ready: {:?} geometry, {:?} mode",
            config.geometry, initial
        );

        Ok(Self {
            platform,
            context,
            program: Some(program),
            geometry: Some(geometry),
            input: InputController::from_config(&config.input),
            toggle: ToggleState::new(initial),
            clear_color: config.render.clear_color,
            pending: Vec::new(),
            phase: LoopPhase::Running,
            stats: EngineStats::default(),
        })
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn fill_mode(&self) -> FillMode {
        self.toggle.mode
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn context(&self) -> &RenderContext<A> {
        &self.context
    }

    /// One full frame: input, clear, draw, present.
    pub fn frame(&mut self) -> Result<FrameStats, RenderError> {
        if self.phase != LoopPhase::Running {
            return Err(RenderError::NotRunning);
        }

        self.process_input();

        self.context.clear(self.clear_color);

        let mut draw = DrawStats::default();
        if let (Some(program), Some(geometry)) = (&self.program, &self.geometry) {
            self.context.use_program(program);
            geometry.bind(&mut self.context);
            draw = self.context.draw()?;
            geometry.unbind(&mut self.context);
            self.stats.draw_calls += 1;
            self.stats.triangles += draw.triangles as u64;
        }

        self.platform.present()?;
        self.pending.extend(self.platform.pump_events());
        self.stats.frames += 1;

        Ok(FrameStats {
            frame: self.stats.frames,
            fill_mode: self.toggle.mode,
            draw,
        })
    }

    fn process_input(&mut self) {
        for event in self.pending.drain(..) {
            let SurfaceEvent::Resized { width, height } = event;
            self.context.set_viewport(width, height);
            debug!("Viewport resized to {}x{}", width, height);
        }

        let keys = self.platform.keys();
        let close = self.input.poll_close(keys);
        let next = self.input.poll_mode_toggle(keys, self.toggle);

        if close {
            self.platform.set_should_close(true);
        }
        if next.mode != self.toggle.mode {
            self.context.set_fill_mode(next.mode);
            self.stats.mode_changes += 1;
        }
        self.toggle = next;
    }

    /// Runs frames until the close flag is seen, then shuts down.
    ///
    /// Shutdown also happens when a frame fails; the error is returned afterwards.
    pub fn run(&mut self) -> Result<EngineStats, RenderError> {
        if self.phase != LoopPhase::Running {
            return Err(RenderError::NotRunning);
        }
        info!("Entering render loop");

        let mut result = Ok(());
        while !self.platform.should_close() {
            if let Err(e) = self.frame() {
                result = Err(e);
                break;
            }
        }

        self.shutdown();
        result.map(|()| self.stats)
    }

    /// Releases geometry, then the program, then the context. Idempotent.
    pub fn shutdown(&mut self) {
        if self.phase == LoopPhase::Terminated {
            return;
        }
        self.phase = LoopPhase::ShuttingDown;
        info!("Shutting down after {} frames", self.stats.frames);

        if let Some(geometry) = self.geometry.take() {
            geometry.unbind(&mut self.context);
            if let Err(e) = geometry.destroy(&mut self.context) {
                warn!("Failed to release geometry: {}", e);
            }
        }
        if let Some(program) = self.program.take() {
            program.destroy(&mut self.context);
        }
        self.platform.terminate();

        self.phase = LoopPhase::Terminated;
    }
}

impl<P: Platform, A: GraphicsApi> Drop for RenderLoop<P, A> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
