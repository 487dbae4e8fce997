use std::num::NonZeroU32;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use glutin::{
    config::{Config, ConfigTemplateBuilder},
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::{GetGlDisplay, GlDisplay},
    prelude::*,
    surface::{Surface, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use log::{info, warn};
use raw_window_handle::HasRawWindowHandle;
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, WindowEvent},
    event_loop::{EventLoop, EventLoopBuilder},
    keyboard::{KeyCode, PhysicalKey},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowBuilder},
};

use super::{Platform, SurfaceEvent};
use crate::config::WindowConfig;
use crate::input::{Key, KeyboardState};
use crate::render::{GlApi, RenderError};
use crate::utils::{InitError, InitPhase};

const NO_CONFIGS: &str = "display offered no framebuffer configs";

/// A winit window with a current OpenGL 3.3 core context.
///
/// Fields drop in declaration order: the surface goes before the window it was
/// created from.
pub struct GlPlatform {
    gl_surface: Option<Surface<WindowSurface>>,
    gl_context: Option<PossiblyCurrentContext>,
    window: Window,
    event_loop: EventLoop<()>,
    keys: KeyboardState,
    should_close: bool,
    size: (u32, u32),
}

impl GlPlatform {
    /// Window, then context, then entry points. The first failure aborts.
    pub fn open(config: &WindowConfig) -> Result<(Self, GlApi), InitError> {
        let (event_loop, window, gl_config) = Self::create_window(config)?;
        let (gl_context, gl_surface) = Self::create_context(&window, &gl_config, config.vsync)?;

        let gl_display = gl_config.display();
        let api = GlApi::load_with(|symbol| gl_display.get_proc_address(symbol))?;

        let size = window.inner_size();
        info!(
            "Opened {}x{} window \"{}\"",
            size.width, size.height, config.title
        );

        Ok((
            Self {
                gl_surface: Some(gl_surface),
                gl_context: Some(gl_context),
                window,
                event_loop,
                keys: KeyboardState::new(),
                should_close: false,
                size: (size.width, size.height),
            },
            api,
        ))
    }

    fn create_window(config: &WindowConfig) -> Result<(EventLoop<()>, Window, Config), InitError> {
        let event_loop = EventLoopBuilder::new()
            .build()
            .map_err(|e| InitError::new(InitPhase::Window, e.to_string()))?;

        let window_builder = WindowBuilder::new()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height));

        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(24)
            .with_stencil_size(8);

        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));

        // the picker has to return a config, an empty set can only unwind out of it
        let built = panic::catch_unwind(AssertUnwindSafe(|| {
            display_builder.build(&event_loop, template, |configs| {
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    .unwrap_or_else(|| panic!("{}", NO_CONFIGS))
            })
        }))
        .map_err(|_| InitError::new(InitPhase::Window, NO_CONFIGS))?;
        let (window, gl_config) =
            built.map_err(|e| InitError::new(InitPhase::Window, e.to_string()))?;

        let window =
            window.ok_or_else(|| InitError::new(InitPhase::Window, "no window was created"))?;
        Ok((event_loop, window, gl_config))
    }

    fn create_context(
        window: &Window,
        gl_config: &Config,
        vsync: bool,
    ) -> Result<(PossiblyCurrentContext, Surface<WindowSurface>), InitError> {
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(window.raw_window_handle()));

        let gl_display = gl_config.display();
        let context = |e: glutin::error::Error| InitError::new(InitPhase::Context, e.to_string());

        let not_current = unsafe { gl_display.create_context(gl_config, &context_attributes) }
            .map_err(context)?;

        let attrs = window.build_surface_attributes(<_>::default());
        let gl_surface =
            unsafe { gl_display.create_window_surface(gl_config, &attrs) }.map_err(context)?;

        let gl_context = not_current.make_current(&gl_surface).map_err(context)?;

        if vsync {
            if let Err(e) =
                gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN))
            {
                warn!("Failed to enable vsync: {}", e);
            }
        }

        Ok((gl_context, gl_surface))
    }

    fn handle_window_event(&mut self, event: WindowEvent, events: &mut Vec<SurfaceEvent>) {
        match event {
            WindowEvent::CloseRequested => self.should_close = true,
            WindowEvent::Resized(size) => {
                if let (Some(surface), Some(context), Some(width), Some(height)) = (
                    &self.gl_surface,
                    &self.gl_context,
                    NonZeroU32::new(size.width),
                    NonZeroU32::new(size.height),
                ) {
                    surface.resize(context, width, height);
                }
                self.size = (size.width, size.height);
                events.push(SurfaceEvent::Resized {
                    width: size.width,
                    height: size.height,
                });
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if let Some(key) = map_key(code) {
                        self.keys.set(key, event.state == ElementState::Pressed);
                    }
                }
            }
            WindowEvent::Focused(false) => self.keys.release_all(),
            _ => {}
        }
    }
}

impl Platform for GlPlatform {
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
        let (Some(surface), Some(context)) = (&self.gl_surface, &self.gl_context) else {
            return Err(RenderError::Present("context was terminated".to_string()));
        };
        surface
            .swap_buffers(context)
            .map_err(|e| RenderError::Present(e.to_string()))
    }

    fn pump_events(&mut self) -> Vec<SurfaceEvent> {
        let mut window_events = Vec::new();
        let window_id = self.window.id();
        let status = self
            .event_loop
            .pump_events(Some(Duration::ZERO), |event, _| {
                if let Event::WindowEvent { window_id: id, event } = event {
                    if id == window_id {
                        window_events.push(event);
                    }
                }
            });

        if let PumpStatus::Exit(code) = status {
            info!("Event loop exited with code {}", code);
            self.should_close = true;
        }

        let mut events = Vec::new();
        for event in window_events {
            self.handle_window_event(event, &mut events);
        }
        events
    }

    /// Releases the context and its surface, then hides the window.
    fn terminate(&mut self) {
        let Some(gl_context) = self.gl_context.take() else {
            return;
        };
        if let Err(e) = gl_context.make_not_current() {
            warn!("Failed to release the current context: {}", e);
        }
        self.gl_surface = None;
        self.window.set_visible(false);
        info!("Graphics context terminated");
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Space => Key::Space,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyL => Key::L,
        KeyCode::F1 => Key::F1,
        _ => return None,
    };
    Some(key)
}
