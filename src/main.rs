use anyhow::{Context, Result};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

use glsquare::{AppConfig, GlPlatform, RenderLoop};

const CONFIG_FILE: &str = "glsquare.toml";

fn main() -> Result<()> {
    SimpleLogger::new().with_level(LevelFilter::Info).env().init()?;
    info!("square");

    let config = AppConfig::load_or_default(CONFIG_FILE)?;

    let (platform, api) = GlPlatform::open(&config.window)?;
    let mut render_loop = RenderLoop::init(&config, platform, api)?;

    let stats = render_loop.run().context("render loop failed")?;
    info!(
        "Exited after {} frames, {} draw calls, {} mode changes",
        stats.frames, stats.draw_calls, stats.mode_changes
    );
    Ok(())
}
