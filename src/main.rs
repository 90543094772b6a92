// src/main.rs
use anyhow::{Context, Result};
use log::info;
use nanosense::engine::Engine;
use nanosense::StreamConfig;

fn load_config() -> Result<StreamConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            StreamConfig::load(&path).with_context(|| format!("failed to load config {path}"))
        }
        None => Ok(StreamConfig::default()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = load_config()?;
    info!("nanosense starting ({:?} transport)", config.transport);
    let engine = Engine::start(&config)?;
    let summary = engine.wait()?;
    info!(
        "finished: {} packets, {} samples, {} rejected packets",
        summary.packets, summary.samples, summary.rejected
    );
    Ok(())
}
