//! viewfinderd - standalone camera server daemon
//!
//! Wires a frame source into the frame store and serves the MJPEG feed:
//! 1. Loads configuration (file + env)
//! 2. Spawns the streaming server
//! 3. Loops capturing frames into the frame store until Ctrl-C
//!
//! On-device the capture pipeline takes the place of the source loop; this
//! binary exists for development and for headless deployments.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use viewfinder_core::config::ViewfinderConfig;
use viewfinder_core::ingest::{FrameSource, StubConfig, StubSource};
use viewfinder_core::server::{ServerConfig, StreamServer};
use viewfinder_core::FrameStore;

#[derive(Debug, Parser)]
#[command(name = "viewfinderd", about = "Camera viewfinder streaming daemon")]
struct Args {
    /// Path to a JSON config file (same as VIEWFINDER_CONFIG).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address override, e.g. 0.0.0.0:8080.
    #[arg(long, env = "VIEWFINDER_LISTEN_ADDR")]
    listen_addr: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Some(path) = &args.config {
        std::env::set_var("VIEWFINDER_CONFIG", path);
    }
    let mut cfg = ViewfinderConfig::load()?;
    if let Some(addr) = args.listen_addr {
        cfg.listen_addr = addr;
    }

    let mut source = open_source(&cfg)?;

    let frames = Arc::new(FrameStore::new());
    let server = StreamServer::new(
        ServerConfig {
            addr: cfg.listen_addr.clone(),
        },
        frames.clone(),
    );
    let handle = server.spawn()?;
    log::info!("camera server listening on {}", handle.addr);
    log::info!(
        "source={} {}x{}@{}fps",
        cfg.source.url,
        cfg.source.width,
        cfg.source.height,
        cfg.source.target_fps
    );

    let running = Arc::new(AtomicBool::new(true));
    let running_handler = running.clone();
    ctrlc::set_handler(move || {
        running_handler.store(false, Ordering::SeqCst);
    })?;

    while running.load(Ordering::SeqCst) {
        match source.next_frame() {
            Ok(jpeg) => frames.publish(jpeg),
            Err(err) => {
                log::warn!("frame capture failed: {}", err);
                std::thread::sleep(Duration::from_millis(500));
            }
        }
    }

    log::info!("shutting down");
    handle.stop()?;
    Ok(())
}

fn open_source(cfg: &ViewfinderConfig) -> Result<Box<dyn FrameSource>> {
    let url = &cfg.source.url;
    if url.starts_with("stub://") {
        return Ok(Box::new(StubSource::new(StubConfig {
            width: cfg.source.width,
            height: cfg.source.height,
            target_fps: cfg.source.target_fps,
        })));
    }
    Err(anyhow!(
        "unsupported source url '{}'; expected stub://",
        url
    ))
}
