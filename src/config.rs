use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SOURCE_URL: &str = "stub://viewfinder";
const DEFAULT_TARGET_FPS: u32 = 10;
const DEFAULT_FRAME_WIDTH: u32 = 640;
const DEFAULT_FRAME_HEIGHT: u32 = 480;

#[derive(Debug, Deserialize, Default)]
struct ViewfinderConfigFile {
    listen_addr: Option<String>,
    source: Option<SourceConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct SourceConfigFile {
    url: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ViewfinderConfig {
    pub listen_addr: String,
    pub source: SourceSettings,
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub url: String,
    pub target_fps: u32,
    pub width: u32,
    pub height: u32,
}

impl ViewfinderConfig {
    /// Load from the JSON file named by `VIEWFINDER_CONFIG` (if set), then
    /// apply env overrides, then validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("VIEWFINDER_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ViewfinderConfigFile) -> Self {
        let listen_addr = file
            .listen_addr
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let source = SourceSettings {
            url: file
                .source
                .as_ref()
                .and_then(|source| source.url.clone())
                .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
            target_fps: file
                .source
                .as_ref()
                .and_then(|source| source.target_fps)
                .unwrap_or(DEFAULT_TARGET_FPS),
            width: file
                .source
                .as_ref()
                .and_then(|source| source.width)
                .unwrap_or(DEFAULT_FRAME_WIDTH),
            height: file
                .source
                .and_then(|source| source.height)
                .unwrap_or(DEFAULT_FRAME_HEIGHT),
        };
        Self {
            listen_addr,
            source,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(addr) = std::env::var("VIEWFINDER_LISTEN_ADDR") {
            if !addr.trim().is_empty() {
                self.listen_addr = addr;
            }
        }
        if let Ok(url) = std::env::var("VIEWFINDER_SOURCE_URL") {
            if !url.trim().is_empty() {
                self.source.url = url;
            }
        }
        if let Ok(fps) = std::env::var("VIEWFINDER_TARGET_FPS") {
            let fps: u32 = fps
                .parse()
                .map_err(|_| anyhow!("VIEWFINDER_TARGET_FPS must be an integer"))?;
            self.source.target_fps = fps;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.listen_addr
            .parse::<SocketAddr>()
            .map_err(|_| anyhow!("invalid listen address '{}'", self.listen_addr))?;
        if self.source.target_fps == 0 {
            return Err(anyhow!("target_fps must be greater than zero"));
        }
        if self.source.width == 0 || self.source.height == 0 {
            return Err(anyhow!("frame dimensions must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<ViewfinderConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
