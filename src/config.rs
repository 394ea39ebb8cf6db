use crate::audio::{AnalysisConfig, ExecutionMode};
use serde::Deserialize;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::time::Duration;

/// Default location of the configuration file
pub const CONFIG_FILE: &str = "config.toml";

/// Configuration for the CLI and its display collaborator
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisSettings,
    pub display: DisplayConfig,
}

/// Spectral analysis settings as written in `config.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// `inline` or `background`
    pub mode: ExecutionMode,
    /// Samples per analysis window; unset means half a second
    pub window_size: Option<usize>,
    /// Longest a single readiness poll may wait, in milliseconds
    pub poll_wait_ms: u64,
}

/// Geometry limits for the oscilloscope view
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    /// Cap on the number of columns drawn per frame
    pub max_render_samples: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            mode: ExecutionMode::Background,
            window_size: None,
            poll_wait_ms: 3,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            width: 2048,
            height: 1024,
            max_render_samples: 4_000_000,
        }
    }
}

impl AnalysisSettings {
    pub fn to_analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            window_size: self.window_size,
            mode: self.mode,
            poll_wait: Duration::from_millis(self.poll_wait_ms),
        }
    }
}

/// Load configuration from `path`, falling back to defaults if it does not exist
pub fn load_config_from(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    match File::open(path) {
        Ok(mut file) => {
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            Ok(toml::from_str(&contents)?)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(e.into()),
    }
}

/// Load configuration from config.toml
pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    load_config_from(Path::new(CONFIG_FILE))
}
