use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding store.json and the session lock.
    /// If absent, the platform data directory is used.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Logical pixel width of one terminal cell
    #[serde(default = "default_cell_width")]
    pub cell_width_px: f32,
    /// Logical pixel height of one terminal cell
    #[serde(default = "default_cell_height")]
    pub cell_height_px: f32,
    /// Frame interval of the timer loop in milliseconds
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    /// Theme used when the store has no saved display mode
    #[serde(default)]
    pub dark_mode_default: bool,
    /// Hex color overrides for the dark theme
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// Hex color overrides for the light theme
    #[serde(default)]
    pub light_colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            cell_width_px: default_cell_width(),
            cell_height_px: default_cell_height(),
            frame_ms: default_frame_ms(),
            dark_mode_default: false,
            colors: HashMap::new(),
            light_colors: HashMap::new(),
        }
    }
}

fn default_cell_width() -> f32 {
    8.0
}

fn default_cell_height() -> f32 {
    16.0
}

fn default_frame_ms() -> u64 {
    16
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log directory. Defaults to `<data_dir>/logs`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
