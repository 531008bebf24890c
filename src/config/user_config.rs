//! User-level configuration for braintype
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/braintype/config.toml

use crate::export::raster::{RasterOptions, DEFAULT_MAX_CANVAS_PX, DEFAULT_SCALE};
use crate::export::share::{DEFAULT_SHARE_TITLE, DEFAULT_SHARE_URL};
use crate::session::Timings;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const ENV_CATALOG: &str = "BRAINTYPE_CATALOG";
pub const ENV_SHARE_URL: &str = "BRAINTYPE_SHARE_URL";
pub const ENV_OUTPUT_DIR: &str = "BRAINTYPE_OUTPUT_DIR";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub quiz: QuizConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub share: ShareConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizConfig {
    /// Pause after a selection before moving on (default: 300)
    pub auto_advance_ms: Option<u64>,

    /// Length of the analyzing phase (default: 2500)
    pub analysis_delay_ms: Option<u64>,

    /// Replacement question catalog (TOML)
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Pixel density multiplier for the card (default: 3)
    pub scale: Option<u32>,

    /// Where saved cards go (default: current directory)
    pub output_dir: Option<PathBuf>,

    /// Largest allowed canvas side in pixels (default: 4096)
    pub max_canvas_px: Option<u32>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ShareConfig {
    /// Link shared with the result
    pub url: Option<String>,

    /// Share sheet title
    pub title: Option<String>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/braintype/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = UserConfig::default();

        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            match Self::from_file(&path) {
                Ok(user_config) => config.merge(user_config),
                Err(e) => warn!("Ignoring config {}: {}", path.display(), e),
            }
        }

        // Environment variables override everything
        config.apply_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str::<UserConfig>(&content)?;
        debug!("Loaded user config from {}", path.display());
        Ok(config)
    }

    /// Get the user config directory path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("braintype").join("config.toml"))
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: UserConfig) {
        if other.quiz.auto_advance_ms.is_some() {
            self.quiz.auto_advance_ms = other.quiz.auto_advance_ms;
        }
        if other.quiz.analysis_delay_ms.is_some() {
            self.quiz.analysis_delay_ms = other.quiz.analysis_delay_ms;
        }
        if other.quiz.catalog.is_some() {
            self.quiz.catalog = other.quiz.catalog;
        }
        if other.export.scale.is_some() {
            self.export.scale = other.export.scale;
        }
        if other.export.output_dir.is_some() {
            self.export.output_dir = other.export.output_dir;
        }
        if other.export.max_canvas_px.is_some() {
            self.export.max_canvas_px = other.export.max_canvas_px;
        }
        if other.share.url.is_some() {
            self.share.url = other.share.url;
        }
        if other.share.title.is_some() {
            self.share.title = other.share.title;
        }
    }

    /// Apply `BRAINTYPE_*` overrides; empty values are ignored
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(path) = get(ENV_CATALOG) {
            self.quiz.catalog = Some(PathBuf::from(path));
        }
        if let Some(url) = get(ENV_SHARE_URL) {
            self.share.url = Some(url);
        }
        if let Some(dir) = get(ENV_OUTPUT_DIR) {
            self.export.output_dir = Some(PathBuf::from(dir));
        }
    }

    /// Timer delays for interactive sessions
    pub fn timings(&self) -> Timings {
        let defaults = Timings::default();
        Timings {
            auto_advance: self
                .quiz
                .auto_advance_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.auto_advance),
            analysis_delay: self
                .quiz
                .analysis_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.analysis_delay),
        }
    }

    pub fn catalog_path(&self) -> Option<&Path> {
        self.quiz.catalog.as_deref()
    }

    pub fn scale(&self) -> u32 {
        self.export.scale.unwrap_or(DEFAULT_SCALE)
    }

    pub fn raster_options(&self) -> RasterOptions {
        RasterOptions {
            scale: self.scale(),
            max_canvas_px: self.export.max_canvas_px.unwrap_or(DEFAULT_MAX_CANVAS_PX),
            ..Default::default()
        }
    }

    pub fn output_dir(&self) -> &Path {
        self.export
            .output_dir
            .as_deref()
            .unwrap_or_else(|| Path::new("."))
    }

    pub fn share_url(&self) -> &str {
        self.share.url.as_deref().unwrap_or(DEFAULT_SHARE_URL)
    }

    pub fn share_title(&self) -> &str {
        self.share.title.as_deref().unwrap_or(DEFAULT_SHARE_TITLE)
    }

    /// Initialize user config directory and create example config
    pub fn init_user_config() -> Result<PathBuf> {
        let config_path = Self::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if !config_path.exists() {
            let example = r#"# braintype User Configuration

[quiz]
# Pause after picking an answer before the next question (milliseconds)
# auto_advance_ms = 300

# How long the "analyzing" screen stays up (milliseconds)
# analysis_delay_ms = 2500

# Use your own questions and profiles (same layout as the built-in catalog)
# catalog = "/path/to/catalog.toml"

[export]
# Card resolution multiplier: 1 = 360x600, 3 = 1080x1800
# scale = 3

# Where declaration cards are saved
# output_dir = "."

# Largest canvas side in pixels
# max_canvas_px = 4096

[share]
# url = "http://localhost:5173/"
# title = "The Last Immersion: Brain Type Diagnosis (C.O.D.E)"
"#;
            std::fs::write(&config_path, example)?;
        }

        Ok(config_path)
    }
}
