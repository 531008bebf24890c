//! Configuration module for braintype
//!
//! This module handles:
//! - User-level configuration (~/.config/braintype/config.toml)
//! - Environment overrides (`BRAINTYPE_*`)
//! - Quiz timing, card export and share defaults

mod user_config;

pub use user_config::{
    ExportConfig, QuizConfig, ShareConfig, UserConfig, ENV_CATALOG, ENV_OUTPUT_DIR,
    ENV_SHARE_URL,
};
