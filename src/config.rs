// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Settings are layered, later sources winning:
//!
//! 1. built-in defaults
//! 2. the user settings file (`settings.toml` in the platform config dir)
//! 3. `.schemaroute.toml` at the workspace root
//! 4. an explicit `--config` file
//! 5. `SCHEMAROUTE__*` environment variables

use crate::triggers::TriggerRule;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the setup wizard store, relative to the root
pub const DEFAULT_STATE_FILE: &str = ".schemaroute/state.json";

/// Per-project settings file name
pub const PROJECT_SETTINGS_FILE: &str = ".schemaroute.toml";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Setup wizard store, relative to the workspace root
    pub state_file: PathBuf,
    /// Scripts to run after files matching a pattern are compiled
    #[serde(default)]
    pub triggers: Vec<TriggerRule>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            triggers: Vec::new(),
        }
    }
}

/// Path of the user settings file
#[must_use]
pub fn user_settings_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "hyperpolymath", "schemaroute")
        .map(|d| d.config_dir().join("settings.toml"))
}

/// Load settings for the workspace at `root`
pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Settings> {
    let defaults = Settings::default();
    let mut builder = config::Config::builder()
        .set_default("log_level", defaults.log_level)?
        .set_default(
            "state_file",
            defaults.state_file.to_string_lossy().into_owned(),
        )?;

    if let Some(user) = user_settings_path() {
        builder = builder.add_source(config::File::from(user).required(false));
    }

    builder = builder.add_source(config::File::from(root.join(PROJECT_SETTINGS_FILE)).required(false));

    if let Some(path) = explicit {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    builder = builder.add_source(config::Environment::with_prefix("SCHEMAROUTE").separator("__"));

    builder
        .build()
        .context("Failed to read settings")?
        .try_deserialize()
        .context("Invalid settings")
}
