// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration back-ends
//!
//! A project declares its topology in exactly one of three places:
//!
//! - an `xcl.yml` manifest (plus optional `.xcl/env.yml`)
//! - a `build.env` / `apply.env` pair
//! - the key/value store written by the setup wizard
//!
//! Each reader produces the same [`RawTopology`] record, which
//! [`crate::project::ProjectModel`] then normalizes.

pub mod env_file;
pub mod state;
pub mod yaml;

use crate::error::Result;
use crate::fs::{find_upward, FileSystem};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Primary YAML manifest name
pub const XCL_MANIFEST: &str = "xcl.yml";
/// Secondary YAML file with connection facts, relative to the root
pub const XCL_ENV: &str = ".xcl/env.yml";
/// Env file with schema facts
pub const BUILD_ENV: &str = "build.env";
/// Env file with connection facts
pub const APPLY_ENV: &str = "apply.env";

/// Which back-end a project model was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// `xcl.yml` manifest
    XclManifest,
    /// `build.env` / `apply.env` pair
    EnvFiles,
    /// Setup wizard key/value store
    IdeState,
}

impl SourceKind {
    /// Short label for output
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::XclManifest => "xcl.yml",
            Self::EnvFiles => "build.env/apply.env",
            Self::IdeState => "stored settings",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Marker files found in a workspace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMarkers {
    /// Path of `xcl.yml`, if present at the root
    pub xcl_manifest: Option<PathBuf>,
    /// Path of the nearest `build.env`, if any
    pub build_env: Option<PathBuf>,
}

impl SourceMarkers {
    /// Probe the workspace for marker files.
    ///
    /// `xcl.yml` is only recognised at the root; `build.env` is searched
    /// upward from `current`.
    pub fn probe(fs: &dyn FileSystem, root: &Path, current: &Path) -> Self {
        let manifest = root.join(XCL_MANIFEST);
        Self {
            xcl_manifest: fs.exists(&manifest).then_some(manifest),
            build_env: find_upward(fs, root, current, BUILD_ENV),
        }
    }
}

/// Pick the authoritative back-end from the markers present.
///
/// `xcl.yml` wins over `build.env`; with neither, the stored settings are used.
#[must_use]
pub fn select_source(markers: &SourceMarkers) -> SourceKind {
    if markers.xcl_manifest.is_some() {
        SourceKind::XclManifest
    } else if markers.build_env.is_some() {
        SourceKind::EnvFiles
    } else {
        SourceKind::IdeState
    }
}

/// Topology facts as read from a back-end, before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTopology {
    /// Project identifier
    pub project_name: Option<String>,
    /// Declared mode (`SINGLE`, `MULTI`, `FLEX`), unparsed
    pub project_mode: Option<String>,
    /// Explicit flex flag, independent of the mode string
    pub flex_mode: bool,
    /// Application schema
    pub app_schema: Option<String>,
    /// Logic schema
    pub logic_schema: Option<String>,
    /// Data schema
    pub data_schema: Option<String>,
    /// Connecting (proxy) user
    pub db_app_user: Option<String>,
    /// Password of the connecting user
    pub db_app_pwd: Option<String>,
    /// Administrative user
    pub db_admin_user: Option<String>,
    /// Administrative password
    pub db_admin_pwd: Option<String>,
    /// Connection descriptor
    pub db_tns: Option<String>,
    /// APEX workspace
    pub workspace: Option<String>,
}

/// A configured back-end, ready to be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `xcl.yml` plus optional `.xcl/env.yml`
    Xcl {
        /// Primary manifest
        manifest: PathBuf,
        /// Secondary connection file
        env: PathBuf,
    },
    /// `build.env` plus the nearest `apply.env`
    EnvFiles {
        /// Schema facts
        build: PathBuf,
        /// Connection facts
        apply: Option<PathBuf>,
    },
    /// Setup wizard store
    IdeState {
        /// JSON file holding the key/value pairs
        store: PathBuf,
    },
}

impl ConfigSource {
    /// Detect the back-end for a workspace. Re-run this before every
    /// resolution; marker files may come and go between operations.
    pub fn detect(fs: &dyn FileSystem, root: &Path, current: &Path, state_file: &Path) -> Self {
        let markers = SourceMarkers::probe(fs, root, current);
        let kind = select_source(&markers);
        debug!("Configuration source: {}", kind);

        match (kind, markers) {
            (
                SourceKind::XclManifest,
                SourceMarkers {
                    xcl_manifest: Some(manifest),
                    ..
                },
            ) => Self::Xcl {
                manifest,
                env: root.join(XCL_ENV),
            },
            (
                SourceKind::EnvFiles,
                SourceMarkers {
                    build_env: Some(build),
                    ..
                },
            ) => Self::EnvFiles {
                apply: find_upward(fs, root, current, APPLY_ENV),
                build,
            },
            _ => Self::IdeState {
                store: root.join(state_file),
            },
        }
    }

    /// Which kind of back-end this is
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Xcl { .. } => SourceKind::XclManifest,
            Self::EnvFiles { .. } => SourceKind::EnvFiles,
            Self::IdeState { .. } => SourceKind::IdeState,
        }
    }

    /// The file a user should open to fix the configuration
    #[must_use]
    pub fn primary_file(&self) -> &Path {
        match self {
            Self::Xcl { manifest, .. } => manifest,
            Self::EnvFiles { build, .. } => build,
            Self::IdeState { store } => store,
        }
    }

    /// Read the raw topology facts
    pub fn read(&self, fs: &dyn FileSystem) -> Result<RawTopology> {
        match self {
            Self::Xcl { manifest, env } => yaml::read(fs, manifest, env),
            Self::EnvFiles { build, apply } => env_file::read(fs, build, apply.as_deref()),
            Self::IdeState { store } => {
                let store = state::JsonStateStore::load(fs, store)?;
                Ok(state::read(&store))
            }
        }
    }
}

/// Trim a value and drop it when empty
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
