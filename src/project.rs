// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Canonical project model
//!
//! Whatever back-end declared the topology, callers only ever see a
//! [`ProjectModel`]. Building one never fails: missing facts are recorded as
//! [`ValidationIssue`]s and flip [`ProjectModel::is_valid`], so read-only
//! flows keep working while anything that talks to the database must check
//! the flag first.

use crate::fs::FileSystem;
use crate::notify::{Notifier, NotifyAction};
use crate::source::{ConfigSource, RawTopology, SourceKind};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Schema-folder semantics of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProjectMode {
    /// One schema owns everything
    Single,
    /// Fixed data, logic and app schemas
    Multi,
    /// Schema taken from the folder name
    Flex,
}

impl ProjectMode {
    /// Parse a declared mode, ignoring case
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SINGLE" | "S" => Some(Self::Single),
            "MULTI" | "M" => Some(Self::Multi),
            "FLEX" | "F" => Some(Self::Flex),
            _ => None,
        }
    }

    /// Uppercase label
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "SINGLE",
            Self::Multi => "MULTI",
            Self::Flex => "FLEX",
        }
    }
}

impl fmt::Display for ProjectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reason the configuration is not usable for database work
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// Connecting user or TNS missing
    MissingConnection {
        /// Names of the missing facts
        fields: Vec<&'static str>,
    },
    /// Declared schemas missing for the mode
    MissingSchemas {
        /// Mode the check ran for
        mode: ProjectMode,
        /// Names of the missing schemas
        fields: Vec<&'static str>,
    },
    /// The configuration could not be read at all
    Unreadable {
        /// Read or parse failure
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingConnection { fields } => {
                write!(f, "connection settings incomplete, missing {}", fields.join(", "))
            }
            Self::MissingSchemas { mode, fields } => {
                write!(f, "{} project is missing {}", mode, fields.join(", "))
            }
            Self::Unreadable { message } => write!(f, "configuration unreadable: {}", message),
        }
    }
}

/// Backend-independent project topology
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ProjectModel {
    /// Lowercase project identifier
    pub project_name: Option<String>,
    /// Declared mode
    pub project_mode: Option<ProjectMode>,
    /// Application schema
    pub app_schema: String,
    /// Logic schema
    pub logic_schema: String,
    /// Data schema
    pub data_schema: String,
    /// Connecting user; a proxy user outside SINGLE mode
    pub db_app_user: String,
    /// Password of the connecting user, when the configuration carries one
    #[serde(skip)]
    pub db_app_pwd: Option<String>,
    /// Administrative user, only used for the setup area
    pub db_admin_user: Option<String>,
    /// Administrative password
    #[serde(skip)]
    pub db_admin_pwd: Option<String>,
    /// Connection descriptor
    pub db_tns: String,
    /// `project_mode == Flex`
    pub is_flex_mode: bool,
    /// No validation issue was found
    pub is_valid: bool,
    /// APEX workspace
    pub workspace: Option<String>,
    /// Back-end the model was read from
    pub source: SourceKind,
    /// Everything that made the model invalid
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Debug for ProjectModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectModel")
            .field("project_name", &self.project_name)
            .field("project_mode", &self.project_mode)
            .field("app_schema", &self.app_schema)
            .field("logic_schema", &self.logic_schema)
            .field("data_schema", &self.data_schema)
            .field("db_app_user", &self.db_app_user)
            .field("db_app_pwd", &self.db_app_pwd.as_ref().map(|_| "***"))
            .field("db_admin_user", &self.db_admin_user)
            .field("db_admin_pwd", &self.db_admin_pwd.as_ref().map(|_| "***"))
            .field("db_tns", &self.db_tns)
            .field("is_flex_mode", &self.is_flex_mode)
            .field("is_valid", &self.is_valid)
            .field("workspace", &self.workspace)
            .field("source", &self.source)
            .field("issues", &self.issues)
            .finish()
    }
}

impl ProjectModel {
    /// Normalize a raw record and run validation
    #[must_use]
    pub fn from_raw(raw: RawTopology, source: SourceKind) -> Self {
        let project_name = raw.project_name.map(|p| p.to_lowercase());
        let project_mode = if raw.flex_mode {
            Some(ProjectMode::Flex)
        } else {
            raw.project_mode.as_deref().and_then(ProjectMode::parse)
        };

        let mut app_schema = raw.app_schema.unwrap_or_default();
        let mut logic_schema = raw.logic_schema.unwrap_or_default();
        let mut data_schema = raw.data_schema.unwrap_or_default();

        match project_mode {
            Some(ProjectMode::Single) => {
                logic_schema = app_schema.clone();
                data_schema = app_schema.clone();
            }
            Some(ProjectMode::Multi) | None => {
                if let Some(project) = &project_name {
                    for (schema, suffix) in [
                        (&mut data_schema, "data"),
                        (&mut logic_schema, "logic"),
                        (&mut app_schema, "app"),
                    ] {
                        if schema.is_empty() {
                            *schema = format!("{project}_{suffix}");
                        }
                    }
                }
            }
            Some(ProjectMode::Flex) => {}
        }

        let mut model = Self {
            project_name,
            project_mode,
            app_schema,
            logic_schema,
            data_schema,
            db_app_user: raw.db_app_user.unwrap_or_default(),
            db_app_pwd: raw.db_app_pwd,
            db_admin_user: raw.db_admin_user,
            db_admin_pwd: raw.db_admin_pwd,
            db_tns: raw.db_tns.unwrap_or_default(),
            is_flex_mode: project_mode == Some(ProjectMode::Flex),
            is_valid: true,
            workspace: raw.workspace,
            source,
            issues: Vec::new(),
        };
        model.issues = model.validate();
        model.is_valid = model.issues.is_empty();
        model
    }

    /// A model for a configuration that could not be read
    #[must_use]
    pub fn unreadable(source: SourceKind, message: String) -> Self {
        let mut model = Self::from_raw(RawTopology::default(), source);
        model.issues.insert(0, ValidationIssue::Unreadable { message });
        model.is_valid = false;
        model
    }

    /// Check connection and schema completeness
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let mut missing = Vec::new();
        if self.db_app_user.is_empty() {
            missing.push("db_app_user");
        }
        if self.db_tns.is_empty() {
            missing.push("db_tns");
        }
        if !missing.is_empty() {
            issues.push(ValidationIssue::MissingConnection { fields: missing });
        }

        if !self.is_flex_mode {
            let mode = self.project_mode.unwrap_or(ProjectMode::Multi);
            let required: Vec<(&'static str, &String)> = match mode {
                ProjectMode::Single => vec![("app_schema", &self.app_schema)],
                _ => vec![
                    ("data_schema", &self.data_schema),
                    ("logic_schema", &self.logic_schema),
                    ("app_schema", &self.app_schema),
                ],
            };
            let missing: Vec<_> = required
                .iter()
                .filter(|(_, value)| value.is_empty())
                .map(|(name, _)| *name)
                .collect();
            if !missing.is_empty() {
                issues.push(ValidationIssue::MissingSchemas { mode, fields: missing });
            }
        }

        issues
    }

    /// Distinct, lowercased, non-empty schema names among the three roles
    #[must_use]
    pub fn distinct_schemas(&self) -> BTreeSet<String> {
        [&self.data_schema, &self.logic_schema, &self.app_schema]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect()
    }

    /// Whether connections must use the `user[schema]` proxy form.
    ///
    /// FLEX projects always connect through a proxy user; otherwise a proxy
    /// is needed as soon as more than one schema exists.
    #[must_use]
    pub fn requires_proxy(&self) -> bool {
        self.is_flex_mode || self.distinct_schemas().len() > 1
    }
}

/// Where a workspace lives and where to start looking for configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRoot {
    /// Workspace root; searches never leave it
    pub root: PathBuf,
    /// Directory of the file being worked on
    pub current: PathBuf,
    /// Setup wizard store, relative to `root`
    pub state_file: PathBuf,
}

impl ProjectRoot {
    /// Root-only location using the default store
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            current: root.clone(),
            root,
            state_file: PathBuf::from(crate::config::DEFAULT_STATE_FILE),
        }
    }

    /// Start configuration lookups from `current` instead of the root
    #[must_use]
    pub fn with_current(mut self, current: impl AsRef<Path>) -> Self {
        let current = current.as_ref();
        self.current = if current.is_absolute() {
            current.to_path_buf()
        } else {
            self.root.join(current)
        };
        self
    }

    /// Use another setup wizard store
    #[must_use]
    pub fn with_state_file(mut self, state_file: impl Into<PathBuf>) -> Self {
        self.state_file = state_file.into();
        self
    }
}

/// Read the active back-end and build a fresh model.
///
/// The back-end is re-detected on every call. A valid model is announced to
/// `notifier` as info. Validation problems are sent as errors with an action
/// to open the configuration file; they never turn into an `Err`.
pub fn resolve_project(
    fs: &dyn FileSystem,
    location: &ProjectRoot,
    notifier: &dyn Notifier,
) -> ProjectModel {
    let source = ConfigSource::detect(
        fs,
        &location.root,
        &location.current,
        &location.state_file,
    );

    let model = match source.read(fs) {
        Ok(raw) => ProjectModel::from_raw(raw, source.kind()),
        Err(e) => ProjectModel::unreadable(source.kind(), e.to_string()),
    };
    debug!(
        "Resolved project {:?} ({}) from {}",
        model.project_name,
        model
            .project_mode
            .map_or("unspecified", |m| m.as_str()),
        source.kind()
    );

    if model.is_valid {
        notifier.info(&format!(
            "Project {} ({}) read from {}",
            model.project_name.as_deref().unwrap_or("(unnamed)"),
            model.project_mode.map_or("MULTI", |m| m.as_str()),
            source.primary_file().display()
        ));
    }

    for issue in &model.issues {
        warn!("{}: {}", source.primary_file().display(), issue);
        notifier.error(
            &format!("Project configuration: {issue}"),
            Some(NotifyAction::OpenConfiguration(
                source.primary_file().to_path_buf(),
            )),
        );
    }

    model
}
