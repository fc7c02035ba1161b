// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Path-to-schema classification
//!
//! Rules are tried in order and the first match wins:
//!
//! 1. `.hooks/…` and `db/.hooks/…`: the schema is part of the file name
//! 2. `db/_setup/…` and `db/.setup/…`: the admin user
//! 3. `db/<schema>/…`: the folder name
//! 4. `apex|rest|static/…`: the folder name in FLEX mode, else the app schema
//! 5. anything else: the caller's selected schema
//!
//! Folder names lose a leading `NN_` ordering prefix, except in the setup
//! area which is never treated as a schema.

use crate::error::{Result, RouteError};
use crate::fs::FileSystem;
use crate::project::ProjectModel;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

/// Folders under `db/` that never name a schema
const RESERVED_DB_FOLDERS: &[&str] = &[".hooks", "_setup", ".setup"];

/// Top-level areas owned by the application schema outside FLEX mode
const APP_AREAS: &[&str] = &["apex", "rest", "static"];

/// Which rule produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Schema name found in a hook file name
    Hook,
    /// Setup area, admin identity
    Setup,
    /// `db/<schema>` folder
    DbFolder,
    /// `apex`, `rest` or `static` area
    AppArea,
    /// Caller-selected schema
    Selected,
}

/// Extra input for classification
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyContext<'a> {
    /// Original path of the file, used to read a hook file's name
    pub current_file: Option<&'a Path>,
    /// Schema chosen earlier, used when no folder rule matches
    pub selected_schema: Option<&'a str>,
}

impl<'a> ClassifyContext<'a> {
    /// Attach the original file path
    #[must_use]
    pub fn with_file(mut self, file: &'a Path) -> Self {
        self.current_file = Some(file);
        self
    }

    /// Attach a selected schema
    #[must_use]
    pub fn with_selected(mut self, schema: &'a str) -> Self {
        self.selected_schema = Some(schema);
        self
    }
}

/// Outcome of a successful classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Owning schema, or the admin user for the setup area
    pub schema: String,
    /// Rule that matched
    pub rule: Rule,
}

/// Maps workspace-relative paths to owning schemas
pub struct PathClassifier<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
}

impl<'a> PathClassifier<'a> {
    /// Create a classifier for the workspace at `root`
    pub fn new(fs: &'a dyn FileSystem, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    /// Workspace root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Owning schema of `path`
    pub fn classify_schema(
        &self,
        path: &str,
        model: &ProjectModel,
        ctx: ClassifyContext<'_>,
    ) -> Result<String> {
        self.classify(path, model, ctx).map(|c| c.schema)
    }

    /// Owning schema of `path` together with the rule that decided it
    pub fn classify(
        &self,
        path: &str,
        model: &ProjectModel,
        ctx: ClassifyContext<'_>,
    ) -> Result<Classification> {
        let path = normalize_path(path);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let found = match segments.as_slice() {
            [".hooks", ..] | ["db", ".hooks", ..] => Classification {
                schema: self.schema_from_hook(&path, &segments, ctx)?,
                rule: Rule::Hook,
            },
            ["db", "_setup" | ".setup", ..] => {
                let admin = model
                    .db_admin_user
                    .as_deref()
                    .filter(|u| !u.is_empty())
                    .ok_or_else(|| RouteError::NoAdminUser { path: path.clone() })?;
                Classification {
                    schema: admin.to_string(),
                    rule: Rule::Setup,
                }
            }
            ["db", folder, _, ..] => Classification {
                schema: strip_order_prefix(folder).to_string(),
                rule: Rule::DbFolder,
            },
            [area, folder, _, ..] if model.is_flex_mode && APP_AREAS.contains(area) => {
                Classification {
                    schema: strip_order_prefix(folder).to_string(),
                    rule: Rule::AppArea,
                }
            }
            [area, ..] if !model.is_flex_mode && APP_AREAS.contains(area) => {
                if model.app_schema.is_empty() {
                    return Err(RouteError::Classification {
                        path: path.clone(),
                        hint: "no application schema is configured".into(),
                    });
                }
                Classification {
                    schema: model.app_schema.clone(),
                    rule: Rule::AppArea,
                }
            }
            _ => {
                let selected = ctx
                    .selected_schema
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| RouteError::NoSelectedSchema { path: path.clone() })?;
                Classification {
                    schema: selected.to_lowercase(),
                    rule: Rule::Selected,
                }
            }
        };

        trace!("{} -> {} ({:?})", path, found.schema, found.rule);
        Ok(found)
    }

    /// Schema folders under `db/`, prefix-stripped and lowercased,
    /// longest first
    pub fn schema_folders(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .fs
            .list_dirs(&self.root.join("db"))?
            .into_iter()
            .map(|n| n.to_lowercase())
            .filter(|n| !RESERVED_DB_FOLDERS.contains(&n.as_str()))
            .map(|n| strip_order_prefix(&n).to_string())
            .collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        names.dedup();
        Ok(names)
    }

    fn schema_from_hook(
        &self,
        path: &str,
        segments: &[&str],
        ctx: ClassifyContext<'_>,
    ) -> Result<String> {
        let file_name = ctx
            .current_file
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().to_lowercase())
            .or_else(|| segments.last().map(|s| s.to_string()))
            .unwrap_or_default();

        let folders = self.schema_folders()?;
        debug!("Looking for one of {:?} in hook file {}", folders, file_name);

        folders
            .into_iter()
            .find(|schema| file_name.contains(schema.as_str()))
            .ok_or_else(|| RouteError::Classification {
                path: path.to_string(),
                hint: "hook files must name their schema, use `*_schema_name_*.sql`".into(),
            })
    }
}

/// Forward slashes, lowercase, no leading `./` or `/`
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/").to_lowercase();
    let mut trimmed = path.as_str();
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            break;
        }
    }
    trimmed.to_string()
}

/// Express `file` relative to `root` in normalized form.
///
/// Relative paths are taken as already relative to the root. `.` and `..`
/// are resolved lexically first, so `db/x/../apex/a.sql` routes as
/// `apex/a.sql`.
#[must_use]
pub fn relative_path(root: &Path, file: &Path) -> String {
    let (root, file) = (resolve_dots(root), resolve_dots(file));
    let relative = file.strip_prefix(&root).unwrap_or(&file);
    let joined = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    normalize_path(&joined)
}

/// Drop `.` and fold `..` into the preceding component without touching the disk
fn resolve_dots(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(resolved.components().next_back(), Some(Component::Normal(_))) {
                    resolved.pop();
                } else if !resolved.has_root() {
                    resolved.push(component);
                }
            }
            other => resolved.push(other),
        }
    }
    resolved
}

/// Remove a single leading `<digits>_` ordering prefix
#[must_use]
pub fn strip_order_prefix(name: &str) -> &str {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return name;
    }
    match name[digits..].strip_prefix('_') {
        Some(rest) if !rest.is_empty() => rest,
        _ => name,
    }
}
