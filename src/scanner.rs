// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Repository scanning
//!
//! Walks a workspace and routes every file, so the whole schema layout can
//! be reviewed at once. `.gitignore` rules are honoured even outside a git
//! checkout.

use crate::classify::{relative_path, ClassifyContext, PathClassifier};
use crate::project::ProjectModel;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Directories that hold tooling state rather than sources
const SKIPPED_DIRS: &[&str] = &[".git", ".xcl", ".schemaroute", "node_modules"];

/// Scan configuration
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Maximum depth (0 = unlimited)
    pub max_depth: usize,
    /// Follow symbolic links
    pub follow_symlinks: bool,
    /// Schema for files outside the folder layout
    pub selected_schema: Option<String>,
}

/// Result of routing one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// Owning schema
    Schema(String),
    /// Why no schema could be determined
    Failed(String),
}

/// One scanned file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanEntry {
    /// Workspace-relative, normalized path
    pub path: String,
    /// Routing outcome
    pub outcome: ScanOutcome,
}

/// Route every file below the classifier's root, sorted by path
pub fn scan_repository(
    classifier: &PathClassifier<'_>,
    model: &ProjectModel,
    config: &ScanConfig,
) -> Result<Vec<ScanEntry>> {
    let root = classifier.root();
    let mut walker = WalkBuilder::new(root);
    walker
        .hidden(false)
        .require_git(false)
        .follow_links(config.follow_symlinks)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !SKIPPED_DIRS.contains(&name.as_ref())
        });
    if config.max_depth > 0 {
        walker.max_depth(Some(config.max_depth));
    }

    let mut entries = Vec::new();
    for entry in walker.build() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = relative_path(root, entry.path());
        if is_project_config(&path) {
            continue;
        }

        let mut ctx = ClassifyContext::default().with_file(entry.path());
        if let Some(schema) = config.selected_schema.as_deref() {
            ctx = ctx.with_selected(schema);
        }

        let outcome = match classifier.classify_schema(&path, model, ctx) {
            Ok(schema) => ScanOutcome::Schema(schema),
            Err(e) => ScanOutcome::Failed(e.to_string()),
        };
        entries.push(ScanEntry { path, outcome });
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("Scanned {} files under {}", entries.len(), root.display());
    Ok(entries)
}

/// Files count per schema; failures are counted under `None`
#[must_use]
pub fn summarize(entries: &[ScanEntry]) -> BTreeMap<Option<String>, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        let key = match &entry.outcome {
            ScanOutcome::Schema(s) => Some(s.clone()),
            ScanOutcome::Failed(_) => None,
        };
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

fn is_project_config(path: &str) -> bool {
    matches!(
        path,
        "xcl.yml" | "build.env" | "apply.env" | ".gitignore" | ".schemaroute.toml"
    )
}

/// Whether `path` looks like a workspace root with a known layout
#[must_use]
pub fn has_layout(root: &Path) -> bool {
    ["db", "apex", "rest", "static"]
        .iter()
        .any(|d| root.join(d).is_dir())
}
