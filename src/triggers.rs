// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Custom trigger runs
//!
//! A trigger rule says "after compiling a file matching `pattern`, also run
//! `run_file`". Each run file is routed like any other file and the results
//! are grouped into DATA, LOGIC and APP sessions so the shell layer can open
//! one session per bucket.

use crate::classify::{normalize_path, ClassifyContext, PathClassifier};
use crate::conn_type::{classify_connection, ConnectionType};
use crate::connection::{connection_parts, ConnectionParts};
use crate::error::{Result, RouteError};
use crate::project::ProjectModel;
use crate::secrets::SecretStore;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One configured trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRule {
    /// Glob over workspace-relative paths, e.g. `db/*/tables/*.sql`
    pub pattern: String,
    /// Script to run, relative to the workspace root
    pub run_file: String,
    /// Arguments passed to the script
    #[serde(default)]
    pub parameters: Vec<String>,
}

/// A trigger that fired for a compiled file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRun {
    /// Script to run, normalized
    pub run_file: String,
    /// Arguments passed to the script
    pub parameters: Vec<String>,
    /// Schema the script belongs to
    pub schema: String,
    /// Resolved connection
    pub connection: ConnectionParts,
    /// Session bucket
    pub kind: ConnectionType,
}

impl TriggerRun {
    /// Run file followed by its parameters
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.run_file.as_str())
            .chain(self.parameters.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Fired triggers grouped by session bucket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerBuckets {
    /// Runs in the data schema
    pub data: Vec<TriggerRun>,
    /// Runs in the logic schema
    pub logic: Vec<TriggerRun>,
    /// Everything else
    pub app: Vec<TriggerRun>,
}

impl TriggerBuckets {
    /// Runs of one bucket
    #[must_use]
    pub fn bucket(&self, kind: ConnectionType) -> &[TriggerRun] {
        match kind {
            ConnectionType::Data => &self.data,
            ConnectionType::Logic => &self.logic,
            ConnectionType::App => &self.app,
        }
    }

    /// Whether no trigger fired
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.logic.is_empty() && self.app.is_empty()
    }

    fn push(&mut self, run: TriggerRun) {
        match run.kind {
            ConnectionType::Data => self.data.push(run),
            ConnectionType::Logic => self.logic.push(run),
            ConnectionType::App => self.app.push(run),
        }
    }
}

/// Compiled trigger rules
#[derive(Debug, Clone)]
pub struct TriggerSet {
    rules: Vec<TriggerRule>,
    globs: GlobSet,
}

impl TriggerSet {
    /// Compile all rule patterns
    pub fn compile(rules: Vec<TriggerRule>) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for rule in &rules {
            let glob = GlobBuilder::new(&normalize_path(&rule.pattern))
                .literal_separator(true)
                .build()
                .map_err(|e| RouteError::InvalidPattern {
                    pattern: rule.pattern.clone(),
                    reason: e.to_string(),
                })?;
            builder.add(glob);
        }
        let globs = builder.build().map_err(|e| RouteError::InvalidPattern {
            pattern: "<trigger set>".into(),
            reason: e.to_string(),
        })?;
        Ok(Self { rules, globs })
    }

    /// Number of rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules whose pattern matches `path`, in configuration order
    #[must_use]
    pub fn matching(&self, path: &str) -> Vec<&TriggerRule> {
        let path = normalize_path(path);
        let mut hits = self.globs.matches(&path);
        hits.sort_unstable();
        hits.into_iter().map(|idx| &self.rules[idx]).collect()
    }

    /// Route every trigger fired by compiling `compiled` (workspace-relative)
    /// in `compiled_schema`.
    ///
    /// Run files that do not follow the folder layout inherit
    /// `compiled_schema`.
    pub fn plan(
        &self,
        compiled: &str,
        compiled_schema: &str,
        classifier: &PathClassifier<'_>,
        model: &ProjectModel,
        secrets: &SecretStore,
    ) -> Result<TriggerBuckets> {
        let mut buckets = TriggerBuckets::default();
        let matched = self.matching(compiled);
        if matched.is_empty() {
            return Ok(buckets);
        }

        for rule in matched {
            let run_file = normalize_path(&rule.run_file);
            let absolute = classifier.root().join(&run_file);
            let ctx = ClassifyContext::default()
                .with_file(&absolute)
                .with_selected(compiled_schema);

            let schema = classifier.classify_schema(&run_file, model, ctx)?;
            let connection = connection_parts(&schema, model, secrets)?;
            let kind = classify_connection(&connection.to_string(), model);
            debug!("Trigger {} fired {} in {} ({})", rule.pattern, run_file, schema, kind);

            buckets.push(TriggerRun {
                run_file,
                parameters: rule.parameters.clone(),
                schema,
                connection,
                kind,
            });
        }

        Ok(buckets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFs;
    use crate::source::{RawTopology, SourceKind};
    use tempfile::TempDir;

    fn model() -> ProjectModel {
        ProjectModel::from_raw(
            RawTopology {
                project_mode: Some("MULTI".into()),
                app_schema: Some("app".into()),
                logic_schema: Some("logic".into()),
                data_schema: Some("data".into()),
                db_app_user: Some("depl".into()),
                db_tns: Some("xe".into()),
                ..Default::default()
            },
            SourceKind::EnvFiles,
        )
    }

    fn secrets() -> SecretStore {
        let mut s = SecretStore::new();
        s.set_app_pwd("pw");
        s
    }

    fn rule(pattern: &str, run_file: &str) -> TriggerRule {
        TriggerRule {
            pattern: pattern.into(),
            run_file: run_file.into(),
            parameters: vec![],
        }
    }

    #[test]
    fn test_matching_respects_segments() {
        let set = TriggerSet::compile(vec![
            rule("db/*/tables/*.sql", "a.sql"),
            rule("db/**/*.pks", "b.sql"),
        ])
        .unwrap();

        assert_eq!(set.matching("db/data/tables/t.sql").len(), 1);
        assert!(set.matching("db/data/tables/sub/t.sql").is_empty());
        assert_eq!(set.matching("DB/Logic/Sources/Packages/p.pks")[0].run_file, "b.sql");
    }

    #[test]
    fn test_invalid_pattern() {
        let err = TriggerSet::compile(vec![rule("db/[unclosed", "a.sql")]).unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));
    }

    #[test]
    fn test_plan_buckets_by_schema() {
        let dir = TempDir::new().unwrap();
        let classifier = PathClassifier::new(&LocalFs, dir.path());
        let set = TriggerSet::compile(vec![
            rule("db/data/tables/*.sql", "db/data/views/refresh.sql"),
            rule("db/data/tables/*.sql", "db/logic/sources/packages/recompile.sql"),
            rule("db/data/tables/*.sql", "apex/f100/sync.sql"),
            rule("db/data/tables/*.sql", "scripts/stats.sql"),
            rule("db/logic/**", "never.sql"),
        ])
        .unwrap();

        let buckets = set
            .plan("db/data/tables/orders.sql", "data", &classifier, &model(), &secrets())
            .unwrap();

        let data: Vec<_> = buckets.data.iter().map(|r| r.run_file.as_str()).collect();
        assert_eq!(data, vec!["db/data/views/refresh.sql", "scripts/stats.sql"]);
        assert_eq!(buckets.logic.len(), 1);
        assert_eq!(buckets.logic[0].connection.identity, "depl[logic]");
        assert_eq!(buckets.app.len(), 1);
        assert_eq!(buckets.app[0].schema, "app");
    }

    #[test]
    fn test_plan_without_match_is_empty() {
        let dir = TempDir::new().unwrap();
        let classifier = PathClassifier::new(&LocalFs, dir.path());
        let set = TriggerSet::compile(vec![rule("db/data/tables/*.sql", "x.sql")]).unwrap();

        let buckets = set
            .plan("reports/readme.md", "app", &classifier, &model(), &secrets())
            .unwrap();
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_command_line() {
        let run = TriggerRun {
            run_file: "a.sql".into(),
            parameters: vec!["x".into(), "y".into()],
            schema: "data".into(),
            connection: ConnectionParts {
                identity: "depl[data]".into(),
                password: "pw".into(),
                tns: "xe".into(),
                is_admin: false,
            },
            kind: ConnectionType::Data,
        };
        assert_eq!(run.command_line(), "a.sql x y");
    }

    #[test]
    fn test_plan_loose_file_uses_given_schema() {
        let dir = TempDir::new().unwrap();
        let classifier = PathClassifier::new(&LocalFs, dir.path());
        let set = TriggerSet::compile(vec![rule("scripts/*.sql", "scripts/after.sql")]).unwrap();

        let buckets = set
            .plan("scripts/stats.sql", "logic", &classifier, &model(), &secrets())
            .unwrap();
        assert_eq!(buckets.logic.len(), 1);
        assert_eq!(buckets.logic[0].schema, "logic");
        assert_eq!(buckets.logic[0].connection.identity, "depl[logic]");
    }
}
