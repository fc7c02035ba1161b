// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Environment handed to the shell layer that runs a task

use crate::conn_type::ConnectionType;
use crate::connection::{ensure_expanded, ConnectionParts};
use crate::error::Result;
use crate::project::ProjectModel;
use crate::triggers::TriggerBuckets;
use std::collections::BTreeMap;

/// Prefix of every variable
pub const PREFIX: &str = "SCHEMAROUTE_";

/// Variables for one task run, in name order
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TaskEnv {
    vars: BTreeMap<String, String>,
}

impl std::fmt::Debug for TaskEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.masked().iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .finish()
    }
}

impl TaskEnv {
    /// Variables for compiling `file` (workspace-relative) as `schema`
    pub fn for_file(
        model: &ProjectModel,
        file: &str,
        schema: &str,
        connection: &ConnectionParts,
    ) -> Result<Self> {
        let mut env = Self::default();
        env.set("DBTNS", &connection.tns)?;
        env.set("DBUSER", &connection.identity)?;
        env.set("DBPASS", &connection.password)?;
        env.set("FILE", file)?;
        env.set("SCHEMA", schema)?;
        if let Some(mode) = model.project_mode {
            env.set("PROJECT_MODE", mode.as_str())?;
        }
        if let Some(project) = &model.project_name {
            env.set("PROJECT", project)?;
        }
        if let Some(workspace) = &model.workspace {
            env.set("WSPACE", workspace)?;
        }
        Ok(env)
    }

    /// Add the connection and file list of every non-empty trigger bucket
    pub fn with_triggers(mut self, buckets: &TriggerBuckets) -> Result<Self> {
        for kind in [ConnectionType::Data, ConnectionType::Logic, ConnectionType::App] {
            let runs = buckets.bucket(kind);
            let Some(first) = runs.first() else {
                continue;
            };
            self.set(&format!("CONN_{kind}"), &first.connection.to_string())?;
            let files = runs
                .iter()
                .map(|r| r.command_line())
                .collect::<Vec<_>>()
                .join(",");
            self.set(&format!("FILES_{kind}"), &files)?;
        }
        Ok(self)
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let key = format!("{PREFIX}{name}");
        ensure_expanded(&key, value)?;
        self.vars.insert(key, value.to_string());
        Ok(())
    }

    /// Look up a variable by its full name
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// All variables
    #[must_use]
    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// All variables with passwords replaced by `***`
    #[must_use]
    pub fn masked(&self) -> BTreeMap<String, String> {
        self.vars
            .iter()
            .map(|(k, v)| {
                let value = if k.ends_with("DBPASS") {
                    "***".to_string()
                } else if k.contains("_CONN_") {
                    mask_connection(v)
                } else {
                    v.clone()
                };
                (k.clone(), value)
            })
            .collect()
    }
}

/// Replace the password of a `user/password@tns` string
fn mask_connection(conn: &str) -> String {
    match (conn.find('/'), conn.rfind('@')) {
        (Some(slash), Some(at)) if slash < at => {
            format!("{}/***{}", &conn[..slash], &conn[at..])
        }
        _ => conn.to_string(),
    }
}
