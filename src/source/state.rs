// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Setup wizard key/value store reader

use super::{non_empty, RawTopology};
use crate::error::Result;
use crate::fs::FileSystem;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::Path;
use tracing::debug;

/// Key/value pairs previously written by a setup wizard
pub trait KeyValueStore {
    /// Look up a stored value
    fn get(&self, key: &str) -> Option<String>;
}

impl KeyValueStore for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl KeyValueStore for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

/// Store persisted as a flat JSON object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonStateStore {
    values: BTreeMap<String, String>,
}

impl JsonStateStore {
    /// Load the store; a missing file is an empty store
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = match fs.read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No stored settings at {}", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&content)?;
        let values = raw
            .into_iter()
            .filter_map(|(k, v)| match v {
                serde_json::Value::String(s) => Some((k, s)),
                serde_json::Value::Bool(b) => Some((k, b.to_string())),
                serde_json::Value::Number(n) => Some((k, n.to_string())),
                _ => None,
            })
            .collect();

        Ok(Self { values })
    }
}

impl KeyValueStore for JsonStateStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Read the wizard's keys into a raw topology record
pub fn read(store: &dyn KeyValueStore) -> RawTopology {
    let get = |key: &str| non_empty(store.get(key));

    RawTopology {
        project_name: get("projectName"),
        project_mode: get("projectMode"),
        flex_mode: get("flexMode").is_some_and(|v| v == "true"),
        app_schema: get("appSchema"),
        logic_schema: get("logicSchema"),
        data_schema: get("dataSchema"),
        db_app_user: get("dbAppUser"),
        db_app_pwd: get("dbAppPwd"),
        db_admin_user: get("dbAdminUser"),
        db_admin_pwd: None,
        db_tns: get("dbTns"),
        workspace: get("workspace"),
    }
}
