// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Bucketing of built connections into DATA, LOGIC and APP sessions

use crate::pattern;
use crate::project::ProjectModel;
use serde::Serialize;
use std::fmt;

/// Session bucket of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConnectionType {
    /// Proxy into the data schema
    Data,
    /// Proxy into the logic schema
    Logic,
    /// Everything else
    App,
}

impl ConnectionType {
    /// Uppercase label, as used in environment variable names
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "DATA",
            Self::Logic => "LOGIC",
            Self::App => "APP",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an identity or full connection string built by
/// [`crate::connection`].
#[must_use]
pub fn classify_connection(connection: &str, model: &ProjectModel) -> ConnectionType {
    let proxy = |schema: &str| format!("{}[{}]**", model.db_app_user, schema);

    if !model.data_schema.is_empty() && pattern::matches(&proxy(&model.data_schema), connection) {
        ConnectionType::Data
    } else if !model.logic_schema.is_empty()
        && pattern::matches(&proxy(&model.logic_schema), connection)
    {
        ConnectionType::Logic
    } else {
        ConnectionType::App
    }
}
