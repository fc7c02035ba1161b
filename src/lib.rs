// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Schemaroute library - path-to-connection routing for multi-schema
//! Oracle APEX/PL-SQL repositories
//!
//! For any file in a repository this crate decides which schema owns it and
//! which connection (plain or `user[schema]` proxy) must be used to work on
//! it. The topology comes from `xcl.yml`, from a `build.env`/`apply.env`
//! pair, or from the settings stored by a setup wizard, and is normalized
//! into one [`project::ProjectModel`].
//!
//! ```no_run
//! use schemaroute::prelude::*;
//!
//! let location = ProjectRoot::new("/work/sales");
//! let model = resolve_project(&LocalFs, &location, &TracingNotifier);
//! let classifier = PathClassifier::new(&LocalFs, &location.root);
//! let schema = classifier
//!     .classify_schema("db/sales_data/tables/orders.sql", &model, ClassifyContext::default())
//!     .unwrap();
//! println!("{}", build_identity(&schema, &model));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod commands;
pub mod config;
pub mod conn_type;
pub mod connection;
pub mod error;
pub mod fs;
pub mod notify;
pub mod pattern;
pub mod project;
pub mod scanner;
pub mod secrets;
pub mod source;
pub mod task_env;
pub mod triggers;

/// Prelude for common imports
pub mod prelude {
    pub use crate::classify::{ClassifyContext, PathClassifier};
    pub use crate::conn_type::{classify_connection, ConnectionType};
    pub use crate::connection::{build_connection, build_identity, ConnectionParts};
    pub use crate::error::RouteError;
    pub use crate::fs::{FileSystem, LocalFs};
    pub use crate::notify::{Notifier, TracingNotifier};
    pub use crate::project::{resolve_project, ProjectMode, ProjectModel, ProjectRoot};
    pub use crate::secrets::{SecretPrompt, SecretStore};
    pub use crate::source::SourceKind;
    pub use anyhow::{Context, Result};
}
