// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! `xcl.yml` manifest reader
//!
//! ```yaml
//! xcl:
//!   project: sales
//!   mode: multi
//!   workspace: SALES
//!   users:
//!     user_deployment: sales_depl
//!     schema_app: sales_app
//!     schema_logic: sales_logic
//!     schema_data: sales_data
//! ```
//!
//! Connection facts live in `.xcl/env.yml`, which is usually not committed:
//!
//! ```yaml
//! connection: localhost:1521/xepdb1
//! password: secret
//! admin_user: sys
//! ```

use super::{non_empty, RawTopology};
use crate::error::Result;
use crate::fs::FileSystem;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    xcl: XclSection,
}

#[derive(Debug, Default, Deserialize)]
struct XclSection {
    project: Option<String>,
    mode: Option<String>,
    workspace: Option<String>,
    #[serde(default)]
    flex: bool,
    #[serde(default)]
    users: Users,
}

#[derive(Debug, Default, Deserialize)]
struct Users {
    user_deployment: Option<String>,
    schema_app: Option<String>,
    schema_logic: Option<String>,
    schema_data: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EnvFile {
    connection: Option<String>,
    password: Option<String>,
    admin_user: Option<String>,
    admin_password: Option<String>,
}

/// Read the manifest and, when present, the secondary env file
pub fn read(fs: &dyn FileSystem, manifest: &Path, env: &Path) -> Result<RawTopology> {
    debug!("Reading {}", manifest.display());
    let content = fs.read_to_string(manifest)?;
    let manifest: Manifest = if content.trim().is_empty() {
        Manifest::default()
    } else {
        serde_yaml::from_str(&content)?
    };

    let env: EnvFile = if fs.exists(env) {
        debug!("Reading {}", env.display());
        let content = fs.read_to_string(env)?;
        if content.trim().is_empty() {
            EnvFile::default()
        } else {
            serde_yaml::from_str(&content)?
        }
    } else {
        warn!(
            "{} not found, connection settings will be incomplete",
            env.display()
        );
        EnvFile::default()
    };

    let XclSection {
        project,
        mode,
        workspace,
        flex,
        users,
    } = manifest.xcl;

    Ok(RawTopology {
        project_name: non_empty(project),
        project_mode: non_empty(mode),
        flex_mode: flex,
        app_schema: non_empty(users.schema_app),
        logic_schema: non_empty(users.schema_logic),
        data_schema: non_empty(users.schema_data),
        db_app_user: non_empty(users.user_deployment),
        db_app_pwd: non_empty(env.password),
        db_admin_user: non_empty(env.admin_user),
        db_admin_pwd: non_empty(env.admin_password),
        db_tns: non_empty(env.connection),
        workspace: non_empty(workspace),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFs;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = "\
xcl:
  project: sales
  mode: multi
  workspace: SALES
  users:
    user_deployment: sales_depl
    schema_app: sales_app
    schema_logic: sales_logic
    schema_data: sales_data
";

    #[test]
    fn test_read_manifest_and_env() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("xcl.yml");
        let env = dir.path().join(".xcl").join("env.yml");
        fs::create_dir_all(env.parent().unwrap()).unwrap();
        fs::write(&manifest, MANIFEST).unwrap();
        fs::write(&env, "connection: db:1521/pdb\npassword: pw\nadmin_user: sys\n").unwrap();

        let raw = read(&LocalFs, &manifest, &env).unwrap();
        assert_eq!(raw.project_name.as_deref(), Some("sales"));
        assert_eq!(raw.project_mode.as_deref(), Some("multi"));
        assert_eq!(raw.app_schema.as_deref(), Some("sales_app"));
        assert_eq!(raw.db_app_user.as_deref(), Some("sales_depl"));
        assert_eq!(raw.db_app_pwd.as_deref(), Some("pw"));
        assert_eq!(raw.db_admin_user.as_deref(), Some("sys"));
        assert_eq!(raw.db_tns.as_deref(), Some("db:1521/pdb"));
        assert_eq!(raw.workspace.as_deref(), Some("SALES"));
    }

    #[test]
    fn test_missing_env_file_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("xcl.yml");
        fs::write(&manifest, MANIFEST).unwrap();

        let raw = read(&LocalFs, &manifest, &dir.path().join(".xcl/env.yml")).unwrap();
        assert_eq!(raw.data_schema.as_deref(), Some("sales_data"));
        assert_eq!(raw.db_tns, None);
        assert_eq!(raw.db_app_pwd, None);
    }

    #[test]
    fn test_malformed_manifest_is_an_error() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("xcl.yml");
        fs::write(&manifest, "xcl: [unclosed").unwrap();

        assert!(read(&LocalFs, &manifest, &dir.path().join("env.yml")).is_err());
    }
}
