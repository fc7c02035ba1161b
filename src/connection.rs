// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Connection identity and connection string building

use crate::error::{Result, RouteError};
use crate::project::ProjectModel;
use crate::secrets::SecretStore;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// First shell-style `${...}` placeholder in `value`
#[must_use]
pub fn find_placeholder(value: &str) -> Option<&str> {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER
        .get_or_init(|| Regex::new(r"\$\{[^}]*\}").expect("placeholder regex is valid"))
        .find(value)
        .map(|m| m.as_str())
}

/// Fail if `value` still carries a placeholder
pub fn ensure_expanded(field: &str, value: &str) -> Result<()> {
    match find_placeholder(value) {
        Some(token) => Err(RouteError::UnsupportedSourcing {
            field: field.to_string(),
            token: token.to_string(),
        }),
        None => Ok(()),
    }
}

fn is_admin(schema: &str, model: &ProjectModel) -> bool {
    model
        .db_admin_user
        .as_deref()
        .is_some_and(|admin| !admin.is_empty() && admin.eq_ignore_ascii_case(schema))
}

/// User identity to connect as for `schema`.
///
/// The admin user is never proxied. The connecting user itself, and every
/// schema of a single-schema project, connect directly. Anything else goes
/// through `db_app_user[schema]`.
#[must_use]
pub fn build_identity(schema: &str, model: &ProjectModel) -> String {
    if is_admin(schema, model) {
        return model.db_admin_user.clone().unwrap_or_default();
    }
    if schema.eq_ignore_ascii_case(&model.db_app_user) || !model.requires_proxy() {
        return model.db_app_user.clone();
    }
    format!("{}[{}]", model.db_app_user, schema)
}

/// The pieces of a `user/password@tns` connection
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParts {
    /// Plain or proxy identity
    pub identity: String,
    /// Password of the identity
    pub password: String,
    /// Connection descriptor
    pub tns: String,
    /// Whether this is the admin identity
    pub is_admin: bool,
}

impl ConnectionParts {
    /// `user/***@tns`, for display
    #[must_use]
    pub fn masked(&self) -> String {
        format!("{}/***@{}", self.identity, self.tns)
    }
}

impl fmt::Display for ConnectionParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.identity, self.password, self.tns)
    }
}

impl fmt::Debug for ConnectionParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParts")
            .field("identity", &self.identity)
            .field("password", &"***")
            .field("tns", &self.tns)
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

/// Resolve identity, password and TNS for `schema`
pub fn connection_parts(
    schema: &str,
    model: &ProjectModel,
    secrets: &SecretStore,
) -> Result<ConnectionParts> {
    let is_admin = is_admin(schema, model);
    let identity = build_identity(schema, model);
    ensure_expanded("user", &identity)?;

    let password = if is_admin {
        secrets.admin_pwd()
    } else {
        secrets.app_pwd()
    }
    .ok_or_else(|| RouteError::MissingSecret {
        identity: identity.clone(),
    })?;
    ensure_expanded("password", password)?;
    ensure_expanded("tns", &model.db_tns)?;

    Ok(ConnectionParts {
        password: password.to_string(),
        tns: model.db_tns.clone(),
        identity,
        is_admin,
    })
}

/// Full `user/password@tns` string for `schema`
pub fn build_connection(
    schema: &str,
    model: &ProjectModel,
    secrets: &SecretStore,
) -> Result<String> {
    connection_parts(schema, model, secrets).map(|parts| parts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RawTopology, SourceKind};

    fn multi() -> ProjectModel {
        ProjectModel::from_raw(
            RawTopology {
                project_mode: Some("MULTI".into()),
                app_schema: Some("app".into()),
                logic_schema: Some("logic".into()),
                data_schema: Some("data".into()),
                db_app_user: Some("depl".into()),
                db_admin_user: Some("SYS".into()),
                db_tns: Some("localhost:1521/xepdb1".into()),
                ..Default::default()
            },
            SourceKind::EnvFiles,
        )
    }

    fn single() -> ProjectModel {
        ProjectModel::from_raw(
            RawTopology {
                project_mode: Some("SINGLE".into()),
                app_schema: Some("hr".into()),
                db_app_user: Some("hr".into()),
                db_tns: Some("xe".into()),
                ..Default::default()
            },
            SourceKind::IdeState,
        )
    }

    fn secrets() -> SecretStore {
        let mut s = SecretStore::new();
        s.set_app_pwd("app_pw");
        s.set_admin_pwd("admin_pw");
        s
    }

    #[test]
    fn test_proxy_identity_for_other_schemas() {
        let model = multi();
        assert_eq!(build_identity("data", &model), "depl[data]");
        assert_eq!(build_identity("logic", &model), "depl[logic]");
    }

    #[test]
    fn test_app_user_is_not_bracketed() {
        assert_eq!(build_identity("DEPL", &multi()), "depl");
    }

    #[test]
    fn test_admin_identity_is_not_proxied() {
        assert_eq!(build_identity("sys", &multi()), "SYS");
    }

    #[test]
    fn test_single_schema_never_proxies() {
        let mut model = single();
        assert_eq!(build_identity("hr", &model), "hr");
        model.db_app_user = "hr_deployer".into();
        assert_eq!(build_identity("hr", &model), "hr_deployer");
    }

    #[test]
    fn test_connection_uses_role_password() {
        let model = multi();
        assert_eq!(
            build_connection("data", &model, &secrets()).unwrap(),
            "depl[data]/app_pw@localhost:1521/xepdb1"
        );
        assert_eq!(
            build_connection("sys", &model, &secrets()).unwrap(),
            "SYS/admin_pw@localhost:1521/xepdb1"
        );
    }

    #[test]
    fn test_placeholder_password_is_rejected() {
        let mut store = SecretStore::new();
        store.set_app_pwd("${DB_PWD}");

        let err = build_connection("data", &multi(), &store).unwrap_err();
        match err {
            RouteError::UnsupportedSourcing { field, token } => {
                assert_eq!(field, "password");
                assert_eq!(token, "${DB_PWD}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_placeholder_user_is_rejected() {
        let mut model = multi();
        model.db_app_user = "${APP_USER}".into();
        let err = build_connection("data", &model, &secrets()).unwrap_err();
        assert!(matches!(err, RouteError::UnsupportedSourcing { ref field, .. } if field == "user"));
    }

    #[test]
    fn test_missing_password() {
        let err = build_connection("data", &multi(), &SecretStore::new()).unwrap_err();
        assert!(matches!(err, RouteError::MissingSecret { .. }));
    }

    #[test]
    fn test_parts_hide_password() {
        let parts = connection_parts("data", &multi(), &secrets()).unwrap();
        assert_eq!(parts.masked(), "depl[data]/***@localhost:1521/xepdb1");
        assert!(!format!("{parts:?}").contains("app_pw"));
    }

    #[test]
    fn test_find_placeholder() {
        assert_eq!(find_placeholder("a${B}c"), Some("${B}"));
        assert_eq!(find_placeholder("$B"), None);
        assert_eq!(find_placeholder("plain"), None);
    }
}
