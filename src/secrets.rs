// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Session cache of entered credentials
//!
//! The store is owned by whoever runs tasks and is passed to the connection
//! builder explicitly. Nothing here touches the disk.

use crate::project::ProjectModel;
use std::fmt;

/// What the user is being asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretRequest {
    /// Password of the connecting user
    AppPassword {
        /// User the password belongs to
        user: String,
    },
    /// Name of the administrative user
    AdminUser,
    /// Password of the administrative user
    AdminPassword {
        /// User the password belongs to
        user: String,
    },
}

impl SecretRequest {
    /// Whether the answer should be hidden while typing
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        !matches!(self, Self::AdminUser)
    }
}

impl fmt::Display for SecretRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AppPassword { user } => write!(f, "Password for {user}"),
            Self::AdminUser => f.write_str("Admin user"),
            Self::AdminPassword { user } => write!(f, "Password for admin {user}"),
        }
    }
}

/// Asks the user for a value; `None` means the prompt was cancelled
pub trait SecretPrompt {
    /// Ask for one value
    fn ask(&self, request: &SecretRequest) -> Option<String>;
}

impl<F> SecretPrompt for F
where
    F: Fn(&SecretRequest) -> Option<String>,
{
    fn ask(&self, request: &SecretRequest) -> Option<String> {
        self(request)
    }
}

/// Credentials entered during this session, keyed by role
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretStore {
    app_pwd: Option<String>,
    admin_pwd: Option<String>,
    admin_user: Option<String>,
}

impl fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("SecretStore")
            .field("app_pwd", &mask(&self.app_pwd))
            .field("admin_pwd", &mask(&self.admin_pwd))
            .field("admin_user", &self.admin_user)
            .finish()
    }
}

impl SecretStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached application password
    #[must_use]
    pub fn app_pwd(&self) -> Option<&str> {
        self.app_pwd.as_deref()
    }

    /// Cached admin password
    #[must_use]
    pub fn admin_pwd(&self) -> Option<&str> {
        self.admin_pwd.as_deref()
    }

    /// Cached admin user
    #[must_use]
    pub fn admin_user(&self) -> Option<&str> {
        self.admin_user.as_deref()
    }

    /// Replace the application password
    pub fn set_app_pwd(&mut self, pwd: impl Into<String>) {
        self.app_pwd = Some(pwd.into());
    }

    /// Replace the admin password
    pub fn set_admin_pwd(&mut self, pwd: impl Into<String>) {
        self.admin_pwd = Some(pwd.into());
    }

    /// Replace the admin user
    pub fn set_admin_user(&mut self, user: impl Into<String>) {
        self.admin_user = Some(user.into());
    }

    /// Forget everything, as after a "reset password" action
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Application password, taken from the cache, then the configuration,
    /// then the prompt. The result is cached.
    pub fn ensure_app_pwd(
        &mut self,
        model: &ProjectModel,
        prompt: &dyn SecretPrompt,
    ) -> Option<&str> {
        if self.app_pwd.is_none() {
            self.app_pwd = model
                .db_app_pwd
                .clone()
                .filter(|p| !p.is_empty())
                .or_else(|| {
                    prompt
                        .ask(&SecretRequest::AppPassword {
                            user: model.db_app_user.clone(),
                        })
                        .filter(|p| !p.is_empty())
                });
        }
        self.app_pwd.as_deref()
    }

    /// Admin user and password, resolved the same way
    pub fn ensure_admin(
        &mut self,
        model: &ProjectModel,
        prompt: &dyn SecretPrompt,
    ) -> Option<(&str, &str)> {
        if self.admin_user.is_none() {
            self.admin_user = model
                .db_admin_user
                .clone()
                .filter(|u| !u.is_empty())
                .or_else(|| prompt.ask(&SecretRequest::AdminUser).filter(|u| !u.is_empty()));
        }
        let user = self.admin_user.clone()?;

        if self.admin_pwd.is_none() {
            self.admin_pwd = model
                .db_admin_pwd
                .clone()
                .filter(|p| !p.is_empty())
                .or_else(|| {
                    prompt
                        .ask(&SecretRequest::AdminPassword { user })
                        .filter(|p| !p.is_empty())
                });
        }

        match (&self.admin_user, &self.admin_pwd) {
            (Some(user), Some(pwd)) => Some((user.as_str(), pwd.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RawTopology, SourceKind};
    use std::cell::Cell;

    fn model(app_pwd: Option<&str>) -> ProjectModel {
        ProjectModel::from_raw(
            RawTopology {
                db_app_user: Some("depl".into()),
                db_app_pwd: app_pwd.map(String::from),
                db_tns: Some("xe".into()),
                ..Default::default()
            },
            SourceKind::EnvFiles,
        )
    }

    #[test]
    fn test_config_password_wins_over_prompt() {
        let mut store = SecretStore::new();
        let prompt = |_: &SecretRequest| -> Option<String> { panic!("should not prompt") };
        assert_eq!(store.ensure_app_pwd(&model(Some("pw")), &prompt), Some("pw"));
    }

    #[test]
    fn test_prompt_once_then_reuse() {
        let asked = Cell::new(0);
        let prompt = |req: &SecretRequest| {
            asked.set(asked.get() + 1);
            assert_eq!(req, &SecretRequest::AppPassword { user: "depl".into() });
            Some("typed".to_string())
        };
        let mut store = SecretStore::new();

        assert_eq!(store.ensure_app_pwd(&model(None), &prompt), Some("typed"));
        assert_eq!(store.ensure_app_pwd(&model(None), &prompt), Some("typed"));
        assert_eq!(asked.get(), 1);
    }

    #[test]
    fn test_cancel_leaves_store_empty() {
        let mut store = SecretStore::new();
        let prompt = |_: &SecretRequest| -> Option<String> { None };
        assert_eq!(store.ensure_app_pwd(&model(None), &prompt), None);
        assert_eq!(store.app_pwd(), None);
    }

    #[test]
    fn test_admin_prompts_for_user_and_password() {
        let mut store = SecretStore::new();
        let prompt = |req: &SecretRequest| match req {
            SecretRequest::AdminUser => Some("sys".to_string()),
            SecretRequest::AdminPassword { user } => Some(format!("{user}-pw")),
            SecretRequest::AppPassword { .. } => None,
        };
        assert_eq!(store.ensure_admin(&model(None), &prompt), Some(("sys", "sys-pw")));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = SecretStore::new();
        store.set_app_pwd("a");
        store.set_admin_user("sys");
        store.set_admin_pwd("b");
        store.reset();
        assert_eq!(store, SecretStore::default());
    }

    #[test]
    fn test_only_passwords_are_hidden() {
        assert!(SecretRequest::AppPassword { user: "depl".into() }.is_hidden());
        assert!(SecretRequest::AdminPassword { user: "sys".into() }.is_hidden());
        assert!(!SecretRequest::AdminUser.is_hidden());
    }

    #[test]
    fn test_debug_masks_passwords() {
        let mut store = SecretStore::new();
        store.set_app_pwd("hunter2");
        assert!(!format!("{store:?}").contains("hunter2"));
    }
}
