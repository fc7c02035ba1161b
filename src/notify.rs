// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! User-notification interface

use std::cell::RefCell;
use std::path::PathBuf;

/// Follow-up offered alongside a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyAction {
    /// Open the file that holds the project configuration
    OpenConfiguration(PathBuf),
}

/// Receives messages meant for the user
pub trait Notifier {
    /// Show an error, optionally with a follow-up action
    fn error(&self, message: &str, action: Option<NotifyAction>);

    /// Show an informational message
    fn info(&self, message: &str);
}

/// Writes notifications to the `tracing` log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str, action: Option<NotifyAction>) {
        match action {
            Some(NotifyAction::OpenConfiguration(path)) => {
                tracing::warn!("{} (open configuration: {})", message, path.display());
            }
            None => tracing::warn!("{}", message),
        }
    }

    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

/// Keeps every notification in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    errors: RefCell<Vec<(String, Option<NotifyAction>)>>,
    infos: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors received so far
    #[must_use]
    pub fn errors(&self) -> Vec<(String, Option<NotifyAction>)> {
        self.errors.borrow().clone()
    }

    /// Info messages received so far
    #[must_use]
    pub fn infos(&self) -> Vec<String> {
        self.infos.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str, action: Option<NotifyAction>) {
        self.errors.borrow_mut().push((message.to_string(), action));
    }

    fn info(&self, message: &str) {
        self.infos.borrow_mut().push(message.to_string());
    }
}
