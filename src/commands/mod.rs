// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod classify;
pub mod completions;
pub mod config;
pub mod connect;
pub mod env;
pub mod resolve;
pub mod scan;
pub mod triggers;
pub mod validate;

use crate::classify::{relative_path, Classification, ClassifyContext, PathClassifier, Rule};
use crate::config::Settings;
use crate::connection::{connection_parts, ConnectionParts};
use crate::error::RouteError;
use crate::fs::LocalFs;
use crate::notify::TracingNotifier;
use crate::project::{resolve_project, ProjectModel, ProjectRoot};
use crate::secrets::{SecretPrompt, SecretRequest, SecretStore};
use anyhow::{bail, Context as _, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use owo_colors::OwoColorize;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Shared state for every command
#[derive(Debug, Clone)]
pub struct Context {
    /// Workspace root
    pub root: PathBuf,
    /// Loaded settings
    pub settings: Settings,
    /// Print JSON instead of text
    pub json: bool,
    /// Use colors in text output
    pub color: bool,
}

impl Context {
    /// Build a context for `root`
    pub fn new(root: &Path, settings: Settings, json: bool, color: bool) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("Workspace root {} not found", root.display()))?;
        Ok(Self {
            root,
            settings,
            json,
            color,
        })
    }

    /// Where to look up configuration for `file`
    #[must_use]
    pub fn location(&self, file: Option<&Path>) -> ProjectRoot {
        let location =
            ProjectRoot::new(self.root.clone()).with_state_file(self.settings.state_file.clone());
        match file.and_then(|f| self.absolute(f).parent().map(Path::to_path_buf)) {
            Some(dir) => location.with_current(dir),
            None => location,
        }
    }

    /// Re-read the project configuration
    #[must_use]
    pub fn resolve(&self, file: Option<&Path>) -> ProjectModel {
        resolve_project(&LocalFs, &self.location(file), &TracingNotifier)
    }

    /// Classifier for this workspace
    #[must_use]
    pub fn classifier(&self) -> PathClassifier<'static> {
        PathClassifier::new(&LocalFs, self.root.clone())
    }

    /// Absolute form of a file argument; relative arguments are taken
    /// relative to the workspace root
    #[must_use]
    pub fn absolute(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.canonicalize().unwrap_or_else(|_| file.to_path_buf())
        } else {
            self.root.join(file)
        }
    }

    /// Workspace-relative, normalized form of a file argument
    #[must_use]
    pub fn relative(&self, file: &Path) -> String {
        relative_path(&self.root, &self.absolute(file))
    }

    pub(crate) fn good(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    pub(crate) fn bad(&self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }

    pub(crate) fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Prompts on stderr and reads answers from stdin.
///
/// `SCHEMAROUTE_APP_PWD`, `SCHEMAROUTE_ADMIN_USER` and
/// `SCHEMAROUTE_ADMIN_PWD` answer without prompting. Passwords typed at a
/// terminal are not echoed.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliPrompt;

impl SecretPrompt for CliPrompt {
    fn ask(&self, request: &SecretRequest) -> Option<String> {
        let var = match request {
            SecretRequest::AppPassword { .. } => "SCHEMAROUTE_APP_PWD",
            SecretRequest::AdminUser => "SCHEMAROUTE_ADMIN_USER",
            SecretRequest::AdminPassword { .. } => "SCHEMAROUTE_ADMIN_PWD",
        };
        if let Ok(value) = std::env::var(var) {
            return Some(value);
        }

        eprint!("{request}: ");
        io::stderr().flush().ok()?;
        if request.is_hidden() && io::stdin().is_terminal() {
            return read_hidden().unwrap_or_else(|e| {
                warn!("Cannot read from the terminal: {e}");
                None
            });
        }

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
        }
    }
}

/// Leaves raw mode when dropped
struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Read one line from the terminal without echo; `Ok(None)` on Esc or Ctrl-C
fn read_hidden() -> io::Result<Option<String>> {
    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard;

    let mut answer = String::new();
    let result = loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => break Some(answer),
            KeyCode::Esc => break None,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break None,
            KeyCode::Backspace => {
                answer.pop();
            }
            KeyCode::Char(c) => answer.push(c),
            _ => {}
        }
    };

    eprintln!();
    Ok(result)
}

/// Stop mutating commands on an invalid configuration
pub(crate) fn require_valid(model: &ProjectModel) -> Result<()> {
    if model.is_valid {
        return Ok(());
    }
    let reasons = model
        .issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    bail!("Project configuration is incomplete: {reasons}. Run 'schemaroute validate' for details")
}

/// Classify `rel`, asking for the admin user when a setup file needs one
/// that the configuration does not name
pub(crate) fn classify_file(
    classifier: &PathClassifier<'_>,
    model: &mut ProjectModel,
    secrets: &mut SecretStore,
    rel: &str,
    absolute: &Path,
    selected: Option<&str>,
) -> Result<Classification> {
    let mut ctx = ClassifyContext::default().with_file(absolute);
    if let Some(schema) = selected {
        ctx = ctx.with_selected(schema);
    }

    match classifier.classify(rel, model, ctx) {
        Err(RouteError::NoAdminUser { .. }) => {
            let (user, _) = secrets
                .ensure_admin(model, &CliPrompt)
                .context("An admin user is required for setup files")?;
            model.db_admin_user = Some(user.to_string());
            Ok(classifier.classify(rel, model, ctx)?)
        }
        other => Ok(other?),
    }
}

/// Obtain the secrets for `found` and build its connection
pub(crate) fn connect_classified(
    model: &ProjectModel,
    secrets: &mut SecretStore,
    found: &Classification,
) -> Result<ConnectionParts> {
    if found.rule == Rule::Setup {
        secrets
            .ensure_admin(model, &CliPrompt)
            .context("No admin password given")?;
    } else {
        secrets
            .ensure_app_pwd(model, &CliPrompt)
            .context("No password given")?;
    }
    Ok(connection_parts(&found.schema, model, secrets)?)
}
