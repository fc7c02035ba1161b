// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Env command - prints the task environment for compiling a file

use super::{classify_file, connect_classified, require_valid, CliPrompt, Context};
use crate::secrets::SecretStore;
use crate::task_env::TaskEnv;
use crate::triggers::TriggerSet;
use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Run the env command
pub fn run(
    ctx: &Context,
    file: PathBuf,
    selected: Option<String>,
    show_secrets: bool,
) -> Result<()> {
    let mut model = ctx.resolve(Some(file.as_path()));
    if let Err(e) = require_valid(&model) {
        warn!("{e}");
        return Err(e);
    }

    let rel = ctx.relative(&file);
    let absolute = ctx.absolute(&file);
    let classifier = ctx.classifier();
    let mut secrets = SecretStore::new();

    let found = classify_file(
        &classifier,
        &mut model,
        &mut secrets,
        &rel,
        &absolute,
        selected.as_deref(),
    )?;
    let parts = connect_classified(&model, &mut secrets, &found)?;
    let mut env = TaskEnv::for_file(&model, &rel, &found.schema, &parts)?;

    let triggers = TriggerSet::compile(ctx.settings.triggers.clone())
        .context("Invalid trigger configuration")?;
    if !triggers.is_empty() {
        // setup files leave the application password unasked
        secrets
            .ensure_app_pwd(&model, &CliPrompt)
            .context("No password given")?;
        let buckets = triggers.plan(&rel, &found.schema, &classifier, &model, &secrets)?;
        debug!("{} trigger rule(s), fired: {}", triggers.len(), !buckets.is_empty());
        env = env.with_triggers(&buckets)?;
    }

    let vars = if show_secrets {
        env.vars().clone()
    } else {
        env.masked()
    };

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&vars)?);
    } else {
        for (key, value) in &vars {
            println!("{key}={value}");
        }
    }
    Ok(())
}
