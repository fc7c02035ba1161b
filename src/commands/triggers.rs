// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Triggers command - shows which scripts compiling a file would run

use super::{classify_file, require_valid, CliPrompt, Context};
use crate::conn_type::ConnectionType;
use crate::secrets::SecretStore;
use crate::triggers::TriggerSet;
use anyhow::{Context as _, Result};
use serde_json::json;
use std::path::PathBuf;
use tracing::warn;

/// Run the triggers command
pub fn run(ctx: &Context, file: PathBuf, selected: Option<String>) -> Result<()> {
    let triggers = TriggerSet::compile(ctx.settings.triggers.clone())
        .context("Invalid trigger configuration")?;
    if triggers.is_empty() {
        println!("No triggers configured");
        return Ok(());
    }

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
    secrets
        .ensure_app_pwd(&model, &CliPrompt)
        .context("No password given")?;

    let buckets = triggers.plan(&rel, &found.schema, &classifier, &model, &secrets)?;

    if ctx.json {
        let mut out = serde_json::Map::new();
        for kind in [ConnectionType::Data, ConnectionType::Logic, ConnectionType::App] {
            let runs: Vec<_> = buckets
                .bucket(kind)
                .iter()
                .map(|r| {
                    json!({
                        "run_file": r.run_file,
                        "parameters": r.parameters,
                        "schema": r.schema,
                        "identity": r.connection.identity,
                    })
                })
                .collect();
            out.insert(kind.to_string(), json!(runs));
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if buckets.is_empty() {
        println!("No trigger matches {rel}");
        return Ok(());
    }

    for kind in [ConnectionType::Data, ConnectionType::Logic, ConnectionType::App] {
        let runs = buckets.bucket(kind);
        if runs.is_empty() {
            continue;
        }
        println!("{kind} ({})", ctx.dim(&runs[0].connection.masked()));
        for run in runs {
            println!("  {}", run.command_line());
        }
    }
    Ok(())
}
