// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Connect command - prints the connection for a file

use super::{classify_file, connect_classified, require_valid, Context};
use crate::conn_type::classify_connection;
use crate::secrets::SecretStore;
use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;
use tracing::warn;

/// Run the connect command
pub fn run(
    ctx: &Context,
    file: PathBuf,
    selected: Option<String>,
    show_password: bool,
) -> Result<()> {
    let mut model = ctx.resolve(Some(file.as_path()));
    if let Err(e) = require_valid(&model) {
        warn!("{e}");
        return Err(e);
    }

    let rel = ctx.relative(&file);
    let absolute = ctx.absolute(&file);
    let mut secrets = SecretStore::new();

    let found = classify_file(
        &ctx.classifier(),
        &mut model,
        &mut secrets,
        &rel,
        &absolute,
        selected.as_deref(),
    )?;
    let parts = connect_classified(&model, &mut secrets, &found)?;
    let kind = classify_connection(&parts.to_string(), &model);
    let connection = if show_password {
        parts.to_string()
    } else {
        parts.masked()
    };

    if ctx.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "path": rel,
                "schema": found.schema,
                "identity": parts.identity,
                "tns": parts.tns,
                "admin": parts.is_admin,
                "type": kind,
                "connection": connection,
            }))?
        );
    } else {
        println!("{connection}");
    }
    Ok(())
}
