// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Classify command - names the schema that owns each file

use super::Context;
use crate::classify::ClassifyContext;
use crate::connection::build_identity;
use anyhow::{Context as _, Result};
use serde_json::json;
use std::path::PathBuf;

/// Run the classify command
pub fn run(ctx: &Context, files: Vec<PathBuf>, selected: Option<String>) -> Result<()> {
    let classifier = ctx.classifier();
    let mut results = Vec::with_capacity(files.len());

    for file in &files {
        let model = ctx.resolve(Some(file.as_path()));
        let absolute = ctx.absolute(file);
        let rel = ctx.relative(file);

        let mut cctx = ClassifyContext::default().with_file(&absolute);
        if let Some(schema) = selected.as_deref() {
            cctx = cctx.with_selected(schema);
        }

        let found = classifier
            .classify(&rel, &model, cctx)
            .with_context(|| format!("Cannot classify {rel}"))?;
        let identity = build_identity(&found.schema, &model);

        if ctx.json {
            results.push(json!({
                "path": rel,
                "schema": found.schema,
                "rule": found.rule,
                "identity": identity,
            }));
        } else {
            println!("{rel}  {}  {}", found.schema, ctx.dim(&identity));
        }
    }

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }
    Ok(())
}
