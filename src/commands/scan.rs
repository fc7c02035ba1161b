// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Scan command - routes every file of the workspace

use super::Context;
use crate::scanner::{has_layout, scan_repository, summarize, ScanConfig, ScanOutcome};
use anyhow::{Context as _, Result};
use tracing::{info, warn};

/// Run the scan command
pub fn run(
    ctx: &Context,
    shallow: bool,
    follow_symlinks: bool,
    selected: Option<String>,
    failures_only: bool,
) -> Result<()> {
    info!("Scanning: {}", ctx.root.display());

    if !has_layout(&ctx.root) {
        warn!(
            "{} has no db, apex, rest or static folder",
            ctx.root.display()
        );
    }

    let model = ctx.resolve(None);

    // Build scan config from flags
    let config = ScanConfig {
        max_depth: if shallow { 3 } else { 0 },
        follow_symlinks,
        selected_schema: selected,
    };

    let entries = scan_repository(&ctx.classifier(), &model, &config)
        .with_context(|| format!("Failed to scan {}", ctx.root.display()))?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No files found in {}", ctx.root.display());
        return Ok(());
    }

    for entry in &entries {
        match &entry.outcome {
            ScanOutcome::Schema(schema) if !failures_only => {
                println!("  {}  {}", entry.path, ctx.good(schema));
            }
            ScanOutcome::Schema(_) => {}
            ScanOutcome::Failed(reason) => {
                println!("  {}  {}", entry.path, ctx.bad(reason));
            }
        }
    }

    // Print summary
    println!();
    println!("Routed {} files:", entries.len());
    for (schema, count) in summarize(&entries) {
        match schema {
            Some(schema) => println!("  {schema}: {count}"),
            None => println!("  {}: {count}", ctx.bad("unrouted")),
        }
    }

    Ok(())
}
