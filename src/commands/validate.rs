// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Validate command - reports configuration problems

use super::Context;
use anyhow::{bail, Result};
use serde_json::json;

/// Run the validate command; fails when the configuration is invalid
pub fn run(ctx: &Context) -> Result<()> {
    let model = ctx.resolve(None);

    if ctx.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "valid": model.is_valid,
                "source": model.source,
                "issues": model.issues,
            }))?
        );
    } else if model.is_valid {
        println!(
            "{} configuration read from {}",
            ctx.good("Valid"),
            model.source
        );
    } else {
        println!(
            "{} configuration read from {}:",
            ctx.bad("Invalid"),
            model.source
        );
        for issue in &model.issues {
            println!("  - {issue}");
        }
    }

    if !model.is_valid {
        bail!("{} configuration issue(s) found", model.issues.len());
    }
    Ok(())
}
