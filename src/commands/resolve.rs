// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Resolve command - prints the normalized project model

use super::Context;
use anyhow::Result;
use std::path::PathBuf;

/// Run the resolve command
pub fn run(ctx: &Context, file: Option<PathBuf>) -> Result<()> {
    let model = ctx.resolve(file.as_deref());

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&model)?);
        return Ok(());
    }

    let unset = ctx.dim("-");
    let show = |value: Option<&str>| value.map_or_else(|| unset.clone(), ToString::to_string);

    println!("Source:    {}", model.source);
    println!("Project:   {}", show(model.project_name.as_deref()));
    println!(
        "Mode:      {}",
        show(model.project_mode.map(|m| m.as_str()))
    );
    println!("Workspace: {}", show(model.workspace.as_deref()));
    println!("User:      {}", model.db_app_user);
    println!("Admin:     {}", show(model.db_admin_user.as_deref()));
    println!("TNS:       {}", model.db_tns);
    println!();
    println!("Schemas:");
    println!("  data   {}", model.data_schema);
    println!("  logic  {}", model.logic_schema);
    println!("  app    {}", model.app_schema);
    println!();
    println!(
        "Proxy:     {}",
        if model.requires_proxy() { "yes" } else { "no" }
    );

    if model.is_valid {
        println!("Status:    {}", ctx.good("valid"));
    } else {
        println!("Status:    {}", ctx.bad("invalid"));
        for issue in &model.issues {
            println!("  - {issue}");
        }
    }

    Ok(())
}
