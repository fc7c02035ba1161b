// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - shows settings and edits settings files

use super::Context;
use crate::config::{user_settings_path, PROJECT_SETTINGS_FILE};
use anyhow::{bail, Context as _, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Keys that can be set from the command line
const SCALAR_KEYS: &[&str] = &["log_level", "state_file"];

/// Run the config command.
///
/// Without a key the effective settings are printed; with a key only its
/// value; with a value the key is written to the user settings file, or to
/// `.schemaroute.toml` when `project` is set.
pub fn run(ctx: &Context, key: Option<String>, value: Option<String>, project: bool) -> Result<()> {
    let effective = toml::Value::try_from(&ctx.settings).context("Cannot render settings")?;

    let Some(key) = key else {
        if ctx.json {
            println!("{}", serde_json::to_string_pretty(&ctx.settings)?);
        } else {
            print!("{}", toml::to_string_pretty(&ctx.settings)?);
        }
        return Ok(());
    };

    let Some(value) = value else {
        let Some(current) = effective.get(&key) else {
            bail!("Unknown setting '{key}'");
        };
        match current {
            toml::Value::String(s) => println!("{s}"),
            toml::Value::Table(t) => print!("{}", toml::to_string_pretty(t)?),
            other => println!("{other}"),
        }
        return Ok(());
    };

    if !SCALAR_KEYS.contains(&key.as_str()) {
        bail!(
            "Setting '{key}' cannot be set here; valid keys: {}",
            SCALAR_KEYS.join(", ")
        );
    }

    let path = if project {
        ctx.root.join(PROJECT_SETTINGS_FILE)
    } else {
        user_settings_path().context("No user configuration directory on this platform")?
    };
    write_key(&path, &key, value)?;
    info!("Set {} in {}", key, path.display());
    Ok(())
}

fn write_key(path: &Path, key: &str, value: String) -> Result<()> {
    let mut table = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        content
            .parse::<toml::Table>()
            .with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        toml::Table::new()
    };

    table.insert(key.to_string(), toml::Value::String(value));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, toml::to_string_pretty(&table)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_key_keeps_other_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/settings.toml");

        write_key(&path, "log_level", "debug".into()).unwrap();
        write_key(&path, "state_file", "ide/state.json".into()).unwrap();

        let table: toml::Table = fs::read_to_string(&path).unwrap().parse().unwrap();
        assert_eq!(table["log_level"].as_str(), Some("debug"));
        assert_eq!(table["state_file"].as_str(), Some("ide/state.json"));
    }
}
