// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! `build.env` / `apply.env` reader
//!
//! The files are meant to be sourced by a shell, so `${VAR}` references are
//! kept verbatim here. Expanding them is not supported; the connection
//! builder rejects any value that still carries one.

use super::{non_empty, RawTopology};
use crate::error::{Result, RouteError};
use crate::fs::FileSystem;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Parse `KEY=value` lines.
///
/// Accepts an optional `export ` prefix, `#` comments, and single or double
/// quotes around the value. Values starting with `!` are base64 encoded.
pub fn parse(content: &str) -> Result<BTreeMap<String, String>> {
    let mut values = BTreeMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((key, raw)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let value = unquote(raw.trim());
        let value = decode_value(key, &value)?;
        values.insert(key.to_string(), value);
    }

    Ok(values)
}

/// Take the quoted span of a quoted value, or cut a trailing ` #` comment
/// from an unquoted one
fn unquote(raw: &str) -> String {
    for quote in ['"', '\''] {
        if let Some(rest) = raw.strip_prefix(quote) {
            if let Some(end) = rest.find(quote) {
                return rest[..end].to_string();
            }
        }
    }
    match raw.find(" #") {
        Some(idx) => raw[..idx].trim_end().to_string(),
        None => raw.to_string(),
    }
}

/// Decode a `!`-prefixed base64 value; other values pass through
pub fn decode_value(key: &str, value: &str) -> Result<String> {
    let Some(encoded) = value.strip_prefix('!') else {
        return Ok(value.to_string());
    };

    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|source| RouteError::Base64 {
            key: key.to_string(),
            source,
        })?;
    let decoded = String::from_utf8(bytes).map_err(|source| RouteError::Utf8 {
        key: key.to_string(),
        source,
    })?;
    Ok(decoded.trim_end_matches(['\n', '\r']).to_string())
}

/// Read both env files into a raw topology record
pub fn read(fs: &dyn FileSystem, build: &Path, apply: Option<&Path>) -> Result<RawTopology> {
    debug!("Reading {}", build.display());
    let mut values = parse(&fs.read_to_string(build)?)?;

    if let Some(apply) = apply {
        debug!("Reading {}", apply.display());
        values.extend(parse(&fs.read_to_string(apply)?)?);
    }

    let mut take = |key: &str| non_empty(values.remove(key));

    Ok(RawTopology {
        project_name: take("PROJECT"),
        project_mode: take("PROJECT_MODE"),
        flex_mode: take("FLEX_MODE").is_some_and(|v| v.eq_ignore_ascii_case("true")),
        app_schema: take("APP_SCHEMA"),
        logic_schema: take("LOGIC_SCHEMA"),
        data_schema: take("DATA_SCHEMA"),
        workspace: take("WORKSPACE"),
        db_app_user: take("DB_APP_USER"),
        db_app_pwd: take("DB_APP_PWD"),
        db_admin_user: take("DB_ADMIN_USER"),
        db_admin_pwd: take("DB_ADMIN_PWD"),
        db_tns: take("DB_TNS"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFs;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_basic_lines() {
        let values = parse(
            "# comment\n\
             PROJECT=sales\n\
             export DB_TNS=localhost:1521/xepdb1\n\
             APP_SCHEMA=\"sales_app\"\n\
             LOGIC_SCHEMA='sales_logic'\n\
             DATA_SCHEMA=sales_data # trailing\n\
             WORKSPACE=\"SALES\" # apex workspace\n\
             DB_APP_USER='depl' # deployment user\n\
             DB_TNS_HINT=\"host # not a comment\"\n\
             \n\
             not a pair\n",
        )
        .unwrap();

        assert_eq!(values["PROJECT"], "sales");
        assert_eq!(values["DB_TNS"], "localhost:1521/xepdb1");
        assert_eq!(values["APP_SCHEMA"], "sales_app");
        assert_eq!(values["LOGIC_SCHEMA"], "sales_logic");
        assert_eq!(values["DATA_SCHEMA"], "sales_data");
        assert_eq!(values["WORKSPACE"], "SALES");
        assert_eq!(values["DB_APP_USER"], "depl");
        assert_eq!(values["DB_TNS_HINT"], "host # not a comment");
        assert_eq!(values.len(), 8);
    }

    #[test]
    fn test_bang_values_are_base64() {
        // "secret\n" encoded
        let values = parse("DB_APP_PWD=!c2VjcmV0Cg==\n").unwrap();
        assert_eq!(values["DB_APP_PWD"], "secret");
    }

    #[test]
    fn test_only_one_bang_is_stripped() {
        // "!x" encoded is IXg=
        assert_eq!(decode_value("K", "!IXg=").unwrap(), "!x");
    }

    #[test]
    fn test_invalid_base64_is_an_error() {
        let err = parse("DB_APP_PWD=!not base64!\n").unwrap_err();
        assert!(matches!(err, RouteError::Base64 { ref key, .. } if key == "DB_APP_PWD"));
    }

    #[test]
    fn test_decoded_value_must_be_utf8() {
        // 0xff 0xfe
        let err = parse("DB_APP_PWD=!//4=\n").unwrap_err();
        assert!(matches!(err, RouteError::Utf8 { ref key, .. } if key == "DB_APP_PWD"));
    }

    #[test]
    fn test_placeholders_are_kept() {
        let values = parse("DB_APP_PWD=${DB_PWD}\n").unwrap();
        assert_eq!(values["DB_APP_PWD"], "${DB_PWD}");
    }

    #[test]
    fn test_read_merges_both_files() {
        let dir = TempDir::new().unwrap();
        let build = dir.path().join("build.env");
        let apply = dir.path().join("apply.env");
        fs::write(
            &build,
            "PROJECT=Sales\nPROJECT_MODE=MULTI\nAPP_SCHEMA=sales_app\nLOGIC_SCHEMA=sales_logic\nDATA_SCHEMA=sales_data\n",
        )
        .unwrap();
        fs::write(&apply, "DB_APP_USER=sales_depl\nDB_APP_PWD=!cHdk\nDB_TNS=db:1521/pdb\n").unwrap();

        let raw = read(&LocalFs, &build, Some(&apply)).unwrap();
        assert_eq!(raw.project_name.as_deref(), Some("Sales"));
        assert_eq!(raw.project_mode.as_deref(), Some("MULTI"));
        assert_eq!(raw.db_app_user.as_deref(), Some("sales_depl"));
        assert_eq!(raw.db_app_pwd.as_deref(), Some("pwd"));
        assert_eq!(raw.db_tns.as_deref(), Some("db:1521/pdb"));
        assert!(!raw.flex_mode);
    }

    #[test]
    fn test_read_without_apply_env() {
        let dir = TempDir::new().unwrap();
        let build = dir.path().join("build.env");
        fs::write(&build, "PROJECT=x\nFLEX_MODE=TRUE\n").unwrap();

        let raw = read(&LocalFs, &build, None).unwrap();
        assert!(raw.flex_mode);
        assert_eq!(raw.db_app_user, None);
    }
}
