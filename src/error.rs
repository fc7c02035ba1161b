// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error types for connection routing
//!
//! Only operations that cannot fall back to a safe default return these.
//! Incomplete configuration is never an error: it is recorded on
//! [`crate::project::ProjectModel::is_valid`] instead.

use thiserror::Error;

/// Errors raised while classifying paths or building connections
#[derive(Error, Debug)]
pub enum RouteError {
    /// A path could not be mapped to any schema
    #[error("cannot determine schema for {path}: {hint}")]
    Classification {
        /// Workspace-relative path that failed
        path: String,
        /// Remediation hint shown to the user
        hint: String,
    },

    /// A setup path was classified but no admin user is configured
    #[error("{path} belongs to the setup area but no admin user is configured")]
    NoAdminUser {
        /// Workspace-relative path that failed
        path: String,
    },

    /// Fallback classification had no selected schema to use
    #[error("{path} does not follow the schema folder layout and no schema is selected")]
    NoSelectedSchema {
        /// Workspace-relative path that failed
        path: String,
    },

    /// A credential still carries a shell placeholder such as `${DB_PWD}`
    #[error("{field} contains the unexpanded placeholder {token}: sourcing/parameters are not supported, enter the value directly")]
    UnsupportedSourcing {
        /// Which value carried the placeholder
        field: String,
        /// The placeholder as found
        token: String,
    },

    /// No password was supplied for the identity
    #[error("no password available for {identity}")]
    MissingSecret {
        /// Identity the password was needed for
        identity: String,
    },

    /// A trigger or connection pattern failed to compile
    #[error("invalid pattern {pattern}: {reason}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// An `!`-prefixed env value was not valid base64
    #[error("cannot decode base64 value of {key}: {source}")]
    Base64 {
        /// Env key holding the value
        key: String,
        /// Decoder error
        #[source]
        source: base64::DecodeError,
    },

    /// A decoded `!`-prefixed env value was not valid UTF-8
    #[error("decoded value of {key} is not valid UTF-8: {source}")]
    Utf8 {
        /// Env key holding the value
        key: String,
        /// Conversion error
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// I/O failure while reading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed YAML manifest
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed state store
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for routing operations
pub type Result<T> = std::result::Result<T, RouteError>;
