// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge.
//!
//! Converts Figment deserialization errors and post-deserialization
//! validation failures into miette diagnostics for readable startup
//! error reporting.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error with diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The configuration failed to parse or deserialize.
    #[error("configuration parse error: {message}")]
    #[diagnostic(
        code(mnemo::config::parse),
        help("check mnemo.toml against the documented keys; unknown keys are rejected")
    )]
    Parse {
        /// Description of the parse failure.
        message: String,
    },

    /// A configuration value violated a semantic constraint.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(mnemo::config::validation))]
    Validation {
        /// Description of the violated constraint.
        message: String,
    },
}

/// Convert a Figment error into one diagnostic per underlying failure.
///
/// Figment aggregates multiple errors behind a single value; iterating
/// yields each individual key/type failure.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| ConfigError::Parse {
            message: e.to_string(),
        })
        .collect()
}

/// Render a list of config errors as a human-readable report.
pub fn render_errors(errors: &[ConfigError]) -> String {
    let mut out = String::new();
    for err in errors {
        out.push_str(&format!("{err}\n"));
    }
    out
}
