// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for Olhos

use thiserror::Error;

/// Result type alias for Olhos operations
pub type Result<T> = std::result::Result<T, OlhosError>;

/// Olhos error types
#[derive(Error, Debug)]
pub enum OlhosError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// Any failure of the external text-generation call (auth, network, quota,
    /// malformed response). Nothing is mutated when this is returned.
    #[error("Classifier unavailable: {0}")]
    Adapter(String),

    #[error("Invalid incident: {0}")]
    InvalidIncident(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Incident {0} not found")]
    IncidentNotFound(u64),

    #[error("Unknown response unit: {0}")]
    UnknownUnit(String),

    #[error("Console state lock poisoned")]
    LockPoisoned,

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Request URLs are stripped; they may carry credentials
impl From<reqwest::Error> for OlhosError {
    fn from(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_timeout() {
            OlhosError::Adapter(format!("request timed out: {}", e))
        } else {
            OlhosError::Adapter(e.to_string())
        }
    }
}
