//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `MigrateError`.
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Migration error types.
///
/// Only `Auth` and `Config` terminate a run; everything else is
/// collected as a per-mutation failure and the batch continues.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Credential or session failure against the source API.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Non-404 HTTP failure from the source API.
    #[error("Source API error: {0}")]
    Source(String),

    /// No target account resolves for a source ledger code.
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Document construction or submission failed on the target side.
    #[error("Document build failed: {0}")]
    Build(String),

    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Target store failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl MigrateError {
    /// Returns true when the error must terminate the whole run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Config(_))
    }

    /// Returns a stable short code for reporting.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "AUTH",
            Self::Source(_) => "SOURCE",
            Self::Mapping(_) => "MAPPING",
            Self::Build(_) => "BUILD",
            Self::Config(_) => "CONFIG",
            Self::Store(_) => "STORE",
        }
    }
}
