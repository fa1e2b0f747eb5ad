//! CLI-specific error types and exit code mapping

use lockgraph_catalog::CatalogError;
use lockgraph_core::error::{ConfigError, LockgraphError};

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// `--fail-on-diagnostics` was given and warnings were recorded.
    #[error("{warnings} warning-level diagnostic(s) recorded")]
    DiagnosticsGate { warnings: usize },

    /// The run was cancelled or timed out before every manifest was processed.
    #[error("partial result: {skipped} manifest(s) not processed")]
    Partial { skipped: usize },

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from lockgraph-core.
    #[error("{0}")]
    Core(#[from] LockgraphError),

    /// Catalog engine error.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                   |
    /// |------|-------------------------------------------|
    /// | 0    | Success                                   |
    /// | 1    | General / command error                   |
    /// | 2    | Configuration error                       |
    /// | 3    | Diagnostics gate failed                   |
    /// | 4    | Partial result (cancelled or timed out)   |
    /// | 10   | IO error                                  |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Core(LockgraphError::Config(_)) => 2,
            Self::Catalog(CatalogError::Config { .. }) => 2,
            Self::DiagnosticsGate { .. } => 3,
            Self::Partial { .. } => 4,
            Self::Io(_) | Self::Core(LockgraphError::Io(_)) | Self::Catalog(CatalogError::Io { .. }) => {
                10
            }
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) | Self::Catalog(_) => 1,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
