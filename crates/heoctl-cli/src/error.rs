//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use heoctl_core::CoreError;
use heoctl_kube::KubeError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Extension directory or manifest problem
    #[error("Extension error: {message}")]
    #[diagnostic(code(heoctl::cli::extension))]
    Extension {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Required inputs without a value
    #[error("Input error: {message}")]
    #[diagnostic(code(heoctl::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(heoctl::cli::io))]
    Io { message: String },

    /// Cluster connection or discovery failure
    #[error("Kubernetes error: {message}")]
    #[diagnostic(code(heoctl::cli::kube))]
    Kube { message: String },

    /// `helm` or `terraform` failed
    #[error("{program} failed: {message}")]
    #[diagnostic(code(heoctl::cli::process))]
    Process { program: String, message: String },

    /// The batch completed but some resources failed
    #[error("{failed} of {total} resource(s) failed")]
    #[diagnostic(code(heoctl::cli::batch))]
    BatchFailed { failed: usize, total: usize },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Extension { .. } => exit_codes::EXTENSION_ERROR,
            CliError::Input { .. } => exit_codes::INPUT_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Kube { .. } => exit_codes::ERROR,
            CliError::Process { .. } => exit_codes::ERROR,
            CliError::BatchFailed { .. } => exit_codes::ERROR,
        }
    }

    /// Create an extension error
    pub fn extension(message: impl Into<String>) -> Self {
        Self::Extension {
            message: message.into(),
            help: None,
        }
    }

    /// Create a process error
    pub fn process(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Process {
            program: program.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MissingInputs(_) => CliError::Input {
                message: err.to_string(),
                help: Some("pass --input name=value or set EXT_<name>".to_string()),
            },
            CoreError::Io(e) => e.into(),
            CoreError::ExtensionNotFound { .. } => CliError::Extension {
                message: err.to_string(),
                help: Some("check --extensions-dir (HEOCTL_EXTENSIONS_DIR)".to_string()),
            },
            other => CliError::extension(other.to_string()),
        }
    }
}

impl From<KubeError> for CliError {
    fn from(err: KubeError) -> Self {
        match err {
            KubeError::Traversal { .. } => CliError::Io {
                message: err.to_string(),
            },
            KubeError::Discovery(_) => CliError::Kube {
                message: err.to_string(),
            },
            _ => CliError::Kube {
                message: err.to_string(),
            },
        }
    }
}

impl From<kube::Error> for CliError {
    fn from(err: kube::Error) -> Self {
        CliError::Kube {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_inputs_map_to_input_error() {
        let err = CliError::from(CoreError::MissingInputs(vec!["domain".to_string()]));
        assert_eq!(err.exit_code(), exit_codes::INPUT_ERROR);
        assert!(err.to_string().contains("input domain is required"));
    }

    #[test]
    fn test_manifest_errors_map_to_extension_error() {
        let err = CliError::from(CoreError::InvalidManifest {
            message: "name is empty".to_string(),
        });
        assert_eq!(err.exit_code(), exit_codes::EXTENSION_ERROR);
    }

    #[test]
    fn test_batch_failure_exit_code() {
        let err = CliError::BatchFailed { failed: 1, total: 3 };
        assert_eq!(err.exit_code(), exit_codes::ERROR);
        assert_eq!(err.to_string(), "1 of 3 resource(s) failed");
    }

    #[test]
    fn test_discovery_failure_maps_to_kube_error() {
        let source = kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "forbidden".to_string(),
            reason: "Forbidden".to_string(),
            code: 403,
        });
        let err = CliError::from(KubeError::Discovery(source));
        assert!(matches!(err, CliError::Kube { .. }));
        assert_eq!(err.exit_code(), exit_codes::ERROR);
        assert!(err.to_string().contains("API discovery failed"));
    }
}
