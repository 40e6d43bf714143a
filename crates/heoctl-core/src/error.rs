//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Extension not found: {path}")]
    ExtensionNotFound { path: String },

    #[error("Invalid extension manifest: {message}")]
    InvalidManifest { message: String },

    #[error("Failed to parse extension manifest: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported extension type '{0}' (expected k8s, helm or terraform)")]
    UnsupportedType(String),

    #[error("{}", join_missing(.0))]
    MissingInputs(Vec<String>),
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Message for every missing required input, joined with `; `
fn join_missing(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("input {} is required, but no value provided", name))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_inputs_lists_every_name() {
        let err = CoreError::MissingInputs(vec!["domain".to_string(), "token".to_string()]);
        assert_eq!(
            err.to_string(),
            "input domain is required, but no value provided; input token is required, but no value provided"
        );
    }
}
