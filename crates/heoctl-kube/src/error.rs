//! Error types for heoctl-kube
//!
//! Two families live here:
//! - [`KubeError`]: run-level failures that stop a batch (discovery, tree traversal)
//! - [`ResourceError`]: failures local to one file or document, recorded as outcomes

use heoctl_engine::{DocumentError, EngineError, TemplatePhase};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for heoctl-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that abort a whole run
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// API discovery failed, so no kind can be mapped
    #[error("API discovery failed: {0}")]
    Discovery(#[source] kube::Error),

    /// The resource tree could not be walked
    #[error("failed to walk resource tree at {}: {source}", path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Classification of a failed outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureKind {
    TemplateParse,
    TemplateExec,
    Io,
    YamlDecode,
    UnknownKind,
    InvalidResource,
    ClusterApi,
}

impl FailureKind {
    /// Name used as the prefix of failure messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TemplateParse => "TemplateParseError",
            Self::TemplateExec => "TemplateExecError",
            Self::Io => "IoError",
            Self::YamlDecode => "YAMLDecodeError",
            Self::UnknownKind => "UnknownKindError",
            Self::InvalidResource => "InvalidResourceError",
            Self::ClusterApi => "ClusterAPIError",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error returned by the cluster for a create or delete call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", self.describe())]
pub struct ClusterApiError {
    /// HTTP status code, when the API server answered
    pub code: Option<u16>,
    /// Machine-readable reason (`AlreadyExists`, `NotFound`, `Forbidden`, ...)
    pub reason: String,
    pub message: String,
}

impl ClusterApiError {
    pub fn new(code: u16, reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            reason: reason.into(),
            message: message.into(),
        }
    }

    /// Check if this is a 404 Not Found error
    pub fn is_not_found(&self) -> bool {
        self.code == Some(404)
    }

    /// Check if this is a conflict error (409)
    pub fn is_conflict(&self) -> bool {
        self.code == Some(409)
    }

    fn describe(&self) -> String {
        match (self.code, self.reason.is_empty()) {
            (Some(code), false) => format!("{} ({}): {}", self.reason, code, self.message),
            (Some(code), true) => format!("({}): {}", code, self.message),
            (None, _) => self.message.clone(),
        }
    }
}

impl From<kube::Error> for ClusterApiError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(resp) => Self {
                code: Some(resp.code),
                reason: resp.reason,
                message: resp.message,
            },
            other => Self {
                code: None,
                reason: String::new(),
                message: other.to_string(),
            },
        }
    }
}

/// Failure of a single file or document
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Template could not be read, parsed or executed
    #[error(transparent)]
    Render(#[from] EngineError),

    /// Document is not valid YAML
    #[error(transparent)]
    Decode(#[from] DocumentError),

    /// Document is YAML but not a Kubernetes object
    #[error("document is not a Kubernetes object: {0}")]
    InvalidObject(String),

    /// Discovery has no mapping for the kind
    #[error("no resource mapping for kind \"{kind}\" in version \"{api_version}\"")]
    UnknownKind { api_version: String, kind: String },

    /// A name is needed and the object has none
    #[error("{kind} has no metadata.name")]
    MissingName { kind: String },

    /// The API server rejected the call
    #[error(transparent)]
    ClusterApi(#[from] ClusterApiError),

    /// The call did not finish before the deadline
    #[error("cluster call timed out after {0:?}")]
    Timeout(Duration),

    /// The run was cancelled while the call was in flight
    #[error("cluster call cancelled")]
    Cancelled,
}

impl ResourceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Render(EngineError::Read { .. }) => FailureKind::Io,
            Self::Render(EngineError::Template(e)) => match e.phase {
                TemplatePhase::Parse => FailureKind::TemplateParse,
                TemplatePhase::Exec => FailureKind::TemplateExec,
            },
            Self::Decode(_) | Self::InvalidObject(_) => FailureKind::YamlDecode,
            Self::UnknownKind { .. } => FailureKind::UnknownKind,
            Self::MissingName { .. } => FailureKind::InvalidResource,
            Self::ClusterApi(_) | Self::Timeout(_) | Self::Cancelled => FailureKind::ClusterApi,
        }
    }
}
