//! Per-resource outcomes and the batch report

use dashmap::DashMap;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::dispatcher::Action;
use crate::error::{FailureKind, ResourceError};

/// Identity of an outcome; also the display order of the report
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub source_path: PathBuf,
    /// Document position, absent for file-level failures
    pub ordinal: Option<usize>,
    pub name: String,
    pub kind: String,
}

/// What happened to one document (or one file that never split)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceOutcome {
    pub source_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<usize>,
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl ResourceOutcome {
    pub fn succeeded(
        source_path: &Path,
        ordinal: Option<usize>,
        kind: impl Into<String>,
        name: impl Into<String>,
        namespace: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            ordinal,
            kind: kind.into(),
            name: name.into(),
            namespace,
            success: true,
            message: message.into(),
            failure: None,
        }
    }

    /// A failed outcome; the message is prefixed with the failure kind
    pub fn failed(
        source_path: &Path,
        ordinal: Option<usize>,
        kind: impl Into<String>,
        name: impl Into<String>,
        namespace: Option<String>,
        error: &ResourceError,
    ) -> Self {
        let failure = error.kind();
        Self {
            source_path: source_path.to_path_buf(),
            ordinal,
            kind: kind.into(),
            name: name.into(),
            namespace,
            success: false,
            message: format!("{}: {}", failure, error),
            failure: Some(failure),
        }
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey {
            source_path: self.source_path.clone(),
            ordinal: self.ordinal,
            name: self.name.clone(),
            kind: self.kind.clone(),
        }
    }

    /// `kind/name`, or the kind alone when the name is unknown
    pub fn display_name(&self) -> String {
        match (self.kind.is_empty(), self.name.is_empty()) {
            (false, false) => format!("{}/{}", self.kind, self.name),
            (false, true) => self.kind.clone(),
            (true, false) => self.name.clone(),
            (true, true) => "<unknown>".to_string(),
        }
    }
}

/// Concurrent outcome sink for one run
///
/// Insertion needs no external lock; a second outcome for the same key
/// replaces the first.
#[derive(Debug, Default)]
pub struct OutcomeCollector {
    entries: DashMap<ResourceKey, ResourceOutcome>,
}

impl OutcomeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: ResourceOutcome) {
        tracing::debug!(
            path = %outcome.source_path.display(),
            kind = %outcome.kind,
            name = %outcome.name,
            success = outcome.success,
            "recorded outcome"
        );
        self.entries.insert(outcome.key(), outcome);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain into a report sorted by key
    pub fn into_report(self, action: Action) -> BatchReport {
        let mut entries: Vec<_> = self.entries.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        BatchReport {
            action,
            outcomes: entries.into_iter().map(|(_, outcome)| outcome).collect(),
        }
    }
}

/// Ordered outcomes of a batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub action: Action,
    pub outcomes: Vec<ResourceOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &ResourceOutcome> {
        self.outcomes.iter().filter(|o| o.success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ResourceOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    /// Check if all operations succeeded
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Format as human-readable summary
    pub fn summary(&self) -> String {
        let succeeded = self.succeeded().count();
        let failed = self.failed().count();

        let mut parts = Vec::with_capacity(2);
        if succeeded > 0 {
            parts.push(format!("{} succeeded", succeeded));
        }
        if failed > 0 {
            parts.push(format!("{} failed", failed));
        }
        if parts.is_empty() {
            "No resources processed".to_string()
        } else {
            parts.join(", ")
        }
    }
}
