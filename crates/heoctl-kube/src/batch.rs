//! Batch orchestration over an extension's resource tree
//!
//! Every file under `<root>/k8s` is rendered, split and dispatched document by
//! document. Failures are recorded as outcomes and the batch carries on; only
//! a traversal error stops it.

use futures::stream::{self, StreamExt};
use heoctl_core::{RESOURCES_DIR, ResolvedInputs};
use heoctl_engine::{Document, EngineError, Renderer, split_documents};
use kube::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

use crate::dispatcher::{Action, ClusterApi, Dispatcher, KubeClusterApi};
use crate::error::{KubeError, ResourceError, Result};
use crate::mapper::{DiscoveryMapper, RestMapper};
use crate::report::{BatchReport, OutcomeCollector, ResourceOutcome};
use crate::resolver::{ObjectIdentity, Resolution, resolve};

/// Default number of files processed at once
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default bound on a single cluster call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Batch configuration
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Files processed in parallel; 1 is sequential
    pub concurrency: usize,
    /// Deadline for each create or delete; `None` waits indefinitely
    pub call_timeout: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            call_timeout: Some(DEFAULT_CALL_TIMEOUT),
        }
    }
}

/// Runs one action over every resource of an extension
pub struct BatchRunner {
    renderer: Renderer,
    mapper: Arc<dyn RestMapper>,
    dispatcher: Dispatcher,
    options: BatchOptions,
    cancel: CancellationToken,
}

impl BatchRunner {
    pub fn new(
        mapper: Arc<dyn RestMapper>,
        api: Arc<dyn ClusterApi>,
        options: BatchOptions,
    ) -> Self {
        let dispatcher = Dispatcher::new(api).with_call_timeout(options.call_timeout);
        Self {
            renderer: Renderer::default(),
            mapper,
            dispatcher,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Discover the cluster's API surface and build a runner for it
    ///
    /// Discovery runs once here; a failure aborts before anything is sent.
    pub async fn connect(client: Client, options: BatchOptions) -> Result<Self> {
        let mapper = DiscoveryMapper::discover(client.clone()).await?;
        let api = KubeClusterApi::new(client);
        Ok(Self::new(Arc::new(mapper), Arc::new(api), options))
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that aborts in-flight cluster calls of this runner
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Apply `action` to every document under `<root>/k8s`
    pub async fn run(
        &self,
        root: &Path,
        inputs: &ResolvedInputs,
        action: Action,
    ) -> Result<BatchReport> {
        let resources = root.join(RESOURCES_DIR);
        let files = collect_files(&resources)?;

        tracing::info!(
            path = %resources.display(),
            files = files.len(),
            action = %action,
            "processing resource files"
        );

        let collector = OutcomeCollector::new();
        stream::iter(files)
            .for_each_concurrent(self.options.concurrency.max(1), |path| {
                let collector = &collector;
                async move {
                    let source = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                    self.process_file(&path, &source, inputs, action, collector)
                        .await;
                }
            })
            .await;

        let report = collector.into_report(action);
        tracing::info!(action = %action, summary = %report.summary(), "batch finished");
        Ok(report)
    }

    async fn process_file(
        &self,
        path: &Path,
        source: &Path,
        inputs: &ResolvedInputs,
        action: Action,
        collector: &OutcomeCollector,
    ) {
        let rendered = match self.render(path, inputs).await {
            Ok(rendered) => rendered,
            Err(err) => {
                tracing::warn!(path = %source.display(), error = %err, "failed to render file");
                collector.record(ResourceOutcome::failed(source, None, "", "", None, &err));
                return;
            }
        };

        for document in split_documents(&rendered) {
            let outcome = self.process_document(source, document, action).await;
            collector.record(outcome);
        }
    }

    /// Read a template without blocking the runtime, then render it
    async fn render(
        &self,
        path: &Path,
        inputs: &ResolvedInputs,
    ) -> std::result::Result<String, ResourceError> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| EngineError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let rendered = self
            .renderer
            .render_str(&source, &path.to_string_lossy(), inputs)?;

        tracing::debug!(path = %path.display(), bytes = rendered.len(), "rendered template");
        Ok(rendered)
    }

    async fn process_document(
        &self,
        source: &Path,
        document: Document,
        action: Action,
    ) -> ResourceOutcome {
        let ordinal = Some(document.ordinal);

        let text = match document.body {
            Ok(text) => text,
            Err(e) => {
                return ResourceOutcome::failed(source, ordinal, "", "", None, &e.into());
            }
        };

        let resolution = match resolve(&text, self.mapper.as_ref()) {
            Ok(resolution) => resolution,
            Err(err) => {
                let id = ObjectIdentity::peek(&text);
                tracing::warn!(path = %source.display(), ?ordinal, error = %err, "failed to resolve document");
                return ResourceOutcome::failed(
                    source,
                    ordinal,
                    id.kind.unwrap_or_default(),
                    id.name.unwrap_or_default(),
                    None,
                    &err,
                );
            }
        };

        let (kind, name, namespace) = match &resolution {
            Resolution::NoOp => (String::new(), String::new(), None),
            Resolution::Resource(r) => (
                r.gvk.kind.clone(),
                r.name().unwrap_or_default().to_string(),
                r.namespace().map(str::to_string),
            ),
        };

        match self.dispatcher.apply(&resolution, action, &self.cancel).await {
            Ok(()) => {
                let message = match (&resolution, action) {
                    (Resolution::NoOp, _) => "empty document",
                    (_, Action::Install) => "created",
                    (_, Action::Uninstall) => "deleted",
                };
                tracing::info!(
                    kind = %kind,
                    name = %name,
                    namespace = namespace.as_deref().unwrap_or(""),
                    action = %action,
                    "{}", message
                );
                ResourceOutcome::succeeded(source, ordinal, kind, name, namespace, message)
            }
            Err(err) => {
                tracing::warn!(kind = %kind, name = %name, error = %err, "cluster call failed");
                ResourceOutcome::failed(source, ordinal, kind, name, namespace, &err)
            }
        }
    }
}

/// Every non-directory entry under `dir`, in file-name order
///
/// Symlinks are kept and read through the link; a dangling one fails when
/// read and gets an outcome like any unreadable file. Symlinked directories
/// are not descended into.
fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|source| KubeError::Traversal {
            path: dir.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_dir() {
            continue;
        }
        if entry.path_is_symlink() && entry.path().is_dir() {
            tracing::warn!(path = %entry.path().display(), "skipping symlinked directory");
            continue;
        }
        files.push(entry.into_path());
    }

    Ok(files)
}
