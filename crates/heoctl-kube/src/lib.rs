//! Kubernetes integration for heoctl
//!
//! This crate provides:
//! - Discovery-backed resolution of any kind to the REST resource serving it
//! - Namespace inference for namespaced and cluster-scoped kinds
//! - Create and foreground delete through the dynamic object API
//! - A batch runner that records one outcome per document

pub mod batch;
pub mod dispatcher;
pub mod error;
pub mod mapper;
pub mod mock;
pub mod report;
pub mod resolver;

pub use batch::{BatchOptions, BatchRunner, DEFAULT_CALL_TIMEOUT, DEFAULT_CONCURRENCY};
pub use dispatcher::{Action, ClusterApi, Dispatcher, KubeClusterApi};
pub use error::{ClusterApiError, FailureKind, KubeError, ResourceError, Result};
pub use mapper::{DiscoveryMapper, GroupVersionResources, ResourceMapping, RestMapper};
pub use mock::{MockCluster, MockRestMapper, RecordedCall};
pub use report::{BatchReport, OutcomeCollector, ResourceKey, ResourceOutcome};
pub use resolver::{
    DEFAULT_NAMESPACE, ObjectIdentity, Resolution, ResolvedResource, gvk_from_type_meta, resolve,
};
