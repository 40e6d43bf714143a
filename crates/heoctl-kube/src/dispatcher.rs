//! Create and delete calls against the cluster
//!
//! [`ClusterApi`] is the seam between the batch and the API server: the live
//! implementation goes through `Api<DynamicObject>`, tests use
//! [`MockCluster`](crate::mock::MockCluster).

use async_trait::async_trait;
use kube::{
    Client,
    api::{Api, DeleteParams, DynamicObject, PostParams},
};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{ClusterApiError, ResourceError};
use crate::resolver::{Resolution, ResolvedResource};

/// What to do with every resource of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Install,
    Uninstall,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "install" => Ok(Self::Install),
            "uninstall" | "delete" => Ok(Self::Uninstall),
            other => Err(format!(
                "unknown action '{}' (expected install, uninstall or delete)",
                other
            )),
        }
    }
}

/// Generic object calls the dispatcher needs
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Create the object
    async fn create(&self, resource: &ResolvedResource) -> Result<(), ClusterApiError>;

    /// Delete the object called `name`
    async fn delete(
        &self,
        resource: &ResolvedResource,
        name: &str,
        params: &DeleteParams,
    ) -> Result<(), ClusterApiError>;
}

/// [`ClusterApi`] over a kube client
#[derive(Clone)]
pub struct KubeClusterApi {
    client: Client,
}

impl KubeClusterApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create an Api client for a resolved resource
    fn api_for(&self, resource: &ResolvedResource) -> Api<DynamicObject> {
        match resource.namespace() {
            Some(ns) if resource.namespaced => {
                Api::namespaced_with(self.client.clone(), ns, &resource.api_resource)
            }
            _ => Api::all_with(self.client.clone(), &resource.api_resource),
        }
    }
}

#[async_trait]
impl ClusterApi for KubeClusterApi {
    async fn create(&self, resource: &ResolvedResource) -> Result<(), ClusterApiError> {
        self.api_for(resource)
            .create(&PostParams::default(), &resource.object)
            .await?;
        Ok(())
    }

    async fn delete(
        &self,
        resource: &ResolvedResource,
        name: &str,
        params: &DeleteParams,
    ) -> Result<(), ClusterApiError> {
        // Either the object (deletion pending) or a Status; both mean accepted
        self.api_for(resource).delete(name, params).await?;
        Ok(())
    }
}

/// Sends resolved resources to a [`ClusterApi`]
#[derive(Clone)]
pub struct Dispatcher {
    api: Arc<dyn ClusterApi>,
    call_timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn ClusterApi>) -> Self {
        Self {
            api,
            call_timeout: None,
        }
    }

    /// Bound every cluster call by `timeout`
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Apply `action` to a resolved document
    ///
    /// A no-op resolution succeeds without a call. Uninstall uses foreground
    /// propagation so dependents are gone before the owner.
    pub async fn apply(
        &self,
        resolution: &Resolution,
        action: Action,
        cancel: &CancellationToken,
    ) -> Result<(), ResourceError> {
        let resource = match resolution {
            Resolution::NoOp => return Ok(()),
            Resolution::Resource(resource) => resource.as_ref(),
        };

        tracing::debug!(
            action = %action,
            kind = %resource.gvk.kind,
            resource = %resource.display_name(),
            "dispatching"
        );

        match action {
            Action::Install => self.bounded(self.api.create(resource), cancel).await,
            Action::Uninstall => {
                let name = resource.name().filter(|n| !n.is_empty()).ok_or_else(|| {
                    ResourceError::MissingName {
                        kind: resource.gvk.kind.clone(),
                    }
                })?;
                let params = DeleteParams::foreground();
                self.bounded(self.api.delete(resource, name, &params), cancel)
                    .await
            }
        }
    }

    async fn bounded<F>(&self, call: F, cancel: &CancellationToken) -> Result<(), ResourceError>
    where
        F: Future<Output = Result<(), ClusterApiError>>,
    {
        let limited = async {
            match self.call_timeout {
                Some(limit) => tokio::time::timeout(limit, call)
                    .await
                    .map_err(|_| ResourceError::Timeout(limit))?
                    .map_err(ResourceError::from),
                None => call.await.map_err(ResourceError::from),
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ResourceError::Cancelled),
            result = limited => result,
        }
    }
}
