//! In-memory cluster and REST mapper for testing
//!
//! These stand in for the API server, useful for unit and end-to-end tests
//! without requiring a Kubernetes cluster.

use async_trait::async_trait;
use kube::{
    api::{DeleteParams, PropagationPolicy},
    core::{GroupVersionKind, TypeMeta},
    discovery::ApiResource,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::dispatcher::ClusterApi;
use crate::error::ClusterApiError;
use crate::mapper::{ResourceMapping, RestMapper};
use crate::resolver::{ResolvedResource, gvk_from_type_meta};

/// One call received by [`MockCluster`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// `create` or `delete`
    pub verb: &'static str,
    pub kind: String,
    pub plural: String,
    pub namespace: Option<String>,
    pub name: Option<String>,
    /// Propagation policy of a delete
    pub propagation: Option<PropagationPolicy>,
    /// The object sent with a create
    pub body: Option<serde_json::Value>,
}

/// Recording [`ClusterApi`]
#[derive(Clone, Default)]
pub struct MockCluster {
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// Object name -> error returned for it
    failures: Arc<HashMap<String, ClusterApiError>>,
    latency: Option<Duration>,
}

impl MockCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call for objects called `name`
    pub fn fail_on(mut self, name: impl Into<String>, error: ClusterApiError) -> Self {
        Arc::make_mut(&mut self.failures).insert(name.into(), error);
        self
    }

    /// Delay every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Calls received so far, in arrival order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn calls_with_verb(&self, verb: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.verb == verb)
            .collect()
    }

    async fn handle(&self, call: RecordedCall) -> Result<(), ClusterApiError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let failure = call
            .name
            .as_ref()
            .and_then(|name| self.failures.get(name))
            .cloned();

        self.calls.write().unwrap().push(call);

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClusterApi for MockCluster {
    async fn create(&self, resource: &ResolvedResource) -> Result<(), ClusterApiError> {
        let body = serde_json::to_value(&resource.object).ok();
        self.handle(RecordedCall {
            verb: "create",
            kind: resource.gvk.kind.clone(),
            plural: resource.plural().to_string(),
            namespace: resource.namespace().map(str::to_string),
            name: resource.name().map(str::to_string),
            propagation: None,
            body,
        })
        .await
    }

    async fn delete(
        &self,
        resource: &ResolvedResource,
        name: &str,
        params: &DeleteParams,
    ) -> Result<(), ClusterApiError> {
        self.handle(RecordedCall {
            verb: "delete",
            kind: resource.gvk.kind.clone(),
            plural: resource.plural().to_string(),
            namespace: resource.namespace().map(str::to_string),
            name: Some(name.to_string()),
            propagation: params.propagation_policy.clone(),
            body: None,
        })
        .await
    }
}

/// Fixed table of served kinds
#[derive(Debug, Clone, Default)]
pub struct MockRestMapper {
    entries: HashMap<(String, String, String), ResourceMapping>,
}

impl MockRestMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `kind` of `api_version` as `plural`
    pub fn with_resource(
        mut self,
        api_version: &str,
        kind: &str,
        plural: &str,
        namespaced: bool,
    ) -> Self {
        let gvk = gvk_from_type_meta(&TypeMeta {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
        });
        let mapping = ResourceMapping {
            api_resource: ApiResource::from_gvk_with_plural(&gvk, plural),
            namespaced,
        };
        self.entries.insert(key(&gvk), mapping);
        self
    }

    /// Core kinds used across the tests
    pub fn with_builtins(self) -> Self {
        self.with_resource("v1", "ConfigMap", "configmaps", true)
            .with_resource("v1", "Secret", "secrets", true)
            .with_resource("v1", "Service", "services", true)
            .with_resource("v1", "Namespace", "namespaces", false)
            .with_resource("apps/v1", "Deployment", "deployments", true)
            .with_resource("rbac.authorization.k8s.io/v1", "ClusterRole", "clusterroles", false)
    }
}

fn key(gvk: &GroupVersionKind) -> (String, String, String) {
    (gvk.group.clone(), gvk.version.clone(), gvk.kind.clone())
}

impl RestMapper for MockRestMapper {
    fn resolve(&self, gvk: &GroupVersionKind) -> Option<ResourceMapping> {
        self.entries.get(&key(gvk)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapper_lookup() {
        let mapper = MockRestMapper::new().with_builtins();
        let gvk = GroupVersionKind::gvk("apps", "v1", "Deployment");

        let mapping = mapper.resolve(&gvk).unwrap();
        assert_eq!(mapping.api_resource.plural, "deployments");
        assert!(mapping.namespaced);

        assert!(mapper
            .resolve(&GroupVersionKind::gvk("apps", "v2", "Deployment"))
            .is_none());
    }
}
