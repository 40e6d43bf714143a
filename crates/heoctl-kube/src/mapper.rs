//! Kind to REST resource mapping
//!
//! The API server's discovery endpoints are read once per run and every
//! document is resolved against that snapshot. Group versions that fail to
//! answer (an aggregated API whose backend is down, say) are logged and left
//! out; only a snapshot with nothing in it is an error.

use futures::stream::{self, StreamExt};
use kube::{
    Client,
    core::{GroupVersion, GroupVersionKind},
    discovery::{self, ApiCapabilities, ApiResource, Scope},
};
use std::collections::HashMap;

use crate::error::{KubeError, Result};

/// Group versions queried at once during discovery
const DISCOVERY_CONCURRENCY: usize = 8;

/// REST resource and scope for a group/version/kind
#[derive(Debug, Clone)]
pub struct ResourceMapping {
    pub api_resource: ApiResource,
    pub namespaced: bool,
}

/// Resolve a GVK to the REST resource that serves it
pub trait RestMapper: Send + Sync {
    /// `None` when the cluster does not serve the kind
    fn resolve(&self, gvk: &GroupVersionKind) -> Option<ResourceMapping>;
}

pub(crate) type MappingKey = (String, String, String);

pub(crate) fn mapping_key(gvk: &GroupVersionKind) -> MappingKey {
    (gvk.group.clone(), gvk.version.clone(), gvk.kind.clone())
}

/// Resources of one group version, or why they could not be listed
pub type GroupVersionResources =
    std::result::Result<Vec<(ApiResource, ApiCapabilities)>, kube::Error>;

/// Mapper backed by a discovery snapshot
#[derive(Debug, Clone, Default)]
pub struct DiscoveryMapper {
    entries: HashMap<MappingKey, ResourceMapping>,
}

impl DiscoveryMapper {
    /// Query every group version the cluster advertises
    pub async fn discover(client: Client) -> Result<Self> {
        let core = client
            .list_core_api_versions()
            .await
            .map_err(KubeError::Discovery)?;
        let groups = client
            .list_api_groups()
            .await
            .map_err(KubeError::Discovery)?;

        let mut versions: Vec<GroupVersion> = core
            .versions
            .iter()
            .map(|v| GroupVersion::gv("", v))
            .collect();
        for group in &groups.groups {
            versions.extend(
                group
                    .versions
                    .iter()
                    .map(|v| GroupVersion::gv(&group.name, &v.version)),
            );
        }

        let results: Vec<(GroupVersion, GroupVersionResources)> = stream::iter(versions)
            .map(|gv| {
                let client = client.clone();
                async move {
                    let resources = discovery::pinned_group(&client, &gv)
                        .await
                        .map(|group| group.versioned_resources(&gv.version));
                    (gv, resources)
                }
            })
            .buffer_unordered(DISCOVERY_CONCURRENCY)
            .collect()
            .await;

        Self::from_results(results)
    }

    /// Build the table from per group version discovery results
    ///
    /// Failed group versions are skipped; if every one failed the last
    /// error is returned.
    pub fn from_results<I>(results: I) -> Result<Self>
    where
        I: IntoIterator<Item = (GroupVersion, GroupVersionResources)>,
    {
        let mut entries = HashMap::new();
        let mut answered = 0usize;
        let mut last_error = None;

        for (gv, result) in results {
            match result {
                Ok(resources) => {
                    answered += 1;
                    for (api_resource, caps) in resources {
                        let gvk = GroupVersionKind::gvk(
                            &api_resource.group,
                            &api_resource.version,
                            &api_resource.kind,
                        );
                        entries.insert(
                            mapping_key(&gvk),
                            ResourceMapping {
                                api_resource,
                                namespaced: caps.scope == Scope::Namespaced,
                            },
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        group_version = %gv.api_version(),
                        error = %e,
                        "skipping unavailable API group"
                    );
                    last_error = Some(e);
                }
            }
        }

        match (answered, last_error) {
            (0, Some(e)) => Err(KubeError::Discovery(e)),
            _ => {
                tracing::debug!(resources = entries.len(), groups = answered, "discovered API resources");
                Ok(Self { entries })
            }
        }
    }
}

impl RestMapper for DiscoveryMapper {
    fn resolve(&self, gvk: &GroupVersionKind) -> Option<ResourceMapping> {
        self.entries.get(&mapping_key(gvk)).cloned()
    }
}
