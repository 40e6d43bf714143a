//! Resource resolution
//!
//! Turns one YAML document into a [`DynamicObject`] plus the REST resource
//! that serves its kind, and settles the namespace the call will target.

use kube::{
    api::DynamicObject,
    core::{GroupVersionKind, TypeMeta},
    discovery::ApiResource,
};
use serde_json::Value as JsonValue;

use crate::error::ResourceError;
use crate::mapper::RestMapper;

/// Namespace used when a namespaced object does not name one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Result of resolving a document
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Blank document; nothing to send
    NoOp,
    Resource(Box<ResolvedResource>),
}

/// A document bound to the cluster resource that serves it
#[derive(Debug, Clone)]
pub struct ResolvedResource {
    pub gvk: GroupVersionKind,
    pub api_resource: ApiResource,
    pub namespaced: bool,
    /// The object, with its namespace already settled
    pub object: DynamicObject,
}

impl ResolvedResource {
    pub fn name(&self) -> Option<&str> {
        self.object.metadata.name.as_deref()
    }

    /// Target namespace; always `None` for cluster-scoped kinds
    pub fn namespace(&self) -> Option<&str> {
        self.object.metadata.namespace.as_deref()
    }

    pub fn plural(&self) -> &str {
        &self.api_resource.plural
    }

    /// Get display name for logging
    pub fn display_name(&self) -> String {
        let name = self.name().unwrap_or("unnamed");
        match self.namespace() {
            Some(ns) => format!("{}/{}/{}", ns, self.gvk.kind, name),
            None => format!("{}/{}", self.gvk.kind, name),
        }
    }
}

/// Resolve a normalised document against the mapper
pub fn resolve(document: &str, mapper: &dyn RestMapper) -> Result<Resolution, ResourceError> {
    if document.trim().is_empty() {
        return Ok(Resolution::NoOp);
    }

    let value: JsonValue = serde_yaml::from_str(document)
        .map_err(|e| ResourceError::InvalidObject(e.to_string()))?;
    if value.is_null() {
        return Ok(Resolution::NoOp);
    }
    if !value.is_object() {
        return Err(ResourceError::InvalidObject(
            "expected a mapping at the document root".to_string(),
        ));
    }

    let mut object: DynamicObject = serde_json::from_value(value)
        .map_err(|e| ResourceError::InvalidObject(e.to_string()))?;

    let type_meta = object
        .types
        .as_ref()
        .filter(|tm| !tm.api_version.is_empty() && !tm.kind.is_empty())
        .ok_or_else(|| ResourceError::InvalidObject("missing apiVersion or kind".to_string()))?;

    let gvk = gvk_from_type_meta(type_meta);

    let mapping = mapper
        .resolve(&gvk)
        .ok_or_else(|| ResourceError::UnknownKind {
            api_version: type_meta.api_version.clone(),
            kind: type_meta.kind.clone(),
        })?;

    if mapping.namespaced {
        if object.metadata.namespace.as_deref().is_none_or(str::is_empty) {
            object.metadata.namespace = Some(DEFAULT_NAMESPACE.to_string());
        }
    } else {
        object.metadata.namespace = None;
    }

    Ok(Resolution::Resource(Box::new(ResolvedResource {
        gvk,
        api_resource: mapping.api_resource,
        namespaced: mapping.namespaced,
        object,
    })))
}

/// Convert TypeMeta to GroupVersionKind
///
/// - "apps/v1" -> group="apps", version="v1"
/// - "v1" -> group="", version="v1" (core API)
pub fn gvk_from_type_meta(tm: &TypeMeta) -> GroupVersionKind {
    let (group, version) = match tm.api_version.rsplit_once('/') {
        Some((g, v)) => (g.to_string(), v.to_string()),
        None => (String::new(), tm.api_version.clone()),
    };

    GroupVersionKind {
        group,
        version,
        kind: tm.kind.clone(),
    }
}

/// Kind and name read from a document, whatever state it is in
///
/// Used to label outcomes of documents that never resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectIdentity {
    pub kind: Option<String>,
    pub name: Option<String>,
}

impl ObjectIdentity {
    pub fn peek(document: &str) -> Self {
        let Ok(value) = serde_yaml::from_str::<serde_yaml::Value>(document) else {
            return Self::default();
        };

        let text = |v: Option<&serde_yaml::Value>| v.and_then(|v| v.as_str()).map(str::to_string);

        Self {
            kind: text(value.get("kind")),
            name: text(value.get("metadata").and_then(|m| m.get("name"))),
        }
    }
}
