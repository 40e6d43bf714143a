//! Extension manifest definition and loading

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Default manifest file name inside an extension directory
pub const MANIFEST_FILE: &str = "manifest.yaml";

/// Directory holding Kubernetes resource templates
pub const RESOURCES_DIR: &str = "k8s";

/// Directory holding the Helm chart of a `helm` extension
pub const HELM_CHART_DIR: &str = "helm";

/// Directory holding the module of a `terraform` extension
pub const TERRAFORM_MODULE_DIR: &str = "terraform-module";

/// An extension manifest (`manifest.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionManifest {
    /// Extension name
    pub name: String,

    /// Human readable description
    #[serde(default)]
    pub description: String,

    /// How the extension is installed
    #[serde(rename = "type")]
    pub extension_type: ExtensionType,

    /// Extension version
    #[serde(default)]
    pub version: String,

    /// Extension author
    #[serde(default)]
    pub author: String,

    /// Declared inputs, in declaration order
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
}

/// Installation mechanism of an extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExtensionType {
    /// Templated Kubernetes manifests under `k8s/`
    Kubernetes,
    /// A Helm chart under `helm/`
    Helm,
    /// A Terraform module under `terraform-module/`
    Terraform,
}

impl ExtensionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kubernetes => "k8s",
            Self::Helm => "helm",
            Self::Terraform => "terraform",
        }
    }
}

impl fmt::Display for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtensionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "k8s" => Ok(Self::Kubernetes),
            "helm" => Ok(Self::Helm),
            "terraform" => Ok(Self::Terraform),
            other => Err(CoreError::UnsupportedType(other.to_string())),
        }
    }
}

impl TryFrom<String> for ExtensionType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ExtensionType> for String {
    fn from(value: ExtensionType) -> Self {
        value.as_str().to_string()
    }
}

/// A declared extension input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSpec {
    /// Input name, as referenced by templates
    pub name: String,

    /// Declared type (informational)
    #[serde(rename = "type", default)]
    pub input_type: String,

    /// Whether a value must be supplied
    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub description: String,

    /// Value used when the input is optional and not supplied
    #[serde(default)]
    pub default: Option<JsonValue>,
}

impl ExtensionManifest {
    /// Parse a manifest from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let manifest: ExtensionManifest = serde_yaml::from_str(yaml)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load a manifest from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidManifest {
                message: "name must not be empty".to_string(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for input in &self.inputs {
            if !seen.insert(input.name.as_str()) {
                return Err(CoreError::InvalidManifest {
                    message: format!("input '{}' is declared more than once", input.name),
                });
            }
        }

        Ok(())
    }
}

/// An extension directory together with its parsed manifest
#[derive(Debug, Clone)]
pub struct LoadedExtension {
    /// Parsed manifest
    pub manifest: ExtensionManifest,

    /// Extension root directory
    pub root: PathBuf,
}

impl LoadedExtension {
    /// Load an extension from a directory, reading `manifest_file` relative to it
    pub fn load<P: AsRef<Path>>(path: P, manifest_file: &str) -> Result<Self> {
        let root = path.as_ref().to_path_buf();

        if !root.is_dir() {
            return Err(CoreError::ExtensionNotFound {
                path: root.display().to_string(),
            });
        }

        let manifest_path = root.join(manifest_file);
        if !manifest_path.exists() {
            return Err(CoreError::InvalidManifest {
                message: format!("{} not found in {}", manifest_file, root.display()),
            });
        }

        let manifest = ExtensionManifest::from_file(&manifest_path)?;

        Ok(Self { manifest, root })
    }

    pub fn helm_chart_dir(&self) -> PathBuf {
        self.root.join(HELM_CHART_DIR)
    }

    pub fn terraform_module_dir(&self) -> PathBuf {
        self.root.join(TERRAFORM_MODULE_DIR)
    }
}
