//! heoctl Core - Core types for the Kubernetes extension installer
//!
//! This crate provides the foundational types used throughout heoctl:
//! - `ExtensionManifest`: The extension definition (`manifest.yaml`)
//! - `ResolvedInputs`: Input values resolved against the manifest
//! - `CoreError`: Manifest and input errors

pub mod error;
pub mod inputs;
pub mod manifest;

pub use error::{CoreError, Result};
pub use inputs::{
    ENV_INPUT_PREFIX, ResolvedInputs, UserInputs, collect_user_inputs, inputs_from_env,
    parse_input_pairs,
};
pub use manifest::{
    ExtensionManifest, ExtensionType, InputSpec, LoadedExtension, MANIFEST_FILE, RESOURCES_DIR,
};
