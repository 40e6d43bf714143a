//! heoctl Engine - templating and document splitting for extension manifests
//!
//! This crate provides:
//! - A MiniJinja-based renderer whose only context is the resolved inputs
//! - Kubernetes-oriented filters (quote, b64encode, nindent, toyaml, ...)
//! - A multi-document YAML splitter that isolates malformed documents

pub mod error;
pub mod filters;
pub mod renderer;
pub mod split;
pub mod suggestions;

pub use error::{EngineError, Result, TemplateError, TemplateErrorKind, TemplatePhase};
pub use renderer::{RenderOptions, Renderer, RendererBuilder};
pub use split::{Document, DocumentError, split_documents};
