//! Engine error types with source-annotated diagnostics

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main engine error type
#[derive(Error, Debug, Diagnostic)]
pub enum EngineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Template(#[from] TemplateError),

    #[error("failed to read template {}: {source}", path.display())]
    #[diagnostic(code(heoctl::template::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Stage of rendering at which a template failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplatePhase {
    /// The template source is not valid template syntax
    Parse,
    /// The template parsed but could not be evaluated against the inputs
    Exec,
}

impl fmt::Display for TemplatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => f.write_str("template parse error"),
            Self::Exec => f.write_str("template execution error"),
        }
    }
}

/// Error kind for categorizing template errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateErrorKind {
    UndefinedInput,
    UnknownFilter,
    UnknownFunction,
    SyntaxError,
    TypeError,
    Other,
}

impl TemplateErrorKind {
    fn from_minijinja(kind: minijinja::ErrorKind) -> Self {
        match kind {
            minijinja::ErrorKind::UndefinedError => Self::UndefinedInput,
            minijinja::ErrorKind::UnknownFilter => Self::UnknownFilter,
            minijinja::ErrorKind::UnknownFunction => Self::UnknownFunction,
            minijinja::ErrorKind::SyntaxError => Self::SyntaxError,
            minijinja::ErrorKind::InvalidOperation
            | minijinja::ErrorKind::NonPrimitive
            | minijinja::ErrorKind::NonKey => Self::TypeError,
            _ => Self::Other,
        }
    }
}

/// Template-specific error with source information
#[derive(Error, Debug, Diagnostic, Clone)]
#[error("{phase}: {message}")]
#[diagnostic(code(heoctl::template::render))]
pub struct TemplateError {
    /// Error message
    pub message: String,

    /// Parse or execution
    pub phase: TemplatePhase,

    /// Error kind for categorization
    pub kind: TemplateErrorKind,

    /// Template source code
    #[source_code]
    pub src: NamedSource<String>,

    /// Error location in source
    #[label("error occurred here")]
    pub span: Option<SourceSpan>,

    /// Suggestion for fixing the error
    #[help]
    pub suggestion: Option<String>,
}

impl TemplateError {
    /// Build from a MiniJinja error
    pub fn from_minijinja(
        err: minijinja::Error,
        phase: TemplatePhase,
        template_name: &str,
        template_source: &str,
    ) -> Self {
        let kind = TemplateErrorKind::from_minijinja(err.kind());
        let span = err
            .line()
            .and_then(|line| calculate_span(template_source, line));

        let message = match err.detail() {
            Some(detail) => format!("{} ({})", err.kind(), detail),
            None => err.kind().to_string(),
        };
        let message = match err.line() {
            Some(line) => format!("{} at {}:{}", message, template_name, line),
            None => message,
        };

        Self {
            message,
            phase,
            kind,
            src: NamedSource::new(template_name, template_source.to_string()),
            span,
            suggestion: None,
        }
    }

    /// Attach a suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Calculate the source span for a given line number
fn calculate_span(source: &str, line_num: usize) -> Option<SourceSpan> {
    let mut offset = 0;

    for (index, line) in source.lines().enumerate() {
        if index + 1 == line_num {
            return Some(SourceSpan::new(offset.into(), line.len()));
        }
        offset += line.len() + 1;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_span() {
        let source = "a: 1\nbb: 2\nccc: 3";
        let span = calculate_span(source, 2).unwrap();
        assert_eq!(span.offset(), 5);
        assert_eq!(span.len(), 5);
        assert!(calculate_span(source, 9).is_none());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(TemplatePhase::Parse.to_string(), "template parse error");
        assert_eq!(TemplatePhase::Exec.to_string(), "template execution error");
    }
}
