//! Template renderer based on MiniJinja
//!
//! Templates see the resolved inputs as their only top-level variables:
//! `replicas: {{ replicas }}`. Go-style field references (`{{ .replicas }}`)
//! are rewritten to the same form when `dot_fields` is enabled.

use heoctl_core::ResolvedInputs;
use minijinja::Environment;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

use crate::error::{EngineError, Result, TemplateError, TemplateErrorKind, TemplatePhase};
use crate::filters;
use crate::suggestions;

/// `{{ .field` / `{{- .field` at the start of an expression
static DOT_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\{\{-?\s*)\.([A-Za-z_])").expect("valid regex"));

/// Rendering options
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Accept `{{ .name }}` as an alias of `{{ name }}`
    pub dot_fields: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { dot_fields: true }
    }
}

/// Renderer builder
#[derive(Debug, Default)]
pub struct RendererBuilder {
    options: RenderOptions,
}

impl RendererBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable Go-style `{{ .field }}` references
    pub fn dot_fields(mut self, enabled: bool) -> Self {
        self.options.dot_fields = enabled;
        self
    }

    /// Build the renderer
    pub fn build(self) -> Renderer {
        Renderer::new(self.options)
    }
}

/// The template renderer
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn builder() -> RendererBuilder {
        RendererBuilder::new()
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Create a configured MiniJinja environment
    fn create_environment(&self) -> Environment<'static> {
        let mut env = Environment::new();

        // A missing input is an execution error, never an empty string
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);

        env.add_filter("quote", filters::quote);
        env.add_filter("squote", filters::squote);
        env.add_filter("b64encode", filters::b64encode);
        env.add_filter("b64decode", filters::b64decode);
        env.add_filter("indent", filters::indent);
        env.add_filter("nindent", filters::nindent);
        env.add_filter("toyaml", filters::toyaml);
        env.add_filter("tojson", filters::tojson);

        env
    }

    fn preprocess<'a>(&self, source: &'a str) -> Cow<'a, str> {
        if self.options.dot_fields {
            DOT_FIELD.replace_all(source, "$1$2")
        } else {
            Cow::Borrowed(source)
        }
    }

    /// Render template source against the inputs
    pub fn render_str(
        &self,
        source: &str,
        template_name: &str,
        inputs: &ResolvedInputs,
    ) -> Result<String> {
        let source = self.preprocess(source);
        let mut env = self.create_environment();

        env.add_template_owned(template_name.to_string(), source.to_string())
            .map_err(|e| {
                TemplateError::from_minijinja(e, TemplatePhase::Parse, template_name, &source)
            })?;

        let tmpl = env.get_template(template_name).map_err(|e| {
            TemplateError::from_minijinja(e, TemplatePhase::Parse, template_name, &source)
        })?;

        tmpl.render(inputs).map_err(|e| {
            let line = e.line();
            let mut error =
                TemplateError::from_minijinja(e, TemplatePhase::Exec, template_name, &source);

            if error.kind == TemplateErrorKind::UndefinedInput {
                let names: Vec<&str> = inputs.names().collect();
                let hint = line
                    .and_then(|n| source.lines().nth(n.saturating_sub(1)))
                    .and_then(|text| suggestions::suggest_undefined_input(text, &names));
                if let Some(hint) = hint {
                    error = error.with_suggestion(hint);
                }
            }

            EngineError::Template(error)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> ResolvedInputs {
        [("replicas", "3"), ("image", "nginx:1.25")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_render_simple() {
        let renderer = Renderer::default();
        let result = renderer
            .render_str("replicas: {{ replicas }}", "test.yaml", &inputs())
            .unwrap();

        assert_eq!(result, "replicas: 3");
    }

    #[test]
    fn test_render_go_style_fields() {
        let renderer = Renderer::default();
        let result = renderer
            .render_str("image: {{ .image }}\nn: {{- .replicas }}", "t.yaml", &inputs())
            .unwrap();

        assert_eq!(result, "image: nginx:1.25\nn:3");
    }

    #[test]
    fn test_dot_fields_disabled() {
        let renderer = Renderer::builder().dot_fields(false).build();
        let err = renderer
            .render_str("image: {{ .image }}", "t.yaml", &inputs())
            .unwrap_err();

        match err {
            EngineError::Template(e) => assert_eq!(e.phase, TemplatePhase::Parse),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = Renderer::default();
        let template = "a: {{ replicas }}\nb: {{ image | quote }}\n";

        let first = renderer.render_str(template, "t.yaml", &inputs()).unwrap();
        let second = renderer.render_str(template, "t.yaml", &inputs()).unwrap();

        assert_eq!(first.as_bytes(), second.as_bytes());
        assert!(first.ends_with('\n'));
    }

    #[test]
    fn test_syntax_error_is_parse_phase() {
        let renderer = Renderer::default();
        let err = renderer
            .render_str("a: {{ replicas ", "broken.yaml", &inputs())
            .unwrap_err();

        match err {
            EngineError::Template(e) => {
                assert_eq!(e.phase, TemplatePhase::Parse);
                assert_eq!(e.kind, TemplateErrorKind::SyntaxError);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_input_is_exec_phase_with_hint() {
        let renderer = Renderer::default();
        let err = renderer
            .render_str("a: 1\nreplicas: {{ replicaz }}", "t.yaml", &inputs())
            .unwrap_err();

        match err {
            EngineError::Template(e) => {
                assert_eq!(e.phase, TemplatePhase::Exec);
                assert_eq!(e.kind, TemplateErrorKind::UndefinedInput);
                assert_eq!(e.suggestion.as_deref(), Some("Did you mean `replicas`?"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_implicit_globals() {
        let renderer = Renderer::default();
        assert!(renderer
            .render_str("{{ values.replicas }}", "t.yaml", &inputs())
            .is_err());
    }
}
