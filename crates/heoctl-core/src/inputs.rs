//! Input collection and resolution
//!
//! Inputs reach an extension from two places:
//! - `--input key=value,other=value` on the command line
//! - `EXT_<NAME>=<value>` environment variables
//!
//! They are then resolved against the manifest: only declared inputs are kept,
//! user values win over defaults, and missing required inputs are reported together.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::{CoreError, Result};
use crate::manifest::ExtensionManifest;

/// Prefix of environment variables that carry inputs
pub const ENV_INPUT_PREFIX: &str = "EXT_";

/// Raw user-supplied inputs, before resolution
pub type UserInputs = IndexMap<String, String>;

/// Parse `key=value` pairs separated by commas
///
/// Pairs that do not split into exactly one key and one value are ignored.
pub fn parse_input_pairs(raw: &str) -> UserInputs {
    let mut inputs = UserInputs::new();

    if raw.is_empty() {
        return inputs;
    }

    for pair in raw.split(',') {
        let parts: Vec<&str> = pair.split('=').collect();
        if let [key, value] = parts.as_slice() {
            inputs.insert((*key).to_string(), (*value).to_string());
        }
    }

    inputs
}

/// Collect inputs from `EXT_`-prefixed variables
///
/// Takes the variables as an iterator so callers can pass `std::env::vars()`.
pub fn inputs_from_env<I>(vars: I) -> UserInputs
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(ENV_INPUT_PREFIX)
                .filter(|name| !name.is_empty())
                .map(|name| (name.to_string(), value))
        })
        .collect()
}

/// Merge command-line and environment inputs; environment values win
pub fn collect_user_inputs(cli: UserInputs, env: UserInputs) -> UserInputs {
    let mut merged = cli;
    merged.extend(env);
    merged
}

/// Inputs resolved against a manifest, used as the template context
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedInputs(IndexMap<String, JsonValue>);

impl ResolvedInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve user inputs against the inputs declared by `manifest`
    ///
    /// - a user value is used when present
    /// - a required input without a user value is an error
    /// - otherwise the declared default, or an empty string when there is none
    pub fn resolve(manifest: &ExtensionManifest, user: &UserInputs) -> Result<Self> {
        let mut resolved = IndexMap::with_capacity(manifest.inputs.len());
        let mut missing = Vec::new();

        for input in &manifest.inputs {
            if let Some(value) = user.get(&input.name) {
                resolved.insert(input.name.clone(), JsonValue::String(value.clone()));
            } else if input.required {
                missing.push(input.name.clone());
            } else {
                let default = input
                    .default
                    .clone()
                    .unwrap_or_else(|| JsonValue::String(String::new()));
                resolved.insert(input.name.clone(), default);
            }
        }

        if !missing.is_empty() {
            return Err(CoreError::MissingInputs(missing));
        }

        Ok(Self(resolved))
    }

    /// Set a value directly
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.0.get(name)
    }

    /// Input names, in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over name/value pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Render each value as a plain string (for `--set` / `-var` style flags)
    pub fn to_string_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for ResolvedInputs {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> ExtensionManifest {
        ExtensionManifest::from_yaml(
            r#"
name: demo
type: k8s
inputs:
  - name: replicas
    default: "1"
  - name: domain
    required: true
  - name: tag
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_input_pairs() {
        let inputs = parse_input_pairs("replicas=3,domain=example.com");
        assert_eq!(inputs.get("replicas").unwrap(), "3");
        assert_eq!(inputs.get("domain").unwrap(), "example.com");
    }

    #[test]
    fn test_parse_input_pairs_ignores_malformed() {
        let inputs = parse_input_pairs("ok=1,novalue,a=b=c,=x");
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs.get("ok").unwrap(), "1");
        assert_eq!(inputs.get("").unwrap(), "x");
        assert!(parse_input_pairs("").is_empty());
    }

    #[test]
    fn test_inputs_from_env() {
        let vars = vec![
            ("EXT_domain".to_string(), "env.example.com".to_string()),
            ("HOME".to_string(), "/root".to_string()),
            ("EXT_".to_string(), "ignored".to_string()),
        ];
        let inputs = inputs_from_env(vars);
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs.get("domain").unwrap(), "env.example.com");
    }

    #[test]
    fn test_environment_wins_over_flags() {
        let cli = parse_input_pairs("domain=cli.example.com,replicas=2");
        let env = inputs_from_env(vec![(
            "EXT_domain".to_string(),
            "env.example.com".to_string(),
        )]);

        let merged = collect_user_inputs(cli, env);
        assert_eq!(merged.get("domain").unwrap(), "env.example.com");
        assert_eq!(merged.get("replicas").unwrap(), "2");
    }

    #[test]
    fn test_resolve_uses_user_value_then_default() {
        let user = parse_input_pairs("replicas=3,domain=example.com,undeclared=x");
        let resolved = ResolvedInputs::resolve(&manifest(), &user).unwrap();

        assert_eq!(resolved.get("replicas").unwrap(), "3");
        assert_eq!(resolved.get("domain").unwrap(), "example.com");
        assert_eq!(resolved.get("tag").unwrap(), "");
        assert!(resolved.get("undeclared").is_none());
        assert_eq!(
            resolved.names().collect::<Vec<_>>(),
            vec!["replicas", "domain", "tag"]
        );
    }

    #[test]
    fn test_resolve_applies_default() {
        let user = parse_input_pairs("domain=example.com");
        let resolved = ResolvedInputs::resolve(&manifest(), &user).unwrap();
        assert_eq!(resolved.get("replicas").unwrap(), "1");
    }

    #[test]
    fn test_resolve_reports_missing_required() {
        let err = ResolvedInputs::resolve(&manifest(), &UserInputs::new()).unwrap_err();
        match err {
            CoreError::MissingInputs(names) => assert_eq!(names, vec!["domain"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_to_string_pairs() {
        let mut inputs = ResolvedInputs::new();
        inputs.insert("replicas", 3);
        inputs.insert("name", "web");

        assert_eq!(
            inputs.to_string_pairs(),
            vec![
                ("replicas".to_string(), "3".to_string()),
                ("name".to_string(), "web".to_string())
            ]
        );
    }
}
