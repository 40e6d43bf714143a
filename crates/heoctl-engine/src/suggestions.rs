//! Fuzzy matching for undefined input references

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum Levenshtein distance to consider for suggestions
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Root identifier of every `{{ ... }}` expression
static EXPRESSION_ROOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{-?\s*([A-Za-z_][A-Za-z0-9_]*)").expect("valid regex"));

/// Find the closest candidates to `input`, best first
pub fn find_closest_matches<'a>(
    input: &str,
    candidates: &[&'a str],
    max_results: usize,
) -> Vec<&'a str> {
    let mut matches: Vec<(usize, &str)> = candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = strsim::levenshtein(input, candidate);
            (distance > 0 && distance <= MAX_SUGGESTION_DISTANCE).then_some((distance, candidate))
        })
        .collect();

    matches.sort_by_key(|(distance, _)| *distance);
    matches.truncate(max_results);
    matches.into_iter().map(|(_, candidate)| candidate).collect()
}

/// Names referenced on `line` that are not among `known`
pub fn unknown_references<'a>(line: &'a str, known: &[&str]) -> Vec<&'a str> {
    EXPRESSION_ROOT
        .captures_iter(line)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .filter(|name| !known.contains(name) && !is_keyword(name))
        .collect()
}

/// Suggest a fix for an undefined input on a given template line
pub fn suggest_undefined_input(line: &str, inputs: &[&str]) -> Option<String> {
    let name = unknown_references(line, inputs).into_iter().next()?;
    let matches = find_closest_matches(name, inputs, 3);

    if matches.is_empty() {
        if inputs.is_empty() {
            Some(format!(
                "`{}` is not a declared input; this extension declares no inputs",
                name
            ))
        } else {
            Some(format!(
                "`{}` is not a declared input. Available: {}",
                name,
                inputs.join(", ")
            ))
        }
    } else {
        let quoted: Vec<String> = matches.iter().map(|m| format!("`{}`", m)).collect();
        Some(format!("Did you mean {}?", quoted.join(" or ")))
    }
}

fn is_keyword(name: &str) -> bool {
    matches!(name, "true" | "false" | "none" | "None" | "not" | "loop")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_closest_matches() {
        let matches = find_closest_matches("replica", &["replicas", "domain", "image"], 3);
        assert_eq!(matches, vec!["replicas"]);
    }

    #[test]
    fn test_exact_match_is_not_a_suggestion() {
        assert!(find_closest_matches("domain", &["domain"], 3).is_empty());
    }

    #[test]
    fn test_unknown_references() {
        let line = "replicas: {{ replcas }} image: {{- image | quote }}";
        assert_eq!(unknown_references(line, &["image"]), vec!["replcas"]);
    }

    #[test]
    fn test_suggest_undefined_input() {
        let hint = suggest_undefined_input("  replicas: {{ replcas }}", &["replicas", "image"]);
        assert_eq!(hint.unwrap(), "Did you mean `replicas`?");

        let hint = suggest_undefined_input("x: {{ zzzzzzzz }}", &["replicas"]);
        assert!(hint.unwrap().contains("Available: replicas"));

        assert!(suggest_undefined_input("x: 1", &["replicas"]).is_none());
    }
}
