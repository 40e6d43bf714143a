//! Multi-document YAML splitting
//!
//! A rendered file may hold several resources separated by `---`. Each
//! document is decoded on its own and re-encoded from its structure, so a
//! malformed document only affects itself: it comes back as an error entry
//! and the documents around it are still returned.

use thiserror::Error;

/// A document that could not be decoded
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to decode YAML document {ordinal}: {message}")]
pub struct DocumentError {
    /// Position of the document within its file (0-based)
    pub ordinal: usize,
    /// Decoder message
    pub message: String,
}

/// One document of a multi-document stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Position within the file (0-based)
    pub ordinal: usize,
    /// Normalised YAML, empty for blank or comment-only documents
    pub body: Result<String, DocumentError>,
}

impl Document {
    /// True when the document carries nothing to apply
    pub fn is_empty(&self) -> bool {
        matches!(&self.body, Ok(text) if text.trim().is_empty())
    }
}

/// Split a YAML stream into normalised documents, in order
pub fn split_documents(input: &str) -> Vec<Document> {
    split_raw(input)
        .into_iter()
        .enumerate()
        .map(|(ordinal, raw)| Document {
            ordinal,
            body: normalize(&raw).map_err(|message| {
                tracing::warn!(ordinal, error = %message, "failed to decode YAML document");
                DocumentError { ordinal, message }
            }),
        })
        .collect()
}

/// Split on document markers, keeping the raw text of each document
fn split_raw(input: &str) -> Vec<String> {
    let mut documents: Vec<String> = Vec::new();
    let mut current = String::new();
    // The current document was opened by a `---` marker
    let mut opened = false;

    for line in input.lines() {
        if let Some(rest) = document_start(line) {
            if opened || !is_blank(&current) {
                documents.push(std::mem::take(&mut current));
            }
            current.clear();
            opened = true;

            let rest = rest.trim();
            if !rest.is_empty() && !rest.starts_with('#') {
                current.push_str(rest);
                current.push('\n');
            }
            continue;
        }

        // `...` closes the document; a bare one may follow without `---`
        if is_document_end(line) {
            if opened || !is_blank(&current) {
                documents.push(std::mem::take(&mut current));
            }
            current.clear();
            opened = false;
            continue;
        }

        current.push_str(line);
        current.push('\n');
    }

    // Trailing blank text after the last marker is not a document
    if !is_blank(&current) {
        documents.push(current);
    }

    documents
}

/// Content following a `---` marker, if `line` starts a document
fn document_start(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("---")?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

fn is_document_end(line: &str) -> bool {
    line.strip_prefix("...")
        .is_some_and(|rest| rest.trim().is_empty() || rest.trim_start().starts_with('#'))
}

/// Blank or comment-only text
fn is_blank(text: &str) -> bool {
    text.lines().all(|l| {
        let l = l.trim();
        l.is_empty() || l.starts_with('#')
    })
}

/// Decode and re-encode one document
fn normalize(raw: &str) -> Result<String, String> {
    if is_blank(raw) {
        return Ok(String::new());
    }

    let value: serde_yaml::Value = serde_yaml::from_str(raw).map_err(|e| e.to_string())?;
    if value.is_null() {
        return Ok(String::new());
    }

    serde_yaml::to_string(&value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bodies(docs: &[Document]) -> Vec<String> {
        docs.iter()
            .map(|d| d.body.clone().unwrap_or_else(|e| format!("ERR {}", e.ordinal)))
            .collect()
    }

    #[test]
    fn test_split_preserves_count_and_order() {
        let input = "kind: A\n---\nkind: B\n---\nkind: C\n";
        let docs = split_documents(input);

        assert_eq!(docs.len(), 3);
        assert_eq!(bodies(&docs), vec!["kind: A\n", "kind: B\n", "kind: C\n"]);
        assert_eq!(
            docs.iter().map(|d| d.ordinal).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_leading_and_trailing_markers() {
        let input = "---\nkind: A\n---\n";
        let docs = split_documents(input);
        assert_eq!(bodies(&docs), vec!["kind: A\n"]);
    }

    #[test]
    fn test_leading_comment_is_not_a_document() {
        let input = "# generated\n---\nkind: A\n";
        assert_eq!(split_documents(input).len(), 1);
    }

    #[test]
    fn test_empty_document_between_markers_is_kept() {
        let input = "kind: A\n---\n\n---\nkind: B\n";
        let docs = split_documents(input);

        assert_eq!(docs.len(), 3);
        assert!(docs[1].is_empty());
        assert!(!docs[0].is_empty());
    }

    #[test]
    fn test_normalises_formatting() {
        let input = "metadata:   {name: web,   labels: {app: web}}\nkind:    Service\n";
        let docs = split_documents(input);

        assert_eq!(
            docs[0].body.as_deref().unwrap(),
            "metadata:\n  name: web\n  labels:\n    app: web\nkind: Service\n"
        );
    }

    #[test]
    fn test_malformed_document_is_isolated() {
        let input = "kind: A\n---\nkind: [unclosed\n---\nkind: C\n";
        let docs = split_documents(input);

        assert_eq!(docs.len(), 3);
        assert!(docs[0].body.is_ok());
        assert_eq!(docs[1].body.as_ref().unwrap_err().ordinal, 1);
        assert_eq!(docs[2].body.as_deref().unwrap(), "kind: C\n");
    }

    #[test]
    fn test_marker_with_inline_content_and_comment() {
        let input = "--- # first\nkind: A\n--- kind: B\n";
        let docs = split_documents(input);
        assert_eq!(bodies(&docs), vec!["kind: A\n", "kind: B\n"]);
    }

    #[test]
    fn test_document_end_marker() {
        let input = "kind: A\n...\n---\nkind: B\n";
        let docs = split_documents(input);
        assert_eq!(bodies(&docs), vec!["kind: A\n", "kind: B\n"]);
    }

    #[test]
    fn test_bare_document_after_end_marker() {
        let docs = split_documents("kind: A\n...\nkind: B\n");
        assert_eq!(bodies(&docs), vec!["kind: A\n", "kind: B\n"]);
        assert_eq!(docs[1].ordinal, 1);

        let docs = split_documents("kind: A\n...\n# trailer\n");
        assert_eq!(bodies(&docs), vec!["kind: A\n"]);
    }

    #[test]
    fn test_dashes_inside_scalars_are_not_markers() {
        let input = "data:\n  banner: |\n    ----- header -----\nkind: ConfigMap\n";
        let docs = split_documents(input);
        assert_eq!(docs.len(), 1);
        assert!(docs[0].body.is_ok());
    }

    #[test]
    fn test_empty_input() {
        assert!(split_documents("").is_empty());
        assert!(split_documents("\n\n# nothing\n").is_empty());
    }
}
