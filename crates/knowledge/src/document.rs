//! Retrieved document type shared by the retriever and the workflow.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A span of text plus free-form metadata.
///
/// Indexed documents always carry a `source` attribute; documents
/// synthesized from web search results carry none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,

    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    /// Document without metadata.
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Map::new(),
        }
    }

    /// Document with a `source` attribute.
    pub fn with_source(page_content: impl Into<String>, source: impl Into<String>) -> Self {
        let mut doc = Self::new(page_content);
        doc.metadata
            .insert("source".to_string(), Value::String(source.into()));
        doc
    }

    /// The `source` attribute, if present and a string.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(Value::as_str)
    }
}
