//! Input document types.

use serde::{Deserialize, Serialize};

/// One scientific paper, already converted to plain text by an upstream
/// PDF/OCR backend. The pipeline treats the text as opaque immutable input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// Stable document identifier (file stem for filesystem-loaded papers).
    pub id: String,
    /// Human-readable name. Usually equals `id`.
    pub name: String,
    /// Main publication text.
    pub publication_text: String,
    /// Supporting-information text. Empty string when the paper has none.
    #[serde(default)]
    pub si_text: String,
}

impl Paper {
    /// Build a paper where the name doubles as the identifier.
    #[must_use]
    pub fn new(id: impl Into<String>, publication_text: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            publication_text: publication_text.into(),
            si_text: String::new(),
        }
    }

    /// Attach supporting-information text.
    #[must_use]
    pub fn with_si_text(mut self, si_text: impl Into<String>) -> Self {
        self.si_text = si_text.into();
        self
    }
}
