use crate::diagnostic::Diagnostic;
use serde::{Deserialize, Serialize};

/// Which notation a blob was routed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotationKind {
    Latex,
    Mathml,
}

/// One step's math text, before and after normalization.
///
/// A blob is created per explanation step and consumed by the emission that
/// carries it; nothing holds on to it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotationBlob {
    pub kind: NotationKind,
    pub raw: String,
    pub normalized: String,
    pub is_valid: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl NotationBlob {
    pub fn new(kind: NotationKind, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            kind,
            normalized: raw.clone(),
            raw,
            is_valid: true,
            diagnostics: Vec::new(),
        }
    }

    /// Returns true if normalization changed the text.
    pub fn was_rewritten(&self) -> bool {
        self.raw != self.normalized
    }
}
