//! Presentation MathML handling.
//!
//! ## Pipeline
//!
//! ```text
//! sanitize -> validate -> (valid?) done
//!                      -> repair -> validate -> (valid?) done
//!                                            -> fallback policy
//! ```
//!
//! Repair runs at most once per fragment. Whatever is still wrong after it is
//! reported through the blob's diagnostics, never raised.
//!
//! ## Modules
//!
//! - [`tree`] - owned element tree over `roxmltree`
//! - [`grammar`] - content models and required attributes
//! - [`validator`] - [`MathmlValidator`] and [`Validation`]
//! - [`repair`] - structural repair
//! - [`sanitize`] - removal of annotations, actions and event handlers
//! - [`report`] - parsing of external validator output
//! - `remote` - online grammar check (feature `remote-validator`)

pub mod grammar;
pub mod repair;
pub mod report;
pub mod sanitize;
pub mod tree;
pub mod validator;

#[cfg(feature = "remote-validator")]
pub mod remote;

pub use grammar::MATHML_NS;
pub use validator::{MathmlValidator, Validation};

use crate::blob::{NotationBlob, NotationKind};
use crate::config::{EngineConfig, FallbackPolicy};
use once_cell::sync::Lazy;
use regex::Regex;

/// Emitted in place of MathML the pipeline could not make valid.
pub const MATHML_SENTINEL: &str = "<math xmlns=\"http://www.w3.org/1998/Math/MathML\"><merror><mtext>Error processing math request</mtext></merror></math>";

static MATH_START_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<math(?:\s[^>]*)?/?>").unwrap());

/// Adds the MathML namespace to the first `<math>` start tag if it has none.
///
/// Works on the text so an already valid fragment keeps its formatting.
pub fn ensure_namespace(text: &str) -> String {
    let Some(tag) = MATH_START_TAG.find(text) else {
        return text.to_string();
    };
    if tag.as_str().contains("xmlns=") {
        return text.to_string();
    }
    let insert_at = tag.start() + "<math".len();
    format!(
        "{} xmlns=\"{}\"{}",
        &text[..insert_at],
        MATHML_NS,
        &text[insert_at..]
    )
}

/// Applies the sanitizer to `text`, returning the rewritten text if anything changed.
pub fn sanitize_text(text: &str) -> Option<String> {
    let mut root = tree::parse(text).ok()?;
    sanitize::sanitize_tree(&mut root).then(|| root.to_xml())
}

/// Runs the full MathML pipeline on one step's math.
pub fn process_mathml(raw: &str, config: &EngineConfig) -> NotationBlob {
    let mut blob = NotationBlob::new(NotationKind::Mathml, raw);
    let validator = MathmlValidator::from_config(config);

    let mut current = raw.to_string();
    if config.sanitize {
        if let Some(clean) = sanitize_text(&current) {
            log::debug!("sanitizer rewrote mathml fragment");
            current = clean;
        }
    }

    let first = validator.validate(&current);
    if first.is_valid {
        blob.normalized = if first.namespace_inserted {
            ensure_namespace(&current)
        } else {
            current
        };
        return blob;
    }

    let (repaired, second) = repair::repair_and_revalidate(&current, &first, &validator);
    if second.is_valid {
        log::debug!("repaired mathml: {}", repaired.actions.join("; "));
        blob.normalized = repaired.text;
        blob.diagnostics = first.diagnostics;
        return blob;
    }

    log::warn!(
        "mathml still invalid after repair ({} diagnostic(s))",
        second.diagnostics.len()
    );
    blob.is_valid = false;
    blob.diagnostics = second.diagnostics;
    blob.normalized = match config.fallback {
        FallbackPolicy::Repaired => repaired.text,
        FallbackPolicy::Original => raw.to_string(),
        FallbackPolicy::Sentinel => MATHML_SENTINEL.to_string(),
    };
    blob
}
