//! # Mathboard Core
//!
//! Notation normalization for machine-generated math explanations.
//!
//! ## Overview
//!
//! A language model writes each explanation step as prose plus a math fragment,
//! in LaTeX or in MathML, with little regard for delimiters, line structure or
//! the MathML grammar. This crate turns each fragment into text a renderer can
//! display, and reports what it had to fix.
//!
//! Every entry point is a pure function over `&str` and an [`EngineConfig`].
//! Rule tables are immutable statics, so the engine can be called from any
//! number of threads at once. Malformed math never produces an error value:
//! the result is the best text available plus [`Diagnostic`]s.
//!
//! ## Modules
//!
//! - [`router`] - classification and dispatch of a step's math
//! - [`latex`] - the LaTeX pipeline ([`delimiters`], [`placeholder`], [`align`], [`cosmetic`])
//! - [`math_validator`] - balance, arity and vocabulary checks for LaTeX
//! - [`mathml`] - validation, repair and sanitizing of presentation MathML
//! - [`transliterate`] - LaTeX to MathML
//! - [`phrasebook`] - plain-English phrases to LaTeX
//! - [`emission`] - display records for generation steps
//!
//! ## Examples
//!
//! ### Normalizing LaTeX
//!
//! ```
//! use mathboard_core::{route, EngineConfig};
//!
//! let blob = route(r"$$a = b \\ = c$$", &EngineConfig::default());
//! assert_eq!(blob.normalized, r"\[\begin{align*} a = b \\ & = c \end{align*}\]");
//! assert!(blob.is_valid);
//! ```
//!
//! ### Repairing MathML
//!
//! ```
//! use mathboard_core::{route, EngineConfig};
//!
//! let blob = route("<math><mfrac><mn>1</mn><mn>2</mn></mfrac></math>", &EngineConfig::default());
//! assert!(blob.is_valid);
//! assert_eq!(
//!     blob.normalized,
//!     "<math xmlns=\"http://www.w3.org/1998/Math/MathML\">\
//!      <mfrac><mrow><mn>1</mn></mrow><mrow><mn>2</mn></mrow></mfrac></math>"
//! );
//! ```

pub mod align;
pub mod blob;
pub mod config;
pub mod cosmetic;
pub mod delimiters;
pub mod diagnostic;
pub mod emission;
pub mod error;
pub mod latex;
pub mod math_validator;
pub mod mathml;
pub mod phrasebook;
pub mod placeholder;
pub mod router;
pub mod rules;
pub mod transliterate;

pub use blob::{NotationBlob, NotationKind};
pub use config::{ConfigError, EngineConfig, FallbackPolicy};
pub use diagnostic::{Diagnostic, DiagnosticCategory, ErrorClass};
pub use emission::{error_record, render_step, render_steps, Step, StepRecord};
pub use error::StageError;
pub use latex::normalize_latex;
pub use mathml::process_mathml;
pub use router::route;
pub use transliterate::latex_to_mathml;
