//! Turning generation steps into display records.

use crate::blob::NotationKind;
use crate::config::EngineConfig;
use crate::latex::LATEX_SENTINEL;
use crate::router::route;
use serde::{Deserialize, Serialize};

/// One explanation step as produced by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub natural: String,
    #[serde(default)]
    pub math: String,
}

impl Step {
    pub fn new(natural: impl Into<String>, math: impl Into<String>) -> Self {
        Self {
            natural: natural.into(),
            math: math.into(),
        }
    }
}

/// One step as sent to the display.
///
/// Exactly one of `math` and `mathml` is set when the step carries math; both
/// are null for a prose-only step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub natural: String,
    pub math: Option<String>,
    pub mathml: Option<String>,
    pub step_number: usize,
    pub total_steps: usize,
    pub request_id: String,
}

/// Normalizes one step's math and builds its record.
pub fn render_step(
    request_id: &str,
    step: &Step,
    step_number: usize,
    total_steps: usize,
    config: &EngineConfig,
) -> StepRecord {
    let mut record = StepRecord {
        natural: step.natural.clone(),
        math: None,
        mathml: None,
        step_number,
        total_steps,
        request_id: request_id.to_string(),
    };

    if step.math.trim().is_empty() {
        return record;
    }

    let blob = route(&step.math, config);
    for diagnostic in &blob.diagnostics {
        log::debug!(
            "request {} step {}: [{}] {}",
            request_id,
            step_number,
            diagnostic.category.as_str(),
            diagnostic.message
        );
    }

    match blob.kind {
        NotationKind::Latex => record.math = Some(blob.normalized),
        NotationKind::Mathml => record.mathml = Some(blob.normalized),
    }
    record
}

/// Renders every step of a request, numbered from 1.
pub fn render_steps(request_id: &str, steps: &[Step], config: &EngineConfig) -> Vec<StepRecord> {
    let total = steps.len();
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| render_step(request_id, step, i + 1, total, config))
        .collect()
}

/// The single record emitted when a request produced no usable steps.
pub fn error_record(request_id: &str) -> StepRecord {
    StepRecord {
        natural: "Error processing math request".to_string(),
        math: Some(LATEX_SENTINEL.to_string()),
        mathml: None,
        step_number: 1,
        total_steps: 1,
        request_id: request_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    #[test]
    fn test_record_wire_shape() {
        let record = render_step(
            "r-1",
            &Step::new("Halve it.", r"\frac{1}{2}"),
            1,
            2,
            &EngineConfig::default(),
        );
        let json = serde_json::to_string(&record).unwrap();
        expect![[r#"{"natural":"Halve it.","math":"\\[\\begin{align*} \\frac{1}{2} \\end{align*}\\]","mathml":null,"stepNumber":1,"totalSteps":2,"requestId":"r-1"}"#]]
            .assert_eq(&json);
    }

    #[test]
    fn test_mathml_step_sets_mathml_only() {
        let step = Step::new("One.", "<math><mn>1</mn></math>");
        let record = render_step("r", &step, 1, 1, &EngineConfig::default());
        assert!(record.math.is_none());
        assert_eq!(
            record.mathml.as_deref(),
            Some("<math xmlns=\"http://www.w3.org/1998/Math/MathML\"><mn>1</mn></math>")
        );
    }

    #[test]
    fn test_prose_only_step() {
        let step: Step = serde_json::from_str(r#"{"natural":"Think first."}"#).unwrap();
        let record = render_step("r", &step, 1, 1, &EngineConfig::default());
        assert_eq!(record.math, None);
        assert_eq!(record.mathml, None);
    }

    #[test]
    fn test_numbering() {
        let steps = vec![Step::new("a", "x"), Step::new("b", "y"), Step::new("c", "z")];
        let records = render_steps("r", &steps, &EngineConfig::default());
        let numbers: Vec<_> = records
            .iter()
            .map(|r| (r.step_number, r.total_steps))
            .collect();
        assert_eq!(numbers, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_error_record_uses_sentinel() {
        let record = error_record("r");
        assert_eq!(record.math.as_deref(), Some(LATEX_SENTINEL));
        assert_eq!(record.mathml, None);
    }
}
