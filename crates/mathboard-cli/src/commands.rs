//! One function per subcommand, each returning the JSON it prints.

use anyhow::Context;
use mathboard_core::math_validator::check_latex as check_latex_diagnostics;
use mathboard_core::mathml::repair::repair_and_revalidate;
use mathboard_core::mathml::MathmlValidator;
use mathboard_core::phrasebook::phrase_to_latex;
use mathboard_core::{latex_to_mathml, normalize_latex, render_steps, EngineConfig, Step};
use serde_json::{json, Value};

pub fn normalize(input: &str, config: &EngineConfig) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(normalize_latex(input, config))?)
}

pub fn to_mathml(input: &str) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(latex_to_mathml(input))?)
}

pub fn validate(input: &str, config: &EngineConfig) -> anyhow::Result<Value> {
    let validation = MathmlValidator::from_config(config).validate(input.trim());
    Ok(serde_json::to_value(validation)?)
}

pub fn repair(input: &str, config: &EngineConfig) -> anyhow::Result<Value> {
    let validator = MathmlValidator::from_config(config);
    let input = input.trim();
    let before = validator.validate(input);
    let (repaired, after) = repair_and_revalidate(input, &before, &validator);
    Ok(json!({
        "text": repaired.text,
        "actions": repaired.actions,
        "is_valid": after.is_valid,
        "diagnostics": after.diagnostics,
    }))
}

pub fn route(input: &str, config: &EngineConfig) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(mathboard_core::route(input, config))?)
}

pub fn check_latex(input: &str, config: &EngineConfig) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(check_latex_diagnostics(input, config))?)
}

pub fn phrase(input: &str) -> anyhow::Result<Value> {
    let latex = phrase_to_latex(input.trim());
    let transliteration = latex_to_mathml(&latex);
    Ok(json!({
        "latex": latex,
        "mathml": transliteration.mathml,
        "diagnostics": transliteration.diagnostics,
    }))
}

pub fn render(input: &str, request_id: &str, config: &EngineConfig) -> anyhow::Result<Value> {
    let steps: Vec<Step> =
        serde_json::from_str(input).context("expected a JSON array of {natural, math} steps")?;
    Ok(serde_json::to_value(render_steps(request_id, &steps, config))?)
}

#[cfg(feature = "remote-validator")]
pub fn remote_check(input: &str) -> anyhow::Result<Value> {
    use mathboard_core::mathml::remote::{RemoteValidator, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};

    let validator = RemoteValidator::new(DEFAULT_ENDPOINT, DEFAULT_TIMEOUT)?;
    Ok(serde_json::to_value(validator.check(input.trim()))?)
}

#[cfg(not(feature = "remote-validator"))]
pub fn remote_check(_input: &str) -> anyhow::Result<Value> {
    anyhow::bail!("this build does not include the remote-validator feature")
}
