#![no_main]
use libfuzzer_sys::fuzz_target;
use mathboard_core::latex_to_mathml;
use mathboard_core::mathml::MathmlValidator;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let out = latex_to_mathml(&s);
    // Whatever the input, the output must at least be well-formed XML.
    let validation = MathmlValidator::new().validate(&out.mathml);
    assert!(!validation.is_malformed(), "{}", out.mathml);
});
