#![no_main]
use libfuzzer_sys::fuzz_target;
use mathboard_core::placeholder::{PLACEHOLDER_CLOSE, PLACEHOLDER_OPEN};
use mathboard_core::{route, EngineConfig};

fuzz_target!(|data: &[u8]| {
    // Lossy conversion keeps inputs that are almost text.
    let s = String::from_utf8_lossy(data);
    let blob = route(&s, &EngineConfig::default());

    // Placeholders may only appear in the output if the input had them.
    if !s.contains(PLACEHOLDER_OPEN) && !s.contains(PLACEHOLDER_CLOSE) {
        assert!(!blob.normalized.contains(PLACEHOLDER_OPEN));
        assert!(!blob.normalized.contains(PLACEHOLDER_CLOSE));
    }
});
