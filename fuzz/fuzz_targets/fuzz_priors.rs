//! Fuzz target for prior file parsing and validation.
//!
//! Tests that JSON and YAML prior parsing handles arbitrary input without
//! panicking, and that validation accepts or rejects whatever parses.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sd_config::{validate_priors, PriorConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(priors) = serde_json::from_slice::<PriorConfig>(data) {
        let _ = validate_priors(&priors);
    }
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(priors) = PriorConfig::from_yaml(text) {
            let _ = validate_priors(&priors);
        }
    }
});
