//! Fuzz target for parameter resolution.
//!
//! Arbitrary text must either resolve or fail with a typed error; a resolved
//! set must render to a document that resolves to the same set.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sd_config::{ConfigError, ParameterSet, ParameterSetBuilder, PriorConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let priors = PriorConfig::default();
    match ParameterSet::from_yaml(text, &priors) {
        Ok(params) => {
            let again = ParameterSetBuilder::new(&priors)
                .build(&params.to_document())
                .expect("rendered document resolves")
                .params;
            // NaN entries never compare equal.
            if !format!("{:?}", params).contains("NaN") {
                assert_eq!(again, params);
            }
        }
        Err(ConfigError::LoadError { .. }) => panic!("string input never hits I/O"),
        Err(_) => {}
    }
});
