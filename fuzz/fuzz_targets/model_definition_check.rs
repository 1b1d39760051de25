#![no_main]

use detrun_model::{validate_checkpoint_header, validate_model_definition};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = validate_checkpoint_header(data);
    if let Ok(raw) = std::str::from_utf8(data) {
        if let Err(reason) = validate_model_definition(raw) {
            assert!(!reason.trim().is_empty());
        }
    }
});
