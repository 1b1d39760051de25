#![no_main]

use detrun_cli::{parse_run_config, RunMode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let args = std::iter::once("detrun").chain(raw.split_whitespace());
    if let Ok(config) = parse_run_config(args) {
        let name = config.run_name();
        match config.mode() {
            RunMode::Train => assert!(name.ends_with("_train")),
            RunMode::Validate => assert!(name.ends_with("_val")),
        }
        assert!(name.starts_with(config.name_prefix()));
    }
});
