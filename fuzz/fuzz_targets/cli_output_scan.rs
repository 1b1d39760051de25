#![no_main]

use detrun_model::forward_cli_output;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut sink = Vec::with_capacity(data.len());
    let run_dir = forward_cli_output(data, &mut sink).expect("in-memory forward");
    assert_eq!(sink, data);
    if let Some(run_dir) = run_dir {
        assert!(!run_dir.as_os_str().is_empty());
    }
});
