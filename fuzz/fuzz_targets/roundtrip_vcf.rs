#![no_main]

use libfuzzer_sys::fuzz_target;
use vcfscope::ExportOptions;

// Whatever decodes must survive re-encoding unchanged.
fuzz_target!(|data: &[u8]| {
    let Ok(original) = vcfscope::decode_bytes(data) else {
        return;
    };
    let payload = original
        .export(&ExportOptions::default())
        .expect("export of a decoded model");
    let decoded = vcfscope::decode(&payload.text()).expect("re-decode");
    assert_eq!(decoded.records(), original.records());
});
