#![no_main]

use html::{ExtractOptions, extract_page};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let page = extract_page(input, "fallback", &ExtractOptions::default());
    for (_, block) in &page.anchors {
        assert!(*block <= page.blocks.len());
    }
});
