#![no_main]

use libfuzzer_sys::fuzz_target;
use paper_digest::parser;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let parsed = parser::parse(text);
    assert!(!parsed.summary.is_empty());
    assert_eq!(parser::parse(&parsed.render()), parsed);
});
