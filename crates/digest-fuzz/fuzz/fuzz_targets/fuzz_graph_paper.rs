#![no_main]

use libfuzzer_sys::fuzz_target;
use paper_digest::models::GraphPaper;

fuzz_target!(|data: &[u8]| {
    if let Ok(paper) = serde_json::from_slice::<GraphPaper>(data) {
        let has_content = paper.has_content();
        let record = paper.into_record("fuzz");
        assert_eq!(has_content, record.abstract_text().is_some() || record.short_summary_text().is_some());
    }
});
