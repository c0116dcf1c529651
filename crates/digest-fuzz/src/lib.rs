//! Fuzzing library for paper-digest.
//!
//! Targets cover the two decoders that see untrusted upstream text: the
//! three-section summary parser and the arXiv Atom decoder, plus the Semantic
//! Scholar JSON model.
//!
//! # Usage
//!
//! ```bash
//! cd crates/digest-fuzz
//! cargo +nightly fuzz run fuzz_summary_parse -- -max_total_time=60
//! ```

pub use paper_digest::client::feed::parse_feed;
pub use paper_digest::models;
pub use paper_digest::parser;
