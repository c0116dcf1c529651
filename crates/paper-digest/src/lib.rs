//! Paper Digest
//!
//! Backend for a research-paper feed. Looks papers up on arXiv and Semantic
//! Scholar, summarizes them with Gemini, and serves one unified record per paper
//! over HTTP.
//!
//! # Features
//!
//! - **Never-empty records**: every field holds real data or a readable placeholder
//! - **Bounded retries**: fixed-delay budgets per upstream, with content validation
//! - **Degraded lookups**: graph failures fall back to arXiv or a placeholder record
//! - **Tolerant parsing**: model output is parsed without ever failing
//!
//! # Example
//!
//! ```no_run
//! use paper_digest::{Aggregator, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let aggregator = Aggregator::new(&config)?;
//!
//!     let record = aggregator.aggregate(Some("10.1017/S0022226797006889")).await?;
//!     println!("{}", record.summary);
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod server;

pub use aggregator::Aggregator;
pub use config::Config;
pub use error::{ClientError, DigestError};
