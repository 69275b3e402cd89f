//! # webpic
//!
//! A CLI tool that takes automated full-page screenshots of webpages. Given
//! a hostname and a list of URLs, it drives a headless Chromium through the
//! Chrome DevTools Protocol and writes one image per URL, with per-URL
//! retries and bounded concurrency. A failing page never aborts the rest of
//! the batch.
//!
//! ## CLI usage
//!
//! ```bash
//! # Two pages against one host, written to ./shots
//! webpic https://example.com shots /about contact
//!
//! # URL list from a file, four captures in flight, three attempts each
//! webpic https://example.com shots --file urls.txt --concurrent 4 --retries 3
//!
//! # JPEG output behind basic auth, waiting 2s for client-side rendering
//! webpic https://staging.example.com shots /dashboard \
//!     --format jpeg --auth user pass --delay 2
//! ```
//!
//! Output files are named after the URL with every `/` replaced by `-`,
//! e.g. `/about` becomes `shots/-about.png`. The process exits non-zero if
//! any URL failed all of its attempts.
//!
//! ## Library usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use webpic::{CaptureOrchestrator, ChromiumSession, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config {
//!         hostname: "https://example.com".to_string(),
//!         output_dir: "shots".into(),
//!         concurrency: 4,
//!         ..Default::default()
//!     };
//!     config.validate()?;
//!
//!     tokio::fs::create_dir_all(&config.output_dir).await?;
//!     let session = Arc::new(ChromiumSession::launch(&config).await?);
//!     let orchestrator = CaptureOrchestrator::new(session.clone(), config);
//!
//!     let outcomes = orchestrator
//!         .run_batch(vec!["/about".to_string(), "contact".to_string()])
//!         .await;
//!     session.shutdown().await;
//!
//!     for outcome in outcomes {
//!         println!("{}: ok={} attempts={}", outcome.url, outcome.success, outcome.attempts);
//!     }
//!     Ok(())
//! }
//! ```

/// Browser session and page management behind the engine trait seam
pub mod browser;

/// The concurrent retry-driven capture loop
pub mod capture;

/// Command-line interface and logging setup
pub mod cli;

/// Configuration shared by every capture in a run
pub mod config;

/// Error types
pub mod error;

/// Target joining, filename derivation, and small formatting helpers
pub mod utils;


pub use browser::*;
pub use capture::*;
pub use cli::*;
pub use config::*;
pub use error::*;
pub use utils::*;
