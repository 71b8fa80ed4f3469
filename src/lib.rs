//! # hinge-analysis
//!
//! Submit a `matches.json` export to a hinge analysis backend, wait for the
//! analysis to finish, and collect the plots it produced.
//!
//! ## Workflow Overview
//!
//! ```text
//! matches.json
//!  │
//!  ├─ 1. Validate  exact file name `matches.json`, nothing else is sent
//!  ├─ 2. Upload    multipart POST {api_base}/upload_hinge, field `file`
//!  ├─ 3. Poll      GET {api_base}/hinge_results.json?_=<ms>, 30 × 1.5 s
//!  └─ 4. Render    plot URLs resolved against the API base → panel / HTML
//! ```
//!
//! Every submission settles in a status line plus an [`Outcome`]; the
//! library never hands a workflow failure back as `Err`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hinge_analysis::{UploadTarget, Workflow, WorkflowConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WorkflowConfig::builder()
//!         .api_base("http://localhost:8000")
//!         .build()?;
//!     let workflow = Workflow::new(config)?;
//!     let outcome = workflow.submit(UploadTarget::from_path("matches.json")).await;
//!     if outcome.is_success() {
//!         println!("{}", workflow.to_html());
//!     } else {
//!         eprintln!("{}", workflow.status());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `hinge` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{WorkflowConfig, WorkflowConfigBuilder, DEFAULT_API_BASE, REQUIRED_FILE_NAME};
pub use error::{HingeError, PollError};
pub use output::{Outcome, Panel, Plot, PollResult, RenderedPlot, UploadResponse};
pub use pipeline::input::UploadTarget;
pub use progress::{NoopProgressCallback, ProgressCallback, WorkflowProgressCallback};
pub use workflow::Workflow;
