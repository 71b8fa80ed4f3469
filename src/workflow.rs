//! The upload-and-poll workflow.
//!
//! A [`Workflow`] owns the panel (status line + rendered plots) and drives
//! each submission through validate → upload → poll → render. Failures
//! never reach the caller as `Err`: every submission ends in a status line
//! and an [`Outcome`].
//!
//! ## Overlapping submissions
//!
//! Each submission that passes the name check takes the next value of the
//! workflow's generation counter. Every panel write is made under the panel
//! lock and only if the writer's generation is still the latest, and the
//! poll loop checks its generation before each request. A newer submission
//! therefore retires any older one, which settles as
//! [`Outcome::Superseded`] without touching the panel again. A file rejected
//! for its name takes no generation and leaves an in-flight poll running.

use crate::config::WorkflowConfig;
use crate::error::{HingeError, STATUS_ANALYSING, STATUS_UPLOADING};
use crate::output::{Outcome, Panel, Plot, RenderedPlot};
use crate::pipeline::input::{self, UploadTarget};
use crate::pipeline::poll::{self, PollOutcome};
use crate::pipeline::{render, upload};
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Upload-and-poll driver with its own panel state.
///
/// Cheap to clone; clones share the panel and the generation counter.
///
/// # Example
/// ```rust,no_run
/// use hinge_analysis::{UploadTarget, Workflow, WorkflowConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let workflow = Workflow::new(WorkflowConfig::default())?;
/// let outcome = workflow.submit(UploadTarget::from_path("export/matches.json")).await;
/// println!("{outcome:?}: {}", workflow.status());
/// for plot in workflow.panel().plots {
///     println!("{}", plot.src);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Workflow {
    inner: Arc<Inner>,
}

struct Inner {
    config: WorkflowConfig,
    client: Client,
    generation: AtomicU64,
    panel: Mutex<Panel>,
}

impl Workflow {
    /// Create a workflow with its own HTTP client.
    pub fn new(config: WorkflowConfig) -> Result<Self, HingeError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| HingeError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self::with_client(config, client))
    }

    /// Create a workflow around an existing HTTP client.
    pub fn with_client(config: WorkflowConfig, client: Client) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                client,
                generation: AtomicU64::new(0),
                panel: Mutex::new(Panel::default()),
            }),
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.inner.config
    }

    /// Snapshot of the panel.
    pub fn panel(&self) -> Panel {
        self.lock_panel().clone()
    }

    /// Current status line.
    pub fn status(&self) -> String {
        self.lock_panel().status.clone()
    }

    /// Submit a file and wait until the submission settles.
    pub async fn submit(&self, target: UploadTarget) -> Outcome {
        if let Err(e) = input::validate(&target) {
            warn!("{}", e);
            self.set_status(&e.status_message());
            return self.settle(Outcome::Rejected);
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Submission #{}: {}", generation, target.name());
        self.set_status_if_current(generation, STATUS_UPLOADING);

        if let Err(e) = self.upload(&target).await {
            let outcome = if self.set_status_if_current(generation, &e.status_message()) {
                Outcome::UploadFailed
            } else {
                Outcome::Superseded
            };
            return self.settle(outcome);
        }

        if !self.begin_polling(generation) {
            return self.settle(Outcome::Superseded);
        }
        if let Some(ref cb) = self.inner.config.progress_callback {
            cb.on_upload_accepted();
        }

        let outcome = match poll::poll_results(&self.inner.client, &self.inner.config, || {
            self.is_current(generation)
        })
        .await
        {
            PollOutcome::Ready(plots) => match self.render_if_current(generation, &plots) {
                Some(count) => Outcome::Rendered(count),
                None => Outcome::Superseded,
            },
            PollOutcome::Exhausted { attempts } => {
                let e = HingeError::PollTimedOut { attempts };
                warn!("Submission #{}: {}", generation, e);
                if self.set_status_if_current(generation, &e.status_message()) {
                    Outcome::TimedOut
                } else {
                    Outcome::Superseded
                }
            }
            PollOutcome::Superseded { attempts } => {
                debug!(
                    "Submission #{} superseded after {} poll attempt(s)",
                    generation, attempts
                );
                Outcome::Superseded
            }
        };
        self.settle(outcome)
    }

    /// Fire-and-forget variant of [`Workflow::submit`] on the tokio runtime.
    pub fn spawn_submit(&self, target: UploadTarget) -> JoinHandle<Outcome> {
        let this = self.clone();
        tokio::spawn(async move { this.submit(target).await })
    }

    /// Replace the rendered plots with `plots`.
    ///
    /// Prior content is discarded entirely; the status line is untouched.
    pub fn render(&self, plots: &[Plot]) -> Vec<RenderedPlot> {
        let rendered = render::render_plots(&self.inner.config.api_base, plots);
        self.lock_panel().plots = rendered.clone();
        if let Some(ref cb) = self.inner.config.progress_callback {
            cb.on_rendered(&rendered);
        }
        rendered
    }

    /// The rendered panel as an HTML fragment.
    pub fn to_html(&self) -> String {
        render::to_html(&self.lock_panel().plots)
    }

    // ── Stages ───────────────────────────────────────────────────────────

    async fn upload(&self, target: &UploadTarget) -> Result<(), HingeError> {
        let bytes = target.read().await?;
        if let Some(ref cb) = self.inner.config.progress_callback {
            cb.on_upload_start(target.name(), bytes.len());
        }
        upload::upload(&self.inner.client, &self.inner.config, target.name(), bytes).await
    }

    /// Switch the panel to "analysing" with no plots.
    fn begin_polling(&self, generation: u64) -> bool {
        {
            let mut panel = self.lock_panel();
            if !self.is_current(generation) {
                return false;
            }
            panel.status = STATUS_ANALYSING.to_string();
            panel.plots.clear();
        }
        self.notify_status(STATUS_ANALYSING);
        true
    }

    fn render_if_current(&self, generation: u64, plots: &[Plot]) -> Option<usize> {
        let rendered = render::render_plots(&self.inner.config.api_base, plots);
        {
            let mut panel = self.lock_panel();
            if !self.is_current(generation) {
                return None;
            }
            panel.status.clear();
            panel.plots = rendered.clone();
        }
        self.notify_status("");
        if let Some(ref cb) = self.inner.config.progress_callback {
            cb.on_rendered(&rendered);
        }
        Some(rendered.len())
    }

    // ── Panel helpers ────────────────────────────────────────────────────

    fn is_current(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == generation
    }

    fn lock_panel(&self) -> MutexGuard<'_, Panel> {
        self.inner
            .panel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_status(&self, status: &str) {
        self.lock_panel().status = status.to_string();
        self.notify_status(status);
    }

    fn set_status_if_current(&self, generation: u64, status: &str) -> bool {
        {
            let mut panel = self.lock_panel();
            if !self.is_current(generation) {
                return false;
            }
            panel.status = status.to_string();
        }
        self.notify_status(status);
        true
    }

    fn notify_status(&self, status: &str) {
        debug!("Status: {:?}", status);
        if let Some(ref cb) = self.inner.config.progress_callback {
            cb.on_status(status);
        }
    }

    fn settle(&self, outcome: Outcome) -> Outcome {
        info!("Settled: {:?}", outcome);
        if let Some(ref cb) = self.inner.config.progress_callback {
            cb.on_settled(&outcome);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow() -> Workflow {
        Workflow::new(WorkflowConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn wrong_name_sets_instruction_and_settles_rejected() {
        let wf = workflow();
        let outcome = wf
            .submit(UploadTarget::from_bytes("results.json", b"{}".to_vec()))
            .await;
        assert_eq!(outcome, Outcome::Rejected);
        assert_eq!(wf.status(), crate::error::STATUS_WRONG_FILE);
        assert!(wf.panel().plots.is_empty());
    }

    #[test]
    fn render_replaces_prior_content() {
        let wf = workflow();
        let first = [Plot {
            url: "/a.png".into(),
            caption: Some("a".into()),
        }];
        let second = [Plot {
            url: "https://cdn/b.png".into(),
            caption: None,
        }];
        wf.render(&first);
        wf.render(&second);
        let panel = wf.panel();
        assert_eq!(panel.plots.len(), 1);
        assert_eq!(panel.plots[0].src, "https://cdn/b.png");

        wf.render(&second);
        assert_eq!(wf.panel(), panel);
    }

    #[test]
    fn stale_generation_cannot_write() {
        let wf = workflow();
        wf.inner.generation.store(2, Ordering::SeqCst);
        assert!(!wf.set_status_if_current(1, "stale"));
        assert!(wf.set_status_if_current(2, "fresh"));
        assert_eq!(wf.status(), "fresh");
        assert_eq!(wf.render_if_current(1, &[]), None);
    }
}
