//! Poll stage: fixed-interval GETs of `{api_base}/hinge_results.json`.
//!
//! ## Retry Strategy
//!
//! Up to `max_attempts` requests, `poll_interval_ms` apart, first request
//! immediately. No backoff and no jitter. A transport error, a body that is
//! not JSON, and a document without plots all mean the same thing here:
//! "not ready yet". They are told apart only in the debug log.
//!
//! Each request carries `?_=<unix millis>` so no intermediate cache can
//! answer with a stale "not ready" document.

use crate::config::WorkflowConfig;
use crate::error::PollError;
use crate::output::{Plot, PollResult};
use reqwest::Client;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::time::sleep;
use tracing::{debug, info};

/// Terminal state of one poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A non-empty `plots` sequence arrived.
    Ready(Vec<Plot>),
    /// Every attempt came back empty or failed.
    Exhausted { attempts: u32 },
    /// The loop noticed it is no longer current and stopped.
    Superseded { attempts: u32 },
}

/// Run the bounded poll loop.
///
/// `is_current` is consulted before every request; once it returns `false`
/// the loop stops without issuing further requests.
pub async fn poll_results<F>(client: &Client, config: &WorkflowConfig, is_current: F) -> PollOutcome
where
    F: Fn() -> bool,
{
    let max = config.max_attempts;

    for attempt in 1..=max {
        if attempt > 1 {
            sleep(config.poll_interval()).await;
        }
        if !is_current() {
            debug!("Poll loop superseded before attempt {}", attempt);
            return PollOutcome::Superseded {
                attempts: attempt - 1,
            };
        }

        if let Some(ref cb) = config.progress_callback {
            cb.on_poll_attempt(attempt, max);
        }

        match fetch_once(client, config, attempt).await {
            Ok(Some(plots)) => {
                info!("Results ready after {} attempt(s): {} plots", attempt, plots.len());
                return PollOutcome::Ready(plots);
            }
            Ok(None) => debug!("Poll attempt {}/{}: not ready", attempt, max),
            Err(e) => debug!("{} (attempt {}/{})", e, attempt, max),
        }
    }

    info!("Giving up after {} poll attempts", max);
    PollOutcome::Exhausted { attempts: max }
}

/// Issue one GET and decode the results document.
///
/// `Ok(None)` means the document arrived but holds no plots yet.
pub async fn fetch_once(
    client: &Client,
    config: &WorkflowConfig,
    attempt: u32,
) -> Result<Option<Vec<Plot>>, PollError> {
    let response = client
        .get(config.results_url())
        .query(&[("_", cache_buster())])
        .timeout(config.request_timeout())
        .send()
        .await
        .map_err(|e| PollError::Transport {
            attempt,
            detail: e.to_string(),
        })?;

    let body = response.bytes().await.map_err(|e| PollError::Transport {
        attempt,
        detail: e.to_string(),
    })?;

    parse_results(&body, attempt)
}

/// Decode a results body. JSON `null` counts as an empty document.
pub fn parse_results(body: &[u8], attempt: u32) -> Result<Option<Vec<Plot>>, PollError> {
    let doc: Option<PollResult> =
        serde_json::from_slice(body).map_err(|e| PollError::Parse {
            attempt,
            detail: e.to_string(),
        })?;
    Ok(doc.and_then(|d| d.ready_plots().map(<[Plot]>::to_vec)))
}

/// Current wall-clock time in milliseconds since the Unix epoch.
fn cache_buster() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ready_document() {
        let plots = parse_results(br#"{"plots":[{"url":"/a.png","caption":"c"}]}"#, 1)
            .unwrap()
            .unwrap();
        assert_eq!(
            plots,
            vec![Plot {
                url: "/a.png".into(),
                caption: Some("c".into())
            }]
        );
    }

    #[test]
    fn parse_not_ready_documents() {
        assert_eq!(parse_results(b"{}", 1).unwrap(), None);
        assert_eq!(parse_results(b"null", 1).unwrap(), None);
        assert_eq!(parse_results(br#"{"plots":[]}"#, 1).unwrap(), None);
        assert_eq!(parse_results(br#"{"plots":null}"#, 1).unwrap(), None);
    }

    #[test]
    fn parse_garbage_is_a_parse_error() {
        let err = parse_results(b"<html>502</html>", 7).unwrap_err();
        assert!(matches!(err, PollError::Parse { attempt: 7, .. }));

        let err = parse_results(b"", 2).unwrap_err();
        assert!(matches!(err, PollError::Parse { attempt: 2, .. }));
    }

    #[test]
    fn cache_buster_is_numeric_and_monotonic_enough() {
        let a: u128 = cache_buster().parse().unwrap();
        let b: u128 = cache_buster().parse().unwrap();
        assert!(b >= a);
        assert!(a > 1_600_000_000_000);
    }
}
