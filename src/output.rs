//! Wire documents exchanged with the backend and the rendered panel state.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Wire documents ───────────────────────────────────────────────────────

/// Answer of `POST {api_base}/upload_hinge`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UploadResponse {
    /// Whether the backend accepted the file. Any truthy JSON value counts.
    #[serde(default, deserialize_with = "truthy")]
    pub success: bool,

    /// Human-readable rejection reason.
    #[serde(default, deserialize_with = "string_or_none")]
    pub error: Option<String>,
}

/// One plot descriptor inside a results document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plot {
    /// Absolute `http(s)://` URL, or a path relative to the API base.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Body of `GET {api_base}/hinge_results.json`.
///
/// The document is "ready" once `plots` is present and non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResult {
    #[serde(default)]
    pub plots: Option<Vec<Plot>>,
}

impl PollResult {
    /// The plots, if this document signals completion.
    pub fn ready_plots(&self) -> Option<&[Plot]> {
        self.plots.as_deref().filter(|p| !p.is_empty())
    }
}

/// JavaScript truthiness of an arbitrary JSON value.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Accept only string `error` fields; anything else counts as absent.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

// ── Rendered state ───────────────────────────────────────────────────────

/// One visual item of the results panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPlot {
    /// Image source, already resolved against the API base.
    pub src: String,
    /// Alternative text: the caption, or a fixed fallback.
    pub alt: String,
    /// Caption element; `None` when the descriptor carried no caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// The shared status/results region of one workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Panel {
    /// Current status line; empty when cleared.
    pub status: String,
    /// Currently rendered plots, in backend order.
    pub plots: Vec<RenderedPlot>,
}

/// How one submission settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// The file name was not `matches.json`; nothing was sent.
    Rejected,
    /// The upload was refused or never got a usable answer.
    UploadFailed,
    /// Results arrived; holds the number of plots rendered.
    Rendered(usize),
    /// The poll loop exhausted its attempts.
    TimedOut,
    /// A newer submission took over before this one settled.
    Superseded,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Rendered(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(json: &str) -> UploadResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn success_follows_js_truthiness() {
        assert!(upload(r#"{"success": true}"#).success);
        assert!(upload(r#"{"success": 1}"#).success);
        assert!(upload(r#"{"success": "yes"}"#).success);
        assert!(upload(r#"{"success": {}}"#).success);
        assert!(!upload(r#"{"success": false}"#).success);
        assert!(!upload(r#"{"success": 0}"#).success);
        assert!(!upload(r#"{"success": ""}"#).success);
        assert!(!upload(r#"{"success": null}"#).success);
        assert!(!upload(r#"{}"#).success);
    }

    #[test]
    fn error_text_is_kept_only_when_string() {
        assert_eq!(
            upload(r#"{"success": false, "error": "X"}"#).error.as_deref(),
            Some("X")
        );
        assert_eq!(upload(r#"{"success": false, "error": 42}"#).error, None);
    }

    #[test]
    fn poll_result_readiness() {
        let empty: PollResult = serde_json::from_str("{}").unwrap();
        assert!(empty.ready_plots().is_none());

        let none: PollResult = serde_json::from_str(r#"{"plots": []}"#).unwrap();
        assert!(none.ready_plots().is_none());

        let ready: PollResult = serde_json::from_str(
            r#"{"plots": [{"url": "/a.png", "caption": "c"}, {"url": "/b.png"}], "extra": 1}"#,
        )
        .unwrap();
        let plots = ready.ready_plots().unwrap();
        assert_eq!(plots.len(), 2);
        assert_eq!(plots[0].caption.as_deref(), Some("c"));
        assert_eq!(plots[1].caption, None);
    }

    #[test]
    fn outcome_success() {
        assert!(Outcome::Rendered(1).is_success());
        assert!(!Outcome::TimedOut.is_success());
        assert!(!Outcome::Superseded.is_success());
    }
}
