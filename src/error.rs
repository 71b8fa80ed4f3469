//! Error types for the hinge-analysis library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`HingeError`] — **Fatal** for one submission: the workflow cannot get
//!   any further (wrong file name, upload refused, polling exhausted).
//!   [`crate::workflow::Workflow::submit`] never returns it to the caller;
//!   it is converted into a status line via [`HingeError::status_message`]
//!   and an [`crate::output::Outcome`].
//!
//! * [`PollError`] — **Non-fatal**: a single poll attempt produced nothing
//!   usable (transport failure, body that is not JSON). The poll loop absorbs
//!   it and tries again until its attempt budget runs out.

use std::path::PathBuf;
use thiserror::Error;

/// Status shown when a file with the wrong name is submitted.
pub const STATUS_WRONG_FILE: &str = "Please upload a file named matches.json.";
/// Status shown while the upload request is in flight.
pub const STATUS_UPLOADING: &str = "Uploading...";
/// Status shown once the backend acknowledged the upload.
pub const STATUS_ANALYSING: &str = "File uploaded. Running analysis...";
/// Generic upload failure status.
pub const STATUS_UPLOAD_FAILED: &str = "Upload failed.";
/// Status shown when the poll loop ran out of attempts.
pub const STATUS_TIMED_OUT: &str = "Analysis timed out.";

/// All fatal errors of a single submission.
#[derive(Debug, Error)]
pub enum HingeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The submitted file is not named exactly `matches.json`.
    #[error("Expected a file named 'matches.json', got '{name}'")]
    InvalidFileName { name: String },

    /// The file name was valid but its contents could not be read.
    #[error("Failed to read upload file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Upload errors ─────────────────────────────────────────────────────
    /// The backend answered but reported `success: false`.
    #[error("Upload rejected by server: {}", .message.as_deref().unwrap_or("no reason given"))]
    UploadRejected { message: Option<String> },

    /// The upload request never produced a usable JSON answer.
    #[error("Upload to '{url}' failed: {reason}")]
    UploadFailed { url: String, reason: String },

    // ── Poll errors ───────────────────────────────────────────────────────
    /// No results arrived within the attempt budget.
    #[error("No analysis results after {attempts} poll attempts")]
    PollTimedOut { attempts: u32 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not write the rendered HTML panel.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl HingeError {
    /// The user-visible status line this error settles the panel with.
    ///
    /// Transport details never reach the status; they are logged instead.
    pub fn status_message(&self) -> String {
        match self {
            HingeError::InvalidFileName { .. } => STATUS_WRONG_FILE.to_string(),
            HingeError::UploadRejected {
                message: Some(message),
            } if !message.is_empty() => message.clone(),
            HingeError::UploadRejected { .. }
            | HingeError::UploadFailed { .. }
            | HingeError::FileRead { .. } => STATUS_UPLOAD_FAILED.to_string(),
            HingeError::PollTimedOut { .. } => STATUS_TIMED_OUT.to_string(),
            other => other.to_string(),
        }
    }
}

/// A non-fatal error for a single poll attempt.
///
/// The loop treats every variant exactly like "results not ready yet".
#[derive(Debug, Clone, Error)]
pub enum PollError {
    /// The GET request failed before a body was received.
    #[error("Poll attempt {attempt}: request failed: {detail}")]
    Transport { attempt: u32, detail: String },

    /// The body was received but is not a results document.
    #[error("Poll attempt {attempt}: unreadable results document: {detail}")]
    Parse { attempt: u32, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_file_name_maps_to_instruction() {
        let e = HingeError::InvalidFileName {
            name: "Matches.json".into(),
        };
        assert_eq!(e.status_message(), STATUS_WRONG_FILE);
        assert!(e.to_string().contains("Matches.json"), "got: {e}");
    }

    #[test]
    fn rejected_with_server_text_shows_it_verbatim() {
        let e = HingeError::UploadRejected {
            message: Some("bad json".into()),
        };
        assert_eq!(e.status_message(), "bad json");
    }

    #[test]
    fn rejected_with_empty_text_falls_back() {
        let e = HingeError::UploadRejected {
            message: Some(String::new()),
        };
        assert_eq!(e.status_message(), STATUS_UPLOAD_FAILED);

        let e = HingeError::UploadRejected { message: None };
        assert_eq!(e.status_message(), STATUS_UPLOAD_FAILED);
        assert!(e.to_string().contains("no reason given"));
    }

    #[test]
    fn transport_failure_hides_detail() {
        let e = HingeError::UploadFailed {
            url: "http://localhost:8000/upload_hinge".into(),
            reason: "connection refused".into(),
        };
        assert_eq!(e.status_message(), STATUS_UPLOAD_FAILED);
        assert!(e.to_string().contains("connection refused"));
    }

    #[test]
    fn timeout_display() {
        let e = HingeError::PollTimedOut { attempts: 30 };
        assert_eq!(e.status_message(), STATUS_TIMED_OUT);
        assert!(e.to_string().contains("30"));
    }

    #[test]
    fn poll_error_display() {
        let e = PollError::Parse {
            attempt: 4,
            detail: "expected value".into(),
        };
        assert!(e.to_string().contains("attempt 4"));
    }
}
