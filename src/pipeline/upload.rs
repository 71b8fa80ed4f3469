//! Upload stage: a single multipart POST to `{api_base}/upload_hinge`.
//!
//! Only the JSON body decides the result, not the HTTP status code: a 400
//! carrying `{"success": false, "error": "..."}` is a rejection with that
//! text, and a 200 whose body is not JSON is a transport failure.

use crate::config::WorkflowConfig;
use crate::error::HingeError;
use crate::output::UploadResponse;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info, warn};

/// Multipart field name the backend reads the file from.
pub const FILE_FIELD: &str = "file";

/// POST the file and interpret the acknowledgment.
///
/// Returns `Ok(())` only when the backend answered with a truthy `success`.
pub async fn upload(
    client: &Client,
    config: &WorkflowConfig,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<(), HingeError> {
    let url = config.upload_url();
    info!("Uploading {} ({} bytes) to {}", file_name, bytes.len(), url);

    let part = Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str("application/json")
        .map_err(|e| transport(&url, e))?;
    let form = Form::new().part(FILE_FIELD, part);

    let response = client
        .post(&url)
        .multipart(form)
        .timeout(config.request_timeout())
        .send()
        .await
        .map_err(|e| transport(&url, e))?;

    let status = response.status();
    let ack: UploadResponse = response.json().await.map_err(|e| transport(&url, e))?;
    debug!("Upload answered HTTP {}: {:?}", status, ack);

    if ack.success {
        Ok(())
    } else {
        warn!(
            "Upload rejected (HTTP {}): {}",
            status,
            ack.error.as_deref().unwrap_or("no reason given")
        );
        Err(HingeError::UploadRejected { message: ack.error })
    }
}

fn transport(url: &str, e: reqwest::Error) -> HingeError {
    warn!("Upload to {} failed: {}", url, e);
    HingeError::UploadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    }
}
