//! Upload input: a named file handle and its name check.
//!
//! The backend only understands one export, so the check is a plain
//! case-sensitive comparison against [`REQUIRED_FILE_NAME`]. No extension
//! sniffing and no content inspection happen here. File contents are read
//! only after the name passes, so a rejected file causes no I/O at all.

use crate::config::REQUIRED_FILE_NAME;
use crate::error::HingeError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the bytes of an [`UploadTarget`] come from.
#[derive(Debug, Clone)]
enum Source {
    /// A file on disk, read lazily.
    Path(PathBuf),
    /// Contents already in memory (e.g. received from another process).
    Bytes(Vec<u8>),
}

/// A file handle with a `name`, ready to be submitted.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    name: String,
    source: Source,
}

impl UploadTarget {
    /// A file on disk. Its name is the final path component.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            source: Source::Path(path),
        }
    }

    /// In-memory contents under an explicit name.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            source: Source::Bytes(bytes.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The backing path, if this target lives on disk.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            Source::Path(p) => Some(p),
            Source::Bytes(_) => None,
        }
    }

    /// Load the file contents.
    pub async fn read(&self) -> Result<Vec<u8>, HingeError> {
        match &self.source {
            Source::Bytes(bytes) => Ok(bytes.clone()),
            Source::Path(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|source| HingeError::FileRead {
                        path: path.clone(),
                        source,
                    })?;
                debug!("Read {} bytes from {}", bytes.len(), path.display());
                Ok(bytes)
            }
        }
    }
}

/// Check the target's name against [`REQUIRED_FILE_NAME`].
pub fn validate(target: &UploadTarget) -> Result<(), HingeError> {
    if target.name() == REQUIRED_FILE_NAME {
        Ok(())
    } else {
        Err(HingeError::InvalidFileName {
            name: target.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_name_passes() {
        assert!(validate(&UploadTarget::from_bytes("matches.json", b"[]".to_vec())).is_ok());
        assert!(validate(&UploadTarget::from_path("/tmp/export/matches.json")).is_ok());
    }

    #[test]
    fn near_misses_are_rejected() {
        for name in [
            "Matches.json",
            "matches.JSON",
            "matches.json ",
            "my_matches.json",
            "matches.json.bak",
            "matches",
            "",
        ] {
            let err = validate(&UploadTarget::from_bytes(name, Vec::new())).unwrap_err();
            assert!(
                matches!(err, HingeError::InvalidFileName { .. }),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn path_without_file_name_has_empty_name() {
        let target = UploadTarget::from_path("/");
        assert_eq!(target.name(), "");
        assert!(validate(&target).is_err());
    }

    #[tokio::test]
    async fn read_missing_file_reports_path() {
        let target = UploadTarget::from_path("/definitely/not/here/matches.json");
        let err = target.read().await.unwrap_err();
        match err {
            HingeError::FileRead { path, .. } => {
                assert!(path.ends_with("matches.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn read_bytes_round_trips() {
        let target = UploadTarget::from_bytes("matches.json", b"{\"a\":1}".to_vec());
        let bytes = tokio_test::block_on(target.read()).unwrap();
        assert_eq!(bytes, b"{\"a\":1}");
        assert!(target.path().is_none());
    }
}
