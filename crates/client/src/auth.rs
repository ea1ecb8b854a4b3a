//! Persisted credential handling.
//!
//! Credentials live in a small JSON file (`{"AuthToken": ..., "SheetId":
//! ...}`). When the file is missing the interactive login flow runs in a
//! browser outside this process; we poll the filesystem once per second
//! until the file shows up.

use crate::error::{ClientError, Result};
use sheetlog_types::Credential;
use std::path::Path;
use std::time::Duration;

/// Read and parse a credential file.
pub fn load_credential<P: AsRef<Path>>(path: P) -> Result<Credential> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    serde_json::from_str(&raw).map_err(|e| ClientError::Credential(e.to_string()))
}

/// Write a credential file, overwriting any existing one.
pub fn save_credential<P: AsRef<Path>>(path: P, credential: &Credential) -> Result<()> {
    let json = serde_json::to_string_pretty(credential)
        .map_err(|e| ClientError::Credential(e.to_string()))?;
    std::fs::write(path.as_ref(), json)?;
    Ok(())
}

/// Wait for a credential file to appear, polling once per second.
///
/// Used after kicking off the interactive login flow, which persists the
/// credential from outside this process. Never times out; a run that is
/// not going to be authenticated is cancelled by the operator.
pub async fn wait_for_credential<P: AsRef<Path>>(path: P) -> Result<Credential> {
    let path = path.as_ref();
    loop {
        if path.exists() {
            match load_credential(path) {
                Ok(credential) => return Ok(credential),
                // A partially-written file parses as garbage; poll again.
                Err(e) => tracing::debug!("credential file not readable yet: {e}"),
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");

        let credential = Credential {
            auth_token: "tok-123".to_string(),
            sheet_id: "sheet-9".to_string(),
        };
        save_credential(&path, &credential).unwrap();

        let loaded = load_credential(&path).unwrap();
        assert_eq!(loaded.auth_token, "tok-123");
        assert_eq!(loaded.sheet_id, "sheet-9");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_credential(dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            load_credential(&path),
            Err(ClientError::Credential(_))
        ));
    }

    #[tokio::test]
    async fn test_wait_for_credential_picks_up_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");

        let writer_path = path.clone();
        let writer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let credential = Credential {
                auth_token: "late".to_string(),
                sheet_id: "s".to_string(),
            };
            save_credential(&writer_path, &credential).unwrap();
        });

        let credential = wait_for_credential(&path).await.unwrap();
        assert_eq!(credential.auth_token, "late");
        writer.await.unwrap();
    }
}
