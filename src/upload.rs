//! Uploads a recorded session document to the configured upload endpoint
//! and prints a shareable player URL, mirroring the original `uploader.c`'s
//! curl-based client: same header, same timeout, same response handling.

use std::path::PathBuf;

use serde::Deserialize;

use crate::config;
use crate::error::{RewindError, Result};

const UPLOAD_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    id: Option<serde_json::Value>,
}

/// Validates that a raw session document looks uploadable (has `metadata`
/// and an array `sessions`), then uploads it.
pub async fn upload_path(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(config::DEFAULT_SESSION_FILE));
    let raw = std::fs::read_to_string(&path).map_err(RewindError::Io)?;
    validate_document(&raw)?;
    upload_json(&raw).await?;
    Ok(())
}

pub async fn upload_json(json: &str) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(UPLOAD_TIMEOUT)
        .user_agent(format!("rewindtty-cli/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| RewindError::Parse(e.to_string()))?;

    let response = client
        .post(config::upload_url())
        .header("Content-Type", "application/json")
        .body(json.to_string())
        .send()
        .await
        .map_err(|e| RewindError::Parse(format!("upload request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(RewindError::Parse(format!(
            "upload failed with HTTP status {status}: {body}"
        )));
    }

    let body: UploadResponse = response
        .json()
        .await
        .map_err(|e| RewindError::Parse(format!("upload response was not valid JSON: {e}")))?;

    if let Some(id) = body.id {
        if let Some(id_str) = stringify_id(&id) {
            println!("You can check here: {}/{}", config::player_url(), id_str);
        }
    }

    Ok(())
}

fn stringify_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn validate_document(raw: &str) -> Result<()> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| RewindError::Parse(e.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| RewindError::Parse("session document must be a JSON object".to_string()))?;

    if !obj.contains_key("metadata") {
        return Err(RewindError::Parse("session document is missing 'metadata'".to_string()));
    }

    match obj.get("sessions") {
        Some(serde_json::Value::Array(_)) => Ok(()),
        Some(_) => Err(RewindError::Parse("'sessions' field must be an array".to_string())),
        None => Err(RewindError::Parse("session document is missing 'sessions'".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_document_missing_sessions_array() {
        let raw = r#"{"metadata": {"version": "1", "interactive_mode": false, "timestamp": 0.0}}"#;
        assert!(validate_document(raw).is_err());
    }

    #[test]
    fn rejects_legacy_bare_array() {
        let raw = r#"[{"command": "ls", "start_time": 0.0, "end_time": 0.1, "duration": 0.1, "chunks": []}]"#;
        assert!(validate_document(raw).is_err());
    }

    #[test]
    fn accepts_well_formed_document() {
        let raw = r#"{"metadata": {"version": "1", "interactive_mode": false, "timestamp": 0.0}, "sessions": []}"#;
        assert!(validate_document(raw).is_ok());
    }

    #[test]
    fn stringifies_numeric_and_string_ids() {
        assert_eq!(stringify_id(&serde_json::json!("abc")), Some("abc".to_string()));
        assert_eq!(stringify_id(&serde_json::json!(42)), Some("42".to_string()));
        assert_eq!(stringify_id(&serde_json::json!(null)), None);
    }
}
