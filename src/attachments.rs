//! Attachment storage for ticket comments.
//!
//! Uploads arrive as base64 (optionally with a `data:<mime>;base64,` prefix),
//! are decoded and size-checked in memory, then written under the uploads
//! directory with a timestamped, sanitized file name. Stored files are served
//! statically under `/uploads/`.

use std::path::PathBuf;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::error::ServiceError;

/// URL prefix under which stored attachments are served
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Attachment as submitted with a comment
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AttachmentUpload {
    /// Original file name
    #[schema(example = "captura.png")]
    pub name: String,
    /// File contents, base64 encoded; a `data:` URL prefix is accepted
    pub base64: String,
}

/// Location of a stored attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAttachment {
    /// Public URL, e.g. `/uploads/1718000000000-captura.png`
    pub url: String,
    /// Original file name
    pub name: String,
    pub size: usize,
}

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("attachment is not valid base64")]
    InvalidEncoding(#[from] base64::DecodeError),
    #[error("attachment is empty")]
    Empty,
    #[error("attachment exceeds the {limit} byte limit ({size} bytes)")]
    TooLarge { size: usize, limit: usize },
    #[error("failed to store attachment: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AttachmentError> for ServiceError {
    fn from(error: AttachmentError) -> Self {
        match error {
            AttachmentError::Io(err) => {
                tracing::error!(error = %err, "Attachment write failed");
                ServiceError::internal("Failed to store attachment")
            }
            other => ServiceError::bad_request(other.to_string()),
        }
    }
}

/// Replace every character outside `[A-Za-z0-9.-]` with `_`
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        "archivo".to_string()
    } else {
        sanitized
    }
}

/// Decode an uploaded payload, enforcing `max_bytes` on the decoded size
pub fn decode_payload(payload: &str, max_bytes: usize) -> Result<Vec<u8>, AttachmentError> {
    let encoded = match payload.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    };
    let encoded: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    // Reject obviously oversized payloads before allocating the decode buffer.
    let estimated = encoded.len() / 4 * 3;
    if estimated > max_bytes + 3 {
        return Err(AttachmentError::TooLarge {
            size: estimated,
            limit: max_bytes,
        });
    }

    let bytes = STANDARD.decode(encoded.as_bytes())?;
    if bytes.is_empty() {
        return Err(AttachmentError::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(AttachmentError::TooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }

    Ok(bytes)
}

/// Storage backend for comment attachments
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Decode, validate and persist an upload
    async fn store(&self, upload: &AttachmentUpload) -> Result<StoredAttachment, AttachmentError>;
}

/// Stores attachments as files in a local directory
#[derive(Debug, Clone)]
pub struct LocalAttachmentStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl LocalAttachmentStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }
}

#[async_trait]
impl AttachmentStore for LocalAttachmentStore {
    async fn store(&self, upload: &AttachmentUpload) -> Result<StoredAttachment, AttachmentError> {
        let bytes = decode_payload(&upload.base64, self.max_bytes)?;
        let file_name = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(&upload.name)
        );

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&file_name), &bytes).await?;

        tracing::debug!(file = %file_name, size = bytes.len(), "Attachment stored");

        Ok(StoredAttachment {
            url: format!("{UPLOADS_URL_PREFIX}/{file_name}"),
            name: upload.name.clone(),
            size: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_file_name("reporte final (v2).pdf"), "reporte_final__v2_.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("año.txt"), "a_o.txt");
        assert_eq!(sanitize_file_name(""), "archivo");
    }

    #[test]
    fn strips_data_url_prefix() {
        let plain = decode_payload("aG9sYQ==", 1024).unwrap();
        let prefixed = decode_payload("data:text/plain;base64,aG9sYQ==", 1024).unwrap();
        assert_eq!(plain, b"hola");
        assert_eq!(prefixed, b"hola");
    }

    #[test]
    fn rejects_invalid_and_oversized_payloads() {
        assert!(matches!(
            decode_payload("not base64!!", 1024),
            Err(AttachmentError::InvalidEncoding(_))
        ));
        assert!(matches!(decode_payload("", 1024), Err(AttachmentError::Empty)));

        let big = STANDARD.encode(vec![0u8; 64]);
        assert!(matches!(
            decode_payload(&big, 16),
            Err(AttachmentError::TooLarge { limit: 16, .. })
        ));
        assert!(decode_payload(&big, 64).is_ok());
    }

    #[test]
    fn errors_map_to_service_errors() {
        let bad: ServiceError = AttachmentError::Empty.into();
        assert!(matches!(bad, ServiceError::BadRequest(_)));

        let io: ServiceError =
            AttachmentError::Io(std::io::Error::other("disk full")).into();
        assert!(matches!(io, ServiceError::Internal(_)));
    }

    #[tokio::test]
    async fn local_store_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAttachmentStore::new(dir.path(), 1024);

        let stored = store
            .store(&AttachmentUpload {
                name: "nota de prueba.txt".to_string(),
                base64: STANDARD.encode(b"contenido"),
            })
            .await
            .unwrap();

        assert!(stored.url.starts_with("/uploads/"));
        assert!(stored.url.ends_with("-nota_de_prueba.txt"));
        assert_eq!(stored.name, "nota de prueba.txt");
        assert_eq!(stored.size, 9);

        let file_name = stored.url.trim_start_matches("/uploads/");
        let written = std::fs::read(dir.path().join(file_name)).unwrap();
        assert_eq!(written, b"contenido");
    }
}
