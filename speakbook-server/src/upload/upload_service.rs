//! Upload proxy: validates an inbound file and forwards it to the external
//! file host as a single multipart POST.
//!
//! There is no retry and no timeout override beyond the transport default;
//! a slow host stalls the request, and every non-success outcome collapses
//! into `UploadFailed`.

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Serialize;
use speakbook_core::{Result, SpeakBookError};
use tracing::info;

const MB: usize = 1024 * 1024;

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"];

const AUDIO_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/wave",
    "audio/x-wav",
    "audio/ogg",
    "audio/x-m4a",
    "audio/mp4",
];

/// Per-kind validation profile: MIME whitelist plus byte-size ceiling.
#[derive(Debug, Clone, Copy)]
pub struct UploadProfile {
    label: &'static str,
    max_bytes: usize,
    allowed_types: &'static [&'static str],
    format_hint: &'static str,
}

impl UploadProfile {
    pub fn image() -> Self {
        Self {
            label: "image",
            max_bytes: 20 * MB,
            allowed_types: IMAGE_TYPES,
            format_hint: "JPG, PNG, GIF or WebP",
        }
    }

    pub fn audio() -> Self {
        Self {
            label: "audio file",
            max_bytes: 50 * MB,
            allowed_types: AUDIO_TYPES,
            format_hint: "MP3, WAV, OGG or M4A",
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Check an inbound payload before any network traffic happens.
    ///
    /// Order matters: empty payload, then content type, then size.
    pub fn validate(&self, size: usize, content_type: Option<&str>) -> Result<()> {
        if size == 0 {
            return Err(SpeakBookError::Validation(format!(
                "Please select an {} to upload",
                self.label
            )));
        }

        match content_type {
            Some(ct) if self.allowed_types.contains(&ct) => {}
            _ => {
                return Err(SpeakBookError::UnsupportedMediaType(format!(
                    "unsupported {} format, please upload {}",
                    self.label, self.format_hint
                )));
            }
        }

        if size > self.max_bytes {
            return Err(SpeakBookError::PayloadTooLarge(format!(
                "{} too large, please upload at most {}MB",
                self.label,
                self.max_bytes / MB
            )));
        }

        Ok(())
    }
}

/// Result of a successful upload: where the file landed, and what it was
/// called on the way in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
    pub file_name: String,
}

/// Client for the Catbox-style file-hosting API.
pub struct UploadClient {
    http: reqwest::Client,
    endpoint: String,
}

impl UploadClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Forward raw bytes to the file host and return the hosted URL.
    ///
    /// Success requires HTTP 200 and a non-blank body that starts with a
    /// recognizable URL scheme; anything else is `UploadFailed`.
    pub async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> Result<UploadResponse> {
        let size = bytes.len();
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new()
            .text("reqtype", "fileupload")
            .part("fileToUpload", part);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SpeakBookError::UploadFailed(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SpeakBookError::UploadFailed(format!(
                "file host returned status {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SpeakBookError::UploadFailed(e.to_string()))?;
        let url = body.trim();
        if url.is_empty() || !url.starts_with("http") {
            return Err(SpeakBookError::UploadFailed(
                "file host returned an invalid URL".to_string(),
            ));
        }

        info!(file_name, size, url, "file forwarded to external host");
        Ok(UploadResponse {
            url: url.to_string(),
            file_name: file_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_rejected_before_anything_else() {
        // an empty body with a bogus type still reports the empty payload
        let err = UploadProfile::image().validate(0, Some("text/plain")).unwrap_err();
        assert!(matches!(err, SpeakBookError::Validation(_)));
    }

    #[test]
    fn unknown_content_type_is_rejected_for_both_profiles() {
        for profile in [UploadProfile::image(), UploadProfile::audio()] {
            let err = profile.validate(10, Some("text/plain")).unwrap_err();
            assert!(matches!(err, SpeakBookError::UnsupportedMediaType(_)));
            let err = profile.validate(10, None).unwrap_err();
            assert!(matches!(err, SpeakBookError::UnsupportedMediaType(_)));
        }
    }

    #[test]
    fn size_ceiling_is_inclusive() {
        let image = UploadProfile::image();
        assert!(image.validate(image.max_bytes(), Some("image/png")).is_ok());
        let err = image
            .validate(image.max_bytes() + 1, Some("image/png"))
            .unwrap_err();
        assert!(matches!(err, SpeakBookError::PayloadTooLarge(_)));

        let audio = UploadProfile::audio();
        assert!(audio.validate(audio.max_bytes(), Some("audio/mpeg")).is_ok());
        assert!(audio.validate(audio.max_bytes() + 1, Some("audio/mpeg")).is_err());
    }

    #[test]
    fn accepted_types_pass() {
        assert!(UploadProfile::image().validate(1, Some("image/webp")).is_ok());
        assert!(UploadProfile::audio().validate(1, Some("audio/x-m4a")).is_ok());
    }
}
