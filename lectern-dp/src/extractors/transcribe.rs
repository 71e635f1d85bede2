//! Speech-to-text client
//!
//! Posts a normalized WAV to an OpenAI-compatible `audio/transcriptions`
//! endpoint and returns the transcript text. Without a configured API key
//! the transcriber is disabled and audio units fail with a recorded error
//! detail; document processing is unaffected.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::ExtractError;

/// Transcription model requested from the provider
const TRANSCRIBE_MODEL: &str = "whisper-1";

/// Request timeout; transcription of long recordings is slow
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// HTTP speech-to-text client
pub struct Transcriber {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl Transcriber {
    pub fn new(api_key: Option<String>, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// A transcriber with no provider configured; every call fails
    pub fn disabled() -> Self {
        Self::new(None, "https://api.openai.com/v1".to_string())
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Transcribe a 16 kHz mono WAV file
    pub async fn transcribe_wav(&self, wav_path: &Path) -> Result<String, ExtractError> {
        let Some(api_key) = &self.api_key else {
            return Err(ExtractError::Internal(
                "speech-to-text not configured (set OPENAI_API_KEY)".to_string(),
            ));
        };

        let wav_bytes = tokio::fs::read(wav_path).await?;

        let part = reqwest::multipart::Part::bytes(wav_bytes)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| ExtractError::Internal(format!("multipart build failed: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", TRANSCRIBE_MODEL)
            .text("response_format", "json");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(api_key)
            .multipart(form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                ExtractError::Internal(format!("transcription request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::Internal(format!(
                "transcription API error ({status}): {body}"
            )));
        }

        let parsed: TranscriptionResponse = response.json().await.map_err(|e| {
            ExtractError::Internal(format!("transcription response unreadable: {e}"))
        })?;

        Ok(parsed.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_transcriber_reports_missing_configuration() {
        let transcriber = Transcriber::disabled();
        assert!(!transcriber.is_enabled());

        let err = transcriber
            .transcribe_wav(Path::new("/tmp/ignored.wav"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not configured"), "{err}");
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let transcriber = Transcriber::new(Some("k".into()), "http://localhost:9999/v1/".into());
        assert_eq!(transcriber.base_url, "http://localhost:9999/v1");
    }
}
