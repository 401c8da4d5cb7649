//! HTTP client for the streaming generative AI backend.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tokio::sync::mpsc::Sender;
use tokio_stream::StreamExt;

use crate::config::GenAiConfig;
use crate::error::{Error, Result};
use crate::runner::FragmentResult;
use crate::types::InvestigationKind;

use super::prompt::{build_prompt, build_system_instruction};
use super::sse::SseDecoder;

/// One investigation request to send to the model.
#[derive(Debug, Clone)]
pub struct InvestigationRequest {
    pub kind: InvestigationKind,
    /// URL, file name, or premium scan target
    pub subject: String,
    /// Ask the model for beginner-friendly, jargon-free wording
    pub simple_language: bool,
    /// Inline file content for file investigations
    pub attachment: Option<InlineData>,
}

/// Base64-encoded inline content attached to a request.
#[derive(Debug, Clone)]
pub struct InlineData {
    /// e.g. "application/pdf"
    pub mime_type: String,
    /// Raw base64, without a data-URL prefix
    pub data: String,
}

/// HTTP client for a Gemini-style `streamGenerateContent` endpoint.
pub struct GenAiClient {
    config: GenAiConfig,
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GenAiClient {
    /// Create a new client from configuration.
    ///
    /// Returns an error if the configuration is invalid or no API key can be
    /// resolved.
    pub fn new(config: GenAiConfig) -> Result<Self> {
        config.validate()?;

        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| Error::Config("no API key resolved".to_string()))?;
        let base_url = config.endpoint.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            base_url,
            api_key,
        })
    }

    /// Run one investigation stream, forwarding text fragments over `tx`.
    ///
    /// Terminates in one of three ways:
    /// - the response stream ends: `tx` is dropped (natural completion);
    /// - the request or stream fails: a single `Err` item is sent;
    /// - the receiver is dropped (session teardown): the stream is abandoned
    ///   silently and the next send becomes a no-op.
    pub async fn stream_investigation(&self, request: InvestigationRequest, tx: Sender<FragmentResult>) {
        if let Err(err) = self.try_stream(&request, &tx).await {
            tracing::warn!(%err, subject = %request.subject, "investigation stream failed");
            let _ = tx.send(Err(err)).await;
        }
    }

    async fn try_stream(
        &self,
        request: &InvestigationRequest,
        tx: &Sender<FragmentResult>,
    ) -> Result<()> {
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.config.model
        );
        let body = build_request_body(request);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Producer(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(Error::Producer(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let mut stream = response.bytes_stream();
        let mut decoder = SseDecoder::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Producer(format!("stream error: {}", e)))?;
            for data in decoder.feed(&chunk) {
                let Some(text) = extract_text(&data) else {
                    continue;
                };
                if tx.send(Ok(text)).await.is_err() {
                    // Receiver gone: the session was torn down
                    tracing::debug!("fragment receiver dropped, abandoning stream");
                    return Ok(());
                }
            }
        }

        Ok(())
    }
}

/// Build the generateContent request body.
fn build_request_body(request: &InvestigationRequest) -> serde_json::Value {
    let mut parts = vec![serde_json::json!({ "text": build_prompt(request) })];
    if let Some(attachment) = &request.attachment {
        parts.push(serde_json::json!({
            "inlineData": {
                "mimeType": attachment.mime_type,
                "data": attachment.data,
            }
        }));
    }

    serde_json::json!({
        "systemInstruction": {
            "parts": [{ "text": build_system_instruction(request.kind, request.simple_language) }]
        },
        "contents": [{ "role": "user", "parts": parts }]
    })
}

/// Pull the concatenated text parts out of one SSE data payload.
///
/// Payloads without text (e.g. safety metadata, usage chunks) yield `None`.
fn extract_text(data: &str) -> Option<String> {
    let value: serde_json::Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(%err, "unparseable SSE payload, skipping");
            return None;
        }
    };

    let parts = value
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let mut text = String::new();
    for part in parts {
        if let Some(t) = part.get("text").and_then(|t| t.as_str()) {
            text.push_str(t);
        }
    }
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_api_key() {
        if std::env::var("GEMINI_API_KEY").is_err() {
            let config = GenAiConfig::default();
            assert!(GenAiClient::new(config).is_err());
        }
    }

    #[test]
    fn test_extract_text_from_candidate() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"hello "},{"text":"world"}]}}]}"#;
        assert_eq!(extract_text(data).as_deref(), Some("hello world"));
    }

    #[test]
    fn test_extract_text_skips_textless_payloads() {
        assert!(extract_text(r#"{"usageMetadata":{"totalTokenCount":10}}"#).is_none());
        assert!(extract_text("not json").is_none());
    }

    #[test]
    fn test_request_body_shape() {
        let request = InvestigationRequest {
            kind: InvestigationKind::File,
            subject: "invoice.pdf".to_string(),
            simple_language: false,
            attachment: Some(InlineData {
                mime_type: "application/pdf".to_string(),
                data: "AAAA".to_string(),
            }),
        };
        let body = build_request_body(&request);
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Sentinel"));
        assert_eq!(
            body["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "application/pdf"
        );
    }
}
