//! OCR over HTTP using an OCR.space-compatible service.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ExtractionFailure;
use crate::models::config::OcrConfig;

/// Text recognised in an image: `Ok(None)` when the service found no text.
pub type OcrOutcome = Result<Option<String>, ExtractionFailure>;

/// A service that turns image bytes into text.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Recognise text in an image.
    async fn recognize(&self, filename: &str, image: Vec<u8>) -> OcrOutcome;
}

/// Response body of the OCR service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcrSpaceResponse {
    #[serde(default)]
    pub is_errored_on_processing: bool,

    #[serde(default)]
    pub error_message: Option<ErrorMessage>,

    #[serde(default)]
    pub parsed_results: Option<Vec<ParsedResult>>,
}

/// The service reports errors either as one string or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    fn joined(&self) -> String {
        match self {
            ErrorMessage::One(message) => message.clone(),
            ErrorMessage::Many(messages) => messages.join("; "),
        }
    }
}

/// Per-page result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParsedResult {
    #[serde(default)]
    pub parsed_text: Option<String>,
}

impl OcrSpaceResponse {
    /// Interpret the response: the first parsed result's text, trimmed.
    pub fn into_outcome(self) -> OcrOutcome {
        if self.is_errored_on_processing {
            let message = self
                .error_message
                .map(|m| m.joined())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Unknown error from OCR Space API.".to_string());
            return Err(ExtractionFailure::OcrService(message));
        }

        let Some(first) = self.parsed_results.and_then(|results| results.into_iter().next()) else {
            return Ok(None);
        };
        match first.parsed_text {
            Some(text) => Ok(Some(text.trim().to_string())),
            None => Err(ExtractionFailure::Ocr(
                "first parsed result carries no ParsedText".to_string(),
            )),
        }
    }
}

/// Client for the OCR.space parse endpoint.
pub struct OcrSpaceClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    language: String,
}

impl OcrSpaceClient {
    /// Create a client from configuration.
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().unwrap_or_default(),
            language: config.language.clone(),
        }
    }
}

#[async_trait]
impl OcrBackend for OcrSpaceClient {
    async fn recognize(&self, filename: &str, image: Vec<u8>) -> OcrOutcome {
        debug!("Sending {} ({} bytes) to {}", filename, image.len(), self.endpoint);

        let form = Form::new()
            .text("apikey", self.api_key.clone())
            .text("language", self.language.clone())
            .part("image", Part::bytes(image).file_name(filename.to_string()));

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!("OCR request for {} failed: {}", filename, e);
                ExtractionFailure::Connectivity(e.to_string())
            })?;

        let body: OcrSpaceResponse = response
            .json()
            .await
            .map_err(|e| ExtractionFailure::Ocr(e.to_string()))?;

        body.into_outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn outcome(json: &str) -> OcrOutcome {
        serde_json::from_str::<OcrSpaceResponse>(json)
            .unwrap()
            .into_outcome()
    }

    #[test]
    fn test_first_parsed_result_trimmed() {
        let result = outcome(
            r#"{"IsErroredOnProcessing": false,
                "ParsedResults": [{"ParsedText": "  Name: John Doe\r\n"}, {"ParsedText": "ignored"}]}"#,
        );
        assert_eq!(result, Ok(Some("Name: John Doe".to_string())));
    }

    #[test]
    fn test_no_parsed_results() {
        assert_eq!(outcome(r#"{"IsErroredOnProcessing": false, "ParsedResults": []}"#), Ok(None));
        assert_eq!(outcome(r#"{"IsErroredOnProcessing": false}"#), Ok(None));
    }

    #[test]
    fn test_null_parsed_text_is_processing_failure() {
        let result = outcome(r#"{"IsErroredOnProcessing": false, "ParsedResults": [{"ParsedText": null}]}"#);
        assert!(matches!(result, Err(ExtractionFailure::Ocr(_))));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .starts_with("Error during OCR processing: ")
        );

        let result = outcome(r#"{"ParsedResults": [{"FileParseExitCode": 1}]}"#);
        assert!(matches!(result, Err(ExtractionFailure::Ocr(_))));
    }

    #[test]
    fn test_processing_error_message() {
        let result = outcome(
            r#"{"IsErroredOnProcessing": true, "ErrorMessage": ["File failed validation", "Bad size"]}"#,
        );
        assert_eq!(
            result,
            Err(ExtractionFailure::OcrService(
                "File failed validation; Bad size".to_string()
            ))
        );

        let result = outcome(r#"{"IsErroredOnProcessing": true, "ErrorMessage": "Timed out"}"#);
        assert_eq!(result, Err(ExtractionFailure::OcrService("Timed out".to_string())));
    }

    #[test]
    fn test_processing_error_without_message() {
        let result = outcome(r#"{"IsErroredOnProcessing": true, "ErrorMessage": null}"#);
        assert_eq!(
            result.unwrap_err().to_string(),
            "OCR Space API Error: Unknown error from OCR Space API."
        );
    }

    #[tokio::test]
    async fn test_unreachable_service_is_connectivity_error() {
        let config = OcrConfig {
            endpoint: "http://127.0.0.1:1/parse/image".to_string(),
            api_key: Some("test".to_string()),
            ..OcrConfig::default()
        };
        let client = OcrSpaceClient::new(&config);

        let result = client.recognize("scan.png", vec![0u8; 16]).await;
        match result {
            Err(ExtractionFailure::Connectivity(_)) => {}
            other => panic!("expected connectivity error, got {:?}", other),
        }
    }
}
