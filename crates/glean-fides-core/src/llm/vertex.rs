//! Vertex AI `generateContent` client (blocking).
//!
//! Non-streaming: one request per prompt, the text parts of the first
//! candidate are concatenated into the answer.

use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::classifier::ClassifierSettings;
use crate::error::{GleanFidesError, Result};

use super::TextGenerator;

pub const DEFAULT_VERTEX_TOKEN_ENV: &str = "GOOGLE_CLOUD_ACCESS_TOKEN";

const GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

pub struct VertexGenerator {
    client: Client,
    base_url: String,
    project: String,
    region: String,
    token: String,
}

impl VertexGenerator {
    pub fn new(
        project: impl Into<String>,
        region: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let project = project.into();
        let region = region.into();

        if project.trim().is_empty() {
            return Err(GleanFidesError::Configuration {
                message: "classifier.project must be set to use the vertex provider".to_string(),
            });
        }
        if region.trim().is_empty() {
            return Err(GleanFidesError::Configuration {
                message: "classifier.region must be set to use the vertex provider".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(GENERATION_TIMEOUT)
            .build()
            .map_err(|e| GleanFidesError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: format!("https://{}-aiplatform.googleapis.com", region),
            project,
            region,
            token: token.into(),
        })
    }

    /// Build a generator for the project and region of `settings`.
    pub fn from_settings(settings: &ClassifierSettings, token: impl Into<String>) -> Result<Self> {
        Self::new(&settings.project, &settings.region, token)
    }

    /// Like [`from_settings`](Self::from_settings), with the access token
    /// read from `token_env`.
    pub fn from_env(settings: &ClassifierSettings, token_env: &str) -> Result<Self> {
        let token = match std::env::var(token_env) {
            Ok(token) if !token.trim().is_empty() => token,
            _ => {
                return Err(GleanFidesError::Configuration {
                    message: format!(
                        "{} environment variable is not set (try: export {}=$(gcloud auth print-access-token))",
                        token_env, token_env
                    ),
                })
            }
        };
        Self::from_settings(settings, token)
    }

    /// Point requests at a different host (regional proxy, test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model_id: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.project,
            self.region,
            model_id
        )
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl TextGenerator for VertexGenerator {
    fn generate(&self, model_id: &str, prompt: &str) -> Result<String> {
        let url = self.endpoint(model_id);
        log::debug!("[LLM] Provider: vertex, model: {}", model_id);

        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({
                "contents": [
                    {
                        "role": "user",
                        "parts": [{ "text": prompt }]
                    }
                ]
            }))
            .send()
            .map_err(|e| {
                log::error!("[LLM] HTTP request failed: {}", e);
                GleanFidesError::Generation {
                    message: format!("Request to {} failed: {}", url, e),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            log::error!("[LLM] Vertex AI returned {}: {}", status, body);
            return Err(GleanFidesError::Generation {
                message: format!("Vertex AI returned {}: {}", status, body.trim()),
            });
        }

        let parsed: GenerateContentResponse =
            response.json().map_err(|e| GleanFidesError::Generation {
                message: format!("Invalid Vertex AI response: {}", e),
            })?;
        log::debug!("[LLM] Response in {}ms", start.elapsed().as_millis());

        parsed.text().ok_or_else(|| GleanFidesError::Generation {
            message: "Vertex AI response contained no text".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const ENDPOINT: &str =
        "/v1/projects/sandbox/locations/us-central1/publishers/google/models/gemini-test:generateContent";

    fn generator(server: &mockito::Server) -> VertexGenerator {
        VertexGenerator::new("sandbox", "us-central1", "token-123")
            .unwrap()
            .with_base_url(server.url())
    }

    #[test]
    fn test_generate_concatenates_text_parts() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", ENDPOINT)
            .match_header("authorization", "Bearer token-123")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "classify me"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "user."}, {"text": "behavior\n"}]}}]}"#,
            )
            .create();

        let text = generator(&server).generate("gemini-test", "classify me").unwrap();
        assert_eq!(text, "user.behavior\n");
        mock.assert();
    }

    #[test]
    fn test_generate_error_status_is_generation_failure() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", ENDPOINT)
            .with_status(429)
            .with_body(r#"{"error": {"message": "quota exceeded"}}"#)
            .create();

        let err = generator(&server).generate("gemini-test", "p").unwrap_err();
        match err {
            GleanFidesError::Generation { message } => {
                assert!(message.contains("429"));
                assert!(message.contains("quota exceeded"));
            }
            other => panic!("Expected Generation, got {:?}", other),
        }
    }

    #[test]
    fn test_generate_without_candidates_is_generation_failure() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", ENDPOINT)
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create();

        let err = generator(&server).generate("gemini-test", "p").unwrap_err();
        assert!(matches!(err, GleanFidesError::Generation { .. }));
    }

    #[test]
    fn test_missing_project_is_configuration_error() {
        let err = VertexGenerator::new("", "us-central1", "t").err().unwrap();
        assert!(matches!(err, GleanFidesError::Configuration { .. }));
    }

    #[test]
    fn test_from_env_without_token_is_configuration_error() {
        let settings = ClassifierSettings {
            project: "sandbox".to_string(),
            ..ClassifierSettings::default()
        };
        let err = VertexGenerator::from_env(&settings, "GLEAN_FIDES_TEST_VERTEX_TOKEN_NEVER_SET")
            .err()
            .unwrap();
        assert!(matches!(err, GleanFidesError::Configuration { .. }));
    }

    #[test]
    fn test_settings_project_and_region_reach_the_endpoint() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock(
                "POST",
                "/v1/projects/telemetry-audit/locations/europe-west4/publishers/google/models/gemini-test:generateContent",
            )
            .with_status(200)
            .with_body(r#"{"candidates": [{"content": {"parts": [{"text": "N/A"}]}}]}"#)
            .create();

        let settings = ClassifierSettings {
            project: "telemetry-audit".to_string(),
            region: "europe-west4".to_string(),
            ..ClassifierSettings::default()
        };
        let generator = VertexGenerator::from_settings(&settings, "t")
            .unwrap()
            .with_base_url(server.url());

        assert_eq!(generator.generate("gemini-test", "p").unwrap(), "N/A");
        mock.assert();
    }

    #[test]
    fn test_settings_without_project_is_configuration_error() {
        let err = VertexGenerator::from_settings(&ClassifierSettings::default(), "t")
            .err()
            .unwrap();
        assert!(matches!(err, GleanFidesError::Configuration { .. }));
    }

    #[test]
    fn test_unreachable_endpoint_is_generation_failure() {
        let generator = VertexGenerator::new("sandbox", "us-central1", "t")
            .unwrap()
            .with_base_url("http://127.0.0.1:1");

        let err = generator.generate("gemini-test", "p").unwrap_err();
        match err {
            GleanFidesError::Generation { message } => {
                assert!(message.contains("127.0.0.1:1"));
            }
            other => panic!("Expected Generation, got {:?}", other),
        }
    }

    #[test]
    fn test_default_endpoint_is_regional() {
        let generator = VertexGenerator::new("p", "europe-west4", "t").unwrap();
        assert_eq!(
            generator.endpoint("gemini-2.0-flash-001"),
            "https://europe-west4-aiplatform.googleapis.com/v1/projects/p/locations/europe-west4/publishers/google/models/gemini-2.0-flash-001:generateContent"
        );
    }
}
