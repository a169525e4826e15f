use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::parser::parse_advisory_response;
use super::prompt::{build_advisory_prompt, ADVISORY_SYSTEM_PROMPT};
use super::types::{AdvisoryClient, AdvisoryProposal, AdvisoryRequest};
use super::AdvisoryError;
use crate::config::AdvisoryConfig;

/// Advisory client backed by a local Ollama instance.
pub struct OllamaAdvisor {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaAdvisor {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, AdvisoryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdvisoryError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    pub fn from_config(config: &AdvisoryConfig) -> Result<Self, AdvisoryError> {
        Self::new(&config.base_url, &config.model, config.timeout)
    }

    fn map_send_error(&self, e: reqwest::Error) -> AdvisoryError {
        if e.is_timeout() {
            AdvisoryError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            AdvisoryError::OllamaConnection(self.base_url.clone())
        } else {
            AdvisoryError::HttpClient(e.to_string())
        }
    }

    fn check_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, AdvisoryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(AdvisoryError::OllamaError {
            status: status.as_u16(),
            body,
        })
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    format: &'a str,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl AdvisoryClient for OllamaAdvisor {
    fn advise(&self, request: &AdvisoryRequest) -> Result<AdvisoryProposal, AdvisoryError> {
        let url = format!("{}/api/generate", self.base_url);
        let prompt = build_advisory_prompt(request);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt: &prompt,
            system: ADVISORY_SYSTEM_PROMPT,
            stream: false,
            format: "json",
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response)?;

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| AdvisoryError::MalformedResponse(e.to_string()))?;

        parse_advisory_response(&parsed.response)
    }

    fn is_available(&self) -> Result<bool, AdvisoryError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response)?;

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| AdvisoryError::MalformedResponse(e.to_string()))?;

        Ok(parsed.models.iter().any(|m| m.name.starts_with(&self.model)))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Mock advisor for testing. Replays a fixed raw model answer.
pub struct MockAdvisor {
    response: Option<String>,
    calls: AtomicUsize,
}

impl MockAdvisor {
    /// Answers every request with `raw`, parsed like a real model reply.
    pub fn new(raw: &str) -> Self {
        Self {
            response: Some(raw.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails every request as if the endpoint were down.
    pub fn unreachable() -> Self {
        Self {
            response: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AdvisoryClient for MockAdvisor {
    fn advise(&self, _request: &AdvisoryRequest) -> Result<AdvisoryProposal, AdvisoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Some(raw) => parse_advisory_response(raw),
            None => Err(AdvisoryError::OllamaConnection("mock".into())),
        }
    }

    fn is_available(&self) -> Result<bool, AdvisoryError> {
        Ok(self.response.is_some())
    }

    fn model(&self) -> &str {
        "mock"
    }
}
