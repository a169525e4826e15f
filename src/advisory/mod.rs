//! Optional model-based second opinion.
//!
//! The advisor sees the patient, the rule-selected drug and the
//! validated dose. Its answer can only lower the dispensed amount; any
//! failure means the rule-based result stands.

pub mod types;
pub mod prompt;
pub mod parser;
pub mod ollama;

pub use types::*;
pub use prompt::*;
pub use parser::*;
pub use ollama::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisoryError {
    #[error("Ollama is not running at {0}")]
    OllamaConnection(String),

    #[error("Advisory request timed out after {0}s")]
    Timeout(u64),

    #[error("Ollama returned error (status {status}): {body}")]
    OllamaError { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed advisory response: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),
}
