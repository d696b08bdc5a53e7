//! Generation adapters: natural-language prompt to [`DiagramData`].
//!
//! DESIGN
//! ======
//! Two adapters implement [`DiagramGenerator`]:
//!
//! - [`llm::LlmGenerator`] asks a hosted model for a JSON diagram and
//!   validates what comes back.
//! - [`heuristic::HeuristicGenerator`] picks a canned template by keyword and
//!   needs no network.
//!
//! [`from_env`] chooses between them with `DIAGRAM_GENERATOR`. In `auto` mode
//! the LLM adapter is used when it can be configured and the local one
//! otherwise.

pub mod heuristic;
pub mod llm;

use std::sync::Arc;

use canvas::model::DiagramData;
use tracing::{info, warn};

use crate::config::{env_parse, env_string};
use crate::error::ErrorCode;
use crate::llm::LlmClient;
use crate::llm::types::LlmError;

pub const DEFAULT_MAX_TOKENS: u32 = 1500;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("please enter a prompt")]
    EmptyPrompt,

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("no response from model")]
    EmptyResponse,

    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("invalid diagram data structure: missing {0}")]
    MissingField(&'static str),

    #[error("unknown diagram type: {0}")]
    UnknownKind(String),

    #[error("invalid diagram data structure: {0}")]
    Malformed(String),

    #[error("generator config: {0}")]
    Config(String),
}

impl ErrorCode for GenerateError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyPrompt => "E_EMPTY_PROMPT",
            Self::Llm(e) => e.error_code(),
            Self::EmptyResponse => "E_EMPTY_RESPONSE",
            Self::InvalidJson(_) => "E_INVALID_JSON",
            Self::MissingField(_) => "E_MISSING_FIELD",
            Self::UnknownKind(_) => "E_UNKNOWN_KIND",
            Self::Malformed(_) => "E_MALFORMED",
            Self::Config(_) => "E_GENERATOR_CONFIG",
        }
    }

    /// Model output varies between calls, so bad payloads are worth a retry.
    fn retryable(&self) -> bool {
        match self {
            Self::Llm(e) => e.retryable(),
            Self::EmptyResponse | Self::InvalidJson(_) | Self::MissingField(_) | Self::UnknownKind(_) | Self::Malformed(_) => {
                true
            }
            Self::EmptyPrompt | Self::Config(_) => false,
        }
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Turns a prompt into an ungrounded diagram.
#[async_trait::async_trait]
pub trait DiagramGenerator: Send + Sync {
    /// Short adapter name for logs.
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Returns a [`GenerateError`] for an empty prompt, a transport failure
    /// or a payload that does not describe a diagram.
    async fn generate(&self, prompt: &str) -> Result<DiagramData, GenerateError>;
}

/// Trim `prompt` and reject it when nothing is left.
///
/// # Errors
///
/// Returns [`GenerateError::EmptyPrompt`] for empty or whitespace-only input.
pub fn validate_prompt(prompt: &str) -> Result<&str, GenerateError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(GenerateError::EmptyPrompt);
    }
    Ok(trimmed)
}

// =============================================================================
// CONFIG
// =============================================================================

/// Which adapter [`from_env`] builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeneratorMode {
    /// LLM when configured, local heuristic otherwise.
    #[default]
    Auto,
    Llm,
    Local,
}

impl GeneratorMode {
    fn parse(raw: Option<&str>) -> Result<Self, GenerateError> {
        match raw.unwrap_or("auto") {
            "auto" => Ok(Self::Auto),
            "llm" => Ok(Self::Llm),
            "local" => Ok(Self::Local),
            other => Err(GenerateError::Config(format!(
                "unknown DIAGRAM_GENERATOR '{other}' (expected 'auto', 'llm' or 'local')"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    pub mode: GeneratorMode,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl GeneratorConfig {
    /// Read `DIAGRAM_GENERATOR` (default `auto`), `DIAGRAM_MAX_TOKENS`
    /// (default 1500) and `DIAGRAM_TEMPERATURE` (default 0.7).
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Config`] for an unknown mode.
    pub fn from_env() -> Result<Self, GenerateError> {
        let mode = GeneratorMode::parse(env_string("DIAGRAM_GENERATOR").as_deref())?;
        let max_tokens = env_parse("DIAGRAM_MAX_TOKENS", DEFAULT_MAX_TOKENS);
        let temperature = env_parse("DIAGRAM_TEMPERATURE", DEFAULT_TEMPERATURE);
        Ok(Self { mode, max_tokens, temperature })
    }
}

/// Build the configured generator.
///
/// # Errors
///
/// Returns an error for an unknown mode, or when `llm` mode is requested and
/// the LLM client cannot be configured.
pub fn from_env() -> Result<Arc<dyn DiagramGenerator>, GenerateError> {
    let config = GeneratorConfig::from_env()?;
    let local = || -> Arc<dyn DiagramGenerator> { Arc::new(heuristic::HeuristicGenerator) };
    let generator: Arc<dyn DiagramGenerator> = match config.mode {
        GeneratorMode::Local => local(),
        GeneratorMode::Llm => {
            let client = LlmClient::from_env()?;
            info!(model = client.model(), "generate: using LLM generator");
            Arc::new(llm::LlmGenerator::new(Arc::new(client), config.max_tokens, config.temperature))
        }
        GeneratorMode::Auto => match LlmClient::from_env() {
            Ok(client) => {
                info!(model = client.model(), "generate: using LLM generator");
                Arc::new(llm::LlmGenerator::new(Arc::new(client), config.max_tokens, config.temperature))
            }
            Err(e) => {
                warn!(error = %e, "LLM client not configured; using local generator");
                local()
            }
        },
    };
    Ok(generator)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
