use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::models::{ConversionOrigin, ConversionOutcome, StructuredResume};
use super::parser::{parse_reply, validate_resume, ParseError};
use super::placeholder::placeholder_resume;
use super::prompts::{build_user_prompt, SYSTEM_PROMPT};
use super::source::{LocalDirSource, S3Source, SourceError, TextSource};
use crate::common::config::{AppConfig, ConversionSourceKind};
use crate::services::{AWSService, ChatCompletionClient, CompletionClient, LlmError};

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("no text source configured")]
    NoSource,

    #[error("no resume text for key '{0}'")]
    MissingText(String),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("unusable model reply: {0}")]
    Parse(#[from] ParseError),
}

/// Turns stored resume text into a structured resume, reusing the last
/// artifact while it is newer than the text
pub struct ConversionService {
    source: Option<Arc<dyn TextSource>>,
    llm: Arc<dyn CompletionClient>,
    default_key: String,
}

impl ConversionService {
    pub fn new(
        source: Option<Arc<dyn TextSource>>,
        llm: Arc<dyn CompletionClient>,
        default_key: impl Into<String>,
    ) -> Self {
        Self {
            source,
            llm,
            default_key: default_key.into(),
        }
    }

    /// Source and model client as selected by the environment
    pub async fn from_config(config: &AppConfig) -> Self {
        let source: Option<Arc<dyn TextSource>> = match config.conversion.source {
            ConversionSourceKind::Local => {
                Some(Arc::new(LocalDirSource::new(&config.conversion.local_dir)))
            }
            ConversionSourceKind::S3 => match AWSService::from_config(&config.storage).await {
                Ok(storage) => Some(Arc::new(S3Source::new(storage))),
                Err(e) => {
                    warn!(error = %e, "S3 conversion source unavailable, conversions will return the placeholder");
                    None
                }
            },
        };

        if config.llm.api_key.is_none() {
            warn!(
                provider = config.llm.provider.as_str(),
                "No LLM API key configured, conversions will return the placeholder"
            );
        }

        let llm: Arc<dyn CompletionClient> = Arc::new(ChatCompletionClient::new(&config.llm));
        Self::new(source, llm, config.conversion.input_key.clone())
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    /// Never fails: every error degrades to the placeholder
    pub async fn convert(&self, key: &str, force: bool) -> ConversionOutcome {
        match self.try_convert(key, force).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(key = %key, error = %e, "Conversion failed, returning placeholder resume");
                ConversionOutcome {
                    origin: ConversionOrigin::Placeholder,
                    resume: placeholder_resume(),
                }
            }
        }
    }

    async fn try_convert(&self, key: &str, force: bool) -> Result<ConversionOutcome, ConversionError> {
        let source = self.source.as_ref().ok_or(ConversionError::NoSource)?;

        let text_modified = source
            .text_modified(key)
            .await?
            .ok_or_else(|| ConversionError::MissingText(key.to_string()))?;
        let artifact_modified = source.artifact_modified(key).await?;

        let is_stale = match artifact_modified {
            Some(artifact) => artifact < text_modified,
            None => true,
        };

        if !is_stale && !force {
            match self.load_artifact(source.as_ref(), key).await {
                Ok(resume) => {
                    debug!(key = %key, source = %source.describe(), "Using cached conversion");
                    return Ok(ConversionOutcome {
                        origin: ConversionOrigin::Cached,
                        resume,
                    });
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Cached conversion unusable, converting again");
                }
            }
        }

        let text = source.read_text(key).await?;
        if text.trim().is_empty() {
            return Err(ConversionError::MissingText(key.to_string()));
        }

        info!(
            key = %key,
            source = %source.describe(),
            stale = is_stale,
            force = force,
            "Converting resume text"
        );

        let reply = self
            .llm
            .complete(SYSTEM_PROMPT, &build_user_prompt(&text))
            .await?;
        let resume = parse_reply(&reply)?;

        match serde_json::to_string_pretty(&resume) {
            Ok(serialized) => {
                if let Err(e) = source.write_artifact(key, &serialized).await {
                    error!(key = %key, error = %e, "Failed to store conversion artifact");
                }
            }
            Err(e) => error!(key = %key, error = %e, "Failed to serialize conversion artifact"),
        }

        Ok(ConversionOutcome {
            origin: ConversionOrigin::Fresh,
            resume,
        })
    }

    async fn load_artifact(
        &self,
        source: &dyn TextSource,
        key: &str,
    ) -> Result<StructuredResume, ConversionError> {
        let raw = source.read_artifact(key).await?;
        let value = serde_json::from_str(&raw).map_err(|_| ParseError::NoJson)?;
        Ok(validate_resume(value)?)
    }
}
