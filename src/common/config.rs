// src/common/config.rs
//! Environment-sourced configuration
//!
//! Every setting is read once at startup. Missing optional values fall back to
//! development defaults; insecure ones are reported with a warning.

use std::env;
use std::path::PathBuf;
use tracing::warn;

pub const INSECURE_SECRET_KEY: &str = "insecure-development-secret-key";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub secret_key: String,
    pub debug: bool,
    pub allowed_hosts: Vec<String>,
    pub cors_allowed_origins: Vec<String>,
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub tokens: TokenLifetimes,
    pub google: OAuthClientConfig,
    pub linkedin: OAuthClientConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub conversion: ConversionConfig,
}

#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    pub access_minutes: i64,
    pub refresh_days: i64,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access_minutes: 60,
            refresh_days: 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OAuthClientConfig {
    pub client_id: Option<String>,
    pub userinfo_url: Option<String>,
    pub tokeninfo_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket_name: Option<String>,
    pub region: String,
}

impl StorageConfig {
    /// True when enough is set to build an S3 client
    pub fn is_configured(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some() && self.bucket_name.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    DeepSeek,
}

impl LlmProvider {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "openai" | "chatgpt" => Some(LlmProvider::OpenAi),
            "deepseek" => Some(LlmProvider::DeepSeek),
            _ => None,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "https://api.openai.com",
            LlmProvider::DeepSeek => "https://api.deepseek.com",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "gpt-3.5-turbo",
            LlmProvider::DeepSeek => "deepseek-chat",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::DeepSeek => "deepseek",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionSourceKind {
    Local,
    S3,
}

#[derive(Debug, Clone)]
pub struct ConversionConfig {
    pub source: ConversionSourceKind,
    pub local_dir: PathBuf,
    pub input_key: String,
}

impl AppConfig {
    /// Build the configuration from the process environment.
    /// `.env` is expected to have been loaded by the caller.
    pub fn from_env() -> Self {
        let secret_key = env::var("SECRET_KEY").unwrap_or_else(|_| {
            warn!("SECRET_KEY not set, using an insecure development key");
            INSECURE_SECRET_KEY.to_string()
        });

        let llm_provider = env::var("LLM_PROVIDER")
            .ok()
            .and_then(|raw| {
                let parsed = LlmProvider::parse(&raw);
                if parsed.is_none() {
                    warn!(value = %raw, "Unknown LLM_PROVIDER, falling back to openai");
                }
                parsed
            })
            .unwrap_or(LlmProvider::OpenAi);

        let llm_api_key = match llm_provider {
            LlmProvider::OpenAi => non_empty_var("OPENAI_API_KEY"),
            LlmProvider::DeepSeek => non_empty_var("DEEPSEEK_API_KEY"),
        };

        let conversion_source = match env::var("CONVERSION_SOURCE")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "s3" => ConversionSourceKind::S3,
            _ => ConversionSourceKind::Local,
        };

        Self {
            secret_key,
            debug: env::var("DEBUG").map(|v| v == "True" || v == "true").unwrap_or(false),
            allowed_hosts: split_list(&env::var("ALLOWED_HOSTS").unwrap_or_else(|_| "*".to_string())),
            cors_allowed_origins: split_list(
                &env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            ),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://resume_api.db".to_string()),
            database_max_connections: parsed_var("DATABASE_MAX_CONNECTIONS", 5),
            port: parsed_var("PORT", 8000),
            tokens: TokenLifetimes {
                access_minutes: parsed_var("ACCESS_TOKEN_LIFETIME_MINUTES", 60),
                refresh_days: parsed_var("REFRESH_TOKEN_LIFETIME_DAYS", 1),
            },
            google: OAuthClientConfig {
                client_id: non_empty_var("GOOGLE_CLIENT_ID"),
                userinfo_url: non_empty_var("GOOGLE_USERINFO_URL"),
                tokeninfo_url: non_empty_var("GOOGLE_TOKENINFO_URL"),
            },
            linkedin: OAuthClientConfig {
                client_id: non_empty_var("LINKEDIN_CLIENT_ID"),
                userinfo_url: non_empty_var("LINKEDIN_USERINFO_URL"),
                tokeninfo_url: None,
            },
            storage: StorageConfig {
                access_key_id: non_empty_var("AWS_ACCESS_KEY_ID"),
                secret_access_key: non_empty_var("AWS_SECRET_ACCESS_KEY"),
                bucket_name: non_empty_var("AWS_STORAGE_BUCKET_NAME"),
                region: env::var("AWS_S3_REGION_NAME").unwrap_or_else(|_| "us-east-1".to_string()),
            },
            llm: LlmConfig {
                provider: llm_provider,
                api_key: llm_api_key,
                model: non_empty_var("LLM_MODEL")
                    .unwrap_or_else(|| llm_provider.default_model().to_string()),
                base_url: non_empty_var("LLM_BASE_URL")
                    .unwrap_or_else(|| llm_provider.default_base_url().to_string()),
                timeout_secs: parsed_var("LLM_TIMEOUT_SECS", 3000),
            },
            conversion: ConversionConfig {
                source: conversion_source,
                local_dir: PathBuf::from(
                    env::var("CONVERSION_LOCAL_DIR").unwrap_or_else(|_| "./data".to_string()),
                ),
                input_key: env::var("CONVERSION_INPUT_KEY").unwrap_or_else(|_| "resume".to_string()),
            },
        }
    }

    /// Configuration used by tests: in-memory database, fixed secret, nothing external.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            secret_key: "test-secret-key".to_string(),
            debug: false,
            allowed_hosts: vec!["*".to_string()],
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            port: 0,
            tokens: TokenLifetimes::default(),
            google: OAuthClientConfig::default(),
            linkedin: OAuthClientConfig::default(),
            storage: StorageConfig {
                region: "us-east-1".to_string(),
                ..StorageConfig::default()
            },
            llm: LlmConfig {
                provider: LlmProvider::OpenAi,
                api_key: None,
                model: LlmProvider::OpenAi.default_model().to_string(),
                base_url: LlmProvider::OpenAi.default_base_url().to_string(),
                timeout_secs: 5,
            },
            conversion: ConversionConfig {
                source: ConversionSourceKind::Local,
                local_dir: PathBuf::from("./data"),
                input_key: "resume".to_string(),
            },
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key = %key, value = %raw, "Invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Split a comma-separated environment value into trimmed, non-empty items
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_trims_and_drops_empty() {
        assert_eq!(
            split_list(" a.example.com, ,b.example.com,"),
            vec!["a.example.com".to_string(), "b.example.com".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_llm_provider_parse() {
        assert_eq!(LlmProvider::parse("OpenAI"), Some(LlmProvider::OpenAi));
        assert_eq!(LlmProvider::parse("deepseek"), Some(LlmProvider::DeepSeek));
        assert_eq!(LlmProvider::parse("other"), None);
        assert_eq!(LlmProvider::DeepSeek.default_model(), "deepseek-chat");
        assert_eq!(LlmProvider::OpenAi.default_model(), "gpt-3.5-turbo");
    }

    #[test]
    fn test_storage_config_requires_credentials_and_bucket() {
        let mut storage = StorageConfig {
            region: "us-east-1".to_string(),
            ..StorageConfig::default()
        };
        assert!(!storage.is_configured());

        storage.access_key_id = Some("key".to_string());
        storage.secret_access_key = Some("secret".to_string());
        assert!(!storage.is_configured());

        storage.bucket_name = Some("bucket".to_string());
        assert!(storage.is_configured());
    }

    #[test]
    fn test_default_token_lifetimes() {
        let lifetimes = TokenLifetimes::default();
        assert_eq!(lifetimes.access_minutes, 60);
        assert_eq!(lifetimes.refresh_days, 1);
    }
}
