//! Runtime configuration, resolved once at startup from the environment.
//!
//! Request handling never reads environment variables; the resolved
//! `AppConfig` is passed into the service state instead.

use std::net::SocketAddr;

use serde::Serialize;
use thiserror::Error;

use crate::pipeline::rules::{SectionMarkers, DEFAULT_SECTION_END, DEFAULT_SECTION_START};
use crate::pipeline::strategy::{ReportParsers, StrategyKind};
use crate::pipeline::structuring::{
    GenerationOptions, LlmClient, OllamaClient, OpenAiClient, ServiceStructurer,
    StructuringError, OLLAMA_DEFAULT_MODEL, OLLAMA_DEFAULT_URL, OPENAI_DEFAULT_MODEL,
    OPENAI_DEFAULT_URL,
};

/// Application-level constants
pub const APP_NAME: &str = "Labscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "labscan=info,tower_http=info"
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Which text-understanding backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceBackend {
    OpenAi,
    Ollama,
}

impl ServiceBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "openai" | "open_ai" => Some(Self::OpenAi),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    pub fn default_url(self) -> &'static str {
        match self {
            Self::OpenAi => OPENAI_DEFAULT_URL,
            Self::Ollama => OLLAMA_DEFAULT_URL,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => OPENAI_DEFAULT_MODEL,
            Self::Ollama => OLLAMA_DEFAULT_MODEL,
        }
    }
}

/// Settings for the text-understanding service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub backend: ServiceBackend,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub generation: GenerationOptions,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub default_strategy: StrategyKind,
    pub markers: SectionMarkers,
    pub max_body_bytes: usize,
    pub service: ServiceConfig,
}

impl AppConfig {
    /// Resolve from the process environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind = match (get("LABSCAN_BIND"), get("PORT")) {
            (Some(addr), _) => parse_value("LABSCAN_BIND", &addr)?,
            (None, Some(port)) => {
                let port: u16 = parse_value("PORT", &port)?;
                SocketAddr::from(([127, 0, 0, 1], port))
            }
            (None, None) => parse_value("LABSCAN_BIND", DEFAULT_BIND)?,
        };

        let default_strategy = match get("LABSCAN_STRATEGY") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "LABSCAN_STRATEGY",
                value,
            })?,
            None => StrategyKind::default(),
        };

        let markers = SectionMarkers::new(
            &get("LABSCAN_SECTION_START").unwrap_or_else(|| DEFAULT_SECTION_START.to_string()),
            &get("LABSCAN_SECTION_END").unwrap_or_else(|| DEFAULT_SECTION_END.to_string()),
        );

        let max_body_bytes = match get("LABSCAN_MAX_BODY_BYTES") {
            Some(value) => parse_value("LABSCAN_MAX_BODY_BYTES", &value)?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let backend = match get("LABSCAN_SERVICE") {
            Some(value) => ServiceBackend::parse(&value).ok_or(ConfigError::InvalidValue {
                key: "LABSCAN_SERVICE",
                value,
            })?,
            None => ServiceBackend::OpenAi,
        };

        let defaults = GenerationOptions::default();
        let generation = GenerationOptions {
            max_tokens: match get("LABSCAN_MAX_TOKENS") {
                Some(value) => parse_value("LABSCAN_MAX_TOKENS", &value)?,
                None => defaults.max_tokens,
            },
            temperature: match get("LABSCAN_TEMPERATURE") {
                Some(value) => parse_value("LABSCAN_TEMPERATURE", &value)?,
                None => defaults.temperature,
            },
        };

        let timeout_secs = match get("LABSCAN_TIMEOUT_SECS") {
            Some(value) => parse_value("LABSCAN_TIMEOUT_SECS", &value)?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "LABSCAN_TIMEOUT_SECS",
                value: "0".into(),
            });
        }

        let service = ServiceConfig {
            backend,
            base_url: get("LABSCAN_SERVICE_URL").unwrap_or_else(|| backend.default_url().to_string()),
            model: get("LABSCAN_MODEL").unwrap_or_else(|| backend.default_model().to_string()),
            api_key: get("OPENAI_API_KEY"),
            timeout_secs,
            generation,
        };

        Ok(Self {
            bind,
            default_strategy,
            markers,
            max_body_bytes,
            service,
        })
    }
}

impl ServiceConfig {
    /// Build the service structurer. `None` when OpenAI is selected without a key.
    ///
    /// Constructs a blocking HTTP client; call outside any async runtime.
    pub fn build_structurer(&self) -> Result<Option<ServiceStructurer>, StructuringError> {
        let llm: Box<dyn LlmClient + Send + Sync> = match self.backend {
            ServiceBackend::OpenAi => {
                let Some(key) = self.api_key.as_deref() else {
                    tracing::warn!(
                        "OPENAI_API_KEY is not set; only rule-based parsing is available"
                    );
                    return Ok(None);
                };
                Box::new(OpenAiClient::new(
                    &self.base_url,
                    key,
                    self.timeout_secs,
                    self.generation,
                )?)
            }
            ServiceBackend::Ollama => Box::new(OllamaClient::new(
                &self.base_url,
                self.timeout_secs,
                self.generation,
            )?),
        };

        tracing::info!(
            backend = llm.backend(),
            model = %self.model,
            timeout_secs = self.timeout_secs,
            "Text-understanding service configured"
        );
        Ok(Some(ServiceStructurer::new(llm, &self.model)))
    }
}

impl AppConfig {
    pub fn build_parsers(&self) -> Result<ReportParsers, StructuringError> {
        let structurer = self.service.build_structurer()?;
        Ok(ReportParsers::new(self.markers.clone(), structurer))
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
