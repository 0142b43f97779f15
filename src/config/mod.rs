use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::crews::research::roster::{ResearchAgents, ResearchTasks};
use crate::crews::writing::roster::{WritingAgents, WritingTasks};
use crate::llm::tools::ToolsConfig;
use crate::logging::LoggingConfig;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "guide-flow.toml";

/// Model provider a stage is bound to.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum LLMProvider {
    #[serde(rename = "groq")]
    #[default]
    Groq,
    #[serde(rename = "ollama")]
    Ollama,
    #[serde(rename = "openai")]
    OpenAI,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::Groq => write!(f, "groq"),
            LLMProvider::Ollama => write!(f, "ollama"),
            LLMProvider::OpenAI => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "groq" => Ok(LLMProvider::Groq),
            "ollama" => Ok(LLMProvider::Ollama),
            "openai" => Ok(LLMProvider::OpenAI),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

impl LLMProvider {
    /// Environment variable holding the provider credential, if it needs one.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            LLMProvider::Groq => Some("GROQ_API_KEY"),
            LLMProvider::OpenAI => Some("OPENAI_API_KEY"),
            LLMProvider::Ollama => None,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            LLMProvider::Groq => "https://api.groq.com/openai/v1",
            LLMProvider::Ollama => "http://localhost:11434",
            LLMProvider::OpenAI => "https://api.openai.com/v1",
        }
    }
}

/// Startup configuration problems. Any of these aborts the run before a stage starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error(
        "{stage} stage uses provider `{provider}` but no API key was found; set `{env_var}` or `{stage}.llm.api_key`"
    )]
    MissingApiKey {
        stage: &'static str,
        provider: LLMProvider,
        env_var: &'static str,
    },

    #[error("{stage} stage has no model configured")]
    MissingModel { stage: &'static str },

    #[error("{stage} stage temperature {value} is outside 0.0..=2.0")]
    InvalidTemperature { stage: &'static str, value: f64 },

    #[error("{stage} stage needs at least one agent turn (max_turns = 0)")]
    ZeroTurns { stage: &'static str },
}

/// Application configuration.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// Research crew: manager plus specialists, bound to one model
    pub research: ResearchStageConfig,

    /// Writing crew: writer then editor, bound to one model
    pub writing: WritingStageConfig,

    /// Settings shared by the specialists' tools
    pub tools: ToolsConfig,

    pub logging: LoggingConfig,

    /// Directory receiving the research report and the final guide
    pub output_path: Option<PathBuf>,

    /// Check both model endpoints before the flow starts
    pub check_connection: bool,

    /// Debug-level diagnostics and a timing report
    pub verbose: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ResearchStageConfig {
    pub llm: LLMConfig,
    pub agents: ResearchAgents,
    pub tasks: ResearchTasks,
}

impl Default for ResearchStageConfig {
    fn default() -> Self {
        Self {
            llm: LLMConfig::research_default(),
            agents: ResearchAgents::default(),
            tasks: ResearchTasks::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct WritingStageConfig {
    pub llm: LLMConfig,
    pub agents: WritingAgents,
    pub tasks: WritingTasks,
}

impl Default for WritingStageConfig {
    fn default() -> Self {
        Self {
            llm: LLMConfig::writing_default(),
            agents: WritingAgents::default(),
            tasks: WritingTasks::default(),
        }
    }
}

/// Model binding for one stage.
///
/// `provider` and `model` are required whenever an `llm` table is written out;
/// everything else falls back to per-field defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LLMConfig {
    /// Provider serving this stage
    pub provider: LLMProvider,

    pub model: String,

    /// API key, falls back to the provider's environment variable
    #[serde(default)]
    pub api_key: String,

    /// API base URL, empty means the provider default
    #[serde(default)]
    pub api_base_url: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Completion token ceiling, unset means the provider default
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Upper bound on tool-calling turns for one agent task
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_temperature() -> f64 {
    0.2
}

fn default_max_turns() -> usize {
    5
}

fn default_timeout_seconds() -> u64 {
    300
}

impl LLMConfig {
    /// Remote, fast and cheap: short answers from the specialists and the manager.
    pub fn research_default() -> Self {
        Self {
            provider: LLMProvider::Groq,
            model: String::from("llama-3.1-8b-instant"),
            api_key: String::new(),
            api_base_url: String::new(),
            temperature: default_temperature(),
            max_tokens: Some(350),
            max_turns: default_max_turns(),
            timeout_seconds: default_timeout_seconds(),
        }
    }

    /// Locally hosted, no token ceiling.
    pub fn writing_default() -> Self {
        Self {
            provider: LLMProvider::Ollama,
            model: String::from("llama3.1:8b"),
            api_key: String::new(),
            api_base_url: String::from("http://localhost:11434"),
            temperature: default_temperature(),
            max_tokens: None,
            max_turns: default_max_turns(),
            timeout_seconds: default_timeout_seconds(),
        }
    }

    /// Configured base URL, or the provider's public endpoint.
    pub fn base_url(&self) -> &str {
        if self.api_base_url.trim().is_empty() {
            self.provider.default_base_url()
        } else {
            &self.api_base_url
        }
    }

    /// Fill an empty `api_key` from the provider's environment variable.
    pub fn resolve_api_key(&mut self) {
        if !self.api_key.trim().is_empty() {
            return;
        }
        if let Some(var) = self.provider.api_key_env()
            && let Ok(value) = std::env::var(var)
        {
            self.api_key = value.trim().to_string();
        }
    }

    fn validate(&self, stage: &'static str) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingModel { stage });
        }
        if let Some(env_var) = self.provider.api_key_env()
            && self.api_key.trim().is_empty()
        {
            return Err(ConfigError::MissingApiKey {
                stage,
                provider: self.provider,
                env_var,
            });
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature {
                stage,
                value: self.temperature,
            });
        }
        if self.max_turns == 0 {
            return Err(ConfigError::ZeroTurns { stage });
        }
        Ok(())
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self::research_default()
    }
}

impl Config {
    /// Loads a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Explicit path first, then `guide-flow.toml` in the working directory, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let default_config_path = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(DEFAULT_CONFIG_FILE);

        if default_config_path.exists() {
            Self::from_file(&default_config_path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn resolve_api_keys(&mut self) {
        self.research.llm.resolve_api_key();
        self.writing.llm.resolve_api_key();
    }

    /// Checks credentials and model settings for both stages.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.research.llm.validate("research")?;
        self.writing.llm.validate("writing")?;
        Ok(())
    }
}

// Include tests
#[cfg(test)]
mod tests;
