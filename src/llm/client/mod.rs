//! Model client for one stage: a provider binding plus the tools its agents may call.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::config::LLMConfig;
use crate::crews::agent::AgentRuntime;
use crate::llm::tools::{ToolKind, Toolbox, ToolsConfig};

mod providers;
mod react_executor;

pub use react_executor::ReActConfig;

use providers::ProviderClient;
use react_executor::ReActExecutor;

#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
    toolbox: Toolbox,
    verbose: bool,
}

impl LLMClient {
    pub fn new(config: LLMConfig, tools: ToolsConfig) -> Result<Self> {
        let client = ProviderClient::new(&config)?;
        let toolbox = Toolbox::new(&tools)?;
        Ok(Self {
            config,
            client,
            toolbox,
            verbose: false,
        })
    }

    /// Prints tool-loop progress.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn config(&self) -> &LLMConfig {
        &self.config
    }

    /// Sends a trivial prompt to confirm the endpoint and model answer.
    pub async fn check_connection(&self) -> Result<()> {
        println!(
            "🔄 Checking {} model `{}`...",
            self.config.provider, self.config.model
        );
        match self
            .prompt_without_react("You are a helpful assistant.", "Hello")
            .await
        {
            Ok(_) => {
                println!("✅ Model connection OK");
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ Model connection failed: {}", e);
                Err(e)
            }
        }
    }

    /// Single-turn prompt without tools.
    pub async fn prompt_without_react(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let agent = self
            .client
            .create_agent(system_prompt, &self.config, &[], &self.toolbox);
        self.with_timeout(agent.prompt(user_prompt)).await
    }

    /// Prompt with the given tools attached, letting the model call them for up
    /// to `max_turns` rounds.
    pub async fn prompt_with_tools(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        tools: &[ToolKind],
    ) -> Result<String> {
        let agent = self
            .client
            .create_agent(system_prompt, &self.config, tools, &self.toolbox);
        let react_config = ReActConfig {
            max_iterations: self.config.max_turns,
            verbose: self.verbose,
        };
        self.with_timeout(ReActExecutor::execute(&agent, user_prompt, &react_config))
            .await
    }

    async fn with_timeout<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        let limit = Duration::from_secs(self.config.timeout_seconds);
        tokio::time::timeout(limit, call).await.map_err(|_| {
            anyhow!(
                "{} model `{}` did not answer within {}s",
                self.config.provider,
                self.config.model,
                self.config.timeout_seconds
            )
        })?
    }
}

#[async_trait]
impl AgentRuntime for LLMClient {
    async fn complete(&self, preamble: &str, prompt: &str, tools: &[ToolKind]) -> Result<String> {
        tracing::debug!(
            provider = %self.config.provider,
            model = %self.config.model,
            tools = ?tools,
            "model call"
        );
        if tools.is_empty() {
            self.prompt_without_react(preamble, prompt).await
        } else {
            self.prompt_with_tools(preamble, prompt, tools).await
        }
    }
}
