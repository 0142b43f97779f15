//! Provider clients and the agents built on them.

use anyhow::Result;
use rig::{
    agent::{Agent, AgentBuilder, AgentBuilderSimple},
    client::CompletionClient,
    completion::{CompletionModel, Prompt, PromptError},
};

use crate::config::{LLMConfig, LLMProvider};
use crate::llm::tools::{ToolKind, Toolbox};

/// One client per supported provider.
#[derive(Clone)]
pub enum ProviderClient {
    Groq(rig::providers::groq::Client),
    Ollama(rig::providers::ollama::Client),
    OpenAI(rig::providers::openai::Client),
}

impl ProviderClient {
    pub fn new(config: &LLMConfig) -> Result<Self> {
        match config.provider {
            LLMProvider::Groq => {
                let client = rig::providers::groq::Client::builder(&config.api_key)
                    .base_url(config.base_url())
                    .build();
                Ok(ProviderClient::Groq(client))
            }
            LLMProvider::Ollama => {
                let client = rig::providers::ollama::Client::builder()
                    .base_url(config.base_url())
                    .build();
                Ok(ProviderClient::Ollama(client))
            }
            LLMProvider::OpenAI => {
                let client = rig::providers::openai::Client::builder(&config.api_key)
                    .base_url(config.base_url())
                    .build();
                Ok(ProviderClient::OpenAI(client))
            }
        }
    }

    /// Agent for `config.model` with the given preamble and tool set.
    pub fn create_agent(
        &self,
        preamble: &str,
        config: &LLMConfig,
        tools: &[ToolKind],
        toolbox: &Toolbox,
    ) -> ProviderAgent {
        let model = config.model.as_str();
        match self {
            ProviderClient::Groq(client) => ProviderAgent::Groq(configure(
                client.agent(model),
                preamble,
                config,
                tools,
                toolbox,
            )),
            ProviderClient::Ollama(client) => ProviderAgent::Ollama(configure(
                client.agent(model),
                preamble,
                config,
                tools,
                toolbox,
            )),
            ProviderClient::OpenAI(client) => ProviderAgent::OpenAI(configure(
                client
                    .completion_model(model)
                    .completions_api()
                    .into_agent_builder(),
                preamble,
                config,
                tools,
                toolbox,
            )),
        }
    }
}

fn configure<M: CompletionModel>(
    builder: AgentBuilder<M>,
    preamble: &str,
    config: &LLMConfig,
    tools: &[ToolKind],
    toolbox: &Toolbox,
) -> Agent<M> {
    let mut builder = builder.preamble(preamble).temperature(config.temperature);
    if let Some(max_tokens) = config.max_tokens {
        builder = builder.max_tokens(max_tokens.into());
    }

    // Attaching the first tool turns the builder into an `AgentBuilderSimple`.
    let Some((first, rest)) = tools.split_first() else {
        return builder.build();
    };
    let builder = match first {
        ToolKind::ScrapeWebsite => builder.tool(toolbox.scrape_website.clone()),
        ToolKind::ScrapeElement => builder.tool(toolbox.scrape_element.clone()),
        ToolKind::ArxivPaper => builder.tool(toolbox.arxiv_paper.clone()),
        ToolKind::ReadFile => builder.tool(toolbox.read_file.clone()),
        ToolKind::ReadDirectory => builder.tool(toolbox.read_directory.clone()),
    };

    rest.iter()
        .fold(builder, |builder, tool| attach_tool(builder, *tool, toolbox))
        .build()
}

fn attach_tool<M: CompletionModel>(
    builder: AgentBuilderSimple<M>,
    tool: ToolKind,
    toolbox: &Toolbox,
) -> AgentBuilderSimple<M> {
    match tool {
        ToolKind::ScrapeWebsite => builder.tool(toolbox.scrape_website.clone()),
        ToolKind::ScrapeElement => builder.tool(toolbox.scrape_element.clone()),
        ToolKind::ArxivPaper => builder.tool(toolbox.arxiv_paper.clone()),
        ToolKind::ReadFile => builder.tool(toolbox.read_file.clone()),
        ToolKind::ReadDirectory => builder.tool(toolbox.read_directory.clone()),
    }
}

pub enum ProviderAgent {
    Groq(Agent<rig::providers::groq::CompletionModel<reqwest::Client>>),
    Ollama(Agent<rig::providers::ollama::CompletionModel<reqwest::Client>>),
    OpenAI(Agent<rig::providers::openai::CompletionModel>),
}

impl ProviderAgent {
    /// Single prompt, no tool loop.
    pub async fn prompt(&self, prompt: &str) -> Result<String> {
        match self {
            ProviderAgent::Groq(agent) => agent.prompt(prompt).await.map_err(|e| e.into()),
            ProviderAgent::Ollama(agent) => agent.prompt(prompt).await.map_err(|e| e.into()),
            ProviderAgent::OpenAI(agent) => agent.prompt(prompt).await.map_err(|e| e.into()),
        }
    }

    /// Prompt with up to `max_turns` rounds of tool calls.
    pub async fn multi_turn(&self, prompt: &str, max_turns: usize) -> Result<String, PromptError> {
        match self {
            ProviderAgent::Groq(agent) => agent.prompt(prompt).multi_turn(max_turns).await,
            ProviderAgent::Ollama(agent) => agent.prompt(prompt).multi_turn(max_turns).await,
            ProviderAgent::OpenAI(agent) => agent.prompt(prompt).multi_turn(max_turns).await,
        }
    }
}
