//! The two crews of the pipeline and the factory that wires them to their models.
//!
//! Research: a manager delegates one sub-task per specialist (web, academic,
//! documents), then compiles their findings into a single report.
//! Writing: a technical writer drafts the guide, a content editor polishes it.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::crews::agent::AgentRuntime;
use crate::crews::research::{ResearchCrew, ResearchInputs};
use crate::crews::writing::{WritingCrew, WritingInputs};
use crate::llm::client::LLMClient;

pub mod agent;
pub mod research;
pub mod task;
pub mod writing;

#[cfg(test)]
pub(crate) mod testing;

/// Output of one task inside a crew run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskOutput {
    pub task: String,
    pub agent: String,
    pub raw: String,
}

/// Result of a crew run. `raw` is the output of the last task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrewOutput {
    pub raw: String,
    pub tasks_output: Vec<TaskOutput>,
}

impl CrewOutput {
    pub fn from_tasks(tasks_output: Vec<TaskOutput>) -> Result<Self> {
        let raw = tasks_output
            .last()
            .map(|output| output.raw.clone())
            .ok_or_else(|| anyhow!("crew finished without running any task"))?;
        Ok(Self { raw, tasks_output })
    }
}

impl std::fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// A configured group of agents and tasks that turns one input into text.
#[async_trait]
pub trait Crew: Send + Sync {
    type Input: Send + Sync;

    fn name(&self) -> &str;

    async fn kickoff(&self, input: &Self::Input) -> Result<CrewOutput>;
}

/// Builds a fresh crew for each flow step that needs one.
pub trait CrewFactory: Send + Sync {
    type Research: Crew<Input = ResearchInputs>;
    type Writing: Crew<Input = WritingInputs>;

    fn research_crew(&self) -> Result<Self::Research>;

    fn writing_crew(&self) -> Result<Self::Writing>;
}

/// Crews backed by the configured model providers.
pub struct LlmCrewFactory {
    config: Config,
    research_llm: Arc<LLMClient>,
    writing_llm: Arc<LLMClient>,
}

impl LlmCrewFactory {
    /// Creates both provider clients up front so a broken binding is reported
    /// before any stage runs.
    pub fn new(config: &Config) -> Result<Self> {
        let research_llm = Arc::new(
            LLMClient::new(config.research.llm.clone(), config.tools.clone())?
                .with_verbose(config.verbose),
        );
        let writing_llm = Arc::new(
            LLMClient::new(config.writing.llm.clone(), config.tools.clone())?
                .with_verbose(config.verbose),
        );

        Ok(Self {
            config: config.clone(),
            research_llm,
            writing_llm,
        })
    }

    pub async fn check_connections(&self) -> Result<()> {
        self.research_llm.check_connection().await?;
        self.writing_llm.check_connection().await
    }
}

impl CrewFactory for LlmCrewFactory {
    type Research = ResearchCrew;
    type Writing = WritingCrew;

    fn research_crew(&self) -> Result<ResearchCrew> {
        let llm: Arc<dyn AgentRuntime> = self.research_llm.clone();
        ResearchCrew::new(&self.config.research, llm)
    }

    fn writing_crew(&self) -> Result<WritingCrew> {
        let llm: Arc<dyn AgentRuntime> = self.writing_llm.clone();
        WritingCrew::new(&self.config.writing, llm)
    }
}
