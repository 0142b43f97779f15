//! Agent descriptors and the model binding they run on.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::crews::TaskOutput;
use crate::crews::task::RenderedTask;
use crate::llm::tools::ToolKind;

/// Role description for one agent, as written in the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl AgentProfile {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    /// System prompt for the agent.
    pub fn preamble(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role.trim(),
            self.backstory.trim(),
            self.goal.trim()
        )
    }
}

/// Model binding shared by the agents of one crew.
///
/// Implementations send `prompt` under `preamble` and return the final text,
/// letting the model call the listed tools when there are any.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn complete(&self, preamble: &str, prompt: &str, tools: &[ToolKind]) -> Result<String>;
}

/// A named role bound to one model binding and a fixed set of tools.
#[derive(Clone)]
pub struct Agent {
    name: String,
    profile: AgentProfile,
    tools: Vec<ToolKind>,
    llm: Arc<dyn AgentRuntime>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("role", &self.profile.role)
            .field("tools", &self.tools)
            .finish()
    }
}

impl Agent {
    pub fn new(name: impl Into<String>, profile: AgentProfile, llm: Arc<dyn AgentRuntime>) -> Self {
        Self {
            name: name.into(),
            profile,
            tools: Vec::new(),
            llm,
        }
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = ToolKind>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn tools(&self) -> &[ToolKind] {
        &self.tools
    }

    /// Runs one task to completion and returns its output.
    pub async fn execute(&self, task: &RenderedTask, context: Option<&str>) -> Result<TaskOutput> {
        println!("   🤖 [{}] working on `{}`...", self.profile.role.trim(), task.name);
        tracing::debug!(agent = %self.name, task = %task.name, tools = ?self.tools, "agent task started");

        let raw = self
            .llm
            .complete(&self.profile.preamble(), &task.prompt(context), &self.tools)
            .await
            .with_context(|| format!("agent `{}` failed on task `{}`", self.name, task.name))?;

        println!("   ✅ [{}] finished `{}`", self.profile.role.trim(), task.name);
        tracing::debug!(agent = %self.name, task = %task.name, chars = raw.len(), "agent task finished");

        Ok(TaskOutput {
            task: task.name.clone(),
            agent: self.name.clone(),
            raw,
        })
    }
}
