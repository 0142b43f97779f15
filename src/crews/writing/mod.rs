//! Writing crew: technical writer drafts, content editor polishes. Strictly sequential.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::config::WritingStageConfig;
use crate::crews::agent::{Agent, AgentRuntime};
use crate::crews::task::{Task, ensure_known_variables};
use crate::crews::{Crew, CrewOutput};

pub mod roster;

/// Variables a writing task template may reference.
pub const WRITING_VARIABLES: [&str; 1] = ["research_report"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WritingInputs {
    pub research_report: String,
}

impl WritingInputs {
    pub fn new(research_report: impl Into<String>) -> Self {
        Self {
            research_report: research_report.into(),
        }
    }

    fn variables(&self) -> [(&'static str, &str); 1] {
        [("research_report", self.research_report.as_str())]
    }
}

pub struct WritingCrew {
    writer: Agent,
    editor: Agent,
    draft: Task,
    polish: Task,
}

impl WritingCrew {
    pub fn new(stage: &WritingStageConfig, llm: Arc<dyn AgentRuntime>) -> Result<Self> {
        let writer = Agent::new(
            "technical_writer",
            stage.agents.technical_writer.clone(),
            llm.clone(),
        );
        let editor = Agent::new("content_editor", stage.agents.content_editor.clone(), llm);

        let draft = Task::new(
            "write_getting_started_guide",
            stage.tasks.write_getting_started_guide.clone(),
        );
        let polish = Task::new(
            "review_and_polish_guide",
            stage.tasks.review_and_polish_guide.clone(),
        );
        ensure_known_variables(&draft, &WRITING_VARIABLES)?;
        ensure_known_variables(&polish, &WRITING_VARIABLES)?;

        Ok(Self {
            writer,
            editor,
            draft,
            polish,
        })
    }
}

#[async_trait]
impl Crew for WritingCrew {
    type Input = WritingInputs;

    fn name(&self) -> &str {
        "writing"
    }

    async fn kickoff(&self, inputs: &WritingInputs) -> Result<CrewOutput> {
        let vars = inputs.variables();
        let draft_task = self.draft.render(&vars)?;
        let polish_task = self.polish.render(&vars)?;

        let draft = self.writer.execute(&draft_task, None).await?;

        // The editor checks the draft against the report it was written from.
        let context = format!(
            "Draft guide from the technical writer:\n{}\n\nResearch report:\n{}",
            draft.raw.trim(),
            inputs.research_report.trim()
        );
        let polished = self.editor.execute(&polish_task, Some(&context)).await?;

        CrewOutput::from_tasks(vec![draft, polished])
    }
}
