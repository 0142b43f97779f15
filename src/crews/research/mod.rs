//! Research crew: explicit fan-out to the specialists, fan-in at the manager.
//!
//! The manager owns the single `research_compilation` task. Each specialist with
//! at least one assigned source receives a delegated brief; the manager then
//! compiles the report from the rendered task and every specialist's findings.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::config::ResearchStageConfig;
use crate::crews::agent::{Agent, AgentRuntime};
use crate::crews::task::{RenderedTask, Task, ensure_known_variables};
use crate::crews::{Crew, CrewOutput, TaskOutput};
use crate::flow::state::{NOT_PROVIDED, SourceInputs};
use crate::llm::tools::ToolKind;

pub mod roster;

/// Variables a research task template may reference.
pub const RESEARCH_VARIABLES: [&str; 4] = [
    "youtube_links",
    "webpage_links",
    "research_paper_links",
    "document_paths",
];

/// The four source lists as handed to the research crew. Empty fields carry
/// the literal `"Not provided"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchInputs {
    pub youtube_links: String,
    pub webpage_links: String,
    pub research_paper_links: String,
    pub document_paths: String,
}

impl ResearchInputs {
    pub fn from_sources(sources: &SourceInputs) -> Self {
        fn or_placeholder(value: &str) -> String {
            if value.trim().is_empty() {
                NOT_PROVIDED.to_string()
            } else {
                value.to_string()
            }
        }

        Self {
            youtube_links: or_placeholder(&sources.youtube_links),
            webpage_links: or_placeholder(&sources.webpage_links),
            research_paper_links: or_placeholder(&sources.research_paper_links),
            document_paths: or_placeholder(&sources.document_paths),
        }
    }

    /// Template variables for task interpolation.
    pub fn variables(&self) -> [(&'static str, &str); 4] {
        [
            ("youtube_links", self.youtube_links.as_str()),
            ("webpage_links", self.webpage_links.as_str()),
            ("research_paper_links", self.research_paper_links.as_str()),
            ("document_paths", self.document_paths.as_str()),
        ]
    }
}

/// Capability a specialist is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specialty {
    Web,
    Academic,
    Document,
}

impl Specialty {
    pub fn agent_name(&self) -> &'static str {
        match self {
            Specialty::Web => "web_specialist",
            Specialty::Academic => "arxiv_specialist",
            Specialty::Document => "document_specialist",
        }
    }

    pub fn tools(&self) -> &'static [ToolKind] {
        match self {
            Specialty::Web => &[ToolKind::ScrapeWebsite, ToolKind::ScrapeElement],
            Specialty::Academic => &[ToolKind::ArxivPaper],
            Specialty::Document => &[ToolKind::ReadFile, ToolKind::ReadDirectory],
        }
    }

    /// Sources this specialist is responsible for, skipping placeholders.
    pub fn assigned_sources<'a>(&self, inputs: &'a ResearchInputs) -> Vec<(&'static str, &'a str)> {
        let candidates: Vec<(&'static str, &'a str)> = match self {
            Specialty::Web => vec![
                ("YouTube videos/channels", inputs.youtube_links.as_str()),
                ("Web pages/articles", inputs.webpage_links.as_str()),
            ],
            Specialty::Academic => vec![("Research papers", inputs.research_paper_links.as_str())],
            Specialty::Document => vec![("Documents", inputs.document_paths.as_str())],
        };

        candidates
            .into_iter()
            .filter(|(_, value)| is_provided(value))
            .collect()
    }
}

fn is_provided(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != NOT_PROVIDED
}

struct Specialist {
    specialty: Specialty,
    agent: Agent,
}

pub struct ResearchCrew {
    manager: Agent,
    specialists: Vec<Specialist>,
    compilation: Task,
}

impl ResearchCrew {
    /// Specialists are consulted in a fixed order: web, academic, documents.
    pub fn new(stage: &ResearchStageConfig, llm: Arc<dyn AgentRuntime>) -> Result<Self> {
        let agents = &stage.agents;
        let manager = Agent::new("research_manager", agents.research_manager.clone(), llm.clone());

        let specialists = [
            (Specialty::Web, &agents.web_specialist),
            (Specialty::Academic, &agents.arxiv_specialist),
            (Specialty::Document, &agents.document_specialist),
        ]
        .into_iter()
        .map(|(specialty, profile)| Specialist {
            specialty,
            agent: Agent::new(specialty.agent_name(), profile.clone(), llm.clone())
                .with_tools(specialty.tools().iter().copied()),
        })
        .collect();

        let compilation = Task::new(
            "research_compilation",
            stage.tasks.research_compilation.clone(),
        );
        ensure_known_variables(&compilation, &RESEARCH_VARIABLES)?;

        Ok(Self {
            manager,
            specialists,
            compilation,
        })
    }

    pub fn manager(&self) -> &Agent {
        &self.manager
    }

    pub fn specialists(&self) -> impl Iterator<Item = &Agent> {
        self.specialists.iter().map(|s| &s.agent)
    }

    /// The manager's brief for one specialist.
    fn delegation_brief(
        &self,
        compilation: &RenderedTask,
        specialist: &Specialist,
        sources: &[(&str, &str)],
    ) -> RenderedTask {
        let mut description = String::from(
            "The research manager is compiling a report about a framework or tool and \
             delegates this part to you.\n\nYour sources:\n",
        );
        for (label, value) in sources {
            description.push_str(&format!("- {}: {}\n", label, value));
        }
        description.push_str(
            "\nUse your tools to read every source listed above. Report only what the \
             sources actually say.",
        );

        RenderedTask {
            name: format!("{}:{}", compilation.name, specialist.agent.name()),
            description,
            expected_output: format!(
                "Detailed findings from your sources, organised by source, with code \
                 examples preserved, to feed into: {}",
                compilation.expected_output
            ),
        }
    }
}

fn format_findings(findings: &[TaskOutput]) -> String {
    if findings.is_empty() {
        return String::from("No specialist returned findings for this request.");
    }

    let mut content = String::from("Findings delegated to the specialists:\n");
    for finding in findings {
        content.push_str(&format!("\n### {}\n{}\n", finding.agent, finding.raw.trim()));
    }
    content
}

#[async_trait]
impl Crew for ResearchCrew {
    type Input = ResearchInputs;

    fn name(&self) -> &str {
        "research"
    }

    async fn kickoff(&self, inputs: &ResearchInputs) -> Result<CrewOutput> {
        let compilation = self.compilation.render(&inputs.variables())?;

        let mut tasks_output = Vec::new();
        for specialist in &self.specialists {
            let sources = specialist.specialty.assigned_sources(inputs);
            if sources.is_empty() {
                tracing::debug!(specialist = specialist.agent.name(), "no sources assigned, not delegating");
                continue;
            }

            let brief = self.delegation_brief(&compilation, specialist, &sources);
            tasks_output.push(specialist.agent.execute(&brief, None).await?);
        }

        let findings = format_findings(&tasks_output);
        let report = self.manager.execute(&compilation, Some(&findings)).await?;
        tasks_output.push(report);

        CrewOutput::from_tasks(tasks_output)
    }
}
