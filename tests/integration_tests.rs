use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use guide_flow::config::Config;
use guide_flow::crews::CrewFactory;
use guide_flow::crews::agent::AgentRuntime;
use guide_flow::crews::research::ResearchCrew;
use guide_flow::crews::writing::WritingCrew;
use guide_flow::llm::tools::ToolKind;
use guide_flow::{FlowStatus, GuideFlow, SourceInputs, outlet};

/// Answers every prompt from a fixed script keyed on the agent's role.
#[derive(Default)]
struct ScriptedModel {
    calls: Mutex<Vec<(String, String, Vec<ToolKind>)>>,
    fail_role: Option<&'static str>,
}

fn role_of(preamble: &str) -> String {
    preamble
        .strip_prefix("You are ")
        .and_then(|rest| rest.split('.').next())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl AgentRuntime for ScriptedModel {
    async fn complete(&self, preamble: &str, prompt: &str, tools: &[ToolKind]) -> Result<String> {
        let role = role_of(preamble);
        self.calls
            .lock()
            .unwrap()
            .push((role.clone(), prompt.to_string(), tools.to_vec()));

        if self.fail_role == Some(role.as_str()) {
            bail!("{} lost its connection", role);
        }

        Ok(match role.as_str() {
            "Web Content Specialist" => "The docs say: install with `cargo add demo`.".to_string(),
            "Research Manager" => "# Research report\nInstall with `cargo add demo`.".to_string(),
            "Technical Writer" => "Draft guide".to_string(),
            "Content Editor" => "# Getting started with demo\n1. `cargo add demo`".to_string(),
            other => format!("{} has nothing to add", other),
        })
    }
}

/// Real crews from the default roster, all agents bound to one scripted model.
struct ScriptedFactory {
    config: Config,
    model: Arc<ScriptedModel>,
}

impl CrewFactory for ScriptedFactory {
    type Research = ResearchCrew;
    type Writing = WritingCrew;

    fn research_crew(&self) -> Result<ResearchCrew> {
        ResearchCrew::new(&self.config.research, self.model.clone())
    }

    fn writing_crew(&self) -> Result<WritingCrew> {
        WritingCrew::new(&self.config.writing, self.model.clone())
    }
}

fn factory(fail_role: Option<&'static str>) -> (ScriptedFactory, Arc<ScriptedModel>) {
    let model = Arc::new(ScriptedModel {
        fail_role,
        ..Default::default()
    });
    let factory = ScriptedFactory {
        config: Config::default(),
        model: model.clone(),
    };
    (factory, model)
}

fn webpage_only() -> SourceInputs {
    SourceInputs {
        webpage_links: "https://example.com/doc".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_end_to_end_generates_guide() {
    let (factory, model) = factory(None);

    let outcome = GuideFlow::new(webpage_only(), factory).kickoff().await;

    assert_eq!(
        outcome.trail,
        vec![
            FlowStatus::InputsReceived,
            FlowStatus::ResearchComplete,
            FlowStatus::GuideComplete
        ]
    );
    assert_eq!(
        outcome.state.research_report(),
        Some("# Research report\nInstall with `cargo add demo`.")
    );
    assert_eq!(
        outcome.result_text(),
        "# Getting started with demo\n1. `cargo add demo`"
    );

    let calls = model.calls.lock().unwrap();
    let roles: Vec<&str> = calls.iter().map(|(role, _, _)| role.as_str()).collect();
    assert_eq!(
        roles,
        vec![
            "Web Content Specialist",
            "Research Manager",
            "Technical Writer",
            "Content Editor"
        ]
    );

    // The web specialist works with its scrapers and is briefed on the page.
    let (_, web_prompt, web_tools) = &calls[0];
    assert!(web_prompt.contains("https://example.com/doc"));
    assert_eq!(
        web_tools,
        &vec![ToolKind::ScrapeWebsite, ToolKind::ScrapeElement]
    );

    // The manager sees the findings and the placeholders for missing sources.
    let (_, manager_prompt, manager_tools) = &calls[1];
    assert!(manager_prompt.contains("install with `cargo add demo`"));
    assert!(manager_prompt.contains("Not provided"));
    assert!(manager_tools.is_empty());

    // The writer receives the compiled report verbatim.
    assert!(calls[2].1.contains("# Research report\nInstall with `cargo add demo`."));
    assert!(calls[3].1.contains("Draft guide"));
}

#[tokio::test]
async fn test_no_sources_never_calls_a_model() {
    let (factory, model) = factory(None);

    let outcome = GuideFlow::new(SourceInputs::default(), factory).kickoff().await;

    assert_eq!(outcome.status, FlowStatus::WritingSkipped);
    assert_eq!(outcome.result_text(), "writing_skipped");
    assert!(model.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_specialist_failure_fails_research_atomically() {
    let (factory, model) = factory(Some("Web Content Specialist"));

    let outcome = GuideFlow::new(webpage_only(), factory).kickoff().await;

    assert_eq!(
        outcome.trail,
        vec![
            FlowStatus::InputsReceived,
            FlowStatus::ResearchFailed,
            FlowStatus::WritingSkipped
        ]
    );
    assert!(outcome.state.research_report().is_none());
    assert_eq!(model.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_editor_failure_keeps_research_report() {
    let (factory, _model) = factory(Some("Content Editor"));

    let outcome = GuideFlow::new(webpage_only(), factory).kickoff().await;

    assert_eq!(outcome.status, FlowStatus::WritingFailed);
    assert!(outcome.state.research_report().is_some());
    assert!(outcome.state.final_guide().is_none());
}

#[tokio::test]
async fn test_outputs_are_saved_to_disk() {
    let (factory, _model) = factory(None);
    let outcome = GuideFlow::new(webpage_only(), factory).kickoff().await;

    let temp_dir = TempDir::new().unwrap();
    let written = outlet::save(temp_dir.path(), &outcome.state).await.unwrap();

    assert_eq!(written.len(), 2);
    let guide =
        std::fs::read_to_string(temp_dir.path().join(outlet::GUIDE_FILE)).unwrap();
    assert!(guide.starts_with("# Getting started with demo"));
}
