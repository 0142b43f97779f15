//! Three-step flow controller: `receive_user_inputs → run_research_crew → run_writing_crew`.
//!
//! Each step receives the status token emitted by the previous one and decides
//! whether its stage runs. Stage errors stop at the step boundary and become
//! status tokens; the flow itself never fails once it has started.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Config;
use crate::crews::research::ResearchInputs;
use crate::crews::writing::WritingInputs;
use crate::crews::{Crew, CrewFactory, LlmCrewFactory};
use crate::flow::state::{FlowState, SourceInputs};
use crate::outlet;

pub mod state;
mod timing;

pub use timing::TimingScope;

/// Rule framing the operator-facing section headings.
pub const BANNER: &str =
    "======================================================================";

/// Token passed from one step to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    NoSources,
    InputsReceived,
    ResearchSkipped,
    ResearchComplete,
    ResearchFailed,
    WritingSkipped,
    GuideComplete,
    WritingFailed,
}

impl FlowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStatus::NoSources => "no_sources",
            FlowStatus::InputsReceived => "inputs_received",
            FlowStatus::ResearchSkipped => "research_skipped",
            FlowStatus::ResearchComplete => "research_complete",
            FlowStatus::ResearchFailed => "research_failed",
            FlowStatus::WritingSkipped => "writing_skipped",
            FlowStatus::GuideComplete => "guide_complete",
            FlowStatus::WritingFailed => "writing_failed",
        }
    }

    /// Tokens the flow can end on.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FlowStatus::WritingSkipped | FlowStatus::GuideComplete | FlowStatus::WritingFailed
        )
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a finished run leaves behind.
#[derive(Debug)]
pub struct FlowOutcome {
    pub status: FlowStatus,
    /// Every token emitted, in step order.
    pub trail: Vec<FlowStatus>,
    pub state: FlowState,
    pub timing: TimingScope,
}

impl FlowOutcome {
    /// The guide when one was produced, otherwise the terminal token.
    pub fn result_text(&self) -> String {
        match self.state.final_guide() {
            Some(guide) => guide.to_string(),
            None => self.status.to_string(),
        }
    }
}

pub struct GuideFlow<F: CrewFactory> {
    state: FlowState,
    factory: F,
    timing: TimingScope,
}

impl<F: CrewFactory> GuideFlow<F> {
    pub fn new(inputs: SourceInputs, factory: F) -> Self {
        Self {
            state: FlowState::new(inputs),
            factory,
            timing: TimingScope::new(),
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn receive_user_inputs(&mut self) -> FlowStatus {
        println!("{}", BANNER);
        println!("🚀 GUIDE GENERATOR FLOW STARTED");
        println!("{}", BANNER);

        let provided = self.state.inputs.provided_kinds();
        if provided.is_empty() {
            println!("\n⚠️  WARNING: No sources provided!");
            println!("Please provide at least one source type.");
            tracing::warn!(flow = %self.state.id(), "no sources provided, nothing to research");
            return FlowStatus::NoSources;
        }

        println!("\n✅ Sources provided: {}", provided.join(", "));
        println!("\n{}", BANNER);
        FlowStatus::InputsReceived
    }

    pub async fn run_research_crew(&mut self, prev: FlowStatus) -> FlowStatus {
        match prev {
            FlowStatus::NoSources => {
                println!("\n❌ Skipping research crew - no sources provided");
                FlowStatus::ResearchSkipped
            }
            FlowStatus::InputsReceived => {
                println!("\n{}", BANNER);
                println!("📚 CREW 1: RESEARCH CREW (Hierarchical)");
                println!("{}", BANNER);
                println!("\nInitializing research crew with manager + 3 specialists...");
                println!("- Web Content Specialist");
                println!("- Academic Paper Specialist");
                println!("- Document Specialist");

                match self.research().await {
                    Ok(report) => {
                        self.state.record_research_report(report);
                        println!("\n{}", BANNER);
                        println!("✅ RESEARCH CREW COMPLETED");
                        println!("{}", BANNER);
                        FlowStatus::ResearchComplete
                    }
                    Err(err) => {
                        println!("\n❌ ERROR in Research Crew: {}", err);
                        tracing::error!(flow = %self.state.id(), error = ?err, "research stage failed");
                        FlowStatus::ResearchFailed
                    }
                }
            }
            other => {
                tracing::warn!(
                    flow = %self.state.id(),
                    status = %other,
                    "research step received an unexpected status, skipping research"
                );
                FlowStatus::ResearchSkipped
            }
        }
    }

    pub async fn run_writing_crew(&mut self, prev: FlowStatus) -> FlowStatus {
        match prev {
            FlowStatus::ResearchSkipped => {
                println!("\n❌ Skipping writing crew - research was skipped");
                return FlowStatus::WritingSkipped;
            }
            FlowStatus::ResearchFailed => {
                println!("\n❌ Skipping writing crew - research failed");
                return FlowStatus::WritingSkipped;
            }
            _ => {}
        }

        println!("\n{}", BANNER);
        println!("✍️  CREW 2: WRITING CREW (Sequential)");
        println!("{}", BANNER);
        println!("\nInitializing writing crew...");
        println!("- Technical Writer (Step 1)");
        println!("- Content Editor (Step 2)");
        println!("\n{}", BANNER);

        match self.writing().await {
            Ok(guide) => {
                self.state.record_final_guide(guide);
                println!("\n{}", BANNER);
                println!("✅ WRITING CREW COMPLETED");
                println!("{}", BANNER);
                FlowStatus::GuideComplete
            }
            Err(err) => {
                println!("\n❌ ERROR in Writing Crew: {}", err);
                tracing::error!(flow = %self.state.id(), error = ?err, "writing stage failed");
                FlowStatus::WritingFailed
            }
        }
    }

    /// Runs the three steps once, in order.
    pub async fn kickoff(mut self) -> FlowOutcome {
        let mut trail = Vec::with_capacity(3);

        self.timing.start_phase("receive_user_inputs");
        let status = self.receive_user_inputs();
        self.timing.end_phase("receive_user_inputs");
        trail.push(status);

        self.timing.start_phase("run_research_crew");
        let status = self.run_research_crew(status).await;
        self.timing.end_phase("run_research_crew");
        trail.push(status);

        self.timing.start_phase("run_writing_crew");
        let status = self.run_writing_crew(status).await;
        self.timing.end_phase("run_writing_crew");
        trail.push(status);

        tracing::debug!(flow = %self.state.id(), trail = ?trail, "flow finished");

        FlowOutcome {
            status,
            trail,
            state: self.state,
            timing: self.timing,
        }
    }

    async fn research(&self) -> Result<String> {
        let crew = self.factory.research_crew()?;
        println!("\n🔄 Delegating research tasks to specialists...\n");

        let inputs = ResearchInputs::from_sources(&self.state.inputs);
        tracing::debug!(crew = crew.name(), inputs = ?inputs, "research crew kickoff");
        let output = crew.kickoff(&inputs).await?;
        Ok(output.raw)
    }

    async fn writing(&self) -> Result<String> {
        let report = self
            .state
            .research_report()
            .ok_or_else(|| anyhow!("no research report is available to write from"))?;

        let crew = self.factory.writing_crew()?;
        println!("\n🔄 Transforming research into beginner-friendly guide...\n");

        tracing::debug!(crew = crew.name(), chars = report.len(), "writing crew kickoff");
        let output = crew.kickoff(&WritingInputs::new(report)).await?;
        Ok(output.raw)
    }
}

/// Runs the flow once against the configured model providers.
pub async fn launch(config: &Config, inputs: SourceInputs) -> Result<FlowOutcome> {
    let factory = LlmCrewFactory::new(config)?;

    if config.check_connection {
        factory.check_connections().await?;
    }

    let outcome = GuideFlow::new(inputs, factory).kickoff().await;

    if let Some(output_path) = &config.output_path
        && let Err(err) = outlet::save(output_path, &outcome.state).await
    {
        tracing::warn!(path = %output_path.display(), error = ?err, "failed to save flow outputs");
        eprintln!("⚠️ Could not save outputs to {}: {}", output_path.display(), err);
    }

    if config.verbose {
        println!("\n{}", outcome.timing.generate_timing_report());
    }

    Ok(outcome)
}
