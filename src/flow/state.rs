use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stand-in handed to the research crew for every source the operator skipped.
pub const NOT_PROVIDED: &str = "Not provided";

/// The four optional source lists collected from the operator. Free text, no
/// URL or path validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInputs {
    pub youtube_links: String,
    pub webpage_links: String,
    pub research_paper_links: String,
    pub document_paths: String,
}

impl SourceInputs {
    /// Copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            youtube_links: self.youtube_links.trim().to_string(),
            webpage_links: self.webpage_links.trim().to_string(),
            research_paper_links: self.research_paper_links.trim().to_string(),
            document_paths: self.document_paths.trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.provided_kinds().is_empty()
    }

    /// Human-readable names of the source kinds that were filled in.
    pub fn provided_kinds(&self) -> Vec<&'static str> {
        [
            ("YouTube", &self.youtube_links),
            ("Web Pages", &self.webpage_links),
            ("Documents", &self.document_paths),
            ("Research Papers", &self.research_paper_links),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(kind, _)| kind)
        .collect()
    }
}

/// Mutable record threaded through the flow.
///
/// The outputs start unset and are written once, by the step that produces
/// them, and only after that step succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct FlowState {
    id: Uuid,
    pub inputs: SourceInputs,
    research_report: Option<String>,
    final_guide: Option<String>,
}

impl FlowState {
    pub fn new(inputs: SourceInputs) -> Self {
        Self {
            id: Uuid::new_v4(),
            inputs: inputs.trimmed(),
            research_report: None,
            final_guide: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn research_report(&self) -> Option<&str> {
        self.research_report.as_deref()
    }

    pub fn final_guide(&self) -> Option<&str> {
        self.final_guide.as_deref()
    }

    pub(crate) fn record_research_report(&mut self, report: String) {
        self.research_report = Some(report);
    }

    pub(crate) fn record_final_guide(&mut self, guide: String) {
        self.final_guide = Some(guide);
    }
}
