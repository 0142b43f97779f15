//! Default roster for the writing crew. Every entry can be overridden from the
//! `[writing.agents.*]` and `[writing.tasks.*]` tables of the config file.

use serde::{Deserialize, Serialize};

use crate::crews::agent::AgentProfile;
use crate::crews::task::TaskProfile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WritingAgents {
    pub technical_writer: AgentProfile,
    pub content_editor: AgentProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WritingTasks {
    pub write_getting_started_guide: TaskProfile,
    pub review_and_polish_guide: TaskProfile,
}

impl Default for WritingAgents {
    fn default() -> Self {
        Self {
            technical_writer: AgentProfile::new(
                "Technical Writer",
                "Turn research reports into beginner-friendly getting-started guides",
                "You write documentation that newcomers actually finish. You explain \
                 one concept at a time, show runnable examples and never assume knowledge \
                 the reader has not been given.",
            ),
            content_editor: AgentProfile::new(
                "Content Editor",
                "Review guides for accuracy, clarity and flow, and deliver the polished \
                 final version",
                "You edit technical content for a developer audience. You tighten prose, \
                 fix structure and formatting, and check every claim against the source \
                 material.",
            ),
        }
    }
}

impl Default for WritingTasks {
    fn default() -> Self {
        Self {
            write_getting_started_guide: TaskProfile::new(
                "Using the research report below, write a getting-started guide for a \
                 complete beginner. Include prerequisites, installation, a first working \
                 example explained step by step, the core concepts, common mistakes and \
                 next steps.\n\nResearch report:\n{research_report}",
                "A complete getting-started guide in markdown with headings, numbered \
                 steps and fenced code blocks.",
            ),
            review_and_polish_guide: TaskProfile::new(
                "Review the draft guide from the technical writer. Check it against the \
                 research report, fix inaccuracies, improve clarity and flow, make sure \
                 every code block is complete, and return the polished guide.",
                "The final, polished getting-started guide in markdown, ready to publish.",
            ),
        }
    }
}
