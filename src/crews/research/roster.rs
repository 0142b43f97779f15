//! Default roster for the research crew. Every entry can be overridden from the
//! `[research.agents.*]` and `[research.tasks.*]` tables of the config file.

use serde::{Deserialize, Serialize};

use crate::crews::agent::AgentProfile;
use crate::crews::task::TaskProfile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchAgents {
    pub research_manager: AgentProfile,
    pub web_specialist: AgentProfile,
    pub arxiv_specialist: AgentProfile,
    pub document_specialist: AgentProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchTasks {
    pub research_compilation: TaskProfile,
}

impl Default for ResearchAgents {
    fn default() -> Self {
        Self {
            research_manager: AgentProfile::new(
                "Research Manager",
                "Coordinate the specialists and compile everything they find into one \
                 accurate, well organised research report about the framework or tool",
                "You lead a small research team. You know which specialist to ask for \
                 which kind of source, you never invent facts the team did not find, and \
                 you are known for reports a technical writer can work from directly.",
            ),
            web_specialist: AgentProfile::new(
                "Web Content Specialist",
                "Extract the installation steps, core concepts and code examples from \
                 documentation pages, blog posts, tutorials and video pages",
                "You have spent years reading developer documentation and tutorials. You \
                 scrape pages carefully, keep code samples intact and note which page \
                 every fact came from.",
            ),
            arxiv_specialist: AgentProfile::new(
                "Academic Paper Specialist",
                "Find the referenced research papers, read them and summarise the ideas \
                 that matter to someone getting started",
                "You are a research engineer who reads papers for a living. You explain \
                 the core contribution, the architecture and the practical takeaways \
                 without drowning the reader in notation.",
            ),
            document_specialist: AgentProfile::new(
                "Document Specialist",
                "Read the provided local documents and pull out setup instructions, \
                 configuration details and usage examples",
                "You are meticulous with internal documentation. You read PDFs, text and \
                 markdown files end to end and report exactly what they say.",
            ),
        }
    }
}

impl Default for ResearchTasks {
    fn default() -> Self {
        Self {
            research_compilation: TaskProfile::new(
                "Compile a comprehensive research report about the framework or tool \
                 described by these sources:\n\
                 - YouTube videos/channels: {youtube_links}\n\
                 - Web pages/articles: {webpage_links}\n\
                 - Research papers: {research_paper_links}\n\
                 - Documents: {document_paths}\n\n\
                 Sources marked \"Not provided\" must be ignored. Cover what the tool is, \
                 how to install it, its core concepts, a minimal working example, common \
                 pitfalls and where to learn more.",
                "A structured markdown research report with sections for overview, \
                 installation, core concepts, examples, pitfalls and references, citing \
                 the source of each finding.",
            ),
        }
    }
}
