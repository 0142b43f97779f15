//! Tools the research specialists can call.
//!
//! Each tool is a `rig` tool with a typed error; failures are reported back to
//! the model as tool errors instead of aborting the agent.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub mod arxiv;
pub mod directory_reader;
pub mod element_scraper;
pub mod file_reader;
pub mod web_scraper;

use arxiv::ArxivPaperTool;
use directory_reader::ReadDirectoryTool;
use element_scraper::ScrapeElementTool;
use file_reader::ReadFileTool;
use web_scraper::ScrapeWebsiteTool;

/// Handle naming one tool; agents carry these and the client resolves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    ScrapeWebsite,
    ScrapeElement,
    ArxivPaper,
    ReadFile,
    ReadDirectory,
}

impl ToolKind {
    /// Name the model sees.
    pub fn name(&self) -> &'static str {
        use rig::tool::Tool;

        match self {
            ToolKind::ScrapeWebsite => ScrapeWebsiteTool::NAME,
            ToolKind::ScrapeElement => ScrapeElementTool::NAME,
            ToolKind::ArxivPaper => ArxivPaperTool::NAME,
            ToolKind::ReadFile => ReadFileTool::NAME,
            ToolKind::ReadDirectory => ReadDirectoryTool::NAME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// arXiv Atom query endpoint
    pub arxiv_api_url: String,

    /// Papers returned for a free-text search
    pub arxiv_max_results: usize,

    /// Download each paper's PDF and return its extracted text
    pub download_pdfs: bool,

    /// Where downloaded PDFs are kept
    pub pdf_dir: PathBuf,

    /// Ceiling on the text any single tool call hands back to the model
    pub max_content_chars: usize,

    pub user_agent: String,

    pub request_timeout_seconds: u64,

    /// How deep `read_directory` descends
    pub directory_max_depth: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            arxiv_api_url: String::from("http://export.arxiv.org/api/query"),
            arxiv_max_results: 3,
            download_pdfs: true,
            pdf_dir: PathBuf::from("./arxiv_papers"),
            max_content_chars: 12_000,
            user_agent: format!("guide-flow/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_seconds: 30,
            directory_max_depth: 5,
        }
    }
}

impl ToolsConfig {
    /// HTTP client shared by the network tools.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(Duration::from_secs(self.request_timeout_seconds))
            .build()
            .context("Failed to build HTTP client for tools")
    }
}

/// One instance of every tool, built once per model binding.
#[derive(Debug, Clone)]
pub struct Toolbox {
    pub scrape_website: ScrapeWebsiteTool,
    pub scrape_element: ScrapeElementTool,
    pub arxiv_paper: ArxivPaperTool,
    pub read_file: ReadFileTool,
    pub read_directory: ReadDirectoryTool,
}

impl Toolbox {
    pub fn new(config: &ToolsConfig) -> Result<Self> {
        let client = config.http_client()?;

        Ok(Self {
            scrape_website: ScrapeWebsiteTool::new(client.clone(), config.max_content_chars),
            scrape_element: ScrapeElementTool::new(client.clone(), config.max_content_chars),
            arxiv_paper: ArxivPaperTool::new(client, config),
            read_file: ReadFileTool::new(config.max_content_chars),
            read_directory: ReadDirectoryTool::new(config.directory_max_depth),
        })
    }
}

/// Cuts `text` to at most `max_chars` characters, marking the cut.
pub fn truncate_content(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => (
            format!("{}\n\n[content truncated after {} characters]", &text[..byte_index], max_chars),
            true,
        ),
        None => (text.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_content_respects_char_boundaries() {
        let (text, truncated) = truncate_content("héllo wörld", 4);
        assert!(truncated);
        assert!(text.starts_with("héll\n\n[content truncated"));

        let (text, truncated) = truncate_content("short", 10);
        assert!(!truncated);
        assert_eq!(text, "short");
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(ToolKind::ScrapeWebsite.name(), "scrape_website");
        assert_eq!(ToolKind::ScrapeElement.name(), "scrape_element");
        assert_eq!(ToolKind::ArxivPaper.name(), "arxiv_paper");
        assert_eq!(ToolKind::ReadFile.name(), "read_file");
        assert_eq!(ToolKind::ReadDirectory.name(), "read_directory");
    }

    #[test]
    fn test_toolbox_builds_from_defaults() {
        let config = ToolsConfig::default();
        assert!(config.download_pdfs);
        assert!(Toolbox::new(&config).is_ok());
    }
}
