use anyhow::{Result, anyhow};
use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, LLMConfig, LLMProvider};
use crate::flow::state::SourceInputs;

/// guide-flow: researches a framework or tool from the sources you give it and
/// writes a beginner-friendly getting-started guide.
#[derive(Parser, Debug)]
#[command(name = "guide-flow")]
#[command(
    about = "Two-stage research-then-write pipeline that turns videos, web pages, papers and documents into a getting-started guide."
)]
#[command(version)]
pub struct Args {
    /// Config file (defaults to ./guide-flow.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory receiving research_report.md and getting_started_guide.md
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// Debug diagnostics and a timing report
    #[arg(short, long)]
    pub verbose: bool,

    /// Check both model endpoints before starting
    #[arg(long)]
    pub check_connection: bool,

    /// Provider for the research crew (groq, ollama, openai)
    #[arg(long)]
    pub research_provider: Option<String>,

    #[arg(long)]
    pub research_model: Option<String>,

    /// Provider for the writing crew (groq, ollama, openai)
    #[arg(long)]
    pub writing_provider: Option<String>,

    #[arg(long)]
    pub writing_model: Option<String>,

    /// Base URL for every stage served by Ollama
    #[arg(long)]
    pub ollama_base_url: Option<String>,

    /// YouTube video or channel links; skips the interactive prompts
    #[arg(long)]
    pub youtube: Option<String>,

    /// Documentation, blog or tutorial URLs; skips the interactive prompts
    #[arg(long)]
    pub webpages: Option<String>,

    /// arXiv URLs, IDs or paper titles; skips the interactive prompts
    #[arg(long)]
    pub papers: Option<String>,

    /// Local PDF, text or markdown paths; skips the interactive prompts
    #[arg(long)]
    pub documents: Option<String>,
}

fn parse_provider(flag: &str, value: &str) -> Result<LLMProvider> {
    value
        .parse::<LLMProvider>()
        .map_err(|e| anyhow!("--{}: {}", flag, e))
}

fn override_llm(
    llm: &mut LLMConfig,
    flag: &str,
    provider: Option<String>,
    model: Option<String>,
) -> Result<()> {
    if let Some(provider) = provider {
        let provider = parse_provider(flag, &provider)?;
        if provider != llm.provider {
            // The configured endpoint belongs to the previous provider.
            llm.api_base_url.clear();
            llm.api_key.clear();
        }
        llm.provider = provider;
    }
    if let Some(model) = model {
        llm.model = model;
    }
    Ok(())
}

impl Args {
    /// Source lists given on the command line, if any source flag was used.
    pub fn source_inputs(&self) -> Option<SourceInputs> {
        if self.youtube.is_none()
            && self.webpages.is_none()
            && self.papers.is_none()
            && self.documents.is_none()
        {
            return None;
        }

        Some(SourceInputs {
            youtube_links: self.youtube.clone().unwrap_or_default(),
            webpage_links: self.webpages.clone().unwrap_or_default(),
            research_paper_links: self.papers.clone().unwrap_or_default(),
            document_paths: self.documents.clone().unwrap_or_default(),
        })
    }

    /// Loads the config file and applies the command-line overrides on top.
    pub fn into_config(self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        override_llm(
            &mut config.research.llm,
            "research-provider",
            self.research_provider,
            self.research_model,
        )?;
        override_llm(
            &mut config.writing.llm,
            "writing-provider",
            self.writing_provider,
            self.writing_model,
        )?;

        if let Some(base_url) = self.ollama_base_url {
            for llm in [&mut config.research.llm, &mut config.writing.llm] {
                if llm.provider == LLMProvider::Ollama {
                    llm.api_base_url = base_url.clone();
                }
            }
        }

        if self.output_path.is_some() {
            config.output_path = self.output_path;
        }
        config.verbose |= self.verbose;
        config.check_connection |= self.check_connection;

        config.resolve_api_keys();
        Ok(config)
    }
}
