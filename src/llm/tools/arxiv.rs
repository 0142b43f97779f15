//! arXiv paper fetcher: queries the Atom API and, when enabled, downloads each
//! paper's PDF and returns its extracted text.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

use super::{ToolsConfig, truncate_content};

static ARXIV_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:https?://)?(?:www\.|export\.)?(?:arxiv\.org/(?:abs|pdf)/)?(?:arxiv:)?(\d{4}\.\d{4,5}(?:v\d+)?)(?:\.pdf)?/?$",
    )
    .expect("arXiv id pattern is valid")
});

#[derive(Debug, Error)]
pub enum ArxivError {
    #[error("search query is empty")]
    EmptyQuery,

    #[error("arXiv request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("arXiv answered with HTTP {0}")]
    Status(u16),

    #[error("malformed arXiv feed: {0}")]
    Feed(String),

    #[error("failed to store PDF at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not extract text from {path}: {reason}")]
    PdfText { path: PathBuf, reason: String },
}

/// Normalised arXiv identifier when `input` is an id or an abs/pdf URL.
pub fn parse_arxiv_id(input: &str) -> Option<String> {
    ARXIV_ID
        .captures(input.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paper {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub published: String,
    pub summary: String,
    pub pdf_url: String,
    /// Set once the PDF was downloaded and read
    pub full_text: Option<String>,
    /// Why the full text is missing when the download or extraction failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Id,
    Title,
    Published,
    Summary,
    AuthorName,
}

#[derive(Default)]
struct EntryBuilder {
    id: String,
    title: String,
    published: String,
    summary: String,
    authors: Vec<String>,
    pdf_url: Option<String>,
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl EntryBuilder {
    fn field_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Id => Some(&mut self.id),
            Field::Title => Some(&mut self.title),
            Field::Published => Some(&mut self.published),
            Field::Summary => Some(&mut self.summary),
            Field::AuthorName => self.authors.last_mut(),
        }
    }

    fn finish(self) -> Paper {
        let abs_url = self.id.trim().to_string();
        let id = abs_url
            .rsplit("/abs/")
            .next()
            .unwrap_or(abs_url.as_str())
            .to_string();
        let pdf_url = self
            .pdf_url
            .unwrap_or_else(|| abs_url.replacen("/abs/", "/pdf/", 1));

        Paper {
            id,
            title: collapse_whitespace(&self.title),
            authors: self
                .authors
                .iter()
                .map(|name| collapse_whitespace(name))
                .filter(|name| !name.is_empty())
                .collect(),
            published: self.published.trim().to_string(),
            summary: collapse_whitespace(&self.summary),
            pdf_url,
            full_text: None,
            download_error: None,
        }
    }
}

fn feed_error(err: impl std::fmt::Display) -> ArxivError {
    ArxivError::Feed(err.to_string())
}

/// `href` of a `<link title="pdf">` element.
fn pdf_link(link: &BytesStart) -> Result<Option<String>, ArxivError> {
    let mut is_pdf = false;
    let mut href = None;
    for attr in link.attributes() {
        let attr = attr.map_err(feed_error)?;
        let value = attr.unescape_value().map_err(feed_error)?;
        match attr.key.local_name().as_ref() {
            b"title" => is_pdf = value == "pdf",
            b"href" => href = Some(value.into_owned()),
            _ => {}
        }
    }
    Ok(href.filter(|_| is_pdf))
}

/// Papers listed in an arXiv Atom feed.
pub fn parse_feed(feed: &str) -> Result<Vec<Paper>, ArxivError> {
    let mut reader = Reader::from_str(feed);
    let mut papers = Vec::new();
    let mut entry: Option<EntryBuilder> = None;
    let mut field: Option<Field> = None;
    let mut in_author = false;

    loop {
        match reader.read_event().map_err(feed_error)? {
            Event::Start(start) => {
                if entry.is_none() {
                    if start.local_name().as_ref() == b"entry" {
                        entry = Some(EntryBuilder::default());
                    }
                    continue;
                }
                let Some(current) = entry.as_mut() else {
                    continue;
                };
                field = match start.local_name().as_ref() {
                    b"id" => Some(Field::Id),
                    b"title" => Some(Field::Title),
                    b"published" => Some(Field::Published),
                    b"summary" => Some(Field::Summary),
                    b"author" => {
                        in_author = true;
                        None
                    }
                    b"name" if in_author => {
                        current.authors.push(String::new());
                        Some(Field::AuthorName)
                    }
                    b"link" => {
                        if let Some(href) = pdf_link(&start)? {
                            current.pdf_url = Some(href);
                        }
                        None
                    }
                    _ => None,
                };
            }
            Event::Empty(element) => {
                if let Some(current) = entry.as_mut()
                    && element.local_name().as_ref() == b"link"
                    && let Some(href) = pdf_link(&element)?
                {
                    current.pdf_url = Some(href);
                }
            }
            Event::Text(text) => {
                if let (Some(current), Some(active)) = (entry.as_mut(), field)
                    && let Some(target) = current.field_mut(active)
                {
                    target.push_str(&text.unescape().map_err(feed_error)?);
                }
            }
            Event::CData(data) => {
                if let (Some(current), Some(active)) = (entry.as_mut(), field)
                    && let Some(target) = current.field_mut(active)
                {
                    target.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(end) => match end.local_name().as_ref() {
                b"entry" => {
                    if let Some(finished) = entry.take() {
                        papers.push(finished.finish());
                    }
                    field = None;
                    in_author = false;
                }
                b"author" => in_author = false,
                _ => field = None,
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(papers)
}

#[derive(Debug, Clone)]
pub struct ArxivPaperTool {
    client: reqwest::Client,
    api_url: String,
    max_results: usize,
    download_pdfs: bool,
    pdf_dir: PathBuf,
    max_content_chars: usize,
}

#[derive(Debug, Deserialize)]
pub struct ArxivPaperArgs {
    pub search_query: String,
    pub max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ArxivResult {
    pub query: String,
    pub papers: Vec<Paper>,
}

impl ArxivPaperTool {
    pub fn new(client: reqwest::Client, config: &ToolsConfig) -> Self {
        Self {
            client,
            api_url: config.arxiv_api_url.clone(),
            max_results: config.arxiv_max_results,
            download_pdfs: config.download_pdfs,
            pdf_dir: config.pdf_dir.clone(),
            max_content_chars: config.max_content_chars,
        }
    }

    pub async fn search(
        &self,
        query: &str,
        max_results: Option<usize>,
    ) -> Result<ArxivResult, ArxivError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ArxivError::EmptyQuery);
        }
        let max_results = max_results.unwrap_or(self.max_results).clamp(1, 10);

        let params: Vec<(&str, String)> = match parse_arxiv_id(query) {
            Some(id) => vec![("id_list", id)],
            None => vec![
                ("search_query", format!("all:{}", query)),
                ("start", "0".to_string()),
                ("max_results", max_results.to_string()),
            ],
        };

        tracing::debug!(query, ?params, "querying arXiv");
        let response = self.client.get(&self.api_url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArxivError::Status(status.as_u16()));
        }

        let feed = response.text().await?;
        let mut papers = parse_feed(&feed)?;
        papers.truncate(max_results);

        if self.download_pdfs {
            for paper in &mut papers {
                match self.download_text(paper).await {
                    Ok(text) => paper.full_text = Some(text),
                    Err(err) => {
                        tracing::warn!(paper = %paper.id, error = %err, "keeping arXiv metadata without full text");
                        paper.download_error = Some(err.to_string());
                    }
                }
            }
        }

        Ok(ArxivResult {
            query: query.to_string(),
            papers,
        })
    }

    async fn download_text(&self, paper: &Paper) -> Result<String, ArxivError> {
        let response = self.client.get(&paper.pdf_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArxivError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;

        let path = self.pdf_path(&paper.id);
        store(&path, &bytes).await?;

        let text = extract_pdf_text(path, bytes.to_vec()).await?;
        Ok(truncate_content(&text, self.max_content_chars).0)
    }

    fn pdf_path(&self, id: &str) -> PathBuf {
        let file_name: String = id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
            .collect();
        self.pdf_dir.join(format!("{}.pdf", file_name))
    }
}

async fn store(path: &Path, bytes: &[u8]) -> Result<(), ArxivError> {
    let storage_error = |source| ArxivError::Storage {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(storage_error)?;
    }
    tokio::fs::write(path, bytes).await.map_err(storage_error)
}

/// Extracts PDF text off the async runtime.
pub(crate) async fn extract_pdf_text(path: PathBuf, bytes: Vec<u8>) -> Result<String, ArxivError> {
    let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await;
    match extracted {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(err)) => Err(ArxivError::PdfText {
            path,
            reason: err.to_string(),
        }),
        Err(join_err) => Err(ArxivError::PdfText {
            path,
            reason: join_err.to_string(),
        }),
    }
}

impl Tool for ArxivPaperTool {
    const NAME: &'static str = "arxiv_paper";

    type Error = ArxivError;
    type Args = ArxivPaperArgs;
    type Output = ArxivResult;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Look up research papers on arXiv by ID, abs/pdf URL or free-text \
                          query. Returns title, authors, abstract and, when available, the \
                          full text of the paper."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "search_query": {
                        "type": "string",
                        "description": "arXiv ID (e.g. 2103.00020), arXiv URL, or search terms"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Papers to return for a search (1-10)"
                    }
                },
                "required": ["search_query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...arxiv_paper@{:?}", args);
        self.search(&args.search_query, args.max_results).await
    }
}
