//! Whole-page scraper: fetches a URL and returns its readable text.

use regex::Regex;
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

use super::truncate_content;

static INVISIBLE_BLOCKS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["script", "style", "noscript", "svg", "template", "head"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b.*?</{tag}\s*>")).expect("block pattern is valid")
        })
        .collect()
});
static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));
static BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)<br\s*/?>|</(?:p|div|li|tr|h[1-6]|section|article|pre|blockquote|ul|ol|table)\s*>",
    )
    .expect("block break pattern is valid")
});
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));
static TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title[^>]*>(.*?)</title\s*>").expect("title pattern is valid")
});

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("`{url}` is not an http(s) URL")]
    InvalidUrl { url: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("unsupported selector `{0}`; use `tag`, `#id`, `.class` or a combination like `div.note`")]
    UnsupportedSelector(String),
}

/// Fetches `url` and returns the body as text.
pub(crate) async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String, ScrapeError> {
    let url = url.trim();
    let parsed = reqwest::Url::parse(url).map_err(|_| ScrapeError::InvalidUrl {
        url: url.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScrapeError::InvalidUrl {
            url: url.to_string(),
        });
    }

    tracing::debug!(url, "fetching page");
    let response = client
        .get(parsed)
        .send()
        .await
        .map_err(|source| ScrapeError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| ScrapeError::Request {
        url: url.to_string(),
        source,
    })
}

/// Page `<title>`, entity-decoded.
pub fn page_title(html: &str) -> Option<String> {
    let title = TITLE.captures(html)?.get(1)?.as_str();
    let title = html_escape::decode_html_entities(title).trim().to_string();
    (!title.is_empty()).then_some(title)
}

/// Readable text of an HTML fragment: invisible blocks and tags removed,
/// block ends turned into line breaks, entities decoded, blank runs collapsed.
pub fn html_to_text(html: &str) -> String {
    let mut text = COMMENT.replace_all(html, "").into_owned();
    for block in INVISIBLE_BLOCKS.iter() {
        text = block.replace_all(&text, " ").into_owned();
    }
    text = BLOCK_BREAK.replace_all(&text, "\n").into_owned();
    text = TAG.replace_all(&text, " ").into_owned();

    let decoded = html_escape::decode_html_entities(&text);
    decoded
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone)]
pub struct ScrapeWebsiteTool {
    client: reqwest::Client,
    max_content_chars: usize,
}

#[derive(Debug, Deserialize)]
pub struct ScrapeWebsiteArgs {
    pub website_url: String,
}

#[derive(Debug, Serialize)]
pub struct ScrapedPage {
    pub url: String,
    pub title: Option<String>,
    pub content: String,
    pub truncated: bool,
}

impl ScrapeWebsiteTool {
    pub fn new(client: reqwest::Client, max_content_chars: usize) -> Self {
        Self {
            client,
            max_content_chars,
        }
    }

    pub async fn scrape(&self, url: &str) -> Result<ScrapedPage, ScrapeError> {
        let html = fetch_html(&self.client, url).await?;
        let (content, truncated) = truncate_content(&html_to_text(&html), self.max_content_chars);

        Ok(ScrapedPage {
            url: url.trim().to_string(),
            title: page_title(&html),
            content,
            truncated,
        })
    }
}

impl Tool for ScrapeWebsiteTool {
    const NAME: &'static str = "scrape_website";

    type Error = ScrapeError;
    type Args = ScrapeWebsiteArgs;
    type Output = ScrapedPage;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Fetch a web page (documentation, blog post, tutorial, video page) and \
                          return its readable text content."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "website_url": {
                        "type": "string",
                        "description": "Full http(s) URL of the page to read"
                    }
                },
                "required": ["website_url"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...scrape_website@{:?}", args);
        self.scrape(&args.website_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Getting Started &amp; Setup</title><style>body { color: red; }</style></head>
<body>
  <!-- nav -->
  <script>var tracking = true;</script>
  <h1>Install</h1>
  <p>Run <code>cargo add tokio</code> first.</p>
  <ul><li>Step one</li><li>Step&nbsp;two</li></ul>
</body>
</html>"#;

    #[test]
    fn test_html_to_text_keeps_visible_text() {
        let text = html_to_text(PAGE);
        assert!(text.contains("Install"));
        assert!(text.contains("Run cargo add tokio first."));
        assert!(text.contains("Step one"));
        assert!(!text.contains("tracking"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("nav"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_page_title_is_decoded() {
        assert_eq!(page_title(PAGE).as_deref(), Some("Getting Started & Setup"));
        assert_eq!(page_title("<p>no title</p>"), None);
    }

    #[tokio::test]
    async fn test_scrape_fetches_and_cleans_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/docs")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(PAGE)
            .create_async()
            .await;

        let tool = ScrapeWebsiteTool::new(reqwest::Client::new(), 10_000);
        let page = tool.scrape(&format!("{}/docs", server.url())).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.title.as_deref(), Some("Getting Started & Setup"));
        assert!(page.content.contains("Run cargo add tokio first."));
        assert!(!page.truncated);
    }

    #[tokio::test]
    async fn test_scrape_reports_http_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let tool = ScrapeWebsiteTool::new(reqwest::Client::new(), 10_000);
        let err = tool
            .scrape(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_scrape_rejects_non_http_urls() {
        let tool = ScrapeWebsiteTool::new(reqwest::Client::new(), 10_000);
        for url in ["not a url", "ftp://example.com/file", "file:///etc/hosts"] {
            let err = tool.scrape(url).await.unwrap_err();
            assert!(matches!(err, ScrapeError::InvalidUrl { .. }), "{url}");
        }
    }
}
