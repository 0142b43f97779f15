//! Targeted scraper: returns only the elements of a page that match a simple
//! CSS selector (`tag`, `#id`, `.class`, or compounds such as `div.note#intro`).

use regex::Regex;
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

use super::truncate_content;
use super::web_scraper::{ScrapeError, fetch_html, html_to_text};

static TAG_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9-]*)\b([^>]*)>").expect("tag token pattern is valid")
});
static ID_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)id\s*=\s*["']([^"']*)["']"#).expect("id pattern is valid")
});
static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)class\s*=\s*["']([^"']*)["']"#).expect("class pattern is valid")
});

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Upper bound on matched elements returned from one page.
const MAX_ELEMENTS: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSelector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl FromStr for ElementSelector {
    type Err = ScrapeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let unsupported = || ScrapeError::UnsupportedSelector(raw.to_string());
        let is_name_char = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';

        let input = raw.trim();
        let mut selector = ElementSelector::default();

        let tag_end = input.find(['.', '#']).unwrap_or(input.len());
        let tag = &input[..tag_end];
        if !tag.is_empty() {
            if !tag.chars().all(is_name_char) {
                return Err(unsupported());
            }
            selector.tag = Some(tag.to_ascii_lowercase());
        }

        let mut rest = &input[tag_end..];
        while let Some(marker) = rest.chars().next() {
            let body = &rest[marker.len_utf8()..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() || !name.chars().all(is_name_char) {
                return Err(unsupported());
            }

            if marker == '#' {
                selector.id = Some(name.to_string());
            } else {
                selector.classes.push(name.to_string());
            }
            rest = &body[end..];
        }

        if selector.tag.is_none() && selector.id.is_none() && selector.classes.is_empty() {
            return Err(unsupported());
        }
        Ok(selector)
    }
}

impl ElementSelector {
    fn matches(&self, tag: &str, attrs: &str) -> bool {
        if let Some(expected) = &self.tag
            && expected != tag
        {
            return false;
        }

        if let Some(expected) = &self.id {
            let id = ID_ATTR.captures(attrs).and_then(|caps| caps.get(1));
            if id.map(|m| m.as_str()) != Some(expected.as_str()) {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let classes: Vec<&str> = CLASS_ATTR
                .captures(attrs)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().split_whitespace().collect())
                .unwrap_or_default();
            if !self.classes.iter().all(|c| classes.contains(&c.as_str())) {
                return false;
            }
        }

        true
    }
}

struct TagToken<'a> {
    start: usize,
    end: usize,
    closing: bool,
    self_closing: bool,
    name: String,
    attrs: &'a str,
}

fn tokenize(html: &str) -> Vec<TagToken<'_>> {
    TAG_TOKEN
        .captures_iter(html)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let attrs = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
            Some(TagToken {
                start: whole.start(),
                end: whole.end(),
                closing: caps.get(1).is_some_and(|m| !m.as_str().is_empty()),
                self_closing: attrs.trim_end().ends_with('/'),
                name: caps.get(2)?.as_str().to_ascii_lowercase(),
                attrs,
            })
        })
        .collect()
}

/// Inner HTML of every element matching `selector`, outermost first. Nested
/// elements with the same tag name are balanced by depth.
pub fn select_elements<'a>(html: &'a str, selector: &ElementSelector) -> Vec<&'a str> {
    let tokens = tokenize(html);
    let mut found = Vec::new();

    for (index, open) in tokens.iter().enumerate() {
        if open.closing
            || open.self_closing
            || VOID_ELEMENTS.contains(&open.name.as_str())
            || !selector.matches(&open.name, open.attrs)
        {
            continue;
        }

        let mut depth = 1usize;
        for token in tokens[index + 1..].iter().filter(|t| t.name == open.name) {
            if token.closing {
                depth -= 1;
            } else if !token.self_closing {
                depth += 1;
            }
            if depth == 0 {
                found.push(&html[open.end..token.start]);
                break;
            }
        }

        if found.len() >= MAX_ELEMENTS {
            break;
        }
    }

    found
}

#[derive(Debug, Clone)]
pub struct ScrapeElementTool {
    client: reqwest::Client,
    max_content_chars: usize,
}

#[derive(Debug, Deserialize)]
pub struct ScrapeElementArgs {
    pub website_url: String,
    pub css_element: String,
}

#[derive(Debug, Serialize)]
pub struct ScrapedElements {
    pub url: String,
    pub selector: String,
    pub elements: Vec<String>,
    pub truncated: bool,
}

impl ScrapeElementTool {
    pub fn new(client: reqwest::Client, max_content_chars: usize) -> Self {
        Self {
            client,
            max_content_chars,
        }
    }

    pub async fn scrape(&self, url: &str, css_element: &str) -> Result<ScrapedElements, ScrapeError> {
        let selector: ElementSelector = css_element.parse()?;
        let html = fetch_html(&self.client, url).await?;

        let mut budget = self.max_content_chars;
        let mut truncated = false;
        let mut elements = Vec::new();
        for inner in select_elements(&html, &selector) {
            let text = html_to_text(inner);
            if text.is_empty() {
                continue;
            }
            if budget == 0 {
                truncated = true;
                break;
            }

            let (text, cut) = truncate_content(&text, budget);
            budget = budget.saturating_sub(text.chars().count());
            truncated |= cut;
            elements.push(text);
        }

        tracing::debug!(url, selector = css_element, matches = elements.len(), "elements scraped");

        Ok(ScrapedElements {
            url: url.trim().to_string(),
            selector: css_element.trim().to_string(),
            elements,
            truncated,
        })
    }
}

impl Tool for ScrapeElementTool {
    const NAME: &'static str = "scrape_element";

    type Error = ScrapeError;
    type Args = ScrapeElementArgs;
    type Output = ScrapedElements;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Fetch a web page and return only the text of the elements matching a \
                          CSS selector. Use it to pull code blocks, article bodies or specific \
                          sections out of large pages."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "website_url": {
                        "type": "string",
                        "description": "Full http(s) URL of the page"
                    },
                    "css_element": {
                        "type": "string",
                        "description": "Selector such as `pre`, `article`, `#installation` or `div.highlight`"
                    }
                },
                "required": ["website_url", "css_element"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...scrape_element@{:?}", args);
        self.scrape(&args.website_url, &args.css_element).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
<div class="note intro" id="first"><p>Outer <div class="inner">nested</div> tail</p></div>
<div class="note"><p>Second note</p></div>
<pre><code>cargo run</code></pre>
<img src="x.png" class="note"/>
<section data-id="first">not an id</section>
</body></html>"#;

    fn select(selector: &str) -> Vec<&'static str> {
        select_elements(PAGE, &selector.parse().unwrap())
    }

    #[test]
    fn test_parse_selectors() {
        assert_eq!(
            "div.note#intro".parse::<ElementSelector>().unwrap(),
            ElementSelector {
                tag: Some("div".to_string()),
                id: Some("intro".to_string()),
                classes: vec!["note".to_string()],
            }
        );
        assert_eq!(
            "PRE".parse::<ElementSelector>().unwrap().tag.as_deref(),
            Some("pre")
        );
        for bad in ["", "div > p", "a[href]", "li:first-child", ".", "#"] {
            assert!(bad.parse::<ElementSelector>().is_err(), "{bad}");
        }
    }

    #[test]
    fn test_select_by_class_balances_nested_tags() {
        let found = select(".note");
        assert_eq!(found.len(), 2);
        assert!(found[0].contains("nested</div> tail"));
        assert_eq!(found[1], "<p>Second note</p>");
    }

    #[test]
    fn test_select_by_tag_and_id() {
        assert_eq!(select("pre"), vec!["<code>cargo run</code>"]);
        assert_eq!(select("#first").len(), 1);
        assert!(select("section#first").is_empty());
        assert_eq!(select("div.inner"), vec!["nested"]);
    }

    #[tokio::test]
    async fn test_scrape_returns_element_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/guide")
            .with_status(200)
            .with_body(PAGE)
            .create_async()
            .await;

        let tool = ScrapeElementTool::new(reqwest::Client::new(), 10_000);
        let scraped = tool
            .scrape(&format!("{}/guide", server.url()), "pre")
            .await
            .unwrap();

        assert_eq!(scraped.elements, vec!["cargo run".to_string()]);
        assert!(!scraped.truncated);
    }

    #[tokio::test]
    async fn test_scrape_rejects_selector_before_fetching() {
        let tool = ScrapeElementTool::new(reqwest::Client::new(), 10_000);
        let err = tool
            .scrape("http://127.0.0.1:9/never-fetched", "ul > li")
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::UnsupportedSelector(_)));
    }
}
