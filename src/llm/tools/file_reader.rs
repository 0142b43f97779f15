//! Reads local documents. Text files are returned as-is (optionally a line
//! window); PDFs go through text extraction.

use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::arxiv::extract_pdf_text;
use super::truncate_content;

#[derive(Debug, Error)]
pub enum FileToolError {
    #[error("{0} does not exist")]
    NotFound(PathBuf),

    #[error("{0} is not a regular file")]
    NotAFile(PathBuf),

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not extract text from PDF {path}: {reason}")]
    Pdf { path: PathBuf, reason: String },

    #[error("failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },
}

impl FileToolError {
    /// Only a missing entry is `NotFound`; any other lookup failure keeps its cause.
    pub(crate) fn from_metadata(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            FileToolError::NotFound(path.to_path_buf())
        } else {
            FileToolError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadFileTool {
    max_content_chars: usize,
}

#[derive(Debug, Deserialize)]
pub struct ReadFileArgs {
    pub file_path: String,
    /// 1-based first line to return
    pub start_line: Option<usize>,
    pub line_count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct FileContent {
    pub path: String,
    pub content: String,
    pub truncated: bool,
}

/// `line_count` lines starting at 1-based `start_line`.
fn line_window(text: &str, start_line: Option<usize>, line_count: Option<usize>) -> String {
    if start_line.is_none() && line_count.is_none() {
        return text.to_string();
    }

    let skip = start_line.unwrap_or(1).saturating_sub(1);
    let lines = text.lines().skip(skip);
    match line_count {
        Some(count) => lines.take(count).collect::<Vec<_>>().join("\n"),
        None => lines.collect::<Vec<_>>().join("\n"),
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

impl ReadFileTool {
    pub fn new(max_content_chars: usize) -> Self {
        Self { max_content_chars }
    }

    pub async fn read(&self, args: &ReadFileArgs) -> Result<FileContent, FileToolError> {
        let path = PathBuf::from(args.file_path.trim());
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|err| FileToolError::from_metadata(&path, err))?;
        if !metadata.is_file() {
            return Err(FileToolError::NotAFile(path));
        }

        let io_error = |source| FileToolError::Io {
            path: path.clone(),
            source,
        };

        let text = if is_pdf(&path) {
            let bytes = tokio::fs::read(&path).await.map_err(io_error)?;
            extract_pdf_text(path.clone(), bytes)
                .await
                .map_err(|err| FileToolError::Pdf {
                    path: path.clone(),
                    reason: err.to_string(),
                })?
        } else {
            let bytes = tokio::fs::read(&path).await.map_err(io_error)?;
            String::from_utf8_lossy(&bytes).into_owned()
        };

        let window = line_window(&text, args.start_line, args.line_count);
        let (content, truncated) = truncate_content(&window, self.max_content_chars);
        tracing::debug!(path = %path.display(), chars = content.len(), truncated, "file read");

        Ok(FileContent {
            path: path.display().to_string(),
            content,
            truncated,
        })
    }
}

impl Tool for ReadFileTool {
    const NAME: &'static str = "read_file";

    type Error = FileToolError;
    type Args = ReadFileArgs;
    type Output = FileContent;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Read a local document (text, markdown, source code or PDF). \
                          Optionally return only a window of lines."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Path of the file to read"
                    },
                    "start_line": {
                        "type": "integer",
                        "description": "First line to return, starting at 1"
                    },
                    "line_count": {
                        "type": "integer",
                        "description": "How many lines to return"
                    }
                },
                "required": ["file_path"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...read_file@{:?}", args);
        self.read(&args).await
    }
}
