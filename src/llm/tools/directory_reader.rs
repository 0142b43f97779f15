//! Lists the files under a directory so the document specialist can pick what to read.

use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::file_reader::FileToolError;

/// Upper bound on listed files.
const MAX_FILES: usize = 500;

#[derive(Debug, Clone)]
pub struct ReadDirectoryTool {
    max_depth: usize,
}

#[derive(Debug, Deserialize)]
pub struct ReadDirectoryArgs {
    pub directory: String,
}

#[derive(Debug, Serialize)]
pub struct DirectoryListing {
    pub directory: String,
    /// Paths relative to `directory`, sorted
    pub files: Vec<String>,
    pub truncated: bool,
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}

impl ReadDirectoryTool {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn list(&self, directory: &Path) -> Result<DirectoryListing, FileToolError> {
        let metadata = std::fs::metadata(directory)
            .map_err(|err| FileToolError::from_metadata(directory, err))?;
        if !metadata.is_dir() {
            return Err(FileToolError::NotADirectory(directory.to_path_buf()));
        }

        let mut files = Vec::new();
        let mut truncated = false;

        let walker = WalkDir::new(directory)
            .max_depth(self.max_depth)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || !is_hidden(&entry.file_name().to_string_lossy())
            });

        for entry in walker {
            let entry = entry.map_err(|err| FileToolError::Walk {
                path: directory.to_path_buf(),
                reason: err.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if files.len() >= MAX_FILES {
                truncated = true;
                break;
            }

            let relative = pathdiff::diff_paths(entry.path(), directory)
                .unwrap_or_else(|| entry.path().to_path_buf());
            files.push(relative.to_string_lossy().replace('\\', "/"));
        }

        files.sort();
        tracing::debug!(directory = %directory.display(), files = files.len(), "directory listed");

        Ok(DirectoryListing {
            directory: directory.display().to_string(),
            files,
            truncated,
        })
    }
}

impl Tool for ReadDirectoryTool {
    const NAME: &'static str = "read_directory";

    type Error = FileToolError;
    type Args = ReadDirectoryArgs;
    type Output = DirectoryListing;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "List the files inside a local directory (recursively, hidden files \
                          skipped). Use read_file afterwards to open the relevant ones."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "directory": {
                        "type": "string",
                        "description": "Path of the directory to list"
                    }
                },
                "required": ["directory"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...read_directory@{:?}", args);

        let directory = PathBuf::from(args.directory.trim());
        let tool = self.clone();
        tokio::task::spawn_blocking(move || tool.list(&directory))
            .await
            .map_err(|err| FileToolError::Walk {
                path: PathBuf::from(args.directory.trim()),
                reason: err.to_string(),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("docs/guides/deep")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::write(root.join("README.md"), "readme").unwrap();
        std::fs::write(root.join(".env"), "SECRET=1").unwrap();
        std::fs::write(root.join(".git/config"), "[core]").unwrap();
        std::fs::write(root.join("docs/intro.md"), "intro").unwrap();
        std::fs::write(root.join("docs/guides/setup.txt"), "setup").unwrap();
        std::fs::write(root.join("docs/guides/deep/notes.md"), "notes").unwrap();
        temp_dir
    }

    #[test]
    fn test_lists_files_relative_and_sorted() {
        let temp_dir = fixture();
        let listing = ReadDirectoryTool::new(10).list(temp_dir.path()).unwrap();
        assert_eq!(
            listing.files,
            vec![
                "README.md",
                "docs/guides/deep/notes.md",
                "docs/guides/setup.txt",
                "docs/intro.md"
            ]
        );
        assert!(!listing.truncated);
    }

    #[test]
    fn test_depth_limit() {
        let temp_dir = fixture();
        let listing = ReadDirectoryTool::new(2).list(temp_dir.path()).unwrap();
        assert_eq!(listing.files, vec!["README.md", "docs/intro.md"]);
    }

    #[test]
    fn test_missing_and_non_directory_paths() {
        let temp_dir = fixture();
        let tool = ReadDirectoryTool::new(5);

        let missing = tool.list(&temp_dir.path().join("nope")).unwrap_err();
        assert!(matches!(missing, FileToolError::NotFound(_)));

        let file = tool.list(&temp_dir.path().join("README.md")).unwrap_err();
        assert!(matches!(file, FileToolError::NotADirectory(_)));

        let under_file = tool
            .list(&temp_dir.path().join("README.md/docs"))
            .unwrap_err();
        assert!(matches!(under_file, FileToolError::Io { .. }));
    }

    #[tokio::test]
    async fn test_tool_call_lists_directory() {
        let temp_dir = fixture();
        let listing = ReadDirectoryTool::new(5)
            .call(ReadDirectoryArgs {
                directory: temp_dir.path().display().to_string(),
            })
            .await
            .unwrap();
        assert_eq!(listing.files.len(), 4);
    }
}
