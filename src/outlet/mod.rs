use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::flow::state::FlowState;

pub const RESEARCH_REPORT_FILE: &str = "research_report.md";
pub const GUIDE_FILE: &str = "getting_started_guide.md";

/// Saves whatever the flow produced into `output_dir`.
pub async fn save(output_dir: &Path, state: &FlowState) -> Result<Vec<PathBuf>> {
    DiskOutlet::new(output_dir).save(state).await
}

pub trait Outlet {
    /// Persists the outputs present in `state`, returning the files written.
    async fn save(&self, state: &FlowState) -> Result<Vec<PathBuf>>;
}

pub struct DiskOutlet {
    output_dir: PathBuf,
}

impl DiskOutlet {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl Outlet for DiskOutlet {
    async fn save(&self, state: &FlowState) -> Result<Vec<PathBuf>> {
        let documents = [
            (RESEARCH_REPORT_FILE, state.research_report()),
            (GUIDE_FILE, state.final_guide()),
        ];
        if documents.iter().all(|(_, content)| content.is_none()) {
            return Ok(Vec::new());
        }

        println!("\n🖊️ Saving outputs...");
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory {}",
                self.output_dir.display()
            )
        })?;

        let mut written = Vec::new();
        for (file_name, content) in documents {
            let Some(content) = content else {
                continue;
            };

            let path = self.output_dir.join(file_name);
            fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("💾 Saved: {}", path.display());
            written.push(path);
        }

        Ok(written)
    }
}
