//! Scripted model binding for crew tests.

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::Mutex;

use crate::crews::agent::AgentRuntime;
use crate::llm::tools::ToolKind;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub preamble: String,
    pub prompt: String,
    pub tools: Vec<ToolKind>,
}

/// Answers `"<role> says: done"` for the role named in the preamble, or fails
/// when the preamble mentions `fail_role`.
#[derive(Default)]
pub struct ScriptedRuntime {
    pub calls: Mutex<Vec<RecordedCall>>,
    pub fail_role: Option<String>,
}

impl ScriptedRuntime {
    pub fn failing_for(role: &str) -> Self {
        Self {
            fail_role: Some(role.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

fn role_of(preamble: &str) -> String {
    preamble
        .strip_prefix("You are ")
        .and_then(|rest| rest.split('.').next())
        .unwrap_or("unknown")
        .to_string()
}

#[async_trait]
impl AgentRuntime for ScriptedRuntime {
    async fn complete(&self, preamble: &str, prompt: &str, tools: &[ToolKind]) -> Result<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            preamble: preamble.to_string(),
            prompt: prompt.to_string(),
            tools: tools.to_vec(),
        });

        let role = role_of(preamble);
        if self.fail_role.as_deref() == Some(role.as_str()) {
            bail!("{} could not reach the model", role);
        }
        Ok(format!("{} says: done", role))
    }
}
