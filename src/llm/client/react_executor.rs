//! Tool-calling loop for one agent task.

use anyhow::{Result, anyhow};
use rig::completion::{AssistantContent, Message, PromptError};

use super::providers::ProviderAgent;

#[derive(Debug, Clone, Copy)]
pub struct ReActConfig {
    /// Tool-calling rounds before the task is abandoned
    pub max_iterations: usize,
    pub verbose: bool,
}

pub struct ReActExecutor;

impl ReActExecutor {
    /// Runs the loop to the model's final answer. Running out of turns is an
    /// error: a half-finished answer is never passed downstream.
    pub async fn execute(
        agent: &ProviderAgent,
        user_prompt: &str,
        config: &ReActConfig,
    ) -> Result<String> {
        if config.verbose {
            println!(
                "   ♻️ tool loop enabled, at most {} turns",
                config.max_iterations
            );
        }

        match agent.multi_turn(user_prompt, config.max_iterations).await {
            Ok(response) => Ok(response),
            Err(PromptError::MaxDepthError {
                max_depth,
                chat_history,
                ..
            }) => {
                let tool_calls = Self::tool_calls(&chat_history);
                tracing::warn!(max_depth, ?tool_calls, "agent ran out of turns");
                Err(anyhow!(
                    "agent did not produce a final answer within {} turns ({} tool calls made)",
                    max_depth,
                    tool_calls.len()
                ))
            }
            Err(e) => Err(anyhow!("agent task failed: {}", e)),
        }
    }

    /// `name(arguments)` for every tool call in the history.
    fn tool_calls(chat_history: &[Message]) -> Vec<String> {
        chat_history
            .iter()
            .filter_map(|msg| match msg {
                Message::Assistant { content, .. } => Some(content),
                _ => None,
            })
            .flat_map(|content| content.iter())
            .filter_map(|c| match c {
                AssistantContent::ToolCall(tool_call) => Some(format!(
                    "{}({})",
                    tool_call.function.name, tool_call.function.arguments
                )),
                _ => None,
            })
            .collect()
    }
}
