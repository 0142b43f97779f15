//! Task descriptors and `{placeholder}` interpolation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use thiserror::Error;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("task `{task}` references `{{{name}}}` but no such input was supplied")]
    MissingVariable { task: String, name: String },
}

/// Prompt template for one task, as written in the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskProfile {
    pub description: String,
    pub expected_output: String,
}

impl TaskProfile {
    pub fn new(description: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
        }
    }
}

/// A named task whose templates are filled from the stage inputs at kickoff.
#[derive(Debug, Clone)]
pub struct Task {
    name: String,
    profile: TaskProfile,
}

/// A task with every placeholder substituted, ready to hand to an agent.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTask {
    pub name: String,
    pub description: String,
    pub expected_output: String,
}

impl Task {
    pub fn new(name: impl Into<String>, profile: TaskProfile) -> Self {
        Self {
            name: name.into(),
            profile,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Placeholder names used by either template.
    pub fn variables(&self) -> BTreeSet<String> {
        [&self.profile.description, &self.profile.expected_output]
            .into_iter()
            .flat_map(|template| PLACEHOLDER.captures_iter(template))
            .map(|caps| caps[1].to_string())
            .collect()
    }

    pub fn render(&self, vars: &[(&str, &str)]) -> Result<RenderedTask, TemplateError> {
        Ok(RenderedTask {
            name: self.name.clone(),
            description: interpolate(&self.name, &self.profile.description, vars)?,
            expected_output: interpolate(&self.name, &self.profile.expected_output, vars)?,
        })
    }
}

impl RenderedTask {
    /// Full user prompt for the executing agent. `context` carries the output of
    /// earlier tasks or delegated findings.
    pub fn prompt(&self, context: Option<&str>) -> String {
        let mut prompt = String::new();
        prompt.push_str(&self.description);
        prompt.push_str("\n\nThis is the expected criteria for your final answer: ");
        prompt.push_str(&self.expected_output);
        prompt.push_str(
            "\nYou MUST return the actual complete content as the final answer, not a summary.",
        );

        if let Some(context) = context
            && !context.trim().is_empty()
        {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            prompt.push_str(context);
        }

        prompt
    }
}

/// Rejects templates that reference an input the crew never supplies, so a bad
/// roster fails when the crew is built rather than halfway through a run.
pub fn ensure_known_variables(task: &Task, known: &[&str]) -> Result<(), TemplateError> {
    match task.variables().into_iter().find(|name| !known.contains(&name.as_str())) {
        Some(name) => Err(TemplateError::MissingVariable {
            task: task.name.clone(),
            name,
        }),
        None => Ok(()),
    }
}

/// Replaces every `{name}` with its value. Braces that do not wrap an identifier
/// (JSON samples, code) are left alone; an identifier without a value is an error.
pub fn interpolate(task: &str, template: &str, vars: &[(&str, &str)]) -> Result<String, TemplateError> {
    let mut rendered = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let name = &caps[1];
        let value = vars
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| TemplateError::MissingVariable {
                task: task.to_string(),
                name: name.to_string(),
            })?;

        rendered.push_str(&template[last..whole.start()]);
        rendered.push_str(value);
        last = whole.end();
    }

    rendered.push_str(&template[last..]);
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_substitutes_known_variables() {
        let rendered = interpolate(
            "t",
            "Read {webpage_links} and {document_paths}.",
            &[("webpage_links", "https://a.dev"), ("document_paths", "Not provided")],
        )
        .unwrap();
        assert_eq!(rendered, "Read https://a.dev and Not provided.");
    }

    #[test]
    fn test_interpolate_missing_variable_is_error() {
        let err = interpolate("draft", "Use {research_report}", &[]).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingVariable {
                task: "draft".to_string(),
                name: "research_report".to_string()
            }
        );
    }

    #[test]
    fn test_interpolate_leaves_non_identifier_braces() {
        let template = r#"Return JSON like {"title": "x"} or { spaced }"#;
        assert_eq!(interpolate("t", template, &[]).unwrap(), template);
    }

    #[test]
    fn test_value_containing_braces_is_not_reexpanded() {
        let rendered = interpolate("t", "{a}", &[("a", "{b}")]).unwrap();
        assert_eq!(rendered, "{b}");
    }

    #[test]
    fn test_task_variables_cover_both_templates() {
        let task = Task::new(
            "t",
            TaskProfile::new("Use {research_report}", "A guide for {audience}"),
        );
        let vars: Vec<_> = task.variables().into_iter().collect();
        assert_eq!(vars, vec!["audience".to_string(), "research_report".to_string()]);
    }

    #[test]
    fn test_rendered_prompt_includes_context_only_when_present() {
        let task = Task::new("t", TaskProfile::new("Do it", "Done"));
        let rendered = task.render(&[]).unwrap();

        let without = rendered.prompt(None);
        assert!(without.starts_with("Do it"));
        assert!(without.contains("expected criteria for your final answer: Done"));
        assert!(!without.contains("context you're working with"));

        let with = rendered.prompt(Some("earlier draft"));
        assert!(with.ends_with("earlier draft"));

        let blank = rendered.prompt(Some("  "));
        assert!(!blank.contains("context you're working with"));
    }
}
