//! The agent loop: completion, parse, dispatch, feed back.
//!
//! Each iteration requests one completion, parses it into plain and action
//! blocks, executes every action through the registry and appends the
//! results as the next user turn. The loop ends when the model emits a
//! terminal tool (attempt_completion or ask_followup) or the iteration cap
//! is hit.

use anyhow::Result;
use serde_json::Value;
use uuid::Uuid;

use sable_core::{Action, ToolName};
use sable_tools::ToolRegistry;

use crate::llm::{Completer, Turn};

/// Maximum number of loop iterations before giving up.
pub const MAX_TOOL_ITERATIONS: usize = 25;

/// How a loop run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The model called attempt_completion.
    Completed { summary: String },
    /// The model called ask_followup and needs user input.
    NeedsFollowup { question: String },
    /// The iteration cap was reached without a terminal tool.
    IterationLimit,
}

pub struct AgentLoop {
    registry: ToolRegistry,
    completer: Box<dyn Completer>,
    max_iterations: usize,
}

impl AgentLoop {
    pub fn new(registry: ToolRegistry, completer: Box<dyn Completer>) -> Self {
        Self {
            registry,
            completer,
            max_iterations: MAX_TOOL_ITERATIONS,
        }
    }

    /// Override the default iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Run the loop for a single user task.
    pub async fn run(&self, task: &str) -> Result<LoopOutcome> {
        let mut turns = vec![
            Turn::system(build_system_prompt(&self.registry)),
            Turn::user(task),
        ];

        for iteration in 1..=self.max_iterations {
            let request_id = Uuid::new_v4();
            tracing::info!(%request_id, iteration, "requesting completion");

            let completion = self.completer.complete(&turns).await?;
            turns.push(Turn::assistant(&completion));

            let mut results: Vec<String> = Vec::new();
            for block in sable_parser::parse(&completion) {
                let Some(action) = block.as_action() else {
                    continue;
                };
                if action.tool.is_terminal() {
                    return Ok(terminal_outcome(action));
                }
                results.push(self.dispatch(action).await);
            }

            if results.is_empty() {
                tracing::debug!(iteration, "completion contained no tool invocation");
                turns.push(Turn::user(
                    "No tool invocation found in your reply. Invoke one of the available \
                     tools, or call attempt_completion when the task is done.",
                ));
            } else {
                turns.push(Turn::user(results.join("\n")));
            }
        }

        tracing::warn!(
            max_iterations = self.max_iterations,
            "iteration cap reached without completion"
        );
        Ok(LoopOutcome::IterationLimit)
    }

    /// Execute one action and render its result for the next user turn.
    async fn dispatch(&self, action: &Action) -> String {
        let name = action.tool.as_str();
        let value = match self.registry.execute_tool(name, action_args(action)).await {
            Ok(value) => value,
            Err(e) => serde_json::json!({"error": e.to_string()}),
        };

        if is_successful(&value) {
            tracing::info!(tool = name, "tool succeeded");
        } else {
            tracing::warn!(tool = name, result = %value, "tool failed");
        }
        format!("[{}] {}", name, value)
    }
}

/// Terminal tools carry their payload in the tag body or a named parameter.
fn terminal_outcome(action: &Action) -> LoopOutcome {
    let payload = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| action.param(key))
            .unwrap_or_default()
            .to_string()
    };
    match action.tool {
        ToolName::AskFollowup => LoopOutcome::NeedsFollowup {
            question: payload(&["question", "content"]),
        },
        _ => LoopOutcome::Completed {
            summary: payload(&["result", "content"]),
        },
    }
}

/// Convert parsed string parameters into the JSON object tools expect.
fn action_args(action: &Action) -> Value {
    Value::Object(
        action
            .params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

/// Success contract: no `error` field and no non-zero `exit_code`.
fn is_successful(value: &Value) -> bool {
    if value.get("error").is_some() {
        return false;
    }
    match value.get("exit_code").and_then(|v| v.as_i64()) {
        Some(code) => code == 0,
        None => true,
    }
}

fn build_system_prompt(registry: &ToolRegistry) -> String {
    let mut prompt = String::from(
        "You are Sable, a coding agent operating on a workspace.\n\
         Invoke tools using XML-style tags, one parameter per nested tag, e.g.:\n\
         <read_file><path>src/main.rs</path></read_file>\n\
         You may reason inside <thinking>...</thinking>; it is stripped before parsing.\n\
         Call <attempt_completion><result>...</result></attempt_completion> when the task \
         is done, or <ask_followup><question>...</question></ask_followup> if you are \
         blocked on the user.\n\nAvailable tools:\n",
    );
    for tool in registry.tool_descriptions() {
        prompt.push_str(&format!(
            "- {}: {}\n",
            tool["name"].as_str().unwrap_or_default(),
            tool["description"].as_str().unwrap_or_default()
        ));
    }
    prompt
}
