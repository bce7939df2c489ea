//! The capability registry the agent dispatches parsed actions through.
//!
//! Tools form a closed, enumerated set built before the loop starts: each
//! one declares a fixed positional-string-argument contract and the registry
//! turns every dispatch outcome — unknown name, wrong arity, tool failure —
//! into a [`ToolResult`] observation instead of letting it escape the loop.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::{AgentError, AgentResult};
use crate::parser::ParsedAction;

pub mod fs;
pub mod shell;

/// A named operation the model can invoke with ordered string arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model calls this tool by
    fn name(&self) -> &str;

    /// One-line description for the system prompt
    fn description(&self) -> &str;

    /// Positional parameter names, in calling order
    fn params(&self) -> &[&'static str];

    /// Display form used in the system prompt, e.g. `read_file(path)`
    fn signature(&self) -> String {
        format!("{}({})", self.name(), self.params().join(", "))
    }

    fn arity(&self) -> usize {
        self.params().len()
    }

    /// Whether dispatching this tool must first pass the approval gate
    fn requires_approval(&self) -> bool {
        false
    }

    /// Run the tool to completion. Failures are reported, never panicked.
    async fn call(&self, args: &[String]) -> AgentResult<String>;
}

/// The textual outcome of dispatching one action. Always exchanged with the
/// model as text, wrapped in the tag the protocol expects.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Observation(String),
    Error(String),
}

impl ToolResult {
    pub fn text(&self) -> &str {
        match self {
            ToolResult::Observation(text) | ToolResult::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Error(_))
    }

    /// Tagged form appended to the transcript for the model to read.
    pub fn render(&self) -> String {
        match self {
            ToolResult::Observation(text) => format!("<observation>{}</observation>", text),
            ToolResult::Error(text) => format!("<error>{}</error>", text),
        }
    }
}

/// Name → capability mapping, populated once at startup.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .map(|tool| tool.as_ref())
    }

    /// Registered tools in registration order, for prompt rendering.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.iter().map(|tool| tool.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke the tool a parsed action names and normalize the outcome.
    ///
    /// An unknown name or an arity mismatch never reaches the tool; a tool
    /// failure is trapped and reported. The loop continues in every case.
    pub async fn dispatch(&self, action: &ParsedAction) -> ToolResult {
        let Some(tool) = self.get(&action.name) else {
            return ToolResult::Error(AgentError::UnknownTool(action.name.clone()).to_string());
        };

        if action.args.len() != tool.arity() {
            return ToolResult::Error(
                AgentError::ArityMismatch {
                    tool: action.name.clone(),
                    expected: tool.arity(),
                    actual: action.args.len(),
                }
                .to_string(),
            );
        }

        debug!(tool = %action.name, args = ?action.args, "dispatching tool");
        match tool.call(&action.args).await {
            Ok(output) => ToolResult::Observation(output),
            Err(e) => ToolResult::Error(e.to_string()),
        }
    }
}

/// The built-in tool set, every tool rooted at the given working directory.
pub fn default_registry(working_dir: impl AsRef<Path>) -> ToolRegistry {
    let working_dir = working_dir.as_ref();
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(fs::ReadFileTool::new(working_dir)));
    registry.register(Box::new(fs::WriteFileTool::new(working_dir)));
    registry.register(Box::new(fs::ListDirectoryTool::new(working_dir)));
    registry.register(Box::new(fs::CreateDirectoryTool::new(working_dir)));
    registry.register(Box::new(fs::SearchFilesTool::new(working_dir)));
    registry.register(Box::new(shell::RunTerminalCommandTool::new(working_dir)));
    registry
}
