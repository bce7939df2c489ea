//! The agent loop: render the system prompt once, seed the transcript with
//! the task, then alternate between asking the model for the next reply and
//! dispatching whatever actions it requested, until the model gives a final
//! answer or the iteration budget runs out.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::{AgentError, AgentResult};
use crate::models::message::Message;
use crate::models::transcript::Transcript;
use crate::parser::{extract_directives, parse_action};
use crate::prompt_template::render_prompt_file;
use crate::providers::base::Provider;
use crate::tools::{ToolRegistry, ToolResult};

pub const DEFAULT_MAX_ITERATIONS: usize = 20;

/// Out-of-band approval for tools flagged as externally consequential.
/// Declining ends the run as user-cancelled rather than failed.
#[async_trait]
pub trait Approver: Send + Sync {
    async fn approve(&self, tool: &str, args: &[String]) -> bool;
}

/// Approves everything; the default when no human is in the loop.
pub struct AutoApprover;

#[async_trait]
impl Approver for AutoApprover {
    async fn approve(&self, _tool: &str, _args: &[String]) -> bool {
        true
    }
}

/// Receives progress as a run unfolds, for rendering only. Nothing here is
/// a control input. All methods default to no-ops.
pub trait EventHandler: Send + Sync {
    fn on_round(&self, _round: usize, _max_rounds: usize) {}
    fn on_thought(&self, _thought: &str) {}
    fn on_action(&self, _action: &str) {}
    fn on_observation(&self, _result: &ToolResult) {}
}

pub struct NullEventHandler;

impl EventHandler for NullEventHandler {}

/// How a run ended when the loop itself did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The model produced a final answer
    Done(String),
    /// A human declined a gated action
    Cancelled,
}

#[derive(Serialize)]
struct ToolContext {
    signature: String,
    description: String,
}

#[derive(Serialize)]
struct SystemContext {
    tools: Vec<ToolContext>,
    operating_system: String,
    working_dir: String,
    file_list: String,
}

/// Agent drives one task to completion against a provider and a fixed tool
/// registry. Each run owns its transcript; nothing is shared across runs.
pub struct Agent {
    provider: Box<dyn Provider>,
    tools: ToolRegistry,
    approver: Box<dyn Approver>,
    events: Box<dyn EventHandler>,
    working_dir: PathBuf,
    max_iterations: usize,
    cancel: Arc<AtomicBool>,
}

impl Agent {
    pub fn new(
        provider: Box<dyn Provider>,
        tools: ToolRegistry,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            tools,
            approver: Box::new(AutoApprover),
            events: Box::new(NullEventHandler),
            working_dir: working_dir.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_approver(mut self, approver: Box<dyn Approver>) -> Self {
        self.approver = approver;
        self
    }

    pub fn with_event_handler(mut self, events: Box<dyn EventHandler>) -> Self {
        self.events = events;
        self
    }

    /// Flag checked before each model call and each dispatch; setting it
    /// (e.g. from a Ctrl-C handler) makes the run fail with `Cancelled`.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Run one task to a terminal outcome.
    pub async fn run(&self, task: &str) -> AgentResult<RunOutcome> {
        let system_prompt = self.render_system_prompt()?;

        let mut transcript = Transcript::new();
        transcript.append(Message::system(system_prompt));
        transcript.append(Message::user(format!("<task>{}</task>", task)));

        for round in 1..=self.max_iterations {
            self.events.on_round(round, self.max_iterations);
            debug!(round, max = self.max_iterations, "starting round");

            if self.cancel.load(Ordering::SeqCst) {
                return Err(AgentError::Cancelled);
            }

            let (reply, _usage) = self
                .provider
                .complete(transcript.messages())
                .await
                .map_err(|e| AgentError::GatewayFailure(e.to_string()))?;
            if reply.content.trim().is_empty() {
                return Err(AgentError::EmptyModelReply);
            }

            transcript.append(Message::assistant(reply.content.as_str()));

            let directives = extract_directives(&reply.content);

            if let Some(thought) = &directives.thought {
                debug!(%thought, "model thought");
                self.events.on_thought(thought);
            }

            // A final answer ends the round even when the same reply still
            // carries pending actions.
            if let Some(answer) = directives.final_answer {
                return Ok(RunOutcome::Done(answer));
            }

            if directives.actions.is_empty() {
                return Err(AgentError::NoDirectiveFound);
            }

            for raw in &directives.actions {
                if self.cancel.load(Ordering::SeqCst) {
                    return Err(AgentError::Cancelled);
                }
                self.events.on_action(raw);

                let result = match parse_action(raw) {
                    Ok(action) => {
                        let gated = self
                            .tools
                            .get(&action.name)
                            .map(|tool| tool.requires_approval())
                            .unwrap_or(false);
                        if gated && !self.approver.approve(&action.name, &action.args).await {
                            return Ok(RunOutcome::Cancelled);
                        }
                        self.tools.dispatch(&action).await
                    }
                    Err(e) => ToolResult::Error(e.to_string()),
                };

                if result.is_error() {
                    warn!(action = %raw, error = %result.text(), "action degraded to error observation");
                }
                self.events.on_observation(&result);
                transcript.append(Message::user(result.render()));
            }
        }

        Err(AgentError::IterationBudgetExhausted(self.max_iterations))
    }

    fn render_system_prompt(&self) -> AgentResult<String> {
        let tools = self
            .tools
            .iter()
            .map(|tool| ToolContext {
                signature: tool.signature(),
                description: tool.description().to_string(),
            })
            .collect();

        let context = SystemContext {
            tools,
            operating_system: std::env::consts::OS.to_string(),
            working_dir: self.working_dir.display().to_string(),
            file_list: list_working_dir(&self.working_dir),
        };

        render_prompt_file("system.md", &context).map_err(|e| AgentError::Internal(e.to_string()))
    }
}

/// Top-level entries of the working directory, for the environment section
/// of the system prompt. An unreadable directory renders as an empty list.
fn list_working_dir(dir: &Path) -> String {
    let mut entries: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| entry.path().display().to_string())
                .collect()
        })
        .unwrap_or_default();
    entries.sort();
    entries.join(", ")
}
