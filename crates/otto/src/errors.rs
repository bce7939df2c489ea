use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Malformed action: {0}")]
    MalformedAction(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Wrong number of arguments for {tool}: expected {expected}, got {actual}")]
    ArityMismatch {
        tool: String,
        expected: usize,
        actual: usize,
    },

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Empty model response")]
    EmptyModelReply,

    #[error("Model request failed: {0}")]
    GatewayFailure(String),

    #[error("No action or final answer in model output")]
    NoDirectiveFound,

    #[error("Iteration budget exhausted after {0} rounds")]
    IterationBudgetExhausted(usize),

    #[error("Cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
