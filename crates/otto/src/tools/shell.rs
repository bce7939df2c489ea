//! Shell command execution. The one tool gated behind the approval signal,
//! since it can do anything the user can.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::errors::{AgentError, AgentResult};
use crate::tools::Tool;

pub struct RunTerminalCommandTool {
    working_dir: PathBuf,
}

impl RunTerminalCommandTool {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

fn shell_invocation(command: &str) -> Command {
    let mut invocation = if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("/bin/bash");
        cmd.arg("-c").arg(command);
        cmd
    };
    invocation.stdout(Stdio::piped()).stderr(Stdio::piped());
    invocation
}

#[async_trait]
impl Tool for RunTerminalCommandTool {
    fn name(&self) -> &str {
        "run_terminal_command"
    }

    fn description(&self) -> &str {
        "Run a shell command in the working directory and return its output"
    }

    fn params(&self) -> &[&'static str] {
        &["command"]
    }

    fn requires_approval(&self) -> bool {
        true
    }

    async fn call(&self, args: &[String]) -> AgentResult<String> {
        let command = &args[0];

        let output = shell_invocation(command)
            .current_dir(&self.working_dir)
            .output()
            .await
            .map_err(|e| AgentError::ExecutionError(format!("spawn {}: {}", command, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(AgentError::ExecutionError(format!(
                "command exited with status {}: {}",
                code, detail
            )));
        }

        let mut report = stdout.to_string();
        if !stderr.trim().is_empty() {
            if !report.is_empty() {
                report.push('\n');
            }
            report.push_str("stderr:\n");
            report.push_str(stderr.trim_end());
        }
        if report.trim().is_empty() {
            report = "command completed with no output".to_string();
        }
        Ok(report)
    }
}
