use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::Result;
use async_trait::async_trait;
use console::style;

use otto::agent::{Agent, Approver, AutoApprover, EventHandler, RunOutcome};
use otto::providers::base::Provider;
use otto::tools::{default_registry, ToolResult};

const MAX_OBSERVATION_DISPLAY: usize = 1000;

pub struct Session {
    agent: Agent,
}

impl Session {
    pub fn new(
        provider: Box<dyn Provider>,
        directory: PathBuf,
        max_iterations: usize,
        auto_approve: bool,
    ) -> Self {
        let tools = default_registry(&directory);
        let approver: Box<dyn Approver> = if auto_approve {
            Box::new(AutoApprover)
        } else {
            Box::new(ConfirmApprover)
        };

        let agent = Agent::new(provider, tools, directory)
            .with_max_iterations(max_iterations)
            .with_approver(approver)
            .with_event_handler(Box::new(ConsoleEvents));

        Session { agent }
    }

    pub async fn start(&mut self) -> Result<()> {
        println!(
            "otto {}",
            style("- type \"exit\" to end the session").dim()
        );

        let cancel = self.agent.cancel_flag();
        ctrlc::set_handler(move || cancel.store(true, Ordering::SeqCst))?;

        loop {
            let task: String = cliclack::input("Task:")
                .placeholder("describe what to do")
                .interact()?;

            if task.trim().eq_ignore_ascii_case("exit") {
                break;
            }
            if task.trim().is_empty() {
                continue;
            }

            // each task is a fresh run; the cancel flag must not leak across
            self.agent.cancel_flag().store(false, Ordering::SeqCst);

            match self.agent.run(&task).await {
                Ok(RunOutcome::Done(answer)) => {
                    println!("\n{} {}\n", style("answer").green().bold(), answer);
                }
                Ok(RunOutcome::Cancelled) => {
                    println!("\n{}\n", style("cancelled by user").yellow());
                }
                Err(e) => {
                    println!("\n{} {}\n", style("task failed:").red().bold(), e);
                }
            }
        }

        Ok(())
    }
}

struct ConsoleEvents;

impl EventHandler for ConsoleEvents {
    fn on_round(&self, round: usize, max_rounds: usize) {
        println!("{}", style(format!("round {}/{}", round, max_rounds)).dim());
    }

    fn on_thought(&self, thought: &str) {
        println!("{} {}", style("thought").cyan().bold(), thought);
    }

    fn on_action(&self, action: &str) {
        println!("{} {}", style("action").yellow().bold(), action);
    }

    fn on_observation(&self, result: &ToolResult) {
        let label = if result.is_error() {
            style("error").red().bold()
        } else {
            style("observation").magenta().bold()
        };
        println!("{} {}", label, truncate(result.text(), MAX_OBSERVATION_DISPLAY));
    }
}

struct ConfirmApprover;

#[async_trait]
impl Approver for ConfirmApprover {
    async fn approve(&self, tool: &str, args: &[String]) -> bool {
        cliclack::confirm(format!("Run {}({})?", tool, args.join(", ")))
            .interact()
            .unwrap_or(false)
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated]", &s[..end])
    }
}
