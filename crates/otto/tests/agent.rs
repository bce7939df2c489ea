//! End-to-end runs of the agent loop against the real built-in tools,
//! with a scripted provider standing in for the model.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use indoc::indoc;

use otto::agent::{Agent, RunOutcome};
use otto::errors::AgentError;
use otto::models::message::Message;
use otto::providers::base::{Provider, Usage};
use otto::providers::mock::MockProvider;
use otto::tools::default_registry;

struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    async fn complete(&self, _messages: &[Message]) -> Result<(Message, Usage)> {
        Err(anyhow!("connection refused"))
    }
}

#[tokio::test]
async fn test_write_then_read_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    let provider = MockProvider::new(vec![
        Message::assistant(indoc! {r#"
            <thought>First write the file.</thought>
            <action>write_to_file("notes.txt", "line1\nline2")</action>
        "#}),
        Message::assistant(indoc! {r#"
            <thought>Now read it back to confirm.</thought>
            <action>read_file("notes.txt")</action>
        "#}),
        Message::assistant(indoc! {r#"
            <thought>The file is in place.</thought>
            <final_answer>notes.txt written with two lines</final_answer>
        "#}),
    ]);
    let recorder = provider.recorder();

    let agent = Agent::new(
        Box::new(provider),
        default_registry(dir.path()),
        dir.path(),
    );

    let outcome = agent.run("write two lines to notes.txt").await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Done("notes.txt written with two lines".to_string())
    );

    // escaped newline in the action arrives as a real line break on disk
    let written = std::fs::read_to_string(dir.path().join("notes.txt")).unwrap();
    assert_eq!(written, "line1\nline2");

    // the read observation carried the file content back to the model
    let calls = recorder.lock().unwrap();
    let last_transcript = calls.last().unwrap();
    let read_observation = last_transcript.last().unwrap().content.as_str();
    assert_eq!(read_observation, "<observation>line1\nline2</observation>");
}

#[tokio::test]
async fn test_directory_workflow() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("existing.rs"), "fn main() {}").unwrap();

    let provider = MockProvider::new(vec![
        Message::assistant(indoc! {r#"
            <thought>Check what is here, then search for Rust sources.</thought>
            <action>list_directory(".")</action>
            <action>search_files("*.rs", "")</action>
        "#}),
        Message::assistant("<final_answer>one rust file</final_answer>"),
    ]);
    let recorder = provider.recorder();

    let agent = Agent::new(
        Box::new(provider),
        default_registry(dir.path()),
        dir.path(),
    );

    agent.run("inventory the project").await.unwrap();

    let calls = recorder.lock().unwrap();
    let transcript = calls.last().unwrap();
    let observations: Vec<&str> = transcript
        .iter()
        .filter(|m| m.content.starts_with("<observation>"))
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(observations.len(), 2);
    assert!(observations[0].contains("existing.rs"));
    assert!(observations[1].contains("existing.rs"));
    assert!(observations[1].contains("1 file(s) found"));
}

#[tokio::test]
async fn test_gateway_failure_is_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Agent::new(
        Box::new(FailingProvider),
        default_registry(dir.path()),
        dir.path(),
    );

    let err = agent.run("anything").await.unwrap_err();
    match err {
        AgentError::GatewayFailure(message) => assert!(message.contains("connection refused")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_system_prompt_lists_environment() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker.md"), "").unwrap();

    let provider = MockProvider::new(vec![Message::assistant(
        "<final_answer>ok</final_answer>",
    )]);
    let recorder = provider.recorder();

    let agent = Agent::new(
        Box::new(provider),
        default_registry(dir.path()),
        dir.path(),
    );
    agent.run("look around").await.unwrap();

    let calls = recorder.lock().unwrap();
    let system = &calls[0][0].content;
    assert!(system.contains("read_file(path)"));
    assert!(system.contains("run_terminal_command(command)"));
    assert!(system.contains("marker.md"));
    assert!(system.contains(&dir.path().display().to_string()));
}
