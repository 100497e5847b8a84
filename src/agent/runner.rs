//! Core orchestration loop implementation.
//!
//! One run drives one user goal through the step protocol: request a
//! completion for the full transcript, validate it as a step message,
//! dispatch TOOL steps through the registry, feed the observation back,
//! and stop on OUTPUT or a fatal fault. Execution is strictly sequential;
//! the only suspension points are the gateway call and the tool dispatch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::Config;
use crate::llm::{CompletionGateway, GatewayError};
use crate::protocol::{Origin, ProtocolViolation, StepMessage, Transcript};
use crate::tools::ToolRegistry;

use super::prompt::build_system_prompt;

/// Fatal run faults. Recoverable conditions (unknown tool, failed or timed
/// out capability) never appear here; those are folded into the transcript
/// as OBSERVE steps so the model can adapt.
#[derive(Debug, Error)]
pub enum RunError {
    /// The gateway's response was not a valid step message. Not retried;
    /// the violation carries the raw offending text.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    /// The completion service failed or timed out.
    #[error("gateway failure: {0}")]
    Gateway(#[from] GatewayError),

    /// The configured step budget ran out before an OUTPUT step.
    #[error("step budget of {limit} exhausted without an OUTPUT step")]
    StepBudgetExceeded { limit: usize },

    /// The same dispatch failure repeated too many times in a row.
    #[error("tool `{name}` failed identically {count} times in a row")]
    ToolFailureLoop { name: String, count: u32 },

    /// The run was cancelled from outside.
    #[error("run cancelled")]
    Cancelled,
}

/// Types of run log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEntryType {
    /// Model surfaced reasoning (START/THINK, or a stray OBSERVE).
    Thinking,
    /// Tool is being dispatched.
    ToolCall,
    /// Dispatch completed cleanly.
    ToolResult,
    /// Dispatch fell short: unknown tool, captured failure, or timeout.
    ToolError,
    /// Model produced the final response.
    Response,
}

/// A single entry in the run's diagnostic log. The model never sees this;
/// it exists so the operator can tell a clean dispatch from a captured
/// failure, which look the same inside the transcript.
#[derive(Debug, Clone, Serialize)]
pub struct RunLogEntry {
    pub timestamp: DateTime<Utc>,
    pub entry_type: LogEntryType,
    pub content: String,
}

impl RunLogEntry {
    fn new(entry_type: LogEntryType, content: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            entry_type,
            content: content.into(),
        }
    }
}

/// Result of a successfully terminated run.
#[derive(Debug)]
pub struct RunReport {
    /// Unique run identifier.
    pub id: Uuid,
    /// Content of the final OUTPUT step.
    pub output: String,
    /// Completion requests issued.
    pub steps: usize,
    /// The full ordered transcript.
    pub transcript: Transcript,
    /// Diagnostic log.
    pub log: Vec<RunLogEntry>,
}

/// The orchestration loop. One `Runner` may serve many goals; each run
/// owns its transcript, so independent runs are isolated and the shared
/// registry is only ever read.
pub struct Runner {
    config: Config,
    gateway: Arc<dyn CompletionGateway>,
    tools: Arc<ToolRegistry>,
}

impl Runner {
    pub fn new(config: Config, gateway: Arc<dyn CompletionGateway>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            config,
            gateway,
            tools,
        }
    }

    /// Run one goal to completion.
    pub async fn run(&self, goal: &str) -> Result<RunReport, RunError> {
        self.run_with_cancel(goal, CancellationToken::new()).await
    }

    /// Run one goal, honoring external cancellation at the suspension
    /// points. A cancellation that lands during a tool dispatch takes
    /// effect at the step boundary, after the capability has run to
    /// completion, so no half-applied side effect is left behind.
    pub async fn run_with_cancel(
        &self,
        goal: &str,
        cancel: CancellationToken,
    ) -> Result<RunReport, RunError> {
        let id = Uuid::new_v4();
        let mut transcript = Transcript::new(build_system_prompt(&self.tools), goal);
        let mut log = Vec::new();
        // Consecutive identical dispatch failures, keyed by (tool, observation).
        let mut failure_streak: Option<(String, u32)> = None;

        tracing::info!("Starting run {} for goal: {}", id, goal);

        for iteration in 0..self.config.max_steps {
            tracing::debug!("Run {} iteration {}", id, iteration + 1);

            let raw = self.next_completion(&transcript, &cancel).await?;

            let message = StepMessage::parse(&raw).map_err(|violation| {
                tracing::error!(
                    "Run {} protocol violation; raw response: {}",
                    id,
                    violation.raw()
                );
                violation
            })?;

            match message {
                StepMessage::Start { .. }
                | StepMessage::Think { .. }
                | StepMessage::Observe { .. } => {
                    // A model-emitted OBSERVE carries no dispatch; it is
                    // recorded like any other reasoning step.
                    let content = message.content().unwrap_or_default().to_string();
                    tracing::info!("[{}] {}", message.kind(), content);
                    log.push(RunLogEntry::new(LogEntryType::Thinking, content));
                    transcript.push(Origin::Model, message);
                }

                StepMessage::Tool {
                    ref tool_name,
                    ref input,
                    ..
                } => {
                    let name = tool_name.clone();
                    let input = input.clone();
                    log.push(RunLogEntry::new(
                        LogEntryType::ToolCall,
                        format!("Calling tool: {} with input: {}", name, truncate_for_log(&input, 200)),
                    ));
                    transcript.push(Origin::Model, message);

                    let outcome = self
                        .tools
                        .dispatch(&name, &input, self.config.tool_timeout)
                        .await;

                    // The dispatch itself is never interrupted mid-capability;
                    // cancellation takes effect here, at the step boundary.
                    if cancel.is_cancelled() {
                        tracing::info!("Run {} cancelled after dispatch of {}", id, name);
                        return Err(RunError::Cancelled);
                    }

                    let observation = outcome.observation();
                    if outcome.is_failure() {
                        log.push(RunLogEntry::new(
                            LogEntryType::ToolError,
                            truncate_for_log(&observation, 1000),
                        ));
                    } else {
                        log.push(RunLogEntry::new(
                            LogEntryType::ToolResult,
                            truncate_for_log(&observation, 1000),
                        ));
                    }

                    transcript.push(
                        Origin::Orchestrator,
                        StepMessage::Observe {
                            content: observation.clone(),
                        },
                    );

                    if outcome.is_failure() {
                        let key = format!("{}\u{1f}{}", name, observation);
                        let count = match failure_streak.take() {
                            Some((previous, count)) if previous == key => count + 1,
                            _ => 1,
                        };
                        if count >= self.config.max_failure_streak {
                            tracing::error!(
                                "Run {} aborted: tool {} failed identically {} times",
                                id,
                                name,
                                count
                            );
                            return Err(RunError::ToolFailureLoop { name, count });
                        }
                        failure_streak = Some((key, count));
                    } else {
                        failure_streak = None;
                    }
                }

                StepMessage::Output { ref content } => {
                    let output = content.clone();
                    log.push(RunLogEntry::new(
                        LogEntryType::Response,
                        truncate_for_log(&output, 2000),
                    ));
                    transcript.push(Origin::Model, message);
                    tracing::info!(
                        "Run {} finished after {} steps ({} transcript entries)",
                        id,
                        iteration + 1,
                        transcript.len()
                    );
                    return Ok(RunReport {
                        id,
                        output,
                        steps: iteration + 1,
                        transcript,
                        log,
                    });
                }
            }
        }

        tracing::error!(
            "Run {} exhausted its step budget of {}",
            id,
            self.config.max_steps
        );
        Err(RunError::StepBudgetExceeded {
            limit: self.config.max_steps,
        })
    }

    /// One gateway round trip, bounded by the configured timeout and
    /// abandoned immediately on cancellation (the gateway call has no side
    /// effects worth waiting for).
    async fn next_completion(
        &self,
        transcript: &Transcript,
        cancel: &CancellationToken,
    ) -> Result<String, RunError> {
        let history = transcript.to_chat_messages();
        let request = self.gateway.complete(&history);

        tokio::select! {
            _ = cancel.cancelled() => Err(RunError::Cancelled),
            result = tokio::time::timeout(self.config.gateway_timeout, request) => match result {
                Ok(Ok(raw)) => Ok(raw),
                Ok(Err(error)) => Err(RunError::Gateway(error)),
                Err(_) => Err(RunError::Gateway(GatewayError::Timeout(
                    self.config.gateway_timeout,
                ))),
            },
        }
    }
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_strings_untouched() {
        assert_eq!(truncate_for_log("hello", 10), "hello");
    }

    #[test]
    fn truncate_long_strings_marked() {
        let truncated = truncate_for_log(&"x".repeat(50), 10);
        assert_eq!(truncated, format!("{}... [truncated]", "x".repeat(10)));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        // 'é' is two bytes; cutting at byte 1 would split it.
        let truncated = truncate_for_log("éé", 1);
        assert_eq!(truncated, "... [truncated]");
    }
}
