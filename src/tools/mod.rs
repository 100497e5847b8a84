//! Tool registry and dispatcher.
//!
//! Capabilities are string-in/string-out external effects. The dispatcher
//! contains every failure: whatever happens inside a capability comes back
//! as an outcome the loop folds into an OBSERVE step, never as a fault
//! that could crash the run. An unregistered name is reported the same
//! way, so the model can correct itself.

mod shell;
mod weather;
mod write_file;

pub use shell::RunCommand;
pub use weather::GetWeather;
pub use write_file::{WriteFile, PATH_CONTENT_SEPARATOR};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// A named capability the model may invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Run the capability with its opaque string input. Errors are captured
    /// by the dispatcher and surfaced to the model as observation text.
    async fn invoke(&self, input: &str, workspace: &Path) -> anyhow::Result<String>;
}

/// Name and description of a registered tool, for prompt building.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Outcome of one dispatch. The variants exist for the orchestrator's own
/// diagnostics; the model only ever sees `observation()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The capability ran to completion and returned its result text.
    Completed(String),
    /// The capability ran and failed; the error text was captured.
    Failed(String),
    /// No capability is registered under the requested name.
    NotFound(String),
    /// The capability exceeded the dispatch timeout.
    TimedOut { name: String, timeout: Duration },
}

impl DispatchOutcome {
    /// The text fed back to the model as OBSERVE content.
    pub fn observation(&self) -> String {
        match self {
            DispatchOutcome::Completed(output) => output.clone(),
            DispatchOutcome::Failed(error) => error.clone(),
            DispatchOutcome::NotFound(name) => format!("Invalid tool: {}", name),
            DispatchOutcome::TimedOut { name, timeout } => format!(
                "Tool {} timed out after {} seconds",
                name,
                timeout.as_secs()
            ),
        }
    }

    /// Whether the dispatch fell short of a clean result.
    pub fn is_failure(&self) -> bool {
        !matches!(self, DispatchOutcome::Completed(_))
    }
}

/// Immutable name -> capability map, built once at startup and shared
/// read-only across concurrent runs.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    workspace: PathBuf,
}

impl ToolRegistry {
    /// An empty registry rooted at the given workspace directory.
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            tools: HashMap::new(),
            workspace: workspace.into(),
        }
    }

    /// A registry with the built-in capability set.
    pub fn with_defaults(workspace: impl Into<PathBuf>) -> Self {
        let mut registry = Self::new(workspace);
        registry.register(Arc::new(GetWeather));
        registry.register(Arc::new(RunCommand));
        registry.register(Arc::new(WriteFile));
        registry
    }

    /// Register a capability. Later registrations under the same name win.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Names and descriptions of all registered tools, sorted by name so
    /// prompt output is deterministic.
    pub fn list_tools(&self) -> Vec<ToolInfo> {
        let mut tools: Vec<ToolInfo> = self
            .tools
            .values()
            .map(|tool| ToolInfo {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
            })
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Dispatch one tool invocation, bounded by `timeout`.
    ///
    /// One dispatch is a single logical unit: either the capability ran to
    /// completion (successfully or with a captured error) or it was never
    /// invoked. Nothing escapes this boundary as a fault.
    pub async fn dispatch(&self, name: &str, input: &str, timeout: Duration) -> DispatchOutcome {
        let Some(tool) = self.tools.get(name) else {
            tracing::warn!("Dispatch requested for unregistered tool: {}", name);
            return DispatchOutcome::NotFound(name.to_string());
        };

        tracing::info!("Dispatching tool: {}", name);

        match tokio::time::timeout(timeout, tool.invoke(input, &self.workspace)).await {
            Ok(Ok(output)) => DispatchOutcome::Completed(output),
            Ok(Err(error)) => {
                tracing::warn!("Tool {} failed: {}", name, error);
                DispatchOutcome::Failed(format!("Error: {}", error))
            }
            Err(_) => {
                tracing::warn!("Tool {} timed out after {:?}", name, timeout);
                DispatchOutcome::TimedOut {
                    name: name.to_string(),
                    timeout,
                }
            }
        }
    }
}
