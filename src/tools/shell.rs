//! Shell command execution tool.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::Tool;

/// Run a shell command in the workspace directory.
pub struct RunCommand;

#[async_trait]
impl Tool for RunCommand {
    fn name(&self) -> &str {
        "run_command"
    }

    fn description(&self) -> &str {
        "Execute a shell command in the workspace directory. Input: the command line. Returns stdout, stderr and the exit code. Use for mkdir, ls, cat and other filesystem work."
    }

    async fn invoke(&self, input: &str, workspace: &Path) -> anyhow::Result<String> {
        let command = input.trim();
        if command.is_empty() {
            anyhow::bail!("missing command");
        }

        tracing::info!("Executing command: {}", command);

        // Determine shell based on OS
        let (shell, shell_arg) = if cfg!(target_os = "windows") {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };

        let output = Command::new(shell)
            .arg(shell_arg)
            .arg(command)
            .current_dir(workspace)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to execute command: {}", e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let exit_code = output.status.code().unwrap_or(-1);

        let mut result = String::new();
        result.push_str(&format!("Exit code: {}\n", exit_code));

        if !stdout.is_empty() {
            result.push_str("\n--- stdout ---\n");
            result.push_str(&stdout);
        }

        if !stderr.is_empty() {
            result.push_str("\n--- stderr ---\n");
            result.push_str(&stderr);
        }

        // Truncate if too long
        if result.len() > 10000 {
            result.truncate(10000);
            result.push_str("\n... [output truncated]");
        }

        Ok(result)
    }
}
