//! File writing tool with the composite `path||content` input.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs;

use super::Tool;

/// Separator between the target path and the literal file content.
///
/// Content that itself contains the separator is not supported: the first
/// occurrence splits, and everything after it is written verbatim.
pub const PATH_CONTENT_SEPARATOR: &str = "||";

/// Write literal content to a file under the workspace, creating missing
/// parent directories first.
pub struct WriteFile;

#[async_trait]
impl Tool for WriteFile {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write a file. Input format: <path>||<content>. Everything after the separator is written verbatim; missing parent directories are created."
    }

    async fn invoke(&self, input: &str, workspace: &Path) -> anyhow::Result<String> {
        let Some((path_part, content)) = input.split_once(PATH_CONTENT_SEPARATOR) else {
            anyhow::bail!(
                "expected input of the form <path>{}<content>",
                PATH_CONTENT_SEPARATOR
            );
        };

        let path_part = path_part.trim();
        if path_part.is_empty() {
            anyhow::bail!("missing target path");
        }

        let target = workspace.join(path_part);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                anyhow::anyhow!("Failed to create {}: {}", parent.display(), e)
            })?;
        }

        fs::write(&target, content)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", target.display(), e))?;

        tracing::info!("Wrote {} ({} bytes)", target.display(), content.len());
        Ok(format!("{} created", path_part))
    }
}
