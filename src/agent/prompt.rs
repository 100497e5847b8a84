//! System prompt for the step protocol.

use crate::tools::ToolRegistry;

/// Build the system prompt with the step-format rules and tool listing.
pub fn build_system_prompt(tools: &ToolRegistry) -> String {
    let tool_descriptions = tools
        .list_tools()
        .iter()
        .map(|t| format!("- **{}**: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an AI assistant that must respond **strictly in JSON** with exactly one step per reply: START, THINK, TOOL, OBSERVE, or OUTPUT.

## Available Tools

{tool_descriptions}

## Rules

1. Always break the problem into THINK steps before OUTPUT.
2. After a TOOL step, wait for the OBSERVE result before continuing.
3. If an observation reports an error, reason about where the problem comes from and try to solve it end to end.
4. OUTPUT only when everything is done.

## Response Format

Reply with a single JSON object and nothing else:
{{"step":"START|THINK|TOOL|OBSERVE|OUTPUT","content":"string","tool_name":"string (TOOL only)","input":"string (TOOL only)"}}"#,
        tool_descriptions = tool_descriptions
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_registered_tools() {
        let prompt = build_system_prompt(&ToolRegistry::with_defaults("."));
        assert!(prompt.contains("**get_weather**"));
        assert!(prompt.contains("**run_command**"));
        assert!(prompt.contains("**write_file**"));
        assert!(prompt.contains("START, THINK, TOOL, OBSERVE, or OUTPUT"));
    }
}
