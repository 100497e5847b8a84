//! Step message model and wire parsing.
//!
//! The model must answer every completion request with a single JSON
//! object:
//!
//! ```json
//! {"step":"START|THINK|TOOL|OBSERVE|OUTPUT","content":"string","tool_name":"string (TOOL only)","input":"string (TOOL only)"}
//! ```
//!
//! Unknown top-level fields are ignored. Anything else - text that is not
//! a JSON object, an unrecognized step kind, or a missing required field -
//! is a protocol violation and fatal for the run.

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// The closed set of step kinds the protocol admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Start,
    Think,
    Tool,
    Observe,
    Output,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StepKind::Start => "START",
            StepKind::Think => "THINK",
            StepKind::Tool => "TOOL",
            StepKind::Observe => "OBSERVE",
            StepKind::Output => "OUTPUT",
        };
        f.write_str(name)
    }
}

/// Validation failure on gateway output. Fatal: the loop never guesses or
/// coerces, it reports the raw offending text and stops.
#[derive(Debug, Error)]
pub enum ProtocolViolation {
    #[error("response is not a step message: {source}")]
    Malformed {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unrecognized step kind `{kind}`")]
    UnknownKind { kind: String, raw: String },

    #[error("{kind} step is missing required field `{field}`")]
    MissingField {
        kind: StepKind,
        field: &'static str,
        raw: String,
    },
}

impl ProtocolViolation {
    /// The raw gateway text that failed validation, for diagnostics.
    pub fn raw(&self) -> &str {
        match self {
            ProtocolViolation::Malformed { raw, .. }
            | ProtocolViolation::UnknownKind { raw, .. }
            | ProtocolViolation::MissingField { raw, .. } => raw,
        }
    }
}

/// Raw wire shape before validation. Extra fields are ignored by serde's
/// default behavior.
#[derive(Debug, Deserialize)]
struct WireStep {
    step: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_name: Option<String>,
    #[serde(default)]
    input: Option<String>,
}

/// A validated step message. The shape is fully determined by the kind:
/// TOOL carries a tool name and input, every other kind carries content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepMessage {
    Start {
        content: String,
    },
    Think {
        content: String,
    },
    Tool {
        content: Option<String>,
        tool_name: String,
        input: String,
    },
    Observe {
        content: String,
    },
    Output {
        content: String,
    },
}

impl StepMessage {
    /// Parse and validate raw gateway text as one step message.
    pub fn parse(raw: &str) -> Result<Self, ProtocolViolation> {
        let wire: WireStep =
            serde_json::from_str(raw.trim()).map_err(|source| ProtocolViolation::Malformed {
                raw: raw.to_string(),
                source,
            })?;

        let kind = match wire.step.as_str() {
            "START" => StepKind::Start,
            "THINK" => StepKind::Think,
            "TOOL" => StepKind::Tool,
            "OBSERVE" => StepKind::Observe,
            "OUTPUT" => StepKind::Output,
            other => {
                return Err(ProtocolViolation::UnknownKind {
                    kind: other.to_string(),
                    raw: raw.to_string(),
                })
            }
        };

        let require = |field: &'static str, value: Option<String>| {
            value.ok_or_else(|| ProtocolViolation::MissingField {
                kind,
                field,
                raw: raw.to_string(),
            })
        };

        match kind {
            StepKind::Start => Ok(StepMessage::Start {
                content: require("content", wire.content)?,
            }),
            StepKind::Think => Ok(StepMessage::Think {
                content: require("content", wire.content)?,
            }),
            StepKind::Observe => Ok(StepMessage::Observe {
                content: require("content", wire.content)?,
            }),
            StepKind::Output => Ok(StepMessage::Output {
                content: require("content", wire.content)?,
            }),
            StepKind::Tool => {
                let tool_name = require("tool_name", wire.tool_name.filter(|n| !n.trim().is_empty()))?;
                let input = require("input", wire.input)?;
                Ok(StepMessage::Tool {
                    content: wire.content,
                    tool_name,
                    input,
                })
            }
        }
    }

    /// The kind tag of this message.
    pub fn kind(&self) -> StepKind {
        match self {
            StepMessage::Start { .. } => StepKind::Start,
            StepMessage::Think { .. } => StepKind::Think,
            StepMessage::Tool { .. } => StepKind::Tool,
            StepMessage::Observe { .. } => StepKind::Observe,
            StepMessage::Output { .. } => StepKind::Output,
        }
    }

    /// Free-form content, if this kind carries any.
    pub fn content(&self) -> Option<&str> {
        match self {
            StepMessage::Start { content }
            | StepMessage::Think { content }
            | StepMessage::Observe { content }
            | StepMessage::Output { content } => Some(content),
            StepMessage::Tool { content, .. } => content.as_deref(),
        }
    }

    /// Serialize back to the wire shape, for the model's context.
    pub fn to_wire_json(&self) -> String {
        let value = match self {
            StepMessage::Start { content } => json!({ "step": "START", "content": content }),
            StepMessage::Think { content } => json!({ "step": "THINK", "content": content }),
            StepMessage::Observe { content } => json!({ "step": "OBSERVE", "content": content }),
            StepMessage::Output { content } => json!({ "step": "OUTPUT", "content": content }),
            StepMessage::Tool {
                content,
                tool_name,
                input,
            } => {
                let mut value = json!({ "step": "TOOL", "tool_name": tool_name, "input": input });
                if let Some(content) = content {
                    value["content"] = json!(content);
                }
                value
            }
        };
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_think() {
        let message = StepMessage::parse(r#"{"step":"THINK","content":"planning"}"#).unwrap();
        assert_eq!(
            message,
            StepMessage::Think {
                content: "planning".to_string()
            }
        );
        assert_eq!(message.kind(), StepKind::Think);
    }

    #[test]
    fn parse_tool() {
        let raw = r#"{"step":"TOOL","tool_name":"run_command","input":"mkdir proj"}"#;
        let message = StepMessage::parse(raw).unwrap();
        assert_eq!(
            message,
            StepMessage::Tool {
                content: None,
                tool_name: "run_command".to_string(),
                input: "mkdir proj".to_string(),
            }
        );
    }

    #[test]
    fn parse_tolerates_surrounding_whitespace() {
        let message = StepMessage::parse("\n  {\"step\":\"OUTPUT\",\"content\":\"done\"}  \n").unwrap();
        assert_eq!(message.content(), Some("done"));
    }

    #[test]
    fn parse_ignores_extra_fields() {
        let raw = r#"{"step":"START","content":"go","confidence":0.9,"note":"x"}"#;
        let message = StepMessage::parse(raw).unwrap();
        assert_eq!(message.kind(), StepKind::Start);
    }

    #[test]
    fn non_json_is_malformed() {
        let err = StepMessage::parse("sure, I'll get right on that").unwrap_err();
        assert!(matches!(err, ProtocolViolation::Malformed { .. }));
        assert_eq!(err.raw(), "sure, I'll get right on that");
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = StepMessage::parse(r#"{"step":"FOO","content":"x"}"#).unwrap_err();
        match err {
            ProtocolViolation::UnknownKind { kind, .. } => assert_eq!(kind, "FOO"),
            other => panic!("expected UnknownKind, got {other:?}"),
        }
    }

    #[test]
    fn think_requires_content() {
        let err = StepMessage::parse(r#"{"step":"THINK"}"#).unwrap_err();
        assert!(matches!(
            err,
            ProtocolViolation::MissingField {
                field: "content",
                ..
            }
        ));
    }

    #[test]
    fn tool_requires_nonempty_name() {
        let err = StepMessage::parse(r#"{"step":"TOOL","tool_name":"  ","input":"x"}"#).unwrap_err();
        assert!(matches!(
            err,
            ProtocolViolation::MissingField {
                field: "tool_name",
                ..
            }
        ));
    }

    #[test]
    fn tool_requires_input() {
        let err = StepMessage::parse(r#"{"step":"TOOL","tool_name":"run_command"}"#).unwrap_err();
        assert!(matches!(
            err,
            ProtocolViolation::MissingField { field: "input", .. }
        ));
    }

    #[test]
    fn tool_content_is_optional() {
        let raw = r#"{"step":"TOOL","content":"making the folder","tool_name":"run_command","input":"mkdir x"}"#;
        let message = StepMessage::parse(raw).unwrap();
        assert_eq!(message.content(), Some("making the folder"));
    }

    #[test]
    fn wire_json_round_trips() {
        let original = StepMessage::Tool {
            content: None,
            tool_name: "write_file".to_string(),
            input: "a.txt||hello".to_string(),
        };
        let reparsed = StepMessage::parse(&original.to_wire_json()).unwrap();
        assert_eq!(reparsed, original);
        // No content key when the TOOL step carried none.
        assert!(!original.to_wire_json().contains("\"content\""));
    }
}
