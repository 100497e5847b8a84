//! Append-only conversation transcript for a single run.
//!
//! The transcript is the only mutable state of a run. It is owned by the
//! orchestration loop, grows monotonically until the run ends, and is
//! discarded with the run. The completion gateway always sees it whole and
//! in order, so every step the model takes is causally informed by all
//! prior observations.

use crate::llm::{ChatMessage, Role};

use super::step::StepMessage;

/// Who appended a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The model emitted this step.
    Model,
    /// The orchestrator emitted this step (OBSERVE results).
    Orchestrator,
}

/// One recorded step with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub origin: Origin,
    pub message: StepMessage,
}

/// Ordered history of one run: the seed context plus every step exchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    system: String,
    goal: String,
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// A transcript seeded with the system instructions and the user goal.
    pub fn new(system: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            goal: goal.into(),
            entries: Vec::new(),
        }
    }

    /// Append one step. Entries are never reordered or removed.
    pub fn push(&mut self, origin: Origin, message: StepMessage) {
        self.entries.push(TranscriptEntry { origin, message });
    }

    /// The recorded steps, in order of occurrence.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of recorded steps (the seed context is not counted).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    /// Project the transcript into gateway history: system instructions and
    /// goal first, then each step serialized back to its wire JSON. Model
    /// steps become assistant turns; orchestrator observations become user
    /// turns, which is how the result of a dispatch reaches the model.
    pub fn to_chat_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.entries.len() + 2);
        messages.push(ChatMessage {
            role: Role::System,
            content: self.system.clone(),
        });
        messages.push(ChatMessage {
            role: Role::User,
            content: self.goal.clone(),
        });
        for entry in &self.entries {
            let role = match entry.origin {
                Origin::Model => Role::Assistant,
                Origin::Orchestrator => Role::User,
            };
            messages.push(ChatMessage {
                role,
                content: entry.message.to_wire_json(),
            });
        }
        messages
    }
}
