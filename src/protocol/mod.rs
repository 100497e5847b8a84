//! The step protocol: message model, wire parsing, and the per-run
//! transcript.
//!
//! Every exchange between the orchestrator and the model is one step
//! message of kind START, THINK, TOOL, OBSERVE, or OUTPUT. The transcript
//! records them in order and is the model's full context on every
//! completion request.

mod step;
mod transcript;

pub use step::{ProtocolViolation, StepKind, StepMessage};
pub use transcript::{Origin, Transcript, TranscriptEntry};
