//! Agent module - the orchestration loop for the step protocol.
//!
//! The loop shepherds the protocol, one step per completion:
//! 1. Seed the transcript with the system prompt and the user goal
//! 2. Request a completion for the full transcript
//! 3. Parse and validate the response as a step message
//! 4. START/THINK: record and continue; TOOL: dispatch and append an
//!    OBSERVE; OUTPUT: terminate with the final content
//! 5. Repeat until OUTPUT, a fatal fault, or the step budget runs out

mod prompt;
mod runner;

pub use prompt::build_system_prompt;
pub use runner::{LogEntryType, RunError, RunLogEntry, RunReport, Runner};
