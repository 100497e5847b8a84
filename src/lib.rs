//! # Stepline
//!
//! A minimal agent orchestrator that drives a conversational language
//! model through a strict step protocol: START, THINK, TOOL, OBSERVE,
//! OUTPUT.
//!
//! This library provides:
//! - A typed step-message protocol with strict validation
//! - A tool registry with contained, string-in/string-out capabilities
//! - A sequential orchestration loop that dispatches tool calls and feeds
//!   observations back until the model produces a final OUTPUT
//!
//! ## Architecture
//!
//! The loop shepherds the protocol, one step per completion:
//! 1. Seed the transcript with the system prompt and the user goal
//! 2. Ask the gateway for the next step, given the full transcript
//! 3. Validate the response as a step message
//! 4. START/THINK: record and continue; TOOL: dispatch and observe;
//!    OUTPUT: terminate with the final content
//! 5. Repeat until OUTPUT, a fatal fault, or the step budget runs out
//!
//! Recoverable conditions (unknown tool, failed or timed-out capability)
//! are folded back into the conversation as OBSERVE data so the model can
//! self-correct; fatal ones (protocol violation, gateway failure, budget
//! exhaustion) terminate the run with a typed error.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stepline::{agent::Runner, config::Config, llm::OpenRouterGateway, tools::ToolRegistry};
//!
//! let config = Config::from_env()?;
//! let gateway = Arc::new(OpenRouterGateway::new(config.api_key.clone(), config.model.clone()));
//! let tools = Arc::new(ToolRegistry::with_defaults(&config.workspace_path));
//! let report = Runner::new(config, gateway, tools).run("Create a landing page").await?;
//! println!("{}", report.output);
//! ```

pub mod agent;
pub mod config;
pub mod llm;
pub mod protocol;
pub mod tools;

pub use config::Config;
