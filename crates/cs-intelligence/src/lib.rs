//! Model-backed configuration rewriting.
//!
//! - [`llm`]: provider abstraction over OpenAI-compatible chat completions,
//!   plus a queue-driven mock for tests
//! - [`prompt`]: system prompt assembly from the current file, parser source
//!   and plugin manifests
//! - [`generation`]: the validate-and-retry loop that turns an editor
//!   instruction into schema-valid YAML

pub mod generation;
pub mod llm;
pub mod prompt;
