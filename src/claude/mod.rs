//! Claude CLI integration.

pub mod generate;
pub mod prompt;
pub mod subprocess;

pub use generate::{PrContent, PrInput, generate_commit_message, generate_pr_content};
pub use prompt::{commit_message_prompt, pr_context, pr_prompt};
pub use subprocess::run_claude;
