//! Git operations through the `git` CLI.

pub mod cli;

pub use cli::{FALLBACK_DEFAULT_BRANCH, Git};
