//! GitHub operations through the `gh` CLI.

pub mod body;
pub mod pr;

pub use body::PrBodyFile;
pub use pr::GitHub;
