//! Temporary file carrying a PR body to `gh --body-file`.

use std::io::Write;
use std::path::Path;

use chrono::Utc;
use tempfile::{Builder, NamedTempFile};

/// A uniquely named file holding PR body text.
///
/// The file is deleted when this value is dropped, on success and error
/// paths alike.
pub struct PrBodyFile {
    file: NamedTempFile,
}

impl PrBodyFile {
    /// Write `body` to a new file in the system temp directory.
    pub fn create(body: &str) -> std::io::Result<Self> {
        Self::create_in(std::env::temp_dir(), body)
    }

    /// Write `body` to a new file in `dir`.
    pub fn create_in(dir: impl AsRef<Path>, body: &str) -> std::io::Result<Self> {
        let prefix = format!("autopr-pr-body-{}-", Utc::now().format("%Y%m%d%H%M%S%3f"));
        let mut file = Builder::new()
            .prefix(&prefix)
            .suffix(".md")
            .tempfile_in(dir)?;
        file.write_all(body.as_bytes())?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
