//! Saved credential file (`~/.config/autopr/config.json`).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::StoreError;

/// On-disk credential record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCredential {
    #[serde(rename = "apiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Reads and writes the credential record at a fixed path.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the per-user default location.
    pub fn default_location() -> Result<Self, StoreError> {
        let home = dirs::home_dir().ok_or(StoreError::NoHomeDir)?;
        Ok(Self::new(home.join(".config").join("autopr").join("config.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<SavedCredential>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::ReadFailed {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::ParseFailed {
                path: self.path.clone(),
                source,
            })
    }

    /// The saved key, if the record exists and holds a non-empty key.
    pub fn api_key(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .load()?
            .and_then(|c| c.api_key)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty()))
    }

    /// Write the key, creating the parent directory as needed.
    ///
    /// The file is written to a sibling temp file with owner-only
    /// permissions and renamed into place.
    pub fn save_api_key(&self, key: &str) -> Result<(), StoreError> {
        let write_err = |source: std::io::Error| StoreError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(write_err)?;

        let record = SavedCredential {
            api_key: Some(key.to_string()),
        };
        let json = serde_json::to_string_pretty(&record).map_err(StoreError::SerializeFailed)?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(write_err)?;
        restrict_permissions(tmp.path()).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
