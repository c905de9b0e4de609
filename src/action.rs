use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

/// Command executed when neither a command nor an upload was requested.
/// Kept as the literal `w` for compatibility with existing scripts.
pub const DEFAULT_COMMAND: &str = "w";

/// `local:remote` pair for a file upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSpec {
    pub local: PathBuf,
    pub remote: String,
}

impl FromStr for UploadSpec {
    type Err = ConfigError;

    /// The local file is opened once here so a bad path fails before any host is touched.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (local, remote) = value
            .split_once(':')
            .ok_or_else(|| ConfigError::MalformedUpload(value.to_string()))?;
        if local.is_empty() || remote.is_empty() {
            return Err(ConfigError::MalformedUpload(value.to_string()));
        }

        let local = PathBuf::from(local);
        File::open(&local).map_err(|source| ConfigError::UploadSource {
            path: local.clone(),
            source,
        })?;

        Ok(Self {
            local,
            remote: remote.to_string(),
        })
    }
}

impl fmt::Display for UploadSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.local.display(), self.remote)
    }
}

/// The single operation applied to every host of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RunCommand(String),
    UploadFile(UploadSpec),
}

impl Action {
    pub fn select(
        command: Option<String>,
        upload: Option<UploadSpec>,
    ) -> Result<Self, ConfigError> {
        match (command, upload) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingAction),
            (None, Some(upload)) => Ok(Action::UploadFile(upload)),
            (Some(command), None) => Ok(Action::RunCommand(command)),
            (None, None) => Ok(Action::RunCommand(DEFAULT_COMMAND.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::RunCommand(command) => f.write_str(command),
            Action::UploadFile(upload) => write!(f, "upload {upload}"),
        }
    }
}
