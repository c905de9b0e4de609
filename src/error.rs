use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors detected before any host is contacted. Every one of them aborts the run.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid host specification {spec:?}: {reason}")]
    InvalidHostSpec { spec: String, reason: &'static str },

    #[error("command and upload are mutually exclusive parameters")]
    ConflictingAction,

    #[error("malformed upload path {0:?}, use: /local/path:/host/path")]
    MalformedUpload(String),

    #[error("unable to open upload source {path:?}: {source}")]
    UploadSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid duration {0:?}")]
    InvalidDuration(String),

    #[error("no identity file configured, pass one with -i")]
    MissingIdentity,

    #[error("unable to read private key {path:?}: {source}")]
    UnreadableKey {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to parse private key {path:?}: {reason}")]
    UnparsableKey { path: PathBuf, reason: String },

    #[error("failed to read password: {0}")]
    PasswordPrompt(#[source] io::Error),

    #[error("no usable authentication method")]
    NoAuthMethods,

    #[error("unable to read hosts file {path:?}: {source}")]
    HostsFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to load config file {path:?}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },
}

/// The step of a host task at which it gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Dial,
    Authenticate,
    Execute,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Dial => "dial",
            Stage::Authenticate => "authenticate",
            Stage::Execute => "execute",
        };
        f.write_str(name)
    }
}

/// A failure confined to a single host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{stage} failed: {cause}")]
pub struct TaskError {
    pub stage: Stage,
    pub cause: String,
}

impl TaskError {
    pub fn new(stage: Stage, cause: impl fmt::Display) -> Self {
        Self {
            stage,
            cause: cause.to_string(),
        }
    }

    pub fn dial(cause: impl fmt::Display) -> Self {
        Self::new(Stage::Dial, cause)
    }

    pub fn authenticate(cause: impl fmt::Display) -> Self {
        Self::new(Stage::Authenticate, cause)
    }

    pub fn execute(cause: impl fmt::Display) -> Self {
        Self::new(Stage::Execute, cause)
    }
}
