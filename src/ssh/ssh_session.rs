use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use super::credentials::CredentialSet;
use super::host_key::{AcceptAll, HostKeyPolicy};
use crate::error::TaskError;
use crate::host_spec::HostSpec;
use crate::output::HostOutput;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only connection settings shared by every host task of a run.
pub struct ConnectParams {
    pub credentials: Arc<CredentialSet>,
    pub host_key_policy: Arc<dyn HostKeyPolicy>,
    pub connect_timeout: Duration,
}

impl ConnectParams {
    pub fn new(credentials: CredentialSet) -> Self {
        Self {
            credentials: Arc::new(credentials),
            host_key_policy: Arc::new(AcceptAll),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_host_key_policy(mut self, policy: Arc<dyn HostKeyPolicy>) -> Self {
        self.host_key_policy = policy;
        self
    }
}

/// One authenticated connection to one host.
#[async_trait::async_trait]
pub trait SshSession: Send + Sized {
    /// Dial, handshake and authenticate. The caller enforces the connect timeout.
    async fn connect(target: &HostSpec, params: &ConnectParams) -> Result<Self, TaskError>;

    /// Run `command`, collecting stdout and stderr into separate buffers.
    /// Returns the exit status. Cleanup noise goes to `output.diagnostics`.
    async fn call(&mut self, command: &str, output: &mut HostOutput) -> Result<u32>;

    /// Copy `local` to `remote` over SFTP, creating or truncating it. Returns bytes written.
    async fn upload(&mut self, local: &Path, remote: &str, output: &mut HostOutput)
        -> Result<u64>;

    async fn close(&mut self) -> Result<()>;
}
