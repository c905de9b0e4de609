use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use russh::keys::*;
use russh::*;
use russh_sftp::client::SftpSession;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::common::SshChannel;
use super::credentials::AuthMethod;
use super::host_key::HostKeyPolicy;
use super::ssh_session::{ConnectParams, SshSession};
use crate::diag;
use crate::error::TaskError;
use crate::host_spec::HostSpec;
use crate::output::HostOutput;

pub struct Client {
    target: HostSpec,
    host_key_policy: Arc<dyn HostKeyPolicy>,
}

#[async_trait]
impl client::Handler for Client {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &key::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(self.host_key_policy.verify(
            &self.target,
            server_public_key.name(),
            &server_public_key.fingerprint(),
        ))
    }
}

/// This struct is a convenience wrapper
/// around a russh client authenticated with
/// the run's credential set
pub struct KeySession {
    session: client::Handle<Client>,
}

#[async_trait]
impl SshSession for KeySession {
    async fn connect(target: &HostSpec, params: &ConnectParams) -> Result<Self, TaskError> {
        let user = target
            .user
            .as_deref()
            .ok_or_else(|| TaskError::authenticate("no remote user configured"))?;

        let config = Arc::new(client::Config::default());
        let sh = Client {
            target: target.clone(),
            host_key_policy: Arc::clone(&params.host_key_policy),
        };

        let mut session = client::connect(config, (target.host.as_str(), target.port), sh)
            .await
            .map_err(TaskError::dial)?;

        for method in params.credentials.methods() {
            let accepted = match method {
                AuthMethod::PublicKey(key_pair) => {
                    session
                        .authenticate_publickey(user, Arc::clone(key_pair))
                        .await
                }
                AuthMethod::Password(password) => {
                    session.authenticate_password(user, password.as_str()).await
                }
            }
            .map_err(TaskError::authenticate)?;

            if accepted {
                debug!("{target}: authenticated as {user} with {method:?}");
                return Ok(Self { session });
            }
        }

        Err(TaskError::authenticate(format!(
            "ssh: unable to authenticate {user}, attempted methods {:?}",
            params.credentials.methods()
        )))
    }

    async fn call(&mut self, command: &str, output: &mut HostOutput) -> Result<u32> {
        let channel = self
            .session
            .channel_open_session()
            .await
            .context("Failed to create session")?;
        SshChannel::new(channel).call(command, output).await
    }

    /// Some sshd_config does not enable sftp by default. A line like
    /// `Subsystem sftp internal-sftp` is needed on the remote machine.
    async fn upload(
        &mut self,
        local: &Path,
        remote: &str,
        output: &mut HostOutput,
    ) -> Result<u64> {
        let channel = self
            .session
            .channel_open_session()
            .await
            .context("Failed to create session")?;
        channel.request_subsystem(true, "sftp").await?;
        let sftp = SftpSession::new(channel.into_stream()).await?;

        let mut source = tokio::fs::File::open(local)
            .await
            .with_context(|| format!("open {}", local.display()))?;
        let mut destination = sftp
            .create(remote)
            .await
            .with_context(|| format!("create {remote}"))?;

        let written = tokio::io::copy(&mut source, &mut destination).await?;
        destination.shutdown().await?;

        if let Err(err) = sftp.close().await {
            diag!(output.diagnostics, "closing sftp session: {err}");
        }
        Ok(written)
    }

    async fn close(&mut self) -> Result<()> {
        self.session
            .disconnect(Disconnect::ByApplication, "", "English")
            .await?;
        Ok(())
    }
}
