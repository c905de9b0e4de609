//! In-memory stand-ins for SSH sessions and the console.
//!
//! `FakeSession` picks its behaviour from the target's host name:
//! `hang*` never finishes connecting, `refuse*` fails to dial,
//! `slow*` takes 300ms to connect, `panic*` panics while connecting,
//! `noisy*` fails to close. Anything else connects immediately.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use ssh_fanout_lib::error::TaskError;
use ssh_fanout_lib::output::{HostOutput, Printer};
use ssh_fanout_lib::ssh::credentials::CredentialSet;
use ssh_fanout_lib::{ConnectParams, HostSpec, SshSession};

pub struct FakeSession {
    target: HostSpec,
}

/// Files "uploaded" by fake sessions, keyed by `host:port` + remote path.
pub fn uploads() -> &'static Mutex<HashMap<String, Vec<u8>>> {
    static UPLOADS: OnceLock<Mutex<HashMap<String, Vec<u8>>>> = OnceLock::new();
    UPLOADS.get_or_init(Default::default)
}

#[async_trait]
impl SshSession for FakeSession {
    async fn connect(target: &HostSpec, _params: &ConnectParams) -> Result<Self, TaskError> {
        let host = target.host.as_str();
        if host.starts_with("hang") {
            return std::future::pending().await;
        }
        if host.starts_with("refuse") {
            return Err(TaskError::dial(format!(
                "dial tcp {target}: connect: connection refused"
            )));
        }
        if host.starts_with("slow") {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        if host.starts_with("panic") {
            panic!("fake session blew up");
        }
        Ok(Self {
            target: target.clone(),
        })
    }

    async fn call(&mut self, command: &str, output: &mut HostOutput) -> Result<u32> {
        let host = &self.target.host;
        for i in 0..3 {
            writeln!(output.stdout, "{host} line {i}")?;
            tokio::task::yield_now().await;
        }
        writeln!(output.stderr, "{host} warning")?;

        match command {
            "false" => Ok(1),
            "broken-pipe" => bail!("wait: remote command exited without exit status"),
            _ => {
                let user = self.target.user.as_deref().unwrap_or("-");
                writeln!(output.stdout, "{host} ran {command} as {user}")?;
                Ok(0)
            }
        }
    }

    async fn upload(
        &mut self,
        local: &Path,
        remote: &str,
        _output: &mut HostOutput,
    ) -> Result<u64> {
        let mut source = tokio::fs::File::open(local).await?;
        let mut sink = Vec::new();
        let written = tokio::io::copy(&mut source, &mut sink).await?;
        uploads()
            .lock()
            .unwrap()
            .insert(format!("{}{remote}", self.target), sink);
        Ok(written)
    }

    async fn close(&mut self) -> Result<()> {
        if self.target.host.starts_with("noisy") {
            bail!("EOF");
        }
        Ok(())
    }
}

/// A cloneable in-memory console.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn printer(&self) -> Printer {
        Printer::new(self.clone())
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).expect("console output is utf-8")
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn params(connect_timeout: Duration) -> ConnectParams {
    ConnectParams::new(CredentialSet::default()).with_connect_timeout(connect_timeout)
}
