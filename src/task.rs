//! The per-host unit of work.
//!
//! A host task walks `Resolved → Connecting → Authenticated → Executing →
//! Completed` strictly in order. Whatever happens, it ends with a
//! [`HostReport`]; errors never leave the task.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout, Instant};
use tracing::{debug, instrument};

use crate::action::Action;
use crate::diag;
use crate::error::TaskError;
use crate::host_spec::HostSpec;
use crate::output::HostOutput;
use crate::ssh::ssh_session::{ConnectParams, SshSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Resolved,
    Connecting,
    Authenticated,
    Executing,
    Completed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed(TaskError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// The finished result of one host task.
#[derive(Debug, Clone)]
pub struct HostReport {
    pub target: HostSpec,
    pub elapsed: Duration,
    pub output: HostOutput,
    pub outcome: Outcome,
}

struct HostTask<'a> {
    target: &'a HostSpec,
    state: TaskState,
    output: HostOutput,
}

impl HostTask<'_> {
    fn advance(&mut self, next: TaskState) {
        debug!(host = %self.target, from = %self.state, to = %next, "host task transition");
        self.state = next;
    }

    async fn drive<S: SshSession>(
        &mut self,
        action: &Action,
        params: &ConnectParams,
    ) -> Result<(), TaskError> {
        self.advance(TaskState::Connecting);
        let connecting = S::connect(self.target, params);
        // a zero timeout means no deadline at all
        let mut session = if params.connect_timeout.is_zero() {
            connecting.await?
        } else {
            match timeout(params.connect_timeout, connecting).await {
                Ok(session) => session?,
                Err(_) => {
                    return Err(TaskError::dial(format!(
                        "dial tcp {}: i/o timeout after {:?}",
                        self.target, params.connect_timeout
                    )))
                }
            }
        };
        self.advance(TaskState::Authenticated);

        self.advance(TaskState::Executing);
        let executed = self.execute(&mut session, action).await;

        if let Err(err) = session.close().await {
            diag!(self.output.diagnostics, "closing connection: {err}");
        }
        executed
    }

    async fn execute<S: SshSession>(
        &mut self,
        session: &mut S,
        action: &Action,
    ) -> Result<(), TaskError> {
        match action {
            Action::RunCommand(command) => {
                let status = session
                    .call(command, &mut self.output)
                    .await
                    .map_err(|err| TaskError::execute(format!("{err:#}")))?;
                if status != 0 {
                    return Err(TaskError::execute(format!(
                        "Process exited with status {status}"
                    )));
                }
            }
            Action::UploadFile(upload) => {
                let written = session
                    .upload(&upload.local, &upload.remote, &mut self.output)
                    .await
                    .map_err(|err| TaskError::execute(format!("{err:#}")))?;
                let line = format!("{written} bytes written to file {}", upload.remote);
                self.output.stdout.extend_from_slice(line.as_bytes());
            }
        }
        Ok(())
    }
}

/// Run `action` against one host and collect everything it produced.
#[instrument(skip_all, fields(host = %target))]
pub async fn run_host_task<S: SshSession>(
    target: HostSpec,
    action: Arc<Action>,
    params: Arc<ConnectParams>,
) -> HostReport {
    let started = Instant::now();
    let mut task = HostTask {
        target: &target,
        state: TaskState::Resolved,
        output: HostOutput::default(),
    };

    let outcome = match task.drive::<S>(&action, &params).await {
        Ok(()) => Outcome::Success,
        Err(err) => {
            diag!(task.output.diagnostics, "{err}");
            Outcome::Failed(err)
        }
    };
    task.advance(TaskState::Completed);

    let output = task.output;
    HostReport {
        elapsed: started.elapsed(),
        target,
        output,
        outcome,
    }
}
