//! Fan-out of one action over every target, plus the barrier that waits for all of them.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::action::Action;
use crate::diag;
use crate::error::TaskError;
use crate::host_spec::HostSpec;
use crate::output::{HostOutput, Printer};
use crate::ssh::ssh_session::{ConnectParams, SshSession};
use crate::task::{run_host_task, HostReport, Outcome};

/// Spawns one host task per target, with no limit on how many run at once.
pub struct Dispatcher<S> {
    params: Arc<ConnectParams>,
    action: Arc<Action>,
    printer: Printer,
    _session: PhantomData<fn() -> S>,
}

impl<S: SshSession + 'static> Dispatcher<S> {
    pub fn new(params: ConnectParams, action: Action, printer: Printer) -> Self {
        Self {
            params: Arc::new(params),
            action: Arc::new(action),
            printer,
            _session: PhantomData,
        }
    }

    /// Start every task right away. Each prints its own block as soon as it is done.
    pub fn spawn(&self, targets: Vec<HostSpec>) -> CompletionBarrier {
        let tasks = targets
            .into_iter()
            .map(|target| {
                let action = Arc::clone(&self.action);
                let params = Arc::clone(&self.params);
                let printer = self.printer.clone();
                let handle = tokio::spawn({
                    let target = target.clone();
                    async move {
                        let report = run_host_task::<S>(target, Arc::clone(&action), params).await;
                        if let Err(err) = printer.emit(&report, &action) {
                            error!("unable to print result for {}: {err}", report.target);
                        }
                        report
                    }
                });
                (target, handle)
            })
            .collect();

        CompletionBarrier {
            tasks,
            action: Arc::clone(&self.action),
            printer: self.printer.clone(),
        }
    }
}

/// Releases once every spawned host task has finished, successfully or not.
pub struct CompletionBarrier {
    tasks: Vec<(HostSpec, JoinHandle<HostReport>)>,
    action: Arc<Action>,
    printer: Printer,
}

impl CompletionBarrier {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Reports come back in spawn order. A task that panicked still yields
    /// a failed report so no host goes unaccounted for.
    pub async fn wait(self) -> Vec<HostReport> {
        let (targets, handles): (Vec<_>, Vec<_>) = self.tasks.into_iter().unzip();
        let joined = join_all(handles).await;

        targets
            .into_iter()
            .zip(joined)
            .map(|(target, joined)| match joined {
                Ok(report) => report,
                Err(err) => {
                    let mut output = HostOutput::default();
                    diag!(output.diagnostics, "host task aborted: {err}");
                    let report = HostReport {
                        target,
                        elapsed: Duration::ZERO,
                        output,
                        outcome: Outcome::Failed(TaskError::execute("host task panicked")),
                    };
                    if let Err(err) = self.printer.emit(&report, &self.action) {
                        error!("unable to print result for {}: {err}", report.target);
                    }
                    report
                }
            })
            .collect()
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_reports(reports: &[HostReport]) -> Self {
        let succeeded = reports.iter().filter(|r| r.outcome.is_success()).count();
        let summary = Self {
            total: reports.len(),
            succeeded,
            failed: reports.len() - succeeded,
        };
        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "run complete"
        );
        summary
    }
}
