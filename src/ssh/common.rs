use anyhow::{bail, Context, Result};
use russh::{client::Msg, *};

use crate::diag;
use crate::output::HostOutput;

/// SSH_EXTENDED_DATA_STDERR
const STDERR_STREAM: u32 = 1;

pub struct SshChannel {
    channel: Channel<Msg>,
}

impl SshChannel {
    pub fn new(channel: Channel<Msg>) -> Self {
        Self { channel }
    }

    /// Execute `command` without a PTY and drain the channel until the server closes it.
    pub async fn call(&mut self, command: &str, output: &mut HostOutput) -> Result<u32> {
        self.channel.exec(true, command).await?;

        let mut code = None;
        let mut signal = None;
        while let Some(msg) = self.channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => output.stdout.extend_from_slice(data),
                ChannelMsg::ExtendedData { ref data, ext } if ext == STDERR_STREAM => {
                    output.stderr.extend_from_slice(data)
                }
                ChannelMsg::ExitStatus { exit_status } => code = Some(exit_status),
                ChannelMsg::ExitSignal { signal_name, .. } => signal = Some(signal_name),
                _ => {}
            }
        }

        // the server usually closed the channel already
        if let Err(err) = self.channel.close().await {
            diag!(output.diagnostics, "closing channel: {err}");
        }

        if let Some(signal) = signal {
            bail!("Process terminated by signal {signal:?}");
        }
        code.context("Remote command exited without exit status or exit signal")
    }
}
