use std::env;
use std::io;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::action::Action;
use crate::cli::Cli;
use crate::config::app_config::{read_config, Config};
use crate::dispatch::{Dispatcher, RunSummary};
use crate::error::ConfigError;
use crate::helper::{expand_tilde, get_file_path, parse_duration, CONFIG_FILE};
use crate::host_spec::{read_hosts_file, resolve_targets, HostSpec};
use crate::output::Printer;
use crate::ssh::credentials::{CredentialOptions, CredentialSet};
use crate::ssh::ssh_session::{ConnectParams, SshSession, DEFAULT_CONNECT_TIMEOUT};

/// Everything resolved at startup. Building an `App` is where every fatal
/// error surfaces; once it exists, no host failure can abort the run.
pub struct App {
    action: Action,
    params: ConnectParams,
    targets: Vec<HostSpec>,
}

impl App {
    /// `prompt` reads a secret with echo disabled.
    pub fn new<P>(cli: Cli, prompt: P) -> Result<Self, ConfigError>
    where
        P: FnMut(&str) -> io::Result<String>,
    {
        let action = Action::select(cli.command, cli.upload)?;

        let config = match cli.config {
            Some(path) => read_config(&expand_tilde(&path))?,
            None => match get_file_path(CONFIG_FILE) {
                Ok(path) => read_config(&path)?,
                Err(err) => {
                    debug!("no default config file: {err}");
                    Config::default()
                }
            },
        };

        let identity_file = cli
            .identity_file
            .or(config.identity_file)
            .map(|path| expand_tilde(&path))
            .ok_or(ConfigError::MissingIdentity)?;
        let connect_timeout = match (cli.timeout, config.timeout) {
            (Some(timeout), _) => timeout,
            (None, Some(timeout)) => parse_duration(&timeout)?,
            (None, None) => DEFAULT_CONNECT_TIMEOUT,
        };

        let credentials = CredentialSet::build(
            &CredentialOptions {
                identity_file,
                password_required: cli.password_required,
                password_auth: cli.password_auth,
            },
            prompt,
        )?;

        let mut tokens = cli.hosts;
        if let Some(path) = cli.hosts_file {
            tokens.extend(read_hosts_file(&expand_tilde(&path))?);
        }
        let default_user = cli
            .user
            .or(config.user)
            .or_else(|| env::var("USER").ok());
        let targets = resolve_targets(&tokens, default_user.as_deref());

        Ok(Self {
            action,
            params: ConnectParams::new(credentials).with_connect_timeout(connect_timeout),
            targets,
        })
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn targets(&self) -> &[HostSpec] {
        &self.targets
    }

    pub fn connect_timeout(&self) -> Duration {
        self.params.connect_timeout
    }

    /// Fan out to every target and wait for all of them.
    pub async fn run<S: SshSession + 'static>(self, printer: Printer) -> RunSummary {
        if self.targets.is_empty() {
            warn!("no hosts given, nothing to do");
        }
        info!(hosts = self.targets.len(), action = %self.action, "dispatching");

        let dispatcher = Dispatcher::<S>::new(self.params, self.action, printer);
        let reports = dispatcher.spawn(self.targets).wait().await;
        RunSummary::from_reports(&reports)
    }
}
