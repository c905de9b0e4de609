use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::action::UploadSpec;
use crate::helper::parse_duration;

#[derive(Parser, Debug, Default)]
#[command(
    name = "ssh-fanout",
    version,
    about = "Run one command or upload one file on many hosts at once"
)]
pub struct Cli {
    /// Remote command (default: `w`)
    #[arg(short = 'c', long, value_name = "CMD")]
    pub command: Option<String>,

    /// Upload a local file to every host
    #[arg(long, value_name = "SRC:DST")]
    pub upload: Option<UploadSpec>,

    /// Default remote user for hosts without `user@`
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Private key path
    #[arg(short = 'i', long, value_name = "PATH")]
    pub identity_file: Option<PathBuf>,

    /// The private key is passphrase protected
    #[arg(short = 'p', long)]
    pub password_required: bool,

    /// Also authenticate with a login password
    #[arg(long)]
    pub password_auth: bool,

    /// Connect timeout, e.g. `10s`, `1m30s`; `0` waits forever
    #[arg(short = 't', long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Read additional hosts from a file, one per line
    #[arg(short = 'f', long, value_name = "PATH")]
    pub hosts_file: Option<PathBuf>,

    /// Defaults file [default: ~/.config/ssh-fanout/config.toml]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v, -vv)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Hosts as `[user@]host[:port]`
    #[arg(value_name = "HOST")]
    pub hosts: Vec<String>,
}
