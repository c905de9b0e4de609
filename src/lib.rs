pub mod action;
pub mod app;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod helper;
pub mod host_spec;
pub mod macros;
pub mod output;
pub mod ssh;
pub mod task;

pub use action::Action;
pub use host_spec::HostSpec;
pub use ssh::key_session::KeySession;
pub use ssh::ssh_session::{ConnectParams, SshSession};
