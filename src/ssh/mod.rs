pub mod common;
pub mod credentials;
pub mod host_key;
pub mod key_session;
pub mod ssh_session;
