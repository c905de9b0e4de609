use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use russh_keys::decode_secret_key;
use russh_keys::key::KeyPair;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::error::ConfigError;

pub static PASSPHRASE_PROMPT: &str = "Enter SSH password: ";
pub static LOGIN_PASSWORD_PROMPT: &str = "Enter login password: ";

pub enum AuthMethod {
    PublicKey(Arc<KeyPair>),
    Password(Zeroizing<String>),
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::PublicKey(_) => f.write_str("PublicKey(..)"),
            AuthMethod::Password(_) => f.write_str("Password(..)"),
        }
    }
}

/// What the user asked for on the command line.
#[derive(Debug, Clone, Default)]
pub struct CredentialOptions {
    pub identity_file: PathBuf,
    /// The key may be passphrase protected; prompt if it does not parse as is.
    pub password_required: bool,
    /// Also offer a login password to the server.
    pub password_auth: bool,
}

/// Authentication methods tried in order against every host.
#[derive(Debug, Default)]
pub struct CredentialSet {
    methods: Vec<AuthMethod>,
}

impl CredentialSet {
    /**
        load the identity file and prompt for secrets as needed;
        `prompt` must read a line with echo disabled
    */
    pub fn build<P>(options: &CredentialOptions, mut prompt: P) -> Result<Self, ConfigError>
    where
        P: FnMut(&str) -> io::Result<String>,
    {
        let path = &options.identity_file;
        let key = fs::read_to_string(path).map_err(|source| ConfigError::UnreadableKey {
            path: path.clone(),
            source,
        })?;

        let mut methods = Vec::new();
        match decode_secret_key(&key, None) {
            Ok(key_pair) => {
                debug!("loaded private key {:?}", path);
                methods.push(AuthMethod::PublicKey(Arc::new(key_pair)));
            }
            Err(err) if options.password_required => {
                debug!("{:?}: {err}, retrying with passphrase", path);
                let passphrase = Zeroizing::new(
                    prompt(PASSPHRASE_PROMPT).map_err(ConfigError::PasswordPrompt)?,
                );
                let key_pair = decode_secret_key(&key, Some(passphrase.as_str())).map_err(
                    |err| ConfigError::UnparsableKey {
                        path: path.clone(),
                        reason: err.to_string(),
                    },
                )?;
                methods.push(AuthMethod::PublicKey(Arc::new(key_pair)));
            }
            Err(err) => warn!("{:?}: {err}", path),
        }

        if options.password_auth {
            let password = Zeroizing::new(
                prompt(LOGIN_PASSWORD_PROMPT).map_err(ConfigError::PasswordPrompt)?,
            );
            methods.push(AuthMethod::Password(password));
        }

        if methods.is_empty() {
            return Err(ConfigError::NoAuthMethods);
        }
        Ok(Self { methods })
    }

    pub fn from_methods(methods: Vec<AuthMethod>) -> Self {
        Self { methods }
    }

    pub fn methods(&self) -> &[AuthMethod] {
        &self.methods
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
