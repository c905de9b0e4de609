use std::fmt;
use std::fs;
use std::net::Ipv6Addr;
use std::path::Path;

use tracing::warn;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 22;

/// A fully resolved connection target. Every host task owns its own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSpec {
    pub user: Option<String>,
    pub host: String,
    pub port: u16,
}

impl HostSpec {
    /**
        parse `[user@]host[:port]`, falling back to `default_user`
        when the token carries no user of its own
    */
    pub fn parse(raw: &str, default_user: Option<&str>) -> Result<Self, ConfigError> {
        let token = raw.trim();
        let invalid = |reason| ConfigError::InvalidHostSpec {
            spec: raw.to_string(),
            reason,
        };

        if token.is_empty() {
            return Err(invalid("empty host specification"));
        }

        let (user, rest) = match token.rsplit_once('@') {
            Some(("", _)) => return Err(invalid("empty user before '@'")),
            Some((user, rest)) => (Some(user.to_string()), rest),
            None => (default_user.map(str::to_owned), token),
        };

        let (host, port) = split_host_port(rest).map_err(invalid)?;
        if host.is_empty() {
            return Err(invalid("empty host"));
        }

        Ok(Self {
            user,
            host: host.to_string(),
            port,
        })
    }
}

fn split_host_port(rest: &str) -> Result<(&str, u16), &'static str> {
    if let Some(bracketed) = rest.strip_prefix('[') {
        let (host, tail) = bracketed
            .split_once(']')
            .ok_or("unterminated '[' in address")?;
        return match tail {
            "" => Ok((host, DEFAULT_PORT)),
            _ => {
                let port = tail.strip_prefix(':').ok_or("unexpected text after ']'")?;
                Ok((host, parse_port(port)?))
            }
        };
    }

    match rest.rsplit_once(':') {
        // bare IPv6 literal without brackets, e.g. `::1`
        Some((host, _)) if host.contains(':') => match rest.parse::<Ipv6Addr>() {
            Ok(_) => Ok((rest, DEFAULT_PORT)),
            Err(_) => Err("IPv6 addresses need brackets to carry a port"),
        },
        Some((host, port)) => Ok((host, parse_port(port)?)),
        None => Ok((rest, DEFAULT_PORT)),
    }
}

fn parse_port(port: &str) -> Result<u16, &'static str> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err("port must be a number between 1 and 65535"),
        Ok(port) => Ok(port),
    }
}

impl fmt::Display for HostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/**
    read newline-delimited host tokens, skipping blank lines and `#` comments
*/
pub fn read_hosts_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::HostsFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect())
}

/// Parse every token; invalid ones are reported and dropped.
pub fn resolve_targets<I, S>(tokens: I, default_user: Option<&str>) -> Vec<HostSpec>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .filter_map(|token| match HostSpec::parse(token.as_ref(), default_user) {
            Ok(spec) => Some(spec),
            Err(err) => {
                warn!("skipping host: {err}");
                None
            }
        })
        .collect()
}
