use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::error::ConfigError;

pub static CONFIG_FILE: &str = "config.toml";

pub fn get_file_path(file_name: &str) -> Result<PathBuf> {
    let mut config_dir = dirs::home_dir().context("Unable to reach user's home directory.")?;
    config_dir.push(".config/ssh-fanout");
    config_dir.push(file_name);
    Ok(config_dir)
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/**
    parse durations such as `300ms`, `10s`, `1m30s` or `1.5h`
    (units: ns, us, µs, ms, s, m, h)
*/
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration(value.to_string());
    let mut rest = value.trim();
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total = 0f64;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(invalid)?;
        let number: f64 = rest[..number_len].parse().map_err(|_| invalid())?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ns" => 1e0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(invalid()),
        };
        rest = &rest[unit_len..];
        total += number * nanos_per_unit;
    }

    Ok(Duration::from_nanos(total as u64))
}

/// Render elapsed time truncated to 100ms, e.g. `0s`, `300ms`, `1.2s`, `1m5s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let tenths = elapsed.as_millis() / 100;
    if tenths == 0 {
        return "0s".to_string();
    }
    if tenths < 10 {
        return format!("{}ms", tenths * 100);
    }

    let total_secs = tenths / 10;
    let seconds = match tenths % 10 {
        0 => format!("{}s", total_secs % 60),
        frac => format!("{}.{}s", total_secs % 60, frac),
    };
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}")
    } else {
        seconds
    }
}
