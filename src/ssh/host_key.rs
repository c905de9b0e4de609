use std::collections::HashMap;

use crate::host_spec::HostSpec;

/// Decides whether a server's host key is acceptable.
pub trait HostKeyPolicy: Send + Sync {
    fn verify(&self, target: &HostSpec, algorithm: &str, fingerprint: &str) -> bool;
}

/// Trust whatever key the server presents. This is the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl HostKeyPolicy for AcceptAll {
    fn verify(&self, _target: &HostSpec, _algorithm: &str, _fingerprint: &str) -> bool {
        true
    }
}

/// Only accept hosts whose key fingerprint was pinned up front,
/// keyed by the `host:port` label.
#[derive(Debug, Default, Clone)]
pub struct PinnedFingerprints {
    pins: HashMap<String, String>,
}

impl PinnedFingerprints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pin(mut self, target: &HostSpec, fingerprint: impl Into<String>) -> Self {
        self.pins.insert(target.to_string(), fingerprint.into());
        self
    }
}

impl HostKeyPolicy for PinnedFingerprints {
    fn verify(&self, target: &HostSpec, _algorithm: &str, fingerprint: &str) -> bool {
        self.pins
            .get(&target.to_string())
            .is_some_and(|pinned| pinned == fingerprint)
    }
}
