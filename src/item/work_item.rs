//! Work items and their retry fingerprints

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// A 128-bit digest of a work item's target
///
/// Two work items with the same target share a fingerprint, and therefore share
/// one entry in the retry ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    /// Computes the fingerprint of a target string
    ///
    /// The digest is the leading 16 bytes of the target's SHA-256 hash.
    pub fn of(target: &str) -> Self {
        let digest = Sha256::digest(target.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Self(bytes)
    }

    /// Returns the raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// One unit of pending work
///
/// The target identifies the item. The remaining fields are transport context a
/// downloader may use, and plugins are free to rewrite any of them in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    target: String,

    /// Extra request headers sent with the fetch
    pub headers: BTreeMap<String, String>,

    /// Proxy to route the fetch through, if any
    pub proxy_url: Option<String>,

    /// Number of discovery hops from a seed (seeds are depth 0)
    pub depth: u32,

    /// Ordering key for priority queues (lower values are polled first)
    pub priority: u32,
}

impl WorkItem {
    /// Creates a seed-level work item for the given target
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            headers: BTreeMap::new(),
            proxy_url: None,
            depth: 0,
            priority: 0,
        }
    }

    /// Creates a work item discovered from this one, one hop deeper
    ///
    /// The child inherits the proxy but not the headers; headers are per-fetch
    /// context that pre-fetch plugins fill in again.
    pub fn child(&self, target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            headers: BTreeMap::new(),
            proxy_url: self.proxy_url.clone(),
            depth: self.depth + 1,
            priority: self.priority,
        }
    }

    /// Sets the priority, builder style
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns the fetch target
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Replaces the fetch target
    ///
    /// This also changes the item's fingerprint.
    pub fn retarget(&mut self, target: impl Into<String>) {
        self.target = target.into();
    }

    /// Sets a request header, replacing any previous value
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Returns the retry fingerprint of the current target
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.target)
    }
}
