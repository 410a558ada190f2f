//! Provider-facing types and error definitions.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A provider datacenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Iad,
    Dfw,
    Ord,
    Syd,
    Hkg,
    Lon,
}

impl Region {
    /// Every region the provider is known to serve.
    pub const ALL: [Region; 6] = [
        Region::Iad,
        Region::Dfw,
        Region::Ord,
        Region::Syd,
        Region::Hkg,
        Region::Lon,
    ];

    /// Regions enumerated when the configuration does not say otherwise.
    pub const DEFAULT_SET: [Region; 5] = [
        Region::Iad,
        Region::Dfw,
        Region::Ord,
        Region::Syd,
        Region::Hkg,
    ];

    /// Lowercase region code (e.g. "dfw").
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Iad => "iad",
            Region::Dfw => "dfw",
            Region::Ord => "ord",
            Region::Syd => "syd",
            Region::Hkg => "hkg",
            Region::Lon => "lon",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a region code is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown region '{0}' (expected one of iad, dfw, ord, syd, hkg, lon)")]
pub struct ParseRegionError(pub String);

impl FromStr for Region {
    type Err = ParseRegionError;

    /// Region codes are matched case-insensitively; the identity catalog
    /// reports them uppercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(code))
            .ok_or_else(|| ParseRegionError(s.to_string()))
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

/// A balancer as seen during region enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancerDescriptor {
    /// Provider-assigned identifier, treated as opaque.
    pub id: String,
    pub name: String,
    pub region: Region,
}

/// A balancer fetched by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balancer {
    pub id: String,
    pub name: String,
    pub region: Region,
    /// Provider status, e.g. `ACTIVE` or `PENDING_UPDATE`.
    pub status: String,
}

/// A backend registered in a balancer pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Provider-assigned node identifier, needed to detach.
    pub id: String,
    pub ip: String,
    pub port: u16,
    pub condition: Option<String>,
}

impl Member {
    /// True if this member is the `(ip, port)` backend.
    ///
    /// Addresses compare by value when both sides parse as IP addresses,
    /// so `::1` and `0:0:0:0:0:0:0:1` are the same node.
    pub fn matches(&self, ip: &str, port: u16) -> bool {
        if self.port != port {
            return false;
        }
        if self.ip == ip {
            return true;
        }
        match (self.ip.parse::<IpAddr>(), ip.parse::<IpAddr>()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

/// A backend to be attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub ip: String,
    pub port: u16,
}

/// Errors surfaced by a load balancer provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Credentials or token rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Provider rate limit hit.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Balancer or node missing.
    #[error("not found: {0}")]
    NotFound(String),

    /// The pool changed between the membership check and the mutation.
    #[error("conflicting change on load balancer {balancer_id}: {message}")]
    Conflict { balancer_id: String, message: String },

    /// Any other non-success status.
    #[error("provider API returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// The service catalog has no load balancer endpoint for the region.
    #[error("no load balancer endpoint for region {0}")]
    RegionUnavailable(Region),

    /// Response body did not have the expected shape.
    #[error("unexpected provider response: {0}")]
    Decode(String),
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
