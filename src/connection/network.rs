//! Network kind and protocol version selectors

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// How connections are physically created when no dialer is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// TCP stream (`host:port`)
    Tcp,
    /// Unix domain socket (filesystem path)
    Unix,
}

impl Network {
    /// Name as used in addresses and URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Unix => "unix",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tcp" => Ok(Self::Tcp),
            "unix" => Ok(Self::Unix),
            _ => Err(Error::config(format!(
                "invalid network '{}': expected tcp or unix",
                s
            ))),
        }
    }
}

/// RESP protocol version negotiated with the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ProtocolVersion {
    /// RESP2
    Resp2,
    /// RESP3 (`HELLO 3`)
    Resp3,
}

impl ProtocolVersion {
    /// Numeric version
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Resp2 => 2,
            Self::Resp3 => 3,
        }
    }
}

impl From<ProtocolVersion> for u8 {
    fn from(v: ProtocolVersion) -> u8 {
        v.as_u8()
    }
}

impl TryFrom<u8> for ProtocolVersion {
    type Error = Error;

    fn try_from(v: u8) -> Result<Self> {
        match v {
            2 => Ok(Self::Resp2),
            3 => Ok(Self::Resp3),
            _ => Err(Error::config(format!(
                "invalid protocol {}: expected 2 or 3",
                v
            ))),
        }
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl std::str::FromStr for ProtocolVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let v: u8 = s
            .parse()
            .map_err(|_| Error::config(format!("invalid protocol '{}': expected 2 or 3", s)))?;
        Self::try_from(v)
    }
}
