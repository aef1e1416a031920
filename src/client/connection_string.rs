//! Connection URL parsing
//!
//! Supports formats:
//! * redis://[user[:password]@][host][:port][/db][?options]
//! * rediss://... (same, over TLS)
//! * unix://[user[:password]@]/path/to/socket[?db=N&options]

use super::defaults::DEFAULT_PORT;
use super::settings::{ConnectionSettings, TlsSettings};
use crate::connection::{ConnectionConfig, Network, TlsConfig};
use crate::duration::SignedDuration;
use crate::{Error, Result};
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Parsed connection URL
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Transport type
    pub network: Network,
    /// Host (for TCP)
    pub host: Option<String>,
    /// Port (for TCP)
    pub port: Option<u16>,
    /// Unix socket path
    pub unix_socket: Option<PathBuf>,
    /// `rediss://` scheme
    pub tls: bool,
    /// `skip_verify` query option (TLS only)
    pub skip_verify: bool,
    /// Address, credentials, database and query options
    pub settings: ConnectionSettings,
}

/// Decode `%XX` escapes in a URL component
fn percent_decode(s: &str) -> Result<String> {
    if !s.contains('%') {
        return Ok(s.to_string());
    }

    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s
                .get(i + 1..i + 3)
                .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| Error::config(format!("invalid percent-encoding in {:?}", s)))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| Error::config("percent-encoded value is not UTF-8"))
}

/// Split `user[:password]` into its parts
fn parse_auth(auth: &str) -> Result<(String, String)> {
    match auth.split_once(':') {
        Some((user, pass)) => Ok((percent_decode(user)?, percent_decode(pass)?)),
        None => Ok((percent_decode(auth)?, String::new())),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::config(format!("invalid {} option: {:?}", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "1" | "t" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(Error::config(format!(
            "invalid {} option: {:?}",
            key, value
        ))),
    }
}

fn parse_duration(key: &str, value: &str) -> Result<SignedDuration> {
    value
        .parse()
        .map_err(|e| Error::config(format!("invalid {} option: {}", key, e)))
}

impl ConnectionInfo {
    /// Parse a connection URL
    pub fn parse(s: &str) -> Result<Self> {
        let info = if let Some(rest) = s.strip_prefix("redis://") {
            Self::parse_tcp(rest, false)?
        } else if let Some(rest) = s.strip_prefix("rediss://") {
            Self::parse_tcp(rest, true)?
        } else if let Some(rest) = s.strip_prefix("unix://") {
            Self::parse_unix(rest)?
        } else {
            return Err(Error::config(
                "connection URL must start with redis://, rediss:// or unix://",
            ));
        };

        tracing::debug!(
            network = %info.network,
            addr = %info.settings.addr,
            db = info.settings.db,
            tls = info.tls,
            "parsed connection URL"
        );
        Ok(info)
    }

    fn parse_unix(rest: &str) -> Result<Self> {
        let (rest, query) = rest.split_once('?').unwrap_or((rest, ""));

        // Credentials only precede the path, never appear inside it
        let (auth, path) = match rest.split_once('@') {
            Some((auth, path)) if !auth.contains('/') => (Some(auth), path),
            _ => (None, rest),
        };

        if !path.starts_with('/') || path.len() < 2 {
            return Err(Error::config(format!(
                "unix socket URL needs an absolute path, got {:?}",
                path
            )));
        }
        let path = percent_decode(path)?;

        let mut info = Self {
            network: Network::Unix,
            host: None,
            port: None,
            unix_socket: Some(PathBuf::from(&path)),
            tls: false,
            skip_verify: false,
            settings: ConnectionSettings {
                network: Some(Network::Unix),
                addr: path,
                ..Default::default()
            },
        };
        if let Some(auth) = auth {
            let (username, password) = parse_auth(auth)?;
            info.settings.username = username;
            info.settings.password = password;
        }
        info.apply_query(query)?;
        Ok(info)
    }

    fn parse_tcp(rest: &str, tls: bool) -> Result<Self> {
        let (rest, query) = rest.split_once('?').unwrap_or((rest, ""));

        // Passwords may contain '@'; the host never does
        let (auth, rest) = match rest.rfind('@') {
            Some(pos) => (Some(&rest[..pos]), &rest[pos + 1..]),
            None => (None, rest),
        };

        let (host_port, db) = match rest.split_once('/') {
            Some((hp, db)) => (hp, db.trim_end_matches('/')),
            None => (rest, ""),
        };

        let db = if db.is_empty() {
            0
        } else {
            db.parse()
                .map_err(|_| Error::config(format!("invalid database number: {:?}", db)))?
        };

        let (host, port) = Self::split_host_port(host_port)?;
        let addr = if host.contains(':') {
            format!("[{}]:{}", host, port)
        } else {
            format!("{}:{}", host, port)
        };

        let mut info = Self {
            network: Network::Tcp,
            host: Some(host),
            port: Some(port),
            unix_socket: None,
            tls,
            skip_verify: false,
            settings: ConnectionSettings {
                network: Some(Network::Tcp),
                addr,
                db,
                ..Default::default()
            },
        };
        if let Some(auth) = auth {
            let (username, password) = parse_auth(auth)?;
            info.settings.username = username;
            info.settings.password = password;
        }
        info.apply_query(query)?;
        Ok(info)
    }

    /// `host[:port]` or `[v6]:port`; an empty host means localhost.
    fn split_host_port(host_port: &str) -> Result<(String, u16)> {
        let (host, port) = if let Some(v6) = host_port.strip_prefix('[') {
            let (host, tail) = v6
                .split_once(']')
                .ok_or_else(|| Error::config("unterminated IPv6 address"))?;
            let port = match tail {
                "" => None,
                p => Some(
                    p.strip_prefix(':')
                        .ok_or_else(|| Error::config("invalid port"))?,
                ),
            };
            (host, port)
        } else {
            match host_port.split_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (host_port, None),
            }
        };

        let port = match port {
            Some(p) => p
                .parse()
                .map_err(|_| Error::config(format!("invalid port: {:?}", p)))?,
            None => DEFAULT_PORT,
        };
        let host = if host.is_empty() { "localhost" } else { host };
        Ok((host.to_string(), port))
    }

    fn apply_query(&mut self, query: &str) -> Result<()> {
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = percent_decode(value)?;
            let value = value.as_str();
            let settings = &mut self.settings;

            match key {
                "db" if self.network == Network::Unix => settings.db = parse_value(key, value)?,
                "protocol" => settings.protocol = Some(parse_value(key, value)?),
                "client_name" => settings.client_name = value.to_string(),
                "max_retries" => settings.max_retries = parse_value(key, value)?,
                "min_retry_backoff" => settings.min_retry_backoff = parse_duration(key, value)?,
                "max_retry_backoff" => settings.max_retry_backoff = parse_duration(key, value)?,
                "dial_timeout" => settings.dial_timeout = parse_duration(key, value)?,
                "read_timeout" => settings.read_timeout = parse_duration(key, value)?,
                "write_timeout" => settings.write_timeout = parse_duration(key, value)?,
                "pool_fifo" => settings.pool_fifo = parse_bool(key, value)?,
                "pool_size" => settings.pool_size = parse_value(key, value)?,
                "pool_timeout" => settings.pool_timeout = parse_duration(key, value)?,
                "min_idle_conns" => settings.min_idle_conns = parse_value(key, value)?,
                "max_idle_conns" => settings.max_idle_conns = parse_value(key, value)?,
                "max_active_conns" => settings.max_active_conns = parse_value(key, value)?,
                "conn_max_idle_time" | "idle_timeout" => {
                    settings.conn_max_idle_time = parse_duration(key, value)?
                }
                "conn_max_lifetime" | "max_conn_age" => {
                    settings.conn_max_lifetime = parse_duration(key, value)?
                }
                "skip_verify" if self.tls => self.skip_verify = parse_bool(key, value)?,
                _ => {
                    return Err(Error::config(format!(
                        "unexpected option in connection URL: {}",
                        key
                    )))
                }
            }
        }
        Ok(())
    }

    /// Build a `TlsConfig` for `rediss://` URLs.
    ///
    /// Returns `None` for plain TCP and Unix sockets. Verification uses the
    /// bundled webpki roots; the host becomes the server name unless it is an
    /// IP literal.
    pub fn to_tls_config(&self) -> Result<Option<TlsConfig>> {
        if !self.tls {
            return Ok(None);
        }

        let server_name = self
            .host
            .as_ref()
            .filter(|h| h.parse::<IpAddr>().is_err())
            .cloned();
        let settings = TlsSettings {
            server_name,
            use_webpki_roots: true,
            insecure_skip_verify: self.skip_verify,
            ..Default::default()
        };
        Ok(Some(settings.build()?))
    }

    /// Convert to ConnectionConfig
    pub fn to_config(&self) -> Result<ConnectionConfig> {
        let mut config = self.settings.clone().into_config()?;
        config.tls_config = self.to_tls_config()?;
        Ok(config)
    }
}

impl FromStr for ConnectionInfo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
