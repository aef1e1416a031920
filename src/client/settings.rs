//! Serializable connection settings
//!
//! Plain-data mirror of [`ConnectionConfig`] for settings files and URL
//! parsing. Callbacks and the limiter cannot be expressed here; attach them to
//! the resulting config afterwards.

use crate::connection::{ConnectionConfig, Network, ProtocolVersion, TlsConfig};
use crate::duration::SignedDuration;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Connection settings as read from a file.
///
/// Durations are strings (`"500ms"`, `"5s"`) or integers (seconds, or raw
/// negative sentinels). Omitted keys stay unset.
///
/// ```
/// use kv_options::ConnectionSettings;
///
/// let settings = ConnectionSettings::from_json_str(r#"{
///     "addr": "cache:6379",
///     "read_timeout": "-2",
///     "pool_size": 16
/// }"#)?;
/// let config = settings.into_config()?;
/// assert_eq!(config.pool_size, 16);
/// # Ok::<(), kv_options::Error>(())
/// ```
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionSettings {
    /// Network kind
    pub network: Option<Network>,
    /// Address
    pub addr: String,
    /// Client name
    pub client_name: String,
    /// RESP version
    pub protocol: Option<ProtocolVersion>,
    /// ACL username
    pub username: String,
    /// Password
    pub password: String,
    /// Database index
    pub db: u32,
    /// Maximum retries (`-1` disables)
    pub max_retries: i32,
    /// Minimum retry backoff
    pub min_retry_backoff: SignedDuration,
    /// Maximum retry backoff
    pub max_retry_backoff: SignedDuration,
    /// Dial timeout
    pub dial_timeout: SignedDuration,
    /// Read timeout
    pub read_timeout: SignedDuration,
    /// Write timeout
    pub write_timeout: SignedDuration,
    /// Honor caller deadlines
    pub context_timeout_enabled: bool,
    /// FIFO pool
    pub pool_fifo: bool,
    /// Base pool size
    pub pool_size: usize,
    /// Pool wait timeout
    pub pool_timeout: SignedDuration,
    /// Minimum idle connections
    pub min_idle_conns: usize,
    /// Maximum idle connections
    pub max_idle_conns: usize,
    /// Maximum active connections
    pub max_active_conns: usize,
    /// Maximum idle time
    pub conn_max_idle_time: SignedDuration,
    /// Maximum lifetime
    pub conn_max_lifetime: SignedDuration,
    /// Skip `CLIENT SETINFO`
    pub disable_identity: bool,
    /// TLS; presence enables it
    pub tls: Option<TlsSettings>,
}

/// TLS section of [`ConnectionSettings`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TlsSettings {
    /// PEM file with CA certificates
    pub ca_cert_path: Option<String>,
    /// SNI / verification name
    pub server_name: Option<String>,
    /// Use bundled roots instead of the system store
    pub use_webpki_roots: bool,
    /// Skip certificate verification (development only)
    pub insecure_skip_verify: bool,
}

impl TlsSettings {
    /// Build the TLS configuration
    pub fn build(&self) -> Result<TlsConfig> {
        let mut builder = TlsConfig::builder()
            .use_webpki_roots(self.use_webpki_roots)
            .danger_accept_invalid_certs(self.insecure_skip_verify);
        if let Some(path) = &self.ca_cert_path {
            builder = builder.ca_cert_path(path);
        }
        if let Some(name) = &self.server_name {
            builder = builder.server_name(name);
        }
        builder.build()
    }
}

impl ConnectionSettings {
    /// Parse settings from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        tracing::debug!(addr = %settings.addr, "loaded connection settings");
        Ok(settings)
    }

    /// Read settings from a JSON file
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Convert into a [`ConnectionConfig`], building the TLS configuration if present.
    pub fn into_config(self) -> Result<ConnectionConfig> {
        let tls_config = self.tls.as_ref().map(TlsSettings::build).transpose()?;

        Ok(ConnectionConfig {
            network: self.network,
            addr: self.addr,
            client_name: self.client_name,
            protocol: self.protocol,
            username: self.username,
            password: self.password,
            db: self.db,
            max_retries: self.max_retries,
            min_retry_backoff: self.min_retry_backoff,
            max_retry_backoff: self.max_retry_backoff,
            dial_timeout: self.dial_timeout,
            read_timeout: self.read_timeout,
            write_timeout: self.write_timeout,
            context_timeout_enabled: self.context_timeout_enabled,
            pool_fifo: self.pool_fifo,
            pool_size: self.pool_size,
            pool_timeout: self.pool_timeout,
            min_idle_conns: self.min_idle_conns,
            max_idle_conns: self.max_idle_conns,
            max_active_conns: self.max_active_conns,
            conn_max_idle_time: self.conn_max_idle_time,
            conn_max_lifetime: self.conn_max_lifetime,
            disable_identity: self.disable_identity,
            tls_config,
            ..ConnectionConfig::default()
        })
    }
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("network", &self.network)
            .field("addr", &self.addr)
            .field("username", &self.username)
            .field("password", &crate::connection::redact(&self.password))
            .field("db", &self.db)
            .field("tls", &self.tls)
            .finish_non_exhaustive()
    }
}
