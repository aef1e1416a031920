//! User-facing connection configuration

use super::callbacks::{
    self, describe, CredentialsProvider, Dialer, OnConnect, Stream,
};
use super::{Credentials, Network, ProtocolVersion, TlsConfig};
use crate::client::ClientOptions;
use crate::duration::SignedDuration;
use crate::limiter::Limiter;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Connection configuration
///
/// Holds every setting a client needs to reach the server, authenticate, and
/// size its connection pool. Zero values mean "not specified": the pool that
/// consumes the translated [`ClientOptions`] picks its own default for them.
///
/// Use [`ConnectionConfig::builder()`] to set fields fluently, or start from
/// [`Default`] and assign fields directly.
#[derive(Clone, Default)]
pub struct ConnectionConfig {
    /// Network kind; `None` lets the pool choose (TCP).
    pub network: Option<Network>,
    /// `host:port`, or a socket path for [`Network::Unix`]
    pub addr: String,
    /// Name announced with `CLIENT SETNAME` on every connection
    pub client_name: String,
    /// Custom dialer; takes priority over `network` and `addr`
    pub dialer: Option<Dialer>,
    /// Hook run once per new connection
    pub on_connect: Option<OnConnect>,
    /// RESP version to negotiate; `None` lets the pool choose (RESP3)
    pub protocol: Option<ProtocolVersion>,
    /// ACL username
    pub username: String,
    /// Password (`requirepass` or ACL user password)
    pub password: String,
    /// Supplies rotating credentials before each (re)connect
    pub credentials_provider: Option<CredentialsProvider>,
    /// Database selected after connecting
    pub db: u32,

    /// Maximum retries before giving up; `-1` disables retries, `0` is the default (3)
    pub max_retries: i32,
    /// Minimum backoff between retries; `-1` disables backoff
    pub min_retry_backoff: SignedDuration,
    /// Maximum backoff between retries; `-1` disables backoff
    pub max_retry_backoff: SignedDuration,

    /// Timeout for establishing new connections
    pub dial_timeout: SignedDuration,
    /// Socket read timeout: `0` default, `-1` block, `-2` no deadline calls
    pub read_timeout: SignedDuration,
    /// Socket write timeout: `0` default, `-1` block, `-2` no deadline calls
    pub write_timeout: SignedDuration,
    /// Honor caller deadlines/cancellation in addition to the timeouts above
    pub context_timeout_enabled: bool,

    /// FIFO (`true`) or LIFO (`false`) reuse of idle connections
    pub pool_fifo: bool,
    /// Base number of connections
    pub pool_size: usize,
    /// How long to wait for a connection when all are busy
    pub pool_timeout: SignedDuration,
    /// Idle connections kept open
    pub min_idle_conns: usize,
    /// Idle connections retained at most
    pub max_idle_conns: usize,
    /// Connections allocated at once; `0` is unbounded
    pub max_active_conns: usize,
    /// Idle time after which a connection is closed lazily; `-1` disables
    pub conn_max_idle_time: SignedDuration,
    /// Age after which a connection is closed lazily; `<= 0` disables
    pub conn_max_lifetime: SignedDuration,

    /// TLS settings; presence enables TLS
    pub tls_config: Option<TlsConfig>,
    /// Rate limiter or circuit breaker
    pub limiter: Option<Arc<dyn Limiter>>,

    /// Route read-only commands to replicas
    pub(crate) read_only: bool,

    /// Skip `CLIENT SETINFO` on connect
    pub disable_identity: bool,
}

impl ConnectionConfig {
    /// Create a configuration for `addr` with every other field unset.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Self::default()
        }
    }

    /// Create a builder
    ///
    /// # Examples
    ///
    /// ```
    /// use kv_options::{ConnectionConfig, SignedDuration};
    ///
    /// let config = ConnectionConfig::builder()
    ///     .addr("cache:6379")
    ///     .password("secret")
    ///     .read_timeout(SignedDuration::NO_DEADLINE)
    ///     .pool_size(32)
    ///     .build();
    /// assert_eq!(config.pool_size, 32);
    /// ```
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::default()
    }

    /// Translate into the options consumed by the client/pool.
    pub fn into_client_options(self) -> ClientOptions {
        crate::client::translate(self)
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("network", &self.network)
            .field("addr", &self.addr)
            .field("client_name", &self.client_name)
            .field("dialer", &describe(&self.dialer))
            .field("on_connect", &describe(&self.on_connect))
            .field("protocol", &self.protocol)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field(
                "credentials_provider",
                &describe(&self.credentials_provider),
            )
            .field("db", &self.db)
            .field("max_retries", &self.max_retries)
            .field("min_retry_backoff", &self.min_retry_backoff)
            .field("max_retry_backoff", &self.max_retry_backoff)
            .field("dial_timeout", &self.dial_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("write_timeout", &self.write_timeout)
            .field("context_timeout_enabled", &self.context_timeout_enabled)
            .field("pool_fifo", &self.pool_fifo)
            .field("pool_size", &self.pool_size)
            .field("pool_timeout", &self.pool_timeout)
            .field("min_idle_conns", &self.min_idle_conns)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("max_active_conns", &self.max_active_conns)
            .field("conn_max_idle_time", &self.conn_max_idle_time)
            .field("conn_max_lifetime", &self.conn_max_lifetime)
            .field("tls_config", &self.tls_config)
            .field("limiter", &describe(&self.limiter))
            .field("read_only", &self.read_only)
            .field("disable_identity", &self.disable_identity)
            .finish()
    }
}

pub(crate) fn redact(password: &str) -> &'static str {
    if password.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

/// Builder for [`ConnectionConfig`]
///
/// Every setter stores its argument verbatim; nothing is validated or defaulted.
#[derive(Debug, Clone, Default)]
pub struct ConnectionConfigBuilder {
    config: ConnectionConfig,
}

impl ConnectionConfigBuilder {
    /// Set the network kind
    pub fn network(mut self, network: Network) -> Self {
        self.config.network = Some(network);
        self
    }

    /// Set the address (`host:port` or socket path)
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.config.addr = addr.into();
        self
    }

    /// Set the client name
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.config.client_name = name.into();
        self
    }

    /// Set a custom dialer
    ///
    /// The closure receives the network kind and address and returns a boxed
    /// future resolving to the connected stream.
    pub fn dialer<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(Network, &'a str) -> BoxFuture<'a, std::io::Result<Stream>>
            + Send
            + Sync
            + 'static,
    {
        self.config.dialer = Some(callbacks::dialer(f));
        self
    }

    /// Set the on-connect hook
    pub fn on_connect<F>(mut self, f: F) -> Self
    where
        F: for<'c> Fn(&'c mut Stream) -> BoxFuture<'c, crate::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.config.on_connect = Some(callbacks::on_connect(f));
        self
    }

    /// Set the RESP protocol version
    pub fn protocol(mut self, protocol: ProtocolVersion) -> Self {
        self.config.protocol = Some(protocol);
        self
    }

    /// Set the ACL username
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    /// Set the password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    /// Set a credentials provider
    pub fn credentials_provider<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Credentials + Send + Sync + 'static,
    {
        self.config.credentials_provider = Some(callbacks::credentials_provider(f));
        self
    }

    /// Set the database index
    pub fn db(mut self, db: u32) -> Self {
        self.config.db = db;
        self
    }

    /// Set the maximum number of retries (`-1` disables)
    pub fn max_retries(mut self, retries: i32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the minimum retry backoff
    pub fn min_retry_backoff(mut self, backoff: impl Into<SignedDuration>) -> Self {
        self.config.min_retry_backoff = backoff.into();
        self
    }

    /// Set the maximum retry backoff
    pub fn max_retry_backoff(mut self, backoff: impl Into<SignedDuration>) -> Self {
        self.config.max_retry_backoff = backoff.into();
        self
    }

    /// Set the dial timeout
    pub fn dial_timeout(mut self, timeout: impl Into<SignedDuration>) -> Self {
        self.config.dial_timeout = timeout.into();
        self
    }

    /// Set the read timeout
    pub fn read_timeout(mut self, timeout: impl Into<SignedDuration>) -> Self {
        self.config.read_timeout = timeout.into();
        self
    }

    /// Set the write timeout
    pub fn write_timeout(mut self, timeout: impl Into<SignedDuration>) -> Self {
        self.config.write_timeout = timeout.into();
        self
    }

    /// Honor caller deadlines and cancellation
    pub fn context_timeout_enabled(mut self, enabled: bool) -> Self {
        self.config.context_timeout_enabled = enabled;
        self
    }

    /// Use FIFO instead of LIFO reuse of idle connections
    pub fn pool_fifo(mut self, fifo: bool) -> Self {
        self.config.pool_fifo = fifo;
        self
    }

    /// Set the base pool size
    pub fn pool_size(mut self, size: usize) -> Self {
        self.config.pool_size = size;
        self
    }

    /// Set the pool wait timeout
    pub fn pool_timeout(mut self, timeout: impl Into<SignedDuration>) -> Self {
        self.config.pool_timeout = timeout.into();
        self
    }

    /// Set the minimum number of idle connections
    pub fn min_idle_conns(mut self, n: usize) -> Self {
        self.config.min_idle_conns = n;
        self
    }

    /// Set the maximum number of idle connections
    pub fn max_idle_conns(mut self, n: usize) -> Self {
        self.config.max_idle_conns = n;
        self
    }

    /// Set the maximum number of active connections (`0` = unbounded)
    pub fn max_active_conns(mut self, n: usize) -> Self {
        self.config.max_active_conns = n;
        self
    }

    /// Set the maximum idle time (`-1` disables)
    pub fn conn_max_idle_time(mut self, d: impl Into<SignedDuration>) -> Self {
        self.config.conn_max_idle_time = d.into();
        self
    }

    /// Set the maximum connection lifetime (`<= 0` disables)
    pub fn conn_max_lifetime(mut self, d: impl Into<SignedDuration>) -> Self {
        self.config.conn_max_lifetime = d.into();
        self
    }

    /// Enable TLS with the given configuration
    pub fn tls_config(mut self, tls: TlsConfig) -> Self {
        self.config.tls_config = Some(tls);
        self
    }

    /// Set the limiter
    pub fn limiter(mut self, limiter: Arc<dyn Limiter>) -> Self {
        self.config.limiter = Some(limiter);
        self
    }

    /// Skip the `CLIENT SETINFO` identification step
    pub fn disable_identity(mut self, disable: bool) -> Self {
        self.config.disable_identity = disable;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ConnectionConfig {
        self.config
    }
}
