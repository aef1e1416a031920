//! Options consumed by the client/connection pool

use super::defaults;
use crate::connection::{
    describe, redact, same_arc, Credentials, CredentialsProvider, Dialer, Network, OnConnect,
    ProtocolVersion, TlsConfig,
};
use crate::duration::SignedDuration;
use crate::limiter::Limiter;
use crate::{Error, Result};
use std::sync::Arc;

/// Options in the shape the connection pool expects.
///
/// Produced by [`translate`](super::translate). Field names and meanings match
/// [`ConnectionConfig`](crate::ConnectionConfig) one to one; sentinel values
/// are carried unchanged.
///
/// Equality compares plain fields by value and callbacks, the limiter and the
/// TLS configuration by identity.
#[derive(Clone, Default)]
pub struct ClientOptions {
    /// Network kind
    pub network: Option<Network>,
    /// Address
    pub addr: String,
    /// Client name
    pub client_name: String,
    /// Custom dialer
    pub dialer: Option<Dialer>,
    /// On-connect hook
    pub on_connect: Option<OnConnect>,
    /// RESP version
    pub protocol: Option<ProtocolVersion>,
    /// ACL username
    pub username: String,
    /// Password
    pub password: String,
    /// Credentials provider
    pub credentials_provider: Option<CredentialsProvider>,
    /// Database index
    pub db: u32,
    /// Maximum retries
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
    /// TLS configuration
    pub tls_config: Option<TlsConfig>,
    /// Limiter
    pub limiter: Option<Arc<dyn Limiter>>,
    /// Replica routing; internal to cluster clients
    pub(crate) read_only: bool,
    /// Skip `CLIENT SETINFO`
    pub disable_identity: bool,
}

impl ClientOptions {
    /// Fill unset fields with the pool's defaults.
    ///
    /// Only zero values and `None`s are replaced; sentinels such as `-1` and
    /// `-2` are kept as they are.
    pub fn with_defaults(mut self) -> Self {
        let network = *self.network.get_or_insert(Network::Tcp);
        if self.addr.is_empty() {
            self.addr = match network {
                Network::Tcp => defaults::DEFAULT_ADDR,
                Network::Unix => defaults::DEFAULT_UNIX_ADDR,
            }
            .to_string();
        }
        self.protocol.get_or_insert(defaults::DEFAULT_PROTOCOL);

        if self.max_retries == 0 {
            self.max_retries = defaults::DEFAULT_MAX_RETRIES;
        }
        if self.min_retry_backoff.is_zero() {
            self.min_retry_backoff = defaults::DEFAULT_MIN_RETRY_BACKOFF;
        }
        if self.max_retry_backoff.is_zero() {
            self.max_retry_backoff = defaults::DEFAULT_MAX_RETRY_BACKOFF;
        }

        if self.dial_timeout.is_zero() {
            self.dial_timeout = defaults::DEFAULT_DIAL_TIMEOUT;
        }
        if self.read_timeout.is_zero() {
            self.read_timeout = defaults::DEFAULT_READ_TIMEOUT;
        }
        if self.write_timeout.is_zero() {
            self.write_timeout = self.read_timeout;
        }

        if self.pool_size == 0 {
            self.pool_size = defaults::default_pool_size();
        }
        if self.pool_timeout.is_zero() {
            self.pool_timeout = if self.read_timeout.is_positive() {
                self.read_timeout.saturating_add(defaults::POOL_TIMEOUT_GRACE)
            } else {
                defaults::DEFAULT_POOL_TIMEOUT_FALLBACK
            };
        }
        if self.conn_max_idle_time.is_zero() {
            self.conn_max_idle_time = defaults::DEFAULT_CONN_MAX_IDLE_TIME;
        }

        tracing::debug!(
            addr = %self.addr,
            pool_size = self.pool_size,
            pool_timeout = %self.pool_timeout,
            "applied pool defaults"
        );
        self
    }

    /// Reject combinations the pool cannot honor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if:
    /// - `max_retries` is below `-1`
    /// - `min_idle_conns` or `max_idle_conns` exceeds a nonzero `max_active_conns`
    /// - both retry backoffs are positive and the minimum exceeds the maximum
    pub fn validate(&self) -> Result<()> {
        if self.max_retries < -1 {
            return Err(Error::config(format!(
                "max_retries {} is invalid: use -1 to disable retries",
                self.max_retries
            )));
        }

        if self.max_active_conns > 0 {
            if self.min_idle_conns > self.max_active_conns {
                return Err(Error::config(format!(
                    "min_idle_conns ({}) exceeds max_active_conns ({})",
                    self.min_idle_conns, self.max_active_conns
                )));
            }
            if self.max_idle_conns > self.max_active_conns {
                return Err(Error::config(format!(
                    "max_idle_conns ({}) exceeds max_active_conns ({})",
                    self.max_idle_conns, self.max_active_conns
                )));
            }
        }

        if self.min_retry_backoff.is_positive()
            && self.max_retry_backoff.is_positive()
            && self.min_retry_backoff > self.max_retry_backoff
        {
            return Err(Error::config(format!(
                "min_retry_backoff ({}) exceeds max_retry_backoff ({})",
                self.min_retry_backoff, self.max_retry_backoff
            )));
        }

        Ok(())
    }

    /// Credentials to authenticate a new connection with.
    ///
    /// The provider, when set, wins over the static username/password.
    pub fn current_credentials(&self) -> Credentials {
        match &self.credentials_provider {
            Some(provider) => provider(),
            None => Credentials::new(self.username.clone(), self.password.clone()),
        }
    }

    /// Whether connections will be encrypted
    pub fn uses_tls(&self) -> bool {
        self.tls_config.is_some()
    }

    /// Whether read-only commands may be routed to replicas
    pub fn read_only(&self) -> bool {
        self.read_only
    }
}

impl PartialEq for ClientOptions {
    fn eq(&self, other: &Self) -> bool {
        let same_tls = match (&self.tls_config, &other.tls_config) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            (None, None) => true,
            _ => false,
        };

        self.network == other.network
            && self.addr == other.addr
            && self.client_name == other.client_name
            && same_arc(&self.dialer, &other.dialer)
            && same_arc(&self.on_connect, &other.on_connect)
            && self.protocol == other.protocol
            && self.username == other.username
            && self.password == other.password
            && same_arc(&self.credentials_provider, &other.credentials_provider)
            && self.db == other.db
            && self.max_retries == other.max_retries
            && self.min_retry_backoff == other.min_retry_backoff
            && self.max_retry_backoff == other.max_retry_backoff
            && self.dial_timeout == other.dial_timeout
            && self.read_timeout == other.read_timeout
            && self.write_timeout == other.write_timeout
            && self.context_timeout_enabled == other.context_timeout_enabled
            && self.pool_fifo == other.pool_fifo
            && self.pool_size == other.pool_size
            && self.pool_timeout == other.pool_timeout
            && self.min_idle_conns == other.min_idle_conns
            && self.max_idle_conns == other.max_idle_conns
            && self.max_active_conns == other.max_active_conns
            && self.conn_max_idle_time == other.conn_max_idle_time
            && self.conn_max_lifetime == other.conn_max_lifetime
            && same_tls
            && same_arc(&self.limiter, &other.limiter)
            && self.read_only == other.read_only
            && self.disable_identity == other.disable_identity
    }
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::credentials_provider;
    use std::time::Duration;

    #[test]
    fn test_with_defaults_fills_unset_fields() {
        let options = ClientOptions::default().with_defaults();

        assert_eq!(options.network, Some(Network::Tcp));
        assert_eq!(options.addr, defaults::DEFAULT_ADDR);
        assert_eq!(options.protocol, Some(ProtocolVersion::Resp3));
        assert_eq!(options.max_retries, 3);
        assert_eq!(options.min_retry_backoff, SignedDuration::from_millis(8));
        assert_eq!(options.max_retry_backoff, SignedDuration::from_millis(512));
        assert_eq!(options.dial_timeout, SignedDuration::from_secs(5));
        assert_eq!(options.read_timeout, SignedDuration::from_secs(3));
        assert_eq!(options.write_timeout, SignedDuration::from_secs(3));
        assert_eq!(options.pool_size, defaults::default_pool_size());
        assert_eq!(options.pool_timeout, SignedDuration::from_secs(4));
        assert_eq!(
            options.conn_max_idle_time,
            SignedDuration::from(Duration::from_secs(30 * 60))
        );
        assert!(options.conn_max_lifetime.is_zero());
        assert_eq!(options.max_active_conns, 0);
    }

    #[test]
    fn test_with_defaults_unix_addr() {
        let options = ClientOptions {
            network: Some(Network::Unix),
            ..Default::default()
        }
        .with_defaults();
        assert_eq!(options.addr, defaults::DEFAULT_UNIX_ADDR);
    }

    #[test]
    fn test_with_defaults_keeps_sentinels() {
        let options = ClientOptions {
            max_retries: -1,
            min_retry_backoff: SignedDuration::DISABLED,
            max_retry_backoff: SignedDuration::DISABLED,
            read_timeout: SignedDuration::NO_DEADLINE,
            write_timeout: SignedDuration::DISABLED,
            conn_max_idle_time: SignedDuration::DISABLED,
            ..Default::default()
        }
        .with_defaults();

        assert_eq!(options.max_retries, -1);
        assert_eq!(options.min_retry_backoff, SignedDuration::DISABLED);
        assert_eq!(options.max_retry_backoff, SignedDuration::DISABLED);
        assert_eq!(options.read_timeout, SignedDuration::NO_DEADLINE);
        assert_eq!(options.write_timeout, SignedDuration::DISABLED);
        assert_eq!(options.conn_max_idle_time, SignedDuration::DISABLED);
        assert_eq!(options.pool_timeout, defaults::DEFAULT_POOL_TIMEOUT_FALLBACK);
    }

    #[test]
    fn test_with_defaults_write_follows_read() {
        let options = ClientOptions {
            read_timeout: SignedDuration::from_millis(250),
            ..Default::default()
        }
        .with_defaults();
        assert_eq!(options.write_timeout, SignedDuration::from_millis(250));
        assert_eq!(options.pool_timeout, SignedDuration::from_millis(1250));
    }

    #[test]
    fn test_with_defaults_keeps_explicit_values() {
        let options = ClientOptions {
            addr: "cache:6380".to_string(),
            pool_size: 7,
            pool_timeout: SignedDuration::from_secs(9),
            ..Default::default()
        }
        .with_defaults();
        assert_eq!(options.addr, "cache:6380");
        assert_eq!(options.pool_size, 7);
        assert_eq!(options.pool_timeout, SignedDuration::from_secs(9));
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(ClientOptions::default().validate().is_ok());
        assert!(ClientOptions::default().with_defaults().validate().is_ok());
    }

    #[test]
    fn test_validate_idle_exceeds_active() {
        let options = ClientOptions {
            max_active_conns: 4,
            min_idle_conns: 5,
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("min_idle_conns"));

        let options = ClientOptions {
            max_active_conns: 4,
            max_idle_conns: 8,
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("max_idle_conns"));

        // unbounded active connections never conflict
        let options = ClientOptions {
            min_idle_conns: 50,
            max_idle_conns: 100,
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_backoff_order() {
        let options = ClientOptions {
            min_retry_backoff: SignedDuration::from_secs(1),
            max_retry_backoff: SignedDuration::from_millis(10),
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = ClientOptions {
            min_retry_backoff: SignedDuration::from_secs(1),
            max_retry_backoff: SignedDuration::DISABLED,
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_max_retries() {
        let options = ClientOptions {
            max_retries: -2,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_current_credentials() {
        let options = ClientOptions {
            username: "static".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };
        assert_eq!(options.current_credentials(), Credentials::new("static", "pw"));

        let options = ClientOptions {
            credentials_provider: Some(credentials_provider(|| {
                Credentials::new("rotated", "token")
            })),
            ..options
        };
        assert_eq!(options.current_credentials().username, "rotated");
    }

    #[test]
    fn test_equality_uses_identity_for_callbacks() {
        let provider = credentials_provider(Credentials::default);
        let a = ClientOptions {
            credentials_provider: Some(provider.clone()),
            ..Default::default()
        };
        let b = a.clone();
        assert_eq!(a, b);

        let c = ClientOptions {
            credentials_provider: Some(credentials_provider(Credentials::default)),
            ..Default::default()
        };
        assert_ne!(a, c);
    }
}
