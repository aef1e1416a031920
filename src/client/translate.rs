//! ConnectionConfig → ClientOptions

use super::ClientOptions;
use crate::connection::ConnectionConfig;
use crate::metrics::counters;

/// Map a [`ConnectionConfig`] onto [`ClientOptions`].
///
/// Every field is moved into its like-named counterpart. Nothing is defaulted,
/// normalized or validated, and shared values (callbacks, TLS configuration,
/// limiter) change owner without being copied. The operation cannot fail.
pub fn translate(config: ConnectionConfig) -> ClientOptions {
    // Exhaustive destructuring: a new config field fails to compile here until mapped.
    let ConnectionConfig {
        network,
        addr,
        client_name,
        dialer,
        on_connect,
        protocol,
        username,
        password,
        credentials_provider,
        db,
        max_retries,
        min_retry_backoff,
        max_retry_backoff,
        dial_timeout,
        read_timeout,
        write_timeout,
        context_timeout_enabled,
        pool_fifo,
        pool_size,
        pool_timeout,
        min_idle_conns,
        max_idle_conns,
        max_active_conns,
        conn_max_idle_time,
        conn_max_lifetime,
        tls_config,
        limiter,
        read_only,
        disable_identity,
    } = config;

    tracing::trace!(
        addr = %addr,
        network = ?network,
        custom_dialer = dialer.is_some(),
        tls = tls_config.is_some(),
        limiter = limiter.is_some(),
        "translating connection config"
    );
    counters::options_translated();

    ClientOptions {
        network,
        addr,
        client_name,
        dialer,
        on_connect,
        protocol,
        username,
        password,
        credentials_provider,
        db,
        max_retries,
        min_retry_backoff,
        max_retry_backoff,
        dial_timeout,
        read_timeout,
        write_timeout,
        context_timeout_enabled,
        pool_fifo,
        pool_size,
        pool_timeout,
        min_idle_conns,
        max_idle_conns,
        max_active_conns,
        conn_max_idle_time,
        conn_max_lifetime,
        tls_config,
        limiter,
        read_only,
        disable_identity,
    }
}

impl From<ConnectionConfig> for ClientOptions {
    fn from(config: ConnectionConfig) -> Self {
        translate(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Credentials, Network, ProtocolVersion, TlsConfig};
    use crate::duration::SignedDuration;
    use crate::limiter::{Limiter, OperationError};
    use crate::BoxError;
    use std::sync::Arc;

    struct AlwaysAllow;

    impl Limiter for AlwaysAllow {
        fn allow(&self) -> std::result::Result<(), BoxError> {
            Ok(())
        }

        fn report_result(&self, _result: std::result::Result<(), &OperationError>) {}
    }

    fn full_config() -> ConnectionConfig {
        let mut config = ConnectionConfig::builder()
            .network(Network::Tcp)
            .addr("cache.internal:6380")
            .client_name("billing")
            .dialer(|_network, _addr| {
                Box::pin(async {
                    Err(std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "refused",
                    ))
                })
            })
            .on_connect(|_conn| Box::pin(async { Ok(()) }))
            .protocol(ProtocolVersion::Resp2)
            .username("billing")
            .password("s3cret")
            .credentials_provider(|| Credentials::new("billing", "rotated"))
            .db(7)
            .max_retries(5)
            .min_retry_backoff(SignedDuration::from_millis(16))
            .max_retry_backoff(SignedDuration::from_secs(1))
            .dial_timeout(SignedDuration::from_secs(2))
            .read_timeout(SignedDuration::NO_DEADLINE)
            .write_timeout(SignedDuration::DISABLED)
            .context_timeout_enabled(true)
            .pool_fifo(true)
            .pool_size(25)
            .pool_timeout(SignedDuration::from_secs(6))
            .min_idle_conns(3)
            .max_idle_conns(11)
            .max_active_conns(40)
            .conn_max_idle_time(SignedDuration::DISABLED)
            .conn_max_lifetime(SignedDuration::from_secs(600))
            .tls_config(
                TlsConfig::builder()
                    .use_webpki_roots(true)
                    .build()
                    .expect("tls config"),
            )
            .limiter(Arc::new(AlwaysAllow))
            .disable_identity(true)
            .build();
        config.read_only = true;
        config
    }

    #[test]
    fn test_every_field_maps_to_its_counterpart() {
        let config = full_config();
        let options = translate(config.clone());

        assert_eq!(options.network, config.network);
        assert_eq!(options.addr, config.addr);
        assert_eq!(options.client_name, config.client_name);
        assert!(Arc::ptr_eq(
            options.dialer.as_ref().unwrap(),
            config.dialer.as_ref().unwrap()
        ));
        assert!(Arc::ptr_eq(
            options.on_connect.as_ref().unwrap(),
            config.on_connect.as_ref().unwrap()
        ));
        assert_eq!(options.protocol, config.protocol);
        assert_eq!(options.username, config.username);
        assert_eq!(options.password, config.password);
        assert!(Arc::ptr_eq(
            options.credentials_provider.as_ref().unwrap(),
            config.credentials_provider.as_ref().unwrap()
        ));
        assert_eq!(options.db, config.db);
        assert_eq!(options.max_retries, config.max_retries);
        assert_eq!(options.min_retry_backoff, config.min_retry_backoff);
        assert_eq!(options.max_retry_backoff, config.max_retry_backoff);
        assert_eq!(options.dial_timeout, config.dial_timeout);
        assert_eq!(options.read_timeout, config.read_timeout);
        assert_eq!(options.write_timeout, config.write_timeout);
        assert_eq!(
            options.context_timeout_enabled,
            config.context_timeout_enabled
        );
        assert_eq!(options.pool_fifo, config.pool_fifo);
        assert_eq!(options.pool_size, config.pool_size);
        assert_eq!(options.pool_timeout, config.pool_timeout);
        assert_eq!(options.min_idle_conns, config.min_idle_conns);
        assert_eq!(options.max_idle_conns, config.max_idle_conns);
        assert_eq!(options.max_active_conns, config.max_active_conns);
        assert_eq!(options.conn_max_idle_time, config.conn_max_idle_time);
        assert_eq!(options.conn_max_lifetime, config.conn_max_lifetime);
        assert!(options
            .tls_config
            .as_ref()
            .unwrap()
            .ptr_eq(config.tls_config.as_ref().unwrap()));
        assert!(Arc::ptr_eq(
            options.limiter.as_ref().unwrap(),
            config.limiter.as_ref().unwrap()
        ));
        assert_eq!(options.read_only, config.read_only);
        assert_eq!(options.disable_identity, config.disable_identity);
    }

    #[test]
    fn test_db_and_idle_counts_map_like_to_like() {
        let config = ConnectionConfig::builder()
            .db(2)
            .max_idle_conns(9)
            .max_active_conns(30)
            .build();
        let options = translate(config);

        assert_eq!(options.db, 2);
        assert_eq!(options.max_idle_conns, 9);
        assert_eq!(options.max_active_conns, 30);
    }

    #[test]
    fn test_translate_is_idempotent() {
        let config = full_config();
        assert_eq!(translate(config.clone()), translate(config.clone()));
        assert_eq!(ClientOptions::from(config.clone()), config.into_client_options());
    }

    #[test]
    fn test_read_only_is_carried() {
        let mut config = ConnectionConfig::default();
        config.read_only = true;
        assert!(translate(config).read_only);
    }
}
