//! Integration tests for config translation
//!
//! Exercises the public surface only: builders, URLs, settings files and the
//! pool-side defaults applied after translation.

use kv_options::connection::{dialer, Stream};
use kv_options::limiter::admit;
use kv_options::{
    translate, BoxError, ClientOptions, ConnectionConfig, ConnectionInfo, ConnectionSettings,
    Error, Limiter, Network, OperationError, SignedDuration, TimeoutKind,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[test]
fn test_basic_scenario_passes_through_without_defaults() {
    init_tracing();

    let config = ConnectionConfig::builder()
        .addr("localhost:6379")
        .max_retries(3)
        .min_retry_backoff(SignedDuration::from_millis(8))
        .pool_size(10)
        .build();
    let options = translate(config);

    assert_eq!(options.addr, "localhost:6379");
    assert_eq!(options.max_retries, 3);
    assert_eq!(options.min_retry_backoff, SignedDuration::from_millis(8));
    assert_eq!(options.pool_size, 10);

    // everything else stays at its zero value
    assert_eq!(options.network, None);
    assert_eq!(options.protocol, None);
    assert!(options.client_name.is_empty());
    assert!(options.dialer.is_none());
    assert!(options.on_connect.is_none());
    assert!(options.credentials_provider.is_none());
    assert_eq!(options.db, 0);
    assert_eq!(options.max_retry_backoff, SignedDuration::ZERO);
    assert_eq!(options.dial_timeout, SignedDuration::ZERO);
    assert_eq!(options.read_timeout, SignedDuration::ZERO);
    assert_eq!(options.write_timeout, SignedDuration::ZERO);
    assert_eq!(options.pool_timeout, SignedDuration::ZERO);
    assert_eq!(options.min_idle_conns, 0);
    assert_eq!(options.max_idle_conns, 0);
    assert_eq!(options.max_active_conns, 0);
    assert_eq!(options.conn_max_idle_time, SignedDuration::ZERO);
    assert_eq!(options.conn_max_lifetime, SignedDuration::ZERO);
    assert!(options.tls_config.is_none());
    assert!(options.limiter.is_none());
    assert!(!options.pool_fifo);
    assert!(!options.context_timeout_enabled);
    assert!(!options.read_only());
    assert!(!options.disable_identity);
}

#[test]
fn test_timeout_sentinels_preserved() {
    let values = [
        SignedDuration::ZERO,
        SignedDuration::DISABLED,
        SignedDuration::NO_DEADLINE,
        SignedDuration::from_secs(5),
    ];

    for value in values {
        let options = translate(
            ConnectionConfig::builder()
                .dial_timeout(value)
                .read_timeout(value)
                .write_timeout(value)
                .pool_timeout(value)
                .conn_max_idle_time(value)
                .conn_max_lifetime(value)
                .build(),
        );

        assert_eq!(options.dial_timeout, value);
        assert_eq!(options.read_timeout, value);
        assert_eq!(options.write_timeout, value);
        assert_eq!(options.pool_timeout, value);
        assert_eq!(options.conn_max_idle_time, value);
        assert_eq!(options.conn_max_lifetime, value);
    }
}

#[test]
fn test_disabled_backoff_preserved() {
    let options = translate(
        ConnectionConfig::builder()
            .min_retry_backoff(SignedDuration::DISABLED)
            .max_retry_backoff(SignedDuration::DISABLED)
            .max_retries(-1)
            .build(),
    );
    assert_eq!(options.min_retry_backoff, SignedDuration::DISABLED);
    assert_eq!(options.max_retry_backoff, SignedDuration::DISABLED);
    assert_eq!(options.max_retries, -1);
}

#[test]
fn test_defaults_leave_sentinels_alone() {
    let options = translate(
        ConnectionConfig::builder()
            .read_timeout(SignedDuration::NO_DEADLINE)
            .write_timeout(SignedDuration::DISABLED)
            .conn_max_idle_time(SignedDuration::DISABLED)
            .build(),
    )
    .with_defaults();

    assert_eq!(options.read_timeout.timeout_kind(), TimeoutKind::NoDeadline);
    assert_eq!(options.write_timeout.timeout_kind(), TimeoutKind::Blocking);
    assert_eq!(options.conn_max_idle_time, SignedDuration::DISABLED);
    assert_eq!(options.addr, "localhost:6379");
    assert_eq!(options.network, Some(Network::Tcp));
    // read timeout is not a deadline, so the pool falls back
    assert_eq!(options.pool_timeout, SignedDuration::from_secs(30));
    options.validate().unwrap();
}

struct CountingLimiter {
    allowed: AtomicUsize,
    reports: AtomicUsize,
}

impl Limiter for CountingLimiter {
    fn allow(&self) -> Result<(), BoxError> {
        self.allowed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn report_result(&self, _result: Result<(), &OperationError>) {
        self.reports.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_limiter_identity_and_use() {
    let limiter = Arc::new(CountingLimiter {
        allowed: AtomicUsize::new(0),
        reports: AtomicUsize::new(0),
    });
    let shared: Arc<dyn Limiter> = limiter.clone();

    let options = translate(ConnectionConfig::builder().limiter(shared.clone()).build());
    let carried = options.limiter.as_ref().unwrap();
    assert!(Arc::ptr_eq(carried, &shared));

    let value = admit(Some(carried.as_ref()), || async { Ok::<_, Error>(7) })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(value, 7);
    assert_eq!(limiter.allowed.load(Ordering::SeqCst), 1);
    assert_eq!(limiter.reports.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_dialer_receives_network_and_addr() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();

    let config = ConnectionConfig::builder()
        .network(Network::Tcp)
        .addr("10.0.0.1:6379")
        .dialer(move |network, addr| {
            assert_eq!(network, Network::Tcp);
            assert_eq!(addr, "10.0.0.1:6379");
            seen.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {
                let (client, mut server) = tokio::io::duplex(64);
                server.write_all(b"+PONG\r\n").await?;
                Ok(Box::new(client) as Stream)
            })
        })
        .build();

    let options = ClientOptions::from(config);
    let dial = options.dialer.as_ref().unwrap();
    let network = options.network.unwrap();

    let mut stream = dial(network, &options.addr).await.unwrap();
    let mut buf = [0u8; 7];
    stream.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"+PONG\r\n");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_shared_dialer_is_not_copied() {
    let dial = dialer(|_network, _addr| {
        Box::pin(async {
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "refused",
            ))
        })
    });

    let mut config = ConnectionConfig::new("localhost:6379");
    config.dialer = Some(dial.clone());
    let options = translate(config);
    assert!(Arc::ptr_eq(options.dialer.as_ref().unwrap(), &dial));
}

#[test]
fn test_translation_is_idempotent() {
    let config = ConnectionConfig::builder()
        .addr("cache:6379")
        .db(4)
        .max_idle_conns(8)
        .read_timeout(SignedDuration::NO_DEADLINE)
        .build();

    let first = translate(config.clone());
    let second = translate(config);
    assert_eq!(first, second);
}

#[test]
fn test_url_to_options() {
    init_tracing();

    let info = ConnectionInfo::parse(
        "redis://app:pw@cache:6380/3?read_timeout=-2&pool_size=12&max_idle_conns=4",
    )
    .unwrap();
    let options = ClientOptions::from(info.to_config().unwrap());

    assert_eq!(options.network, Some(Network::Tcp));
    assert_eq!(options.addr, "cache:6380");
    assert_eq!(options.username, "app");
    assert_eq!(options.password, "pw");
    assert_eq!(options.db, 3);
    assert_eq!(options.max_idle_conns, 4);
    assert_eq!(options.pool_size, 12);
    assert_eq!(options.read_timeout, SignedDuration::NO_DEADLINE);
    assert_eq!(options.current_credentials().username, "app");
}

#[test]
fn test_settings_file_to_options() {
    let path = std::env::temp_dir().join(format!("kv-options-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{ "network": "unix", "addr": "/tmp/redis.sock", "db": 1, "conn_max_lifetime": "-1" }"#,
    )
    .unwrap();

    let settings = ConnectionSettings::from_json_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let options = translate(settings.into_config().unwrap());
    assert_eq!(options.network, Some(Network::Unix));
    assert_eq!(options.addr, "/tmp/redis.sock");
    assert_eq!(options.db, 1);
    assert_eq!(options.conn_max_lifetime, SignedDuration::DISABLED);
}
