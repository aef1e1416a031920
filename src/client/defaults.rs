//! Defaults applied by the pool to unset options
//!
//! These are never injected by [`translate`](super::translate); only
//! [`ClientOptions::with_defaults`](super::ClientOptions::with_defaults) uses them.

use crate::connection::ProtocolVersion;
use crate::duration::SignedDuration;
use std::time::Duration;

/// Address used when `addr` is empty on TCP
pub const DEFAULT_ADDR: &str = "localhost:6379";

/// Address used when `addr` is empty on a Unix socket
pub const DEFAULT_UNIX_ADDR: &str = "/tmp/redis.sock";

/// Port assumed when a URL names none
pub const DEFAULT_PORT: u16 = 6379;

/// Protocol negotiated when unset
pub const DEFAULT_PROTOCOL: ProtocolVersion = ProtocolVersion::Resp3;

/// Retry count when `max_retries` is 0
pub const DEFAULT_MAX_RETRIES: i32 = 3;

/// Minimum retry backoff
pub const DEFAULT_MIN_RETRY_BACKOFF: SignedDuration = SignedDuration::from_millis(8);

/// Maximum retry backoff
pub const DEFAULT_MAX_RETRY_BACKOFF: SignedDuration = SignedDuration::from_millis(512);

/// Dial timeout
pub const DEFAULT_DIAL_TIMEOUT: SignedDuration = SignedDuration::from_secs(5);

/// Read timeout (write timeout follows it)
pub const DEFAULT_READ_TIMEOUT: SignedDuration = SignedDuration::from_secs(3);

/// Added to a positive read timeout to derive the pool timeout
pub const POOL_TIMEOUT_GRACE: Duration = Duration::from_secs(1);

/// Pool timeout when the read timeout is not a positive deadline
pub const DEFAULT_POOL_TIMEOUT_FALLBACK: SignedDuration = SignedDuration::from_secs(30);

/// Connections per available CPU
pub const POOL_SIZE_PER_CPU: usize = 10;

/// Idle time before lazy closure
pub const DEFAULT_CONN_MAX_IDLE_TIME: SignedDuration = SignedDuration::from_secs(30 * 60);

/// `POOL_SIZE_PER_CPU` times the available parallelism.
pub fn default_pool_size() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    POOL_SIZE_PER_CPU * cpus
}
