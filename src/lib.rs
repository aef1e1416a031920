//! kv-options: connection options for Redis-compatible key-value clients
//!
//! This crate collects the user-facing connection, authentication, pooling,
//! retry and timeout settings into a single [`ConnectionConfig`] and maps it
//! onto the [`ClientOptions`] shape consumed by a client/connection-pool
//! implementation.
//!
//! The mapping is pure: no field is defaulted, normalized or dropped. Defaults
//! belong to the pool that consumes the options (see
//! [`ClientOptions::with_defaults`]).
//!
//! ```
//! use kv_options::{ConnectionConfig, ClientOptions, SignedDuration};
//!
//! let config = ConnectionConfig::builder()
//!     .addr("localhost:6379")
//!     .max_retries(3)
//!     .min_retry_backoff(SignedDuration::from_millis(8))
//!     .pool_size(10)
//!     .build();
//!
//! let options = ClientOptions::from(config);
//! assert_eq!(options.addr, "localhost:6379");
//! assert_eq!(options.pool_size, 10);
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod connection;
pub mod duration;
pub mod error;
pub mod limiter;
pub mod metrics;

pub use client::{translate, ClientOptions, ConnectionInfo, ConnectionSettings};
pub use connection::{
    ConnectionConfig, ConnectionConfigBuilder, Credentials, Network, ProtocolVersion, TlsConfig,
};
pub use duration::{SignedDuration, TimeoutKind};
pub use error::{BoxError, Error, Result};
pub use limiter::{Admission, Limiter, OperationError};
