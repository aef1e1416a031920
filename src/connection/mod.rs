//! Connection configuration
//!
//! This module handles:
//! * Network kind and protocol selection
//! * Callback seams (dialer, on-connect hook, credentials provider)
//! * TLS configuration
//! * The user-facing [`ConnectionConfig`] and its builder

mod callbacks;
mod config;
mod network;
mod tls;

pub use callbacks::{
    credentials_provider, dialer, on_connect, AsyncStream, Credentials, CredentialsProvider,
    Dialer, OnConnect, Stream,
};
pub use config::{ConnectionConfig, ConnectionConfigBuilder};
pub use network::{Network, ProtocolVersion};
pub use tls::{parse_server_name, TlsConfig, TlsConfigBuilder};

pub(crate) use callbacks::{describe, same_arc};
pub(crate) use config::redact;
