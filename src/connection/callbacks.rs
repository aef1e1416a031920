//! Callback types carried by the options
//!
//! These are opaque to this crate: they are stored and forwarded by
//! reference, and only the pool that consumes the options invokes them.

use super::Network;
use crate::Result;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};

/// A bidirectional byte stream produced by a dialer.
pub trait AsyncStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> AsyncStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// A connection handle: any boxed [`AsyncStream`].
pub type Stream = Box<dyn AsyncStream>;

/// Creates a network connection; takes priority over `network`/`addr`.
///
/// Cancellation is expressed by dropping the returned future.
pub type Dialer =
    Arc<dyn for<'a> Fn(Network, &'a str) -> BoxFuture<'a, std::io::Result<Stream>> + Send + Sync>;

/// Called once for every newly established connection.
///
/// An error means the connection must be closed instead of pooled.
pub type OnConnect =
    Arc<dyn for<'c> Fn(&'c mut Stream) -> BoxFuture<'c, Result<()>> + Send + Sync>;

/// Returns the current credentials; consulted on every (re)connect.
pub type CredentialsProvider = Arc<dyn Fn() -> Credentials + Send + Sync>;

/// Wrap a closure as a [`Dialer`].
///
/// ```
/// use kv_options::connection::{dialer, Stream};
///
/// let dial = dialer(|_network, addr| {
///     Box::pin(async move {
///         let stream = tokio::net::TcpStream::connect(addr).await?;
///         Ok(Box::new(stream) as Stream)
///     })
/// });
/// # drop(dial);
/// ```
pub fn dialer<F>(f: F) -> Dialer
where
    F: for<'a> Fn(Network, &'a str) -> BoxFuture<'a, std::io::Result<Stream>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as an [`OnConnect`] hook.
pub fn on_connect<F>(f: F) -> OnConnect
where
    F: for<'c> Fn(&'c mut Stream) -> BoxFuture<'c, Result<()>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as a [`CredentialsProvider`].
pub fn credentials_provider<F>(f: F) -> CredentialsProvider
where
    F: Fn() -> Credentials + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Username/password pair
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// ACL username (empty for the default user)
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create a credentials pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Pointer equality for optional shared values.
pub(crate) fn same_arc<T: ?Sized>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Placeholder used by `Debug` impls for callback fields.
pub(crate) fn describe<T: ?Sized>(value: &Option<Arc<T>>) -> &'static str {
    if value.is_some() {
        "Some(<fn>)"
    } else {
        "None"
    }
}
