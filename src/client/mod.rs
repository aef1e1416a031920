//! Client-facing options
//!
//! * [`translate`]: the pure `ConnectionConfig` → [`ClientOptions`] mapping
//! * [`ClientOptions`]: the pool's view, with its defaults and validation
//! * [`ConnectionInfo`]: `redis://`, `rediss://` and `unix://` URLs
//! * [`ConnectionSettings`]: serde front-end for settings files

mod connection_string;
pub mod defaults;
mod options;
mod settings;
mod translate;

pub use connection_string::ConnectionInfo;
pub use options::ClientOptions;
pub use settings::{ConnectionSettings, TlsSettings};
pub use translate::translate;
