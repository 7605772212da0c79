// docwallet-api: Async Rust client for the document sharing API

pub mod error;
pub mod models;
pub mod sharing;
pub mod transport;

pub use error::Error;
pub use models::{DocToAdd, DocsToAddResponse, ShareLink};
pub use sharing::SharingClient;
pub use transport::{TlsMode, TransportConfig};
