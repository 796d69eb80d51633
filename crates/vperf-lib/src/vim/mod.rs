//! Remote inventory API: boundary trait, session gateway, traversal
//! specifications, and the HTTP transport.

pub mod api;
pub mod session;
pub mod transport;
pub mod traversal;
pub mod types;

pub use api::VimApi;
pub use session::{Session, SessionConfig};
pub use transport::HttpVimApi;
