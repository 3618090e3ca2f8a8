//! ============================================================================
//! POCKET-CORE: Reading List Retrieval
//! ============================================================================
//! This crate handles all backend logic for the `pocket` command:
//! - Pocket OAuth2 request/authorize handshake with a loopback callback page
//! - Article retrieval over HTTPS via reqwest
//! - Credentials cache and raw article dump on disk
//! - Localized report rendering (Europe/Rome, it_CH)
//! ============================================================================

pub mod auth;
pub mod client;
pub mod config;
pub mod report;
pub mod store;
pub mod time_format;
pub mod types;

// Re-export main types for convenience
pub use auth::{CallbackServer, OAuthFlow};
pub use client::PocketClient;
pub use config::PocketConfig;
pub use report::{run, ReportSummary};
pub use store::CredentialsStore;
pub use types::*;
