//! ============================================================================
//! Auth Module - Pocket Authorization
//! ============================================================================
//! - OAuthFlow: request/authorize handshake with the Pocket API
//! - CallbackServer: loopback page the browser lands on after approval
//! ============================================================================

mod callback_server;
mod flow;

pub use callback_server::CallbackServer;
pub use flow::OAuthFlow;
