//! ============================================================================
//! Pocket OAuth2 Flow
//! ============================================================================
//! request token -> print authorize URL -> wait for the loopback callback ->
//! exchange for an access token -> cache it on disk.
//! ============================================================================

use std::io::Write;

use tracing::{error, info, warn};

use crate::auth::CallbackServer;
use crate::client::PocketClient;
use crate::config::PocketConfig;
use crate::store::CredentialsStore;
use crate::types::{Credentials, PocketError};

/// Drives the browser authorization handshake once
pub struct OAuthFlow<'a> {
    config: &'a PocketConfig,
    client: &'a PocketClient,
}

impl<'a> OAuthFlow<'a> {
    pub fn new(config: &'a PocketConfig, client: &'a PocketClient) -> Self {
        Self { config, client }
    }

    /// Browser URL the user opens to approve the application.
    pub fn authorization_url(&self, request_token: &str) -> String {
        format!(
            "{}?request_token={}&redirect_uri={}",
            self.config.authorize_url,
            urlencoding::encode(request_token),
            urlencoding::encode(&self.config.redirect_uri())
        )
    }

    /// Run the whole handshake. The prompt with the authorization link is
    /// written to `out`.
    ///
    /// Saving the credentials is best effort: on failure a warning is logged
    /// and the token is still returned for the current run.
    pub async fn run<W: Write>(
        &self,
        store: &CredentialsStore,
        out: &mut W,
    ) -> Result<Credentials, PocketError> {
        let redirect_uri = self.config.redirect_uri();
        let request_token = self
            .client
            .request_token(&redirect_uri)
            .await
            .inspect_err(|_| error!("could not obtain request token"))?;

        let server = CallbackServer::bind(&self.config.callback_host, self.config.callback_port)
            .inspect_err(|e| error!("Cannot start server: {}", e))?;

        writeln!(
            out,
            "Click link to authorize\n{}",
            self.authorization_url(&request_token)
        )
        .and_then(|_| out.flush())
        .map_err(|e| PocketError::io("stdout", e))?;

        let timeout = self.config.callback_timeout;
        tokio::task::spawn_blocking(move || server.wait_for_stop(timeout))
            .await
            .map_err(|e| PocketError::CallbackServer(e.to_string()))??;

        let credentials = self.client.authorize(&request_token).await?;

        match store.save(&credentials) {
            Ok(()) => info!("Saved credentials to {}", store.path().display()),
            Err(e) => warn!("Cannot save file {} to disk: {}", store.path().display(), e),
        }

        Ok(credentials)
    }
}
