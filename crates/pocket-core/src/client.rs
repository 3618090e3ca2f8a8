//! ============================================================================
//! Pocket API Client
//! ============================================================================
//! JSON-over-HTTPS POSTs to the fixed Pocket v3 endpoints:
//! - /v3/oauth/request   request token for the authorization handshake
//! - /v3/oauth/authorize exchange the request token for an access token
//! - /v3/get             retrieve saved items
//! No retries: a failed call is terminal for that operation.
//! ============================================================================

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::PocketConfig;
use crate::types::{Credentials, PocketError};

pub const REQUEST_TOKEN_PATH: &str = "/v3/oauth/request";
pub const AUTHORIZE_PATH: &str = "/v3/oauth/authorize";
pub const RETRIEVE_PATH: &str = "/v3/get";

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Client for the Pocket v3 API
pub struct PocketClient {
    client: Client,
    base_url: String,
    consumer_key: String,
}

impl PocketClient {
    pub fn new(config: &PocketConfig) -> Result<Self, PocketError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PocketError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            consumer_key: config.consumer_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body and return the parsed JSON response.
    ///
    /// Anything other than `200 OK` is an [`PocketError::Api`] carrying the
    /// `X-Error-Code` / `X-Error` diagnostics Pocket attaches to failures.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        headers: &[(&'static str, &str)],
        body: &B,
    ) -> Result<Value, PocketError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let mut header_map = HeaderMap::new();
        header_map.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        for (name, value) in headers {
            let value = HeaderValue::from_str(value).map_err(|e| {
                PocketError::Config(format!("invalid value for header {}: {}", name, e))
            })?;
            header_map.insert(*name, value);
        }

        let response = self
            .client
            .post(&url)
            .headers(header_map)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!("HTTP POST error: {}", e);
                PocketError::Transport {
                    path: path.to_string(),
                    source: e,
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let error_code = header_text(response.headers(), "X-Error-Code");
            let error_message = header_text(response.headers(), "X-Error");
            let body = response.text().await.unwrap_or_default();

            error!(
                "Request failed with status: {} reason: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            );
            error!("X-Error-Code: {}", error_code.as_deref().unwrap_or(""));
            error!("X-Error: {}", error_message.as_deref().unwrap_or(""));
            if !body.is_empty() {
                debug!("Response body: {}", body);
            }

            return Err(PocketError::Api {
                path: path.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                error_code,
                error_message,
                body,
            });
        }

        let text = response.text().await.map_err(|e| PocketError::Transport {
            path: path.to_string(),
            source: e,
        })?;

        serde_json::from_str(&text).map_err(|e| PocketError::Decode {
            context: format!("response from {}", path),
            source: e,
        })
    }

    /// Step one of the handshake: obtain a short-lived request token.
    pub async fn request_token(&self, redirect_uri: &str) -> Result<String, PocketError> {
        let body = RequestTokenBody {
            consumer_key: &self.consumer_key,
            redirect_uri,
        };

        let json = self
            .post(REQUEST_TOKEN_PATH, &[("X-Accept", "application/json")], &body)
            .await?;

        let code = json
            .get("code")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| PocketError::Data("request token response has no code".to_string()))?;

        debug!("Obtained request token");
        Ok(code.to_string())
    }

    /// Exchange an approved request token for the user's access token.
    pub async fn authorize(&self, code: &str) -> Result<Credentials, PocketError> {
        let body = AuthorizeBody {
            consumer_key: &self.consumer_key,
            code,
        };

        let json = self
            .post(AUTHORIZE_PATH, &[("X-Accept", "application/json")], &body)
            .await?;

        let credentials: Credentials = serde_json::from_value(json)
            .map_err(|e| PocketError::Data(format!("authorize response: {}", e)))?;

        if credentials.access_token.is_empty() {
            return Err(PocketError::Data(
                "authorize response has an empty access_token".to_string(),
            ));
        }

        info!("Got access token for username: {}", credentials.username);
        Ok(credentials)
    }

    /// Fetch the newest `count` articles, all states, simple detail.
    pub async fn retrieve(&self, access_token: &str, count: u32) -> Result<Value, PocketError> {
        let count = count.to_string();
        let body = RetrieveBody {
            consumer_key: &self.consumer_key,
            access_token,
            state: "all",
            content_type: "article",
            sort: "newest",
            detail_type: "simple",
            count: &count,
            offset: "0",
        };

        self.post(RETRIEVE_PATH, &[], &body).await
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

// ============================================================================
// Pocket API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct RequestTokenBody<'a> {
    consumer_key: &'a str,
    redirect_uri: &'a str,
}

#[derive(Debug, Serialize)]
struct AuthorizeBody<'a> {
    consumer_key: &'a str,
    code: &'a str,
}

#[derive(Debug, Serialize)]
struct RetrieveBody<'a> {
    consumer_key: &'a str,
    access_token: &'a str,
    state: &'a str,
    #[serde(rename = "contentType")]
    content_type: &'a str,
    sort: &'a str,
    #[serde(rename = "detailType")]
    detail_type: &'a str,
    count: &'a str,
    offset: &'a str,
}
