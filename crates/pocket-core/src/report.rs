//! ============================================================================
//! Retrieval & Report
//! ============================================================================
//! Top-level run: ensure credentials, fetch one page of articles, dump the raw
//! response, and print one localized block per article.
//! ============================================================================

use std::io::Write;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::auth::OAuthFlow;
use crate::client::PocketClient;
use crate::config::PocketConfig;
use crate::store::{self, CredentialsStore};
use crate::time_format::format_timestamp;
use crate::types::{Article, PocketError};

/// What a successful run printed
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub username: String,
    pub articles: usize,
}

/// Run the tool end to end, writing the prompt (if any) and report to `out`.
pub async fn run<W: Write>(config: &PocketConfig, out: &mut W) -> Result<ReportSummary, PocketError> {
    config.validate()?;

    let client = PocketClient::new(config)?;
    let store = CredentialsStore::new(&config.credentials_path);

    // A fresh token is used directly so a failed cache write does not end the run
    let credentials = if store.exists() {
        let credentials = store.load()?;
        info!("Found saved info for user: {}", credentials.username);
        credentials
    } else {
        info!(
            "No saved credentials at {}, starting authorization",
            store.path().display()
        );
        OAuthFlow::new(config, &client).run(&store, out).await?
    };

    let response = client
        .retrieve(&credentials.access_token, config.page_size)
        .await?;

    dump_response(config, &response);

    let articles = parse_articles(&response)?;
    for article in &articles {
        writeln!(out, "{}\n", render_article(article)?)
            .map_err(|e| PocketError::io("stdout", e))?;
    }

    Ok(ReportSummary {
        username: credentials.username,
        articles: articles.len(),
    })
}

fn dump_response(config: &PocketConfig, response: &Value) {
    let path = &config.articles_path;
    let result = serde_json::to_string_pretty(response)
        .map_err(|e| PocketError::Encode {
            context: "article response".to_string(),
            source: e,
        })
        .and_then(|content| store::write(path, &content));

    if let Err(e) = result {
        warn!("Cannot save file {} to disk: {}", path.display(), e);
    }
}

/// Items of the response's `list`, in document order.
///
/// The live API sends an object keyed by item id, and an empty array when
/// there is nothing to return; both shapes are accepted.
pub fn parse_articles(response: &Value) -> Result<Vec<Article>, PocketError> {
    let list = response
        .get("list")
        .ok_or_else(|| PocketError::Data("response has no list".to_string()))?;

    let items: Vec<&Value> = match list {
        Value::Array(items) => items.iter().collect(),
        Value::Object(items) => items.values().collect(),
        other => {
            return Err(PocketError::Data(format!(
                "list is neither an array nor an object: {}",
                other
            )))
        }
    };

    items
        .into_iter()
        .map(|item| {
            Article::deserialize(item).map_err(|e| PocketError::Decode {
                context: "article".to_string(),
                source: e,
            })
        })
        .collect()
}

/// `[<timestamp>] <title>\n<excerpt>\n<url>`
pub fn render_article(article: &Article) -> Result<String, PocketError> {
    let added = format_timestamp(article.time_added_secs()?)?;
    Ok(format!(
        "[{}] {}\n{}\n{}",
        added,
        article.display_title(),
        article.excerpt,
        article.given_url
    ))
}
