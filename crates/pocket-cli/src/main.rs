// ============================================================================
// pocket — print your Pocket reading list
// ============================================================================
// Usage:
//   pocket                              Authorize on first run, then print
//                                       the 20 newest saved articles
//   pocket --credentials FILE           Use another credentials cache
//   pocket --output FILE                Dump the raw API response elsewhere
// Configuration is read from POCKET_* environment variables (and .env).
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use pocket_core::{ErrorKind, PocketConfig, PocketError};
use tracing::{error, info, Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Pocket reading list printer
#[derive(Parser)]
#[command(name = "pocket", version, about = "Print the newest articles saved in Pocket")]
struct Cli {
    /// Pocket consumer key (default: POCKET_CONSUMER_KEY)
    #[arg(long)]
    consumer_key: Option<String>,

    /// Credentials cache file (default: pocket_access_token.json)
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Raw article dump file (default: articles.json)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Local port for the authorization callback (default: 6969)
    #[arg(long)]
    callback_port: Option<u16>,

    /// Seconds to wait for the authorization callback (default: 300)
    #[arg(long)]
    callback_timeout: Option<u64>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn apply(self, mut config: PocketConfig) -> PocketConfig {
        if let Some(key) = self.consumer_key {
            config.consumer_key = key;
        }
        if let Some(path) = self.credentials {
            config.credentials_path = path;
        }
        if let Some(path) = self.output {
            config.articles_path = path;
        }
        if let Some(port) = self.callback_port {
            config.callback_port = port;
        }
        if let Some(secs) = self.callback_timeout {
            config.callback_timeout = Duration::from_secs(secs);
        }
        config
    }
}

/// `[LEVEL] message` lines on stderr
struct BracketedLevel;

impl<S, N> FormatEvent<S, N> for BracketedLevel
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "[{}] ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(BracketedLevel)
        .init();
}

/// Process exit status for any failed run
const FAILURE_EXIT: u8 = 1;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&e);
            ExitCode::from(FAILURE_EXIT)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.apply(PocketConfig::from_env()?);

    let mut stdout = std::io::stdout().lock();
    let summary = pocket_core::run(&config, &mut stdout).await?;

    info!(
        "Printed {} articles for {}",
        summary.articles, summary.username
    );
    Ok(())
}

/// How the boundary reports a failed run
#[derive(Debug, PartialEq)]
enum Failure {
    /// The API client already logged the status and X-Error diagnostics
    AlreadyLogged,
    /// Anticipated failure, logged at error level
    Handled(String),
    /// Local data or I/O fault, printed as `[EXCEPTION]`
    Unexpected(String),
}

impl Failure {
    fn classify(e: &anyhow::Error) -> Self {
        match e.downcast_ref::<PocketError>() {
            Some(pocket) if matches!(pocket.kind(), ErrorKind::Api | ErrorKind::Transport) => {
                Failure::AlreadyLogged
            }
            Some(pocket) if pocket.is_handled() => Failure::Handled(pocket.to_string()),
            _ => Failure::Unexpected(format!("{:#}", e)),
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Failure::AlreadyLogged | Failure::Handled(_) => "[ERROR]",
            Failure::Unexpected(_) => "[EXCEPTION]",
        }
    }
}

fn report_failure(e: &anyhow::Error) {
    let failure = Failure::classify(e);
    match &failure {
        Failure::AlreadyLogged => {}
        Failure::Handled(msg) => error!("{}", msg),
        Failure::Unexpected(msg) => eprintln!("{} {}", failure.prefix(), msg),
    }
}
