//! stock ledger server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `STOCK_*`
//! environment variables, opens the SQLite store, and serves the JSON API.
//!
//! # Seeding a credential
//!
//! The credential routes themselves require authentication, so the first
//! credential is added from the command line:
//!
//! ```
//! cargo run -p stock-api --bin server -- --add-credential admin
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use stock_api::{AppState, ServerConfig};
use stock_core::store::CredentialStore;
use stock_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Stock movement ledger server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Store a credential for SUBJECT, reading the secret from stdin, and exit.
  #[arg(long, value_name = "SUBJECT")]
  add_credential: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("STOCK"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?
    .with_timeout(Duration::from_secs(server_cfg.timeout_secs));

  if let Some(subject) = cli.add_credential {
    let secret = read_secret()?;
    let added = store
      .add(&subject, &secret)
      .await
      .context("failed to store credential")?;
    if !added {
      anyhow::bail!("that secret is already in use");
    }
    println!("credential stored for {subject}");
    return Ok(());
  }

  let state = AppState::new(Arc::new(store)).context("failed to build operation registry")?;
  tracing::info!(operations = ?state.registry.names(), "registry ready");

  let app = stock_api::router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read one line from stdin.
fn read_secret() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Secret: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let secret = line.trim_end_matches(['\n', '\r']).to_string();
  if secret.is_empty() {
    anyhow::bail!("empty secret");
  }
  Ok(secret)
}

fn expand_tilde(path: &Path) -> PathBuf {
  let Ok(rest) = path.strip_prefix("~") else {
    return path.to_path_buf();
  };
  match std::env::var_os("HOME") {
    Some(home) => PathBuf::from(home).join(rest),
    None => path.to_path_buf(),
  }
}
