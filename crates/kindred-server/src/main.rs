//! kindred-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store and serves the discovery API over HTTP.
//!
//! # Seeding
//!
//! To load profiles from a JSON file and exit:
//!
//! ```text
//! cargo run -p kindred-server -- --seed profiles.json
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use kindred_server::{ServerConfig, app, expand_tilde, seed};
use kindred_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Kindred member discovery server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Load profiles from a JSON seed file into the store and exit.
  #[arg(long, value_name = "FILE")]
  seed: Option<PathBuf>,
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
  let server_cfg = ServerConfig::load(&cli.config)?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper mode: seed and exit.
  if let Some(seed_path) = cli.seed {
    let count = seed(&store, &seed_path).await?;
    println!("seeded {count} profiles into {}", store_path.display());
    return Ok(());
  }

  let app = app(store, &server_cfg);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
