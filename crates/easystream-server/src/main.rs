//! easystream server binary.
//!
//! Reads `easystream.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, seeds the default service catalogue and serves the
//! panel API over HTTP. Maintenance subcommands work on the same store.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `auth_password_hash`:
//!
//! ```
//! cargo run -p easystream-server -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand};
use easystream_core::{Panel, setting, snapshot::Snapshot};
use easystream_server::{AppState, ServerConfig, auth::hash_password};
use easystream_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "EasyStream subscription panel")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "easystream.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Write a JSON backup of every table.
  Export {
    /// Destination file; defaults to `easystream_backup_<date>.json`.
    output: Option<PathBuf>,
  },
  /// Replace all data with the contents of a JSON backup.
  Import { file: PathBuf },
  /// Print the report for the current month.
  Report {
    #[arg(long)]
    json: bool,
  },
  /// Store the panel password in the settings table.
  SetPassword,
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

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = rpassword_or_stdin()?;
    println!("{}", hash_password(&password)?);
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("EASYSTREAM"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = Arc::new(
    SqliteStore::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?,
  );
  let panel = Arc::new(Panel::new(Arc::clone(&store)));

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(Arc::clone(&panel), server_cfg).await?,
    Command::Export { output } => {
      let snapshot = panel.export_snapshot(Utc::now()).await?;
      let path = output.unwrap_or_else(|| PathBuf::from(snapshot.file_name()));
      std::fs::write(&path, snapshot.to_json_pretty()?)
        .with_context(|| format!("failed to write {path:?}"))?;
      tracing::info!(path = %path.display(), "backup written");
    }
    Command::Import { file } => {
      let json = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read {file:?}"))?;
      let counts = panel.import_snapshot(Snapshot::parse(&json)?).await?;
      for (table, restored) in counts {
        println!("{table}: {restored}");
      }
    }
    Command::Report { json } => {
      let report = panel.monthly_report(Utc::now()).await?;
      if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
      } else {
        print!("{report}");
      }
    }
    Command::SetPassword => {
      let password = rpassword_or_stdin()?;
      panel
        .settings()
        .set(setting::PASSWORD_HASH, hash_password(&password)?.into())
        .await?;
      tracing::info!("password updated");
    }
  }

  drop(panel);
  if let Ok(store) = Arc::try_unwrap(store) {
    store.close().await.context("failed to close store")?;
  }
  Ok(())
}

async fn serve(panel: Arc<Panel<SqliteStore>>, config: ServerConfig) -> anyhow::Result<()> {
  let seeded = panel.seed_default_services(Utc::now()).await?;
  if seeded > 0 {
    tracing::info!(seeded, "seeded default services");
  }

  let address = format!("{}:{}", config.host, config.port);
  let app = easystream_server::router(AppState::new(panel, config));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      tokio::signal::ctrl_c().await.ok();
      tracing::info!("shutting down");
    })
    .await
    .context("server error")?;

  Ok(())
}

/// Read a password line from stdin.
fn rpassword_or_stdin() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
