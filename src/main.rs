//! git-history - follow a file's history across renames
//!
//! # Usage
//! ```bash
//! git-history log src/lib.rs              # History of a file in the current repo
//! git-history -C ~/project log a.txt --json
//! git-history -C ~/project serve --port 3001
//! ```

mod error;
mod git;
mod models;
mod output;
mod routes;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use clap::{Args, Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use git::similarity::DEFAULT_SIMILARITY_THRESHOLD;
use git::{GitRepository, HistoryOptions};
use routes::AppState;

/// Follow a file's history across renames
#[derive(Parser)]
#[command(name = "git-history")]
#[command(about = "Follow a file's history across renames", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the git repository (or any directory inside it)
    #[arg(short = 'C', long = "repo", value_name = "REPO_PATH", default_value = ".", global = true)]
    repo_path: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every commit that changed a file, oldest first
    Log {
        /// File path relative to the repository root
        path: String,

        /// Print JSON instead of one line per commit
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        tuning: Tuning,
    },
    /// Serve the history API over HTTP
    Serve {
        /// Port to run the server on
        #[arg(short, long, default_value = "3001")]
        port: u16,

        #[command(flatten)]
        tuning: Tuning,
    },
}

#[derive(Args, Clone)]
struct Tuning {
    /// Minimum line overlap (percent) to accept a rename whose content changed
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD, value_parser = clap::value_parser!(u32).range(0..=100))]
    threshold: u32,

    /// Give up on a history lookup after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Tuning {
    fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

async fn run_log(repo_path: &str, path: String, json: bool, tuning: Tuning) -> anyhow::Result<()> {
    let repo = Arc::new(GitRepository::open(repo_path)?);

    let cancel = Arc::new(AtomicBool::new(false));
    let options = HistoryOptions {
        similarity_threshold: tuning.threshold,
        timeout: tuning.timeout(),
        cancel: Some(cancel.clone()),
    };

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.store(true, Ordering::Relaxed);
        }
    });

    let response = tokio::task::spawn_blocking(move || repo.get_file_history(&path, &options)).await??;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        output::print_history(&response);
    }

    Ok(())
}

async fn run_server(repo_path: &str, port: u16, tuning: Tuning) -> anyhow::Result<()> {
    let repo = GitRepository::open(repo_path)?;
    let canonical_path = std::fs::canonicalize(repo_path)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| repo_path.to_string());

    let state = AppState {
        repo: Arc::new(repo),
        threshold: tuning.threshold,
        timeout: tuning.timeout(),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::create_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("  Repository: {}", canonical_path);
    println!("  Server:     http://{}", addr);
    println!("  Press Ctrl+C to stop");

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n  Shutting down...");
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Log { path, json, tuning } => run_log(&cli.repo_path, path, json, tuning).await,
        Commands::Serve { port, tuning } => run_server(&cli.repo_path, port, tuning).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_log_with_defaults() {
        let cli = Cli::try_parse_from(["git-history", "log", "src/lib.rs"]).unwrap();

        assert_eq!(cli.repo_path, ".");
        match cli.command {
            Commands::Log { path, json, tuning } => {
                assert_eq!(path, "src/lib.rs");
                assert!(!json);
                assert_eq!(tuning.threshold, DEFAULT_SIMILARITY_THRESHOLD);
                assert_eq!(tuning.timeout(), None);
            }
            Commands::Serve { .. } => panic!("expected log"),
        }
    }

    #[test]
    fn parses_serve_options() {
        let cli = Cli::try_parse_from([
            "git-history",
            "-C",
            "/tmp/repo",
            "serve",
            "--port",
            "4000",
            "--threshold",
            "70",
            "--timeout-secs",
            "30",
        ])
        .unwrap();

        assert_eq!(cli.repo_path, "/tmp/repo");
        match cli.command {
            Commands::Serve { port, tuning } => {
                assert_eq!(port, 4000);
                assert_eq!(tuning.threshold, 70);
                assert_eq!(tuning.timeout(), Some(Duration::from_secs(30)));
            }
            Commands::Log { .. } => panic!("expected serve"),
        }
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        assert!(Cli::try_parse_from(["git-history", "log", "a.txt", "--threshold", "150"]).is_err());
    }
}
