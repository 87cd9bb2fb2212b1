//! Server entry point for taskdeck.

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use taskdeck::{AppState, build_router};
use taskdeck_app::{EntityStore, MemoryStore, ReminderScanner, TokenSigner};
use taskdeck_core::Role;
use taskdeck_store_mongo::MongoStore;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

const DEFAULT_TOKEN_SECRET: &str = "taskdeck-dev-secret";

/// Task and todo tracking with deadline reminders and report export.
#[derive(Parser, Debug)]
#[command(name = "taskdeck", version, about = "taskdeck: tasks, todos, reminders and reports")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server and the reminder scanner.
    Serve(ServeArgs),

    /// Mint a signed role token for manual API access.
    Token {
        /// Role to embed (admin, user or guest).
        #[arg(long)]
        role: String,

        /// Shared secret the server verifies tokens with.
        #[arg(long, env = "TASKDECK_TOKEN_SECRET", default_value = DEFAULT_TOKEN_SECRET)]
        token_secret: String,
    },
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Connection string for the document store; `memory` selects the
    /// in-process backend.
    #[arg(long, env = "TASKDECK_STORE_URI", default_value = "mongodb://127.0.0.1:27017")]
    store_uri: String,

    /// Database name.
    #[arg(long, env = "TASKDECK_DB_NAME", default_value = "todoapp")]
    db_name: String,

    /// HTTP port to listen on.
    #[arg(long, env = "TASKDECK_PORT", default_value_t = 5000)]
    port: u16,

    /// Reminder scan interval in milliseconds.
    #[arg(long, env = "TASKDECK_REMINDER_INTERVAL_MS", default_value_t = 60_000)]
    reminder_interval_ms: u64,

    /// Shared secret used to sign and verify role tokens.
    #[arg(long, env = "TASKDECK_TOKEN_SECRET", default_value = DEFAULT_TOKEN_SECRET)]
    token_secret: String,
}

fn main() -> Result<()> {
    let Cli { cmd } = Cli::parse();
    match cmd {
        Command::Token { role, token_secret } => {
            let role: Role = role.parse()?;
            println!("{}", TokenSigner::new(token_secret).issue(role));
            Ok(())
        }
        Command::Serve(args) => {
            install_tracing();
            tokio::runtime::Runtime::new()?.block_on(serve(args))
        }
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let store = open_store(&args).await?;

    // Never serve a request before the store answers.
    store
        .ping()
        .await
        .map_err(|err| anyhow!("store is not reachable: {err}"))?;
    info!(db = %args.db_name, "store connection ready");

    let scanner = ReminderScanner::new(
        Arc::clone(&store),
        Duration::from_millis(args.reminder_interval_ms),
    );
    tokio::spawn(scanner.run());

    let state = AppState::new(store, &args.token_secret);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port))
        .await
        .with_context(|| format!("failed to bind port {}", args.port))?;
    info!(port = args.port, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn open_store(args: &ServeArgs) -> Result<Arc<dyn EntityStore>> {
    if args.store_uri == "memory" {
        info!("using in-process memory store");
        return Ok(Arc::new(MemoryStore::default()));
    }
    let store = MongoStore::connect(&args.store_uri, &args.db_name)
        .await
        .context("failed to open store connection")?;
    Ok(Arc::new(store))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
}

fn install_tracing() {
    // RUST_LOG overrides; default is INFO.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_defaults() {
        let cli = Cli::parse_from(["taskdeck", "serve"]);
        let Command::Serve(args) = cli.cmd else {
            panic!("expected serve command");
        };
        assert_eq!(args.db_name, "todoapp");
        assert_eq!(args.port, 5000);
        assert_eq!(args.reminder_interval_ms, 60_000);
    }

    #[test]
    fn parse_serve_overrides() {
        let cli = Cli::parse_from([
            "taskdeck",
            "serve",
            "--store-uri",
            "memory",
            "--port",
            "8080",
            "--reminder-interval-ms",
            "5000",
        ]);
        let Command::Serve(args) = cli.cmd else {
            panic!("expected serve command");
        };
        assert_eq!(args.store_uri, "memory");
        assert_eq!(args.port, 8080);
        assert_eq!(args.reminder_interval_ms, 5000);
    }

    #[test]
    fn parse_token_command() {
        let cli = Cli::parse_from(["taskdeck", "token", "--role", "admin"]);
        match cli.cmd {
            Command::Token { role, .. } => assert_eq!(role, "admin"),
            Command::Serve(_) => panic!("expected token command"),
        }
    }
}
