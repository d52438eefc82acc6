//! Tournament registration server.
//!
//! Serves the registration API over HTTP, backed by PostgreSQL or an
//! in-process store, and delivers confirmation messages from a background
//! worker.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use battlebucks::{
    CallerIdentity, ChannelSink, ConfirmationMessage, Database, LedgerStore, MemoryStore,
    PgStore, RegistrationLedger,
};
use bb_server::{
    api::{self, token::TokenVerifier},
    config::{ServerConfig, StoreBackend},
    logging, metrics,
};
use log::info;
use pico_args::Arguments;
use tokio::sync::mpsc;

const HELP: &str = "\
Run the BattleBucks tournament registration server

USAGE:
  bb_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]
  --store      BACKEND     postgres or memory          [default: env STORE_BACKEND or postgres]
  --issue-token UID        Print a bearer token for UID and exit
  --email      EMAIL       Email claim for --issue-token

FLAGS:
  --admin                  Give the --issue-token caller the admin claim
  -h, --help               Print help information

ENVIRONMENT:
  JWT_SECRET               Bearer token secret (required, 32+ characters)
  LEDGER_MAX_ATTEMPTS      Attempts per slot transaction [default: 5]
  LEDGER_REVERT_MODE       guarded or unconditional [default: guarded]
  METRICS_BIND             Prometheus exporter address (disabled when unset)
  (See .env.example for all configuration options)
";

/// Pending confirmation messages held before senders wait
const NOTIFICATION_QUEUE: usize = 256;

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    store: Option<StoreBackend>,
    issue_token: Option<String>,
    email: Option<String>,
    admin: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        store: pargs.opt_value_from_str("--store")?,
        issue_token: pargs.opt_value_from_str("--issue-token")?,
        email: pargs.opt_value_from_str("--email")?,
        admin: pargs.contains("--admin"),
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url, args.store)?;
    config.validate()?;

    let tokens = TokenVerifier::new(&config.security.jwt_secret);

    if let Some(uid) = args.issue_token {
        let caller = CallerIdentity {
            uid,
            email: args.email,
            is_admin: args.admin,
        };
        println!("{}", tokens.issue(&caller, chrono::Duration::hours(12))?);
        return Ok(());
    }

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics exported at http://{}/metrics", addr);
    }

    let (store, database): (Arc<dyn LedgerStore>, Option<Database>) = match config.store {
        StoreBackend::Memory => {
            log::warn!("Using the in-memory store, data will not survive a restart");
            let store: Arc<dyn LedgerStore> = Arc::new(MemoryStore::new());
            (store, None)
        }
        StoreBackend::Postgres => {
            info!("Connecting to database");
            let db = Database::new(&config.database)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
            db.migrate()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to apply migrations: {}", e))?;
            info!("Database connected and migrated");

            let store: Arc<dyn LedgerStore> = Arc::new(PgStore::new(Arc::new(db.pool().clone())));
            (store, Some(db))
        }
    };

    let (sink, outbox) = ChannelSink::new(NOTIFICATION_QUEUE);
    tokio::spawn(deliver_confirmations(outbox));

    let ledger = RegistrationLedger::new(store.clone(), Arc::new(sink), config.ledger.clone());
    info!(
        "Ledger ready: {} attempts per transaction, {:?} revert",
        config.ledger.max_attempts, config.ledger.revert_mode
    );

    let app = api::create_router(api::AppState::new(store, ledger, tokens));

    info!("Starting HTTP server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    if let Some(db) = database {
        db.close().await;
        info!("Database pool closed");
    }

    Ok(())
}

/// Drain the confirmation queue.
///
/// Delivery is logged; an email provider would be plugged in here.
async fn deliver_confirmations(mut outbox: mpsc::Receiver<ConfirmationMessage>) {
    while let Some(message) = outbox.recv().await {
        info!(
            "Confirmation to {}: {} ({} bytes)",
            message.recipient,
            message.subject,
            message.body.len()
        );
    }
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
