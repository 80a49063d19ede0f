use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use teampay::application::service::PaymentService;
use teampay::config::{GatewayConfig, WebhookSecret};
use teampay::domain::money::validate_recorded_amount;
use teampay::domain::payout::compute_payout;
use teampay::domain::ports::{
    GATEWAY_KEY_SETTING, SettingsStore, SettingsStoreRef, TeamStore, TeamStoreRef,
};
use teampay::domain::team::TeamPaymentRecord;
use teampay::infrastructure::gateway_http::HttpGatewayClient;
use teampay::infrastructure::in_memory::{InMemorySettingsStore, InMemoryTeamStore};
#[cfg(feature = "storage-rocksdb")]
use teampay::infrastructure::rocksdb::RocksDBStore;
use teampay::interfaces::csv::amount_reader::RecordedAmountReader;
use teampay::interfaces::csv::payout_writer::PayoutWriter;
use teampay::interfaces::http::signature::SignatureVerifier;
use teampay::interfaces::http::{AppState, router};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (gateway webhook and team payment endpoints)
    Serve(ServeArgs),

    /// Compute payout summaries from a CSV of recorded amounts
    Payouts {
        /// Input CSV file with `team_id, recorded_amount` rows
        input: PathBuf,

        /// Path to persistent database (optional). If provided, uses RocksDB.
        #[arg(long)]
        db_path: Option<PathBuf>,
    },

    /// Print payout summaries for every team in the store
    Report {
        /// Path to persistent database.
        #[arg(long)]
        db_path: Option<PathBuf>,
    },

    /// Write a settings entry, e.g. the gateway API key
    SetSetting {
        key: String,
        value: String,

        /// Path to persistent database. Required: settings must outlive the process.
        #[arg(long)]
        db_path: PathBuf,
    },
}

#[derive(Args)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "TEAMPAY_BIND", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Base URL of the payment gateway API
    #[arg(long, env = "PAYMENT_GATEWAY_URL")]
    gateway_url: String,

    /// Timeout for each gateway call, in milliseconds
    #[arg(long, env = "PAYMENT_GATEWAY_TIMEOUT_MS", default_value_t = 10_000)]
    gateway_timeout_ms: u64,

    /// Smallest amount the gateway accepts, in whole currency units
    #[arg(long, env = "PAYMENT_GATEWAY_MIN_AMOUNT", default_value = "1")]
    gateway_min_amount: Decimal,

    /// Shared secret used to verify webhook signatures
    #[arg(long, env = "PAYMENT_WEBHOOK_SECRET", hide_env_values = true)]
    webhook_secret: String,

    /// Gateway API key to seed into the settings store on startup
    #[arg(long, env = "PAYMENT_GATEWAY_KEY", hide_env_values = true)]
    gateway_key: Option<String>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

struct Stores {
    teams: TeamStoreRef,
    settings: SettingsStoreRef,
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    match db_path {
        Some(db_path) => open_persistent_stores(db_path),
        None => Ok(in_memory_stores()),
    }
}

/// Opens the RocksDB store, with no in-memory fallback.
#[cfg(feature = "storage-rocksdb")]
fn open_persistent_stores(db_path: PathBuf) -> Result<Stores> {
    let store = RocksDBStore::open(db_path).into_diagnostic()?;
    Ok(Stores {
        teams: Arc::new(store.clone()),
        settings: Arc::new(store),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_persistent_stores(_db_path: PathBuf) -> Result<Stores> {
    Err(miette::miette!(
        "persistent storage is required, but the 'storage-rocksdb' feature is not enabled"
    ))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> Stores {
    Stores {
        teams: Arc::new(InMemoryTeamStore::new()),
        settings: Arc::new(InMemorySettingsStore::new()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Payouts { input, db_path } => payouts(input, db_path).await,
        Command::Report { db_path } => report(db_path).await,
        Command::SetSetting {
            key,
            value,
            db_path,
        } => {
            let stores = open_persistent_stores(db_path)?;
            stores.settings.put(&key, &value).await.into_diagnostic()?;
            tracing::info!(%key, "setting stored");
            Ok(())
        }
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let stores = open_stores(args.db_path)?;
    if let Some(key) = args.gateway_key.as_deref() {
        stores
            .settings
            .put(GATEWAY_KEY_SETTING, key)
            .await
            .into_diagnostic()?;
    }

    let config = GatewayConfig::new(&args.gateway_url)
        .into_diagnostic()?
        .with_timeout(Duration::from_millis(args.gateway_timeout_ms))
        .with_min_amount(args.gateway_min_amount);
    let gateway = HttpGatewayClient::new(config, stores.settings.clone()).into_diagnostic()?;
    let min_amount = gateway.config().min_amount;
    let service = PaymentService::new(stores.teams, Arc::new(gateway), min_amount);

    let secret = WebhookSecret::new(args.webhook_secret).into_diagnostic()?;
    let verifier = SignatureVerifier::new(&secret).into_diagnostic()?;
    let app = router(AppState::new(service, verifier));

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .into_diagnostic()?;
    tracing::info!(addr = %args.bind, "teampay listening");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .into_diagnostic()?;
    Ok(())
}

async fn payouts(input: PathBuf, db_path: Option<PathBuf>) -> Result<()> {
    let persist = db_path.is_some();
    let stores = open_stores(db_path)?;

    let file = File::open(input).into_diagnostic()?;
    let reader = RecordedAmountReader::new(file);
    let stdout = io::stdout();
    let mut writer = PayoutWriter::new(stdout.lock());

    for row_result in reader.rows() {
        let row = match row_result {
            Ok(row) => row,
            Err(e) => {
                eprintln!("Error reading record: {}", e);
                continue;
            }
        };
        let amount = match validate_recorded_amount(row.recorded_amount) {
            Ok(amount) => amount,
            Err(e) => {
                eprintln!("Error processing record for team {}: {}", row.team_id, e);
                continue;
            }
        };
        if persist {
            stores
                .teams
                .insert_if_absent(TeamPaymentRecord::new(row.team_id.as_str()))
                .await
                .into_diagnostic()?;
            stores
                .teams
                .set_recorded_amount(&row.team_id, amount)
                .await
                .into_diagnostic()?;
        }
        writer
            .write(&row.team_id, &compute_payout(amount))
            .into_diagnostic()?;
    }

    writer.flush().into_diagnostic()?;
    Ok(())
}

async fn report(db_path: Option<PathBuf>) -> Result<()> {
    let stores = open_stores(db_path)?;
    let teams = stores.teams.all().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = PayoutWriter::new(stdout.lock());
    for team in teams {
        writer
            .write(&team.team_id, &compute_payout(team.recorded_amount))
            .into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}
