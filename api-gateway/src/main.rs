//! API Gateway for the papers exchange

use std::sync::Arc;

use account_service::{AccountService, InMemoryLedgerRepository, LedgerRepository, PostgresLedgerRepository};
use api_gateway::config::AppConfig;
use api_gateway::{router, AppState};
use clap::Parser;
use common::decimal::dec;
use common::model::paper::Paper;
use common::{IntoError, RepositoryType, UserLocks};
use dotenv::dotenv;
use market_data::{MarketDataService, PostgresPaperRepository, PriceOracle};
use portfolio_service::{
    InMemoryHoldingsCache, InMemoryInventoryRepository, InventoryRepository, PostgresInventoryRepository,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use trade_executor::TradeExecutor;
use uuid::Uuid;

/// Papers exchange API server
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Listening address, defaults to 127.0.0.1:$PORT
    #[clap(short, long)]
    addr: Option<String>,

    /// Use the PostgreSQL stores (DATABASE_URL) instead of in-memory ones
    #[clap(long)]
    postgres: bool,

    /// Seed a demo account and papers into the in-memory stores
    #[clap(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging with debug level when DEBUG=1 env var is set
    let env = std::env::var("DEBUG").unwrap_or_else(|_| "0".to_string());
    let log_level = if env == "1" { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    debug!("Debug logging enabled");

    let mut config = AppConfig::new();
    if args.postgres {
        config.use_postgres();
    }

    let locks = Arc::new(UserLocks::new());

    type Stores = (Arc<dyn LedgerRepository>, Arc<dyn InventoryRepository>, Arc<dyn PriceOracle>);
    let (ledger, inventory, oracle): Stores = match &config.store.backend {
        RepositoryType::InMemory => {
            info!("Using in-memory stores");
            let ledger = Arc::new(InMemoryLedgerRepository::new());
            let market_data_service = Arc::new(MarketDataService::new());
            if args.demo {
                seed_demo(&ledger, &market_data_service)?;
            }
            let inventory: Arc<dyn InventoryRepository> = Arc::new(InMemoryInventoryRepository::new());
            (ledger as Arc<dyn LedgerRepository>, inventory, market_data_service as Arc<dyn PriceOracle>)
        }
        RepositoryType::Postgres(_) => {
            info!("Using PostgreSQL stores");
            if args.demo {
                warn!("--demo only seeds in-memory stores, ignoring");
            }
            let pool = common::db::connect(&config.store).await?;
            common::db::run_migrations(&pool).await?;
            let ledger: Arc<dyn LedgerRepository> = Arc::new(PostgresLedgerRepository::new(pool.clone()));
            let inventory: Arc<dyn InventoryRepository> = Arc::new(PostgresInventoryRepository::new(pool.clone()));
            // Live prices, rewritten by the market simulation
            let oracle: Arc<dyn PriceOracle> = Arc::new(PostgresPaperRepository::new(pool));
            (ledger, inventory, oracle)
        }
    };

    let account_service = Arc::new(AccountService::with_repository(ledger.clone(), locks.clone()));
    let executor = Arc::new(TradeExecutor::new(
        ledger,
        inventory,
        Arc::new(InMemoryHoldingsCache::new()),
        oracle,
        locks,
    ));

    let state = Arc::new(AppState {
        executor,
        account_service,
    });

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(log_level))
                .on_request(DefaultOnRequest::new().level(log_level))
                .on_response(DefaultOnResponse::new().level(log_level)),
        );

    // Start the server
    let addr: std::net::SocketAddr = args
        .addr
        .unwrap_or_else(|| config.listen_addr())
        .parse()
        .map_err(|e: std::net::AddrParseError| e.into_error("Invalid listening address"))?;
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    // Run until interrupt signal
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

/// Demo data: one funded account and the base paper the market simulation starts from
fn seed_demo(ledger: &InMemoryLedgerRepository, market: &MarketDataService) -> common::Result<()> {
    let user_id = Uuid::new_v4();
    ledger.open_account(user_id, dec!(1000));
    market.seed(&[
        Paper::new("BasePaper", dec!(1)),
        Paper::new("Blue Chip", dec!(125.50)),
        Paper::new("Penny", dec!(0.05)),
    ])?;

    info!("Seeded demo account {} with balance 1000", user_id);
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
