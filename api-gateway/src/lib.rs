//! HTTP surface of the papers exchange

pub mod api;
pub mod config;
pub mod error;

use std::sync::Arc;

use account_service::AccountService;
use axum::{
    routing::{get, post},
    Json, Router,
};
use trade_executor::TradeExecutor;
use utoipa::OpenApi;

use crate::api::{account, trade};

/// App state shared across handlers
pub struct AppState {
    /// Trade executor
    pub executor: Arc<TradeExecutor>,
    /// Account service
    pub account_service: Arc<AccountService>,
}

/// API documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Account routes
        api::account::get_account,
        api::account::get_balance,
        api::account::deposit,
        api::account::withdraw,
        // Trade routes
        api::trade::buy,
        api::trade::sell,
        api::trade::get_user_papers,
        api::trade::get_available_papers,
    ),
    components(
        schemas(
            api::account::BalanceView,
            api::account::CashRequest,
            common::model::account::Account,

            api::trade::TradeParams,
            api::trade::TradeResult,
            common::model::trade::Side,
            common::model::trade::TradeReceipt,
            common::model::holding::PaperPosition,
            common::model::paper::Paper,
        )
    ),
    tags(
        (name = "account", description = "Cash balance endpoints"),
        (name = "trade", description = "Buying, selling and holdings")
    ),
    info(
        title = "Papers Exchange API",
        version = "1.0.0",
        description = "Trade papers against a cash balance and read holdings marked to market"
    )
)]
pub struct ApiDoc;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// All routes with the shared state attached
pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Account routes
        .route("/accounts/:id", get(account::get_account))
        .route("/accounts/:id/balance", get(account::get_balance))
        .route("/accounts/:id/deposit", post(account::deposit))
        .route("/accounts/:id/withdraw", post(account::withdraw))
        // Trade routes
        .route("/trades/buy", post(trade::buy))
        .route("/trades/sell", post(trade::sell))
        .route("/users/:id/papers", get(trade::get_user_papers))
        .route("/papers", get(trade::get_available_papers));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/api-docs/openapi.json", get(openapi))
        .with_state(state)
}
