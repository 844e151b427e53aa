//! Trade API handlers
//!
//! Handlers for buying and selling papers and for reading prices and
//! holdings. A rejected trade (low balance, not enough papers, unknown paper)
//! is still a successful call: the outcome code tells the client what happened.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use common::decimal::precision;
use common::model::holding::PaperPosition;
use common::model::paper::Paper;
use common::model::trade::{TradeOutcome, TradeReceipt, TradeRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::response::{ApiListResponse, ApiResponse};
use crate::error::ApiError;
use crate::AppState;

/// Buy or sell request
#[derive(Debug, Deserialize, ToSchema)]
pub struct TradeParams {
    /// Trading user
    pub user_id: Uuid,
    /// Paper name
    pub paper: String,
    /// Number of papers, must be positive
    pub quantity: i32,
}

/// Result of a trade call
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TradeResult {
    /// `executed`, `insufficient_funds`, `insufficient_holdings` or `unknown_instrument`
    pub outcome: String,
    /// Human readable outcome
    pub message: String,
    /// Execution details, present only when executed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<TradeReceipt>,
}

impl From<TradeOutcome> for TradeResult {
    fn from(outcome: TradeOutcome) -> Self {
        let outcome_code = outcome.code().to_string();
        let message = outcome.message().to_string();
        let receipt = match outcome {
            TradeOutcome::Executed(mut receipt) => {
                receipt.holdings = receipt.holdings.map(display_positions);
                Some(receipt)
            }
            _ => None,
        };

        Self {
            outcome: outcome_code,
            message,
            receipt,
        }
    }
}

fn display_positions(positions: Vec<PaperPosition>) -> Vec<PaperPosition> {
    positions
        .into_iter()
        .map(|p| PaperPosition::new(p.name, p.quantity, precision::round_display(p.price)))
        .collect()
}

async fn run(state: &AppState, request: TradeRequest) -> Result<ApiResponse<TradeResult>, ApiError> {
    let outcome = state.executor.execute(&request).await?;
    Ok(ApiResponse::new(outcome.into()))
}

/// Buy papers
#[utoipa::path(
    post,
    path = "/api/v1/trades/buy",
    request_body = TradeParams,
    responses(
        (status = 200, description = "Trade processed; see the outcome code", body = TradeResult),
        (status = 400, description = "Invalid trade request"),
        (status = 404, description = "Account not found"),
        (status = 500, description = "Storage failure or inconsistent state")
    ),
    tag = "trade"
)]
pub async fn buy(
    State(state): State<Arc<AppState>>,
    Json(params): Json<TradeParams>,
) -> Result<ApiResponse<TradeResult>, ApiError> {
    run(&state, TradeRequest::buy(params.user_id, params.paper, params.quantity)).await
}

/// Sell papers
#[utoipa::path(
    post,
    path = "/api/v1/trades/sell",
    request_body = TradeParams,
    responses(
        (status = 200, description = "Trade processed; see the outcome code", body = TradeResult),
        (status = 400, description = "Invalid trade request"),
        (status = 404, description = "Account not found"),
        (status = 500, description = "Storage failure or inconsistent state")
    ),
    tag = "trade"
)]
pub async fn sell(
    State(state): State<Arc<AppState>>,
    Json(params): Json<TradeParams>,
) -> Result<ApiResponse<TradeResult>, ApiError> {
    run(&state, TradeRequest::sell(params.user_id, params.paper, params.quantity)).await
}

/// Papers held by a user at current prices
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/papers",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Holdings marked to market"),
        (status = 500, description = "Internal server error")
    ),
    tag = "trade"
)]
pub async fn get_user_papers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<ApiListResponse<PaperPosition>, ApiError> {
    let positions = state.executor.user_papers(id).await?;
    Ok(ApiListResponse::new(display_positions(positions)))
}

/// Papers that can be traded right now
#[utoipa::path(
    get,
    path = "/api/v1/papers",
    responses(
        (status = 200, description = "Tradable papers with their current price"),
        (status = 500, description = "Internal server error")
    ),
    tag = "trade"
)]
pub async fn get_available_papers(
    State(state): State<Arc<AppState>>,
) -> Result<ApiListResponse<Paper>, ApiError> {
    let papers = state
        .executor
        .available_papers()
        .await?
        .into_iter()
        .map(|paper| {
            let price = paper.display_price();
            Paper::new(paper.name, price)
        })
        .collect();

    Ok(ApiListResponse::new(papers))
}
