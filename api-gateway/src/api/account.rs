//! Account API handlers
//!
//! Handles endpoints related to the cash balance:
//! - Get account details
//! - Get the balance
//! - Deposit and withdraw funds

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use common::decimal::Amount;
use common::model::account::Account;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::response::ApiResponse;
use crate::error::ApiError;
use crate::AppState;

/// Cash balance of a user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceView {
    /// Account ID
    pub user_id: Uuid,
    /// Cash balance
    pub balance: Amount,
}

/// Deposit or withdraw request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CashRequest {
    /// Amount, must be positive
    pub amount: Amount,
}

/// Get an account by ID
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Account details retrieved successfully"),
        (status = 404, description = "Account not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Account>, ApiError> {
    let account = state.account_service.get_account(id).await?
        .ok_or_else(|| ApiError::NotFound(format!("Account not found: {}", id)))?;

    Ok(ApiResponse::new(account))
}

/// Get the cash balance of an account
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}/balance",
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Balance retrieved successfully", body = BalanceView),
        (status = 404, description = "Account not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<BalanceView>, ApiError> {
    let balance = state.account_service.get_balance(id).await?;

    Ok(ApiResponse::new(BalanceView { user_id: id, balance }))
}

/// Deposit funds into an account
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/deposit",
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    request_body = CashRequest,
    responses(
        (status = 200, description = "Funds deposited successfully", body = BalanceView),
        (status = 404, description = "Account not found"),
        (status = 400, description = "Invalid deposit request"),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<CashRequest>,
) -> Result<ApiResponse<BalanceView>, ApiError> {
    let balance = state.account_service.deposit(id, request.amount).await?;
    info!("Deposited {} to {}", request.amount, id);

    Ok(ApiResponse::new(BalanceView { user_id: id, balance }))
}

/// Withdraw funds from an account
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/withdraw",
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    request_body = CashRequest,
    responses(
        (status = 200, description = "Funds withdrawn successfully", body = BalanceView),
        (status = 404, description = "Account not found"),
        (status = 400, description = "Invalid withdrawal request or insufficient funds"),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<CashRequest>,
) -> Result<ApiResponse<BalanceView>, ApiError> {
    let balance = state.account_service.withdraw(id, request.amount).await?;
    info!("Withdrew {} from {}", request.amount, id);

    Ok(ApiResponse::new(BalanceView { user_id: id, balance }))
}
