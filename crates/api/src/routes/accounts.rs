//! Account lifecycle routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use tally_core::{AccountInfo, CloseAccount, CreateAccount};
use tally_db::entities::accounts;
use tally_shared::{AccountId, Money};

use crate::AppState;
use crate::error::{ledger_error, validation_error};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/createAccount", post(create_account))
        .route("/accountInfo", get(account_info))
        .route("/closeAccount", delete(close_account))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for opening an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    /// Holder's first name.
    pub first_name: String,
    /// Holder's second name.
    pub second_name: String,
    /// Opening balance; omitted means zero.
    #[serde(default)]
    pub initial_balance: Decimal,
}

/// Query parameters identifying an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountQuery {
    /// Account to look up.
    pub account_id: AccountId,
}

/// Request body for closing an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseAccountRequest {
    /// Account to close.
    pub account_id: AccountId,
}

/// Response for an account lookup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// Store-assigned account id.
    pub id: i64,
    /// Holder's first name.
    pub first_name: String,
    /// Holder's second name.
    pub second_name: String,
    /// Moment the account was opened, UTC.
    pub registered_at: DateTime<Utc>,
    /// Current balance.
    pub balance: Money,
}

impl From<accounts::Model> for AccountResponse {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            second_name: model.second_name,
            registered_at: model.registered_at,
            balance: Money::from_minor(model.balance),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/createAccount` - Open an account and return its id.
async fn create_account(
    State(state): State<AppState>,
    Json(body): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    let request = match CreateAccount::new(body.first_name, body.second_name, body.initial_balance)
    {
        Ok(request) => request,
        Err(e) => return validation_error(&e).into_response(),
    };
    match state.engine.create_account(request).await {
        Ok(id) => {
            info!(account_id = %id, "Account created");
            (StatusCode::OK, Json(json!({ "accountId": id }))).into_response()
        }
        Err(e) => ledger_error(&e).into_response(),
    }
}

/// GET `/accountInfo` - Look up one account.
async fn account_info(
    State(state): State<AppState>,
    Query(query): Query<AccountQuery>,
) -> impl IntoResponse {
    let request = AccountInfo {
        account_id: query.account_id,
    };
    match state.engine.account_info(request).await {
        Ok(account) => (StatusCode::OK, Json(AccountResponse::from(account))).into_response(),
        Err(e) => ledger_error(&e).into_response(),
    }
}

/// DELETE `/closeAccount` - Close an account; its history stays behind.
async fn close_account(
    State(state): State<AppState>,
    Json(body): Json<CloseAccountRequest>,
) -> impl IntoResponse {
    let request = CloseAccount {
        account_id: body.account_id,
    };
    match state.engine.close_account(request).await {
        Ok(()) => {
            info!(account_id = %body.account_id, "Account closed");
            (StatusCode::OK, Json(json!({}))).into_response()
        }
        Err(e) => ledger_error(&e).into_response(),
    }
}
