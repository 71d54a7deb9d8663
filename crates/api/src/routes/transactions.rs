//! Movement routes: history, deposits, withdrawals and transfers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use tally_core::{Deposit, Transfer, TransactionsInfo, Withdrawal};
use tally_db::entities::{TransactionKind, transactions};
use tally_shared::{AccountId, Money};

use crate::AppState;
use crate::error::{ledger_error, validation_error};

/// Creates the movement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactionsInfo", get(transactions_info))
        .route("/deposit", post(deposit))
        .route("/withdraw", post(withdraw))
        .route("/transfer", post(transfer))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing an account's movements.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQuery {
    /// Account whose history is requested.
    pub account_id: AccountId,
    /// Inclusive lower bound, `YYYY-MM-DD` with an optional ` HH:MM:SS`.
    pub start_period: Option<String>,
    /// Inclusive upper bound, same format as `start_period`.
    pub end_period: Option<String>,
    /// Maximum number of movements to return, oldest kept.
    pub limit: Option<u64>,
}

/// Request body for a deposit or withdrawal.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceChangeRequest {
    /// Target account.
    pub account_id: AccountId,
    /// Amount to move, strictly positive.
    pub sum: Decimal,
}

/// Request body for a transfer.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Paying account.
    pub from: AccountId,
    /// Receiving account.
    pub to: AccountId,
    /// Amount to move, strictly positive.
    pub sum: Decimal,
}

/// Response for one recorded movement.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Movement id.
    pub id: i64,
    /// Paying account, absent for deposits.
    pub sender_id: Option<i64>,
    /// Receiving account, absent for withdrawals.
    pub recipient_id: Option<i64>,
    /// Moment the movement was recorded, UTC.
    pub time: DateTime<Utc>,
    /// Amount moved.
    pub sum: Money,
    /// Movement kind.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

impl TransactionResponse {
    /// Maps a stored movement; `None` when the stored kind code is unknown.
    fn from_model(model: transactions::Model) -> Option<Self> {
        let kind = TransactionKind::from_code(model.kind)?;
        Some(Self {
            id: model.id,
            sender_id: model.sender_id,
            recipient_id: model.recipient_id,
            time: model.transaction_time,
            sum: Money::from_minor(model.sum),
            kind,
        })
    }
}

/// Parses a period bound: a date with an optional time, midnight assumed.
fn parse_period(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(stamp.and_utc());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(date.and_time(NaiveTime::MIN).and_utc())
}

fn bad_period(raw: &str) -> axum::response::Response {
    let message =
        format!("Period bounds must look like 2024-01-31 or 2024-01-31 23:59:59, got [{raw}].");
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/transactionsInfo` - List the movements an account took part in.
async fn transactions_info(
    State(state): State<AppState>,
    Query(query): Query<TransactionsQuery>,
) -> impl IntoResponse {
    let mut request = TransactionsInfo::all(query.account_id);
    request.limit = query.limit;
    if let Some(raw) = query.start_period.as_deref() {
        match parse_period(raw) {
            Some(start) => request.start_period = Some(start),
            None => return bad_period(raw),
        }
    }
    if let Some(raw) = query.end_period.as_deref() {
        match parse_period(raw) {
            Some(end) => request.end_period = Some(end),
            None => return bad_period(raw),
        }
    }
    match state.engine.transactions_info(request).await {
        Ok(movements) => {
            let mut items = Vec::with_capacity(movements.len());
            for movement in movements {
                let id = movement.id;
                match TransactionResponse::from_model(movement) {
                    Some(item) => items.push(item),
                    None => {
                        error!(movement_id = id, "Stored movement carries an unknown kind code");
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({ "error": "An internal error occurred." })),
                        )
                            .into_response();
                    }
                }
            }
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => ledger_error(&e).into_response(),
    }
}

/// POST `/deposit` - Add funds and return the new balance.
async fn deposit(
    State(state): State<AppState>,
    Json(body): Json<BalanceChangeRequest>,
) -> impl IntoResponse {
    let request = match Deposit::new(body.account_id, body.sum) {
        Ok(request) => request,
        Err(e) => return validation_error(&e).into_response(),
    };
    match state.engine.deposit(request).await {
        Ok(balance) => (StatusCode::OK, Json(json!({ "balance": balance }))).into_response(),
        Err(e) => ledger_error(&e).into_response(),
    }
}

/// POST `/withdraw` - Remove funds and return the new balance.
async fn withdraw(
    State(state): State<AppState>,
    Json(body): Json<BalanceChangeRequest>,
) -> impl IntoResponse {
    let request = match Withdrawal::new(body.account_id, body.sum) {
        Ok(request) => request,
        Err(e) => return validation_error(&e).into_response(),
    };
    match state.engine.withdraw(request).await {
        Ok(balance) => (StatusCode::OK, Json(json!({ "balance": balance }))).into_response(),
        Err(e) => ledger_error(&e).into_response(),
    }
}

/// POST `/transfer` - Move funds between accounts and return the movement id.
async fn transfer(
    State(state): State<AppState>,
    Json(body): Json<TransferRequest>,
) -> impl IntoResponse {
    let request = match Transfer::new(body.from, body.to, body.sum) {
        Ok(request) => request,
        Err(e) => return validation_error(&e).into_response(),
    };
    match state.engine.transfer_funds(request).await {
        Ok(id) => {
            info!(transaction_id = %id, from = %body.from, to = %body.to, "Transfer completed");
            (StatusCode::OK, Json(json!({ "transactionId": id }))).into_response()
        }
        Err(e) => ledger_error(&e).into_response(),
    }
}
