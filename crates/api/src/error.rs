//! Error translation at the HTTP boundary.
//!
//! Every failure leaving the service is reduced to the one-field envelope
//! `{"error": "<message>"}`. Domain rejections keep their message verbatim;
//! store-level failures are logged in full here and reported generically so
//! internals never reach clients.

use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};
use tracing::{error, warn};

use tally_core::ValidationError;
use tally_db::LedgerError;

/// Renders a request validation failure.
pub(crate) fn validation_error(err: &ValidationError) -> (StatusCode, Json<Value>) {
    warn!(error = %err, "Rejected invalid request");
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": err.to_string() })),
    )
}

/// Renders a ledger failure with the canonical status mapping.
pub(crate) fn ledger_error(err: &LedgerError) -> (StatusCode, Json<Value>) {
    let (status, message) = match err {
        LedgerError::AccountsNotFound(_) => {
            warn!(error = %err, "Request referenced missing accounts");
            (StatusCode::NOT_FOUND, err.to_string())
        }
        LedgerError::InsufficientFunds { .. } => {
            warn!(error = %err, "Request exceeded the available balance");
            (StatusCode::FORBIDDEN, err.to_string())
        }
        LedgerError::Conflict(_) => {
            error!(error = %err, "Store conflict outlived the retry budget");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "The service is busy, please retry the request.".to_owned(),
            )
        }
        LedgerError::Database(_) | LedgerError::Invariant(_) => {
            error!(error = %err, "Ledger operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred.".to_owned(),
            )
        }
    };
    (status, Json(json!({ "error": message })))
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;

    use tally_shared::{AccountId, Money};

    use super::*;

    #[test]
    fn test_domain_errors_keep_their_message() {
        let (status, body) = ledger_error(&LedgerError::AccountsNotFound(vec![
            AccountId::new(1),
            AccountId::new(2),
        ]));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.0["error"], json!("Account ids [1,2] do not exist."));

        let (status, body) = ledger_error(&LedgerError::InsufficientFunds {
            requested: Money::from_minor(1_200_000),
            available: Money::from_minor(600_000),
        });
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body.0["error"],
            json!("The requested sum [120] is greater than available balance [60].")
        );
    }

    #[test]
    fn test_store_failures_are_reported_generically() {
        let (status, body) = ledger_error(&LedgerError::Database(DbErr::Custom("boom".into())));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.0["error"], json!("An internal error occurred."));

        let (status, _) = ledger_error(&LedgerError::Conflict(DbErr::Custom("busy".into())));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, body) = ledger_error(&LedgerError::Invariant("two rows".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.0["error"], json!("An internal error occurred."));
    }

    #[test]
    fn test_validation_failures_are_bad_requests() {
        let (status, body) = validation_error(&ValidationError::NonPositiveSum);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body.0["error"],
            json!("The sum in any request must always be greater than zero.")
        );
    }
}
