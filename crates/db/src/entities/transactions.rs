//! `SeaORM` Entity for the `t_transactions` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One recorded movement of funds. Rows are append-only and outlive the
/// accounts they reference, so closed accounts keep their history.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "t_transactions")]
pub struct Model {
    /// Store-assigned identifier, strictly increasing per database.
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Paying account, absent for deposits.
    pub sender_id: Option<i64>,
    /// Receiving account, absent for withdrawals.
    pub recipient_id: Option<i64>,
    pub transaction_time: DateTimeUtc,
    /// Amount moved in minor units, always strictly positive.
    pub sum: i64,
    /// Stored `TransactionKind` code.
    #[sea_orm(column_name = "type")]
    pub kind: i16,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Discriminates the three movement kinds recorded in `t_transactions`.
///
/// The stored codes predate this service and must not change: `-1` for
/// withdrawals, `0` for transfers, `1` for deposits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    /// Funds removed from an account; no recipient.
    Withdraw,
    /// Funds moved between two accounts.
    Transfer,
    /// Funds added to an account; no sender.
    Deposit,
}

impl TransactionKind {
    /// Returns the code stored in the `type` column.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Withdraw => -1,
            Self::Transfer => 0,
            Self::Deposit => 1,
        }
    }

    /// Maps a stored code back to its kind. Unknown codes indicate a
    /// corrupted row and are left to the caller to report.
    #[must_use]
    pub const fn from_code(code: i16) -> Option<Self> {
        match code {
            -1 => Some(Self::Withdraw),
            0 => Some(Self::Transfer),
            1 => Some(Self::Deposit),
            _ => None,
        }
    }
}
