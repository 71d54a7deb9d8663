//! `SeaORM` Entity for the `t_accounts` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One ledger account row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "t_accounts")]
pub struct Model {
    /// Store-assigned identifier, never reused within one database.
    #[sea_orm(primary_key)]
    pub id: i64,
    pub first_name: String,
    pub second_name: String,
    pub registered_at: DateTimeUtc,
    /// Current balance in minor units. A CHECK constraint keeps it non-negative.
    pub balance: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
