//! The ledger engine: every account and transaction operation, executed
//! against the store.
//!
//! Mutating operations run inside an explicit store transaction and are
//! retried a bounded number of times when the store reports a transient
//! conflict, so a momentary lock or serialization failure never surfaces to
//! callers as a hard error. Domain rejections roll the transaction back on
//! the spot and are never retried.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbBackend, DbErr, EntityTrait, IsolationLevel, QueryFilter, QueryOrder,
    QuerySelect, RuntimeErr, TransactionTrait,
};
use tracing::warn;

use tally_core::{
    AccountInfo, Clock, CloseAccount, CreateAccount, Deposit, Transfer, TransactionsInfo,
    Withdrawal,
};
use tally_shared::{AccountId, Money, TransactionId};

use crate::entities::transactions::TransactionKind;
use crate::entities::{accounts, transactions};

/// Upper bound on attempts for one mutating operation, first try included.
const MAX_ATTEMPTS: u32 = 5;

/// Pause between attempts. Kept short and fixed; the bound on attempts is
/// what keeps the loop from spinning forever.
const RETRY_BACKOFF: Duration = Duration::from_millis(20);

/// Errors surfaced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// One or more referenced accounts do not exist. Ids are listed in
    /// ascending order.
    #[error("Account ids {} do not exist.", fmt_ids(.0))]
    AccountsNotFound(Vec<AccountId>),

    /// A withdrawal or transfer asked for more than the paying account holds.
    #[error("The requested sum [{requested}] is greater than available balance [{available}].")]
    InsufficientFunds {
        /// Amount the request asked to move.
        requested: Money,
        /// Balance the paying account actually held.
        available: Money,
    },

    /// A store conflict persisted through every retry attempt.
    #[error("Store conflict persisted across retries: {0}")]
    Conflict(#[source] DbErr),

    /// Non-transient store failure.
    #[error("Database error: {0}")]
    Database(#[source] DbErr),

    /// State the engine considers unreachable. Indicates a corrupted store.
    #[error("Ledger invariant violated: {0}")]
    Invariant(String),
}

impl From<DbErr> for LedgerError {
    fn from(err: DbErr) -> Self {
        if is_transient(&err) {
            Self::Conflict(err)
        } else {
            Self::Database(err)
        }
    }
}

fn fmt_ids(ids: &[AccountId]) -> String {
    let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!("[{}]", ids.join(","))
}

/// Splits store errors into those worth another attempt and those that are
/// final. Serialization failures and deadlocks on Postgres and the busy or
/// locked families on SQLite abort before anything commits, so replaying
/// them is safe. An I/O failure is final: the connection can drop with a
/// commit already in flight, and replaying that attempt could apply a
/// movement twice.
fn is_transient(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::RecordNotUpdated => true,
        DbErr::Conn(err) | DbErr::Exec(err) | DbErr::Query(err) => runtime_is_transient(err),
        _ => false,
    }
}

fn runtime_is_transient(err: &RuntimeErr) -> bool {
    let RuntimeErr::SqlxError(err) = err else {
        return false;
    };
    match err {
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(err) => {
            // Postgres 40001/40P01; SQLite BUSY and LOCKED extended codes.
            err.code().is_some_and(|code| {
                matches!(
                    code.as_ref(),
                    "40001" | "40P01" | "5" | "6" | "261" | "262" | "517"
                )
            }) || err.message().contains("database is locked")
        }
        _ => false,
    }
}

/// Executes ledger operations against the store.
///
/// Holds the process-wide connection pool and the injected clock, nothing
/// else. Cloning is cheap and every clone shares the same pool, so one
/// engine value can serve all handlers.
#[derive(Clone)]
pub struct LedgerEngine {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
}

impl LedgerEngine {
    /// Creates an engine over an established pool. The clock stamps every
    /// recorded movement and account registration.
    #[must_use]
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Opens an account and returns its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the insert.
    pub async fn create_account(&self, req: CreateAccount) -> Result<AccountId, LedgerError> {
        let req = &req;
        retrying("create_account", || async move {
            let account = accounts::ActiveModel {
                first_name: Set(req.first_name().to_owned()),
                second_name: Set(req.second_name().to_owned()),
                registered_at: Set(self.clock.now()),
                balance: Set(req.initial_balance().minor()),
                ..Default::default()
            }
            .insert(&self.db)
            .await?;
            Ok(AccountId::new(account.id))
        })
        .await
    }

    /// Closes an account by deleting its row. Remaining funds are discarded
    /// with the row; recorded transactions keep referencing the dead id.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AccountsNotFound`] if no such account exists.
    pub async fn close_account(&self, req: CloseAccount) -> Result<(), LedgerError> {
        retrying("close_account", || async move {
            let txn = self.begin().await?;
            let res = accounts::Entity::delete_by_id(req.account_id.get())
                .exec(&txn)
                .await?;
            match res.rows_affected {
                1 => {
                    txn.commit().await?;
                    Ok(())
                }
                0 => {
                    txn.rollback().await?;
                    Err(LedgerError::AccountsNotFound(vec![req.account_id]))
                }
                n => {
                    txn.rollback().await?;
                    Err(LedgerError::Invariant(format!(
                        "deleting account {} removed {n} rows",
                        req.account_id
                    )))
                }
            }
        })
        .await
    }

    /// Reads one account's current state.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AccountsNotFound`] if no such account exists.
    pub async fn account_info(&self, req: AccountInfo) -> Result<accounts::Model, LedgerError> {
        let account = accounts::Entity::find_by_id(req.account_id.get())
            .one(&self.db)
            .await?;
        account.ok_or_else(|| LedgerError::AccountsNotFound(vec![req.account_id]))
    }

    /// Lists the movements an account took part in, on either side, oldest
    /// first with ids breaking timestamp ties. Period bounds are inclusive.
    /// An account with no history, including one that never existed, yields
    /// an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the query.
    pub async fn transactions_info(
        &self,
        req: TransactionsInfo,
    ) -> Result<Vec<transactions::Model>, LedgerError> {
        let mut query = transactions::Entity::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::SenderId.eq(req.account_id.get()))
                    .add(transactions::Column::RecipientId.eq(req.account_id.get())),
            )
            .order_by_asc(transactions::Column::TransactionTime)
            .order_by_asc(transactions::Column::Id);
        if let Some(start) = req.start_period {
            query = query.filter(transactions::Column::TransactionTime.gte(start));
        }
        if let Some(end) = req.end_period {
            query = query.filter(transactions::Column::TransactionTime.lte(end));
        }
        if let Some(limit) = req.limit {
            query = query.limit(limit);
        }
        let movements = query.all(&self.db).await?;
        Ok(movements)
    }

    /// Adds funds to an account and returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AccountsNotFound`] if no such account exists.
    pub async fn deposit(&self, req: Deposit) -> Result<Money, LedgerError> {
        retrying("deposit", || async move { self.try_deposit(req).await }).await
    }

    /// Removes funds from an account and returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AccountsNotFound`] if no such account exists,
    /// or [`LedgerError::InsufficientFunds`] if the balance cannot cover the
    /// requested sum.
    pub async fn withdraw(&self, req: Withdrawal) -> Result<Money, LedgerError> {
        retrying("withdraw", || async move { self.try_withdraw(req).await }).await
    }

    /// Moves funds between two accounts and returns the id of the recorded
    /// movement.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AccountsNotFound`] naming every missing
    /// endpoint, or [`LedgerError::InsufficientFunds`] if the sender cannot
    /// cover the sum.
    pub async fn transfer_funds(&self, req: Transfer) -> Result<TransactionId, LedgerError> {
        retrying("transfer", || async move { self.try_transfer(req).await }).await
    }

    async fn try_deposit(&self, req: Deposit) -> Result<Money, LedgerError> {
        let txn = self.begin().await?;
        let Some(account) = load_account(&txn, req.account_id()).await? else {
            txn.rollback().await?;
            return Err(LedgerError::AccountsNotFound(vec![req.account_id()]));
        };
        let Some(new_balance) = Money::from_minor(account.balance).checked_add(req.sum()) else {
            txn.rollback().await?;
            return Err(LedgerError::Invariant(format!(
                "deposit overflows the balance of account {}",
                req.account_id()
            )));
        };
        write_balance(&txn, account, new_balance).await?;
        record_movement(
            &txn,
            Movement {
                sender_id: None,
                recipient_id: Some(req.account_id()),
                sum: req.sum(),
                kind: TransactionKind::Deposit,
            },
            self.clock.now(),
        )
        .await?;
        txn.commit().await?;
        Ok(new_balance)
    }

    async fn try_withdraw(&self, req: Withdrawal) -> Result<Money, LedgerError> {
        let txn = self.begin().await?;
        let Some(account) = load_account(&txn, req.account_id()).await? else {
            txn.rollback().await?;
            return Err(LedgerError::AccountsNotFound(vec![req.account_id()]));
        };
        let available = Money::from_minor(account.balance);
        if available < req.sum() {
            txn.rollback().await?;
            return Err(LedgerError::InsufficientFunds {
                requested: req.sum(),
                available,
            });
        }
        // The guard above keeps the difference non-negative.
        let new_balance = Money::from_minor(available.minor() - req.sum().minor());
        write_balance(&txn, account, new_balance).await?;
        record_movement(
            &txn,
            Movement {
                sender_id: Some(req.account_id()),
                recipient_id: None,
                sum: req.sum(),
                kind: TransactionKind::Withdraw,
            },
            self.clock.now(),
        )
        .await?;
        txn.commit().await?;
        Ok(new_balance)
    }

    async fn try_transfer(&self, req: Transfer) -> Result<TransactionId, LedgerError> {
        let txn = self.begin().await?;
        let endpoints = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in([req.from().get(), req.to().get()]))
            .all(&txn)
            .await?;
        let mut sender = None;
        let mut recipient = None;
        // From and to are distinct by construction, so each row matches
        // exactly one side.
        for account in endpoints {
            if account.id == req.from().get() {
                sender = Some(account);
            } else {
                recipient = Some(account);
            }
        }
        let (sender, recipient) = match (sender, recipient) {
            (Some(sender), Some(recipient)) => (sender, recipient),
            (sender, recipient) => {
                let mut missing = Vec::new();
                if sender.is_none() {
                    missing.push(req.from());
                }
                if recipient.is_none() {
                    missing.push(req.to());
                }
                missing.sort_unstable();
                txn.rollback().await?;
                return Err(LedgerError::AccountsNotFound(missing));
            }
        };
        let available = Money::from_minor(sender.balance);
        if available < req.sum() {
            txn.rollback().await?;
            return Err(LedgerError::InsufficientFunds {
                requested: req.sum(),
                available,
            });
        }
        let Some(credited) = Money::from_minor(recipient.balance).checked_add(req.sum()) else {
            txn.rollback().await?;
            return Err(LedgerError::Invariant(format!(
                "transfer overflows the balance of account {}",
                req.to()
            )));
        };
        // The funds guard above keeps the debit non-negative.
        let debited = Money::from_minor(available.minor() - req.sum().minor());
        write_balance(&txn, sender, debited).await?;
        write_balance(&txn, recipient, credited).await?;
        let recorded = record_movement(
            &txn,
            Movement {
                sender_id: Some(req.from()),
                recipient_id: Some(req.to()),
                sum: req.sum(),
                kind: TransactionKind::Transfer,
            },
            self.clock.now(),
        )
        .await?;
        txn.commit().await?;
        Ok(TransactionId::new(recorded.id))
    }

    /// Opens a store transaction strong enough for balance read-then-write.
    /// SQLite transactions are always serializable and reject an explicit
    /// isolation level, so only other backends ask for REPEATABLE READ.
    async fn begin(&self) -> Result<DatabaseTransaction, LedgerError> {
        let txn = match self.db.get_database_backend() {
            DbBackend::Sqlite => self.db.begin().await?,
            _ => {
                self.db
                    .begin_with_config(Some(IsolationLevel::RepeatableRead), None)
                    .await?
            }
        };
        Ok(txn)
    }
}

/// Runs one mutating operation until it succeeds, fails for a domain
/// reason, or exhausts the attempt budget on store conflicts.
async fn retrying<T, F, Fut>(op: &'static str, mut body: F) -> Result<T, LedgerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LedgerError>>,
{
    let mut attempt = 1;
    loop {
        match body().await {
            Err(LedgerError::Conflict(err)) if attempt < MAX_ATTEMPTS => {
                warn!(operation = op, attempt, error = %err, "Retrying after store conflict");
                attempt += 1;
                tokio::time::sleep(RETRY_BACKOFF).await;
            }
            other => return other,
        }
    }
}

/// Row content for one recorded movement; the timestamp is supplied by the
/// engine's clock at insert time.
struct Movement {
    sender_id: Option<AccountId>,
    recipient_id: Option<AccountId>,
    sum: Money,
    kind: TransactionKind,
}

async fn load_account(
    txn: &DatabaseTransaction,
    id: AccountId,
) -> Result<Option<accounts::Model>, LedgerError> {
    let account = accounts::Entity::find_by_id(id.get()).one(txn).await?;
    Ok(account)
}

async fn write_balance(
    txn: &DatabaseTransaction,
    account: accounts::Model,
    balance: Money,
) -> Result<(), LedgerError> {
    let mut active: accounts::ActiveModel = account.into();
    active.balance = Set(balance.minor());
    active.update(txn).await?;
    Ok(())
}

async fn record_movement(
    txn: &DatabaseTransaction,
    movement: Movement,
    time: DateTime<Utc>,
) -> Result<transactions::Model, LedgerError> {
    let recorded = transactions::ActiveModel {
        sender_id: Set(movement.sender_id.map(AccountId::get)),
        recipient_id: Set(movement.recipient_id.map(AccountId::get)),
        transaction_time: Set(time),
        sum: Set(movement.sum.minor()),
        kind: Set(movement.kind.code()),
        ..Default::default()
    }
    .insert(txn)
    .await?;
    Ok(recorded)
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
