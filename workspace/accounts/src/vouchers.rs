//! Voucher balance bookkeeping.
//!
//! Every balance change goes through [`VoucherLedger`], which updates the
//! voucher and appends one `voucher_histories` row in the same transaction.
//! The row's `applied_count` is the balance after the change and its
//! `applied_date` the validity window after the change, so replaying the
//! ledger of a user always ends at the current voucher state.

use chrono::{Duration, NaiveDate};
use model::entities::{
    custom_user::{self, Entity as CustomUser},
    voucher::{self, Entity as Voucher},
    voucher_history::{self, Entity as VoucherHistory, VoucherHistoryType},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{AccountsError, Result};

/// Voucher state after a change together with the ledger entry it wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherStatement {
    pub voucher: voucher::Model,
    pub entry: voucher_history::Model,
}

/// A purchase recorded on the voucher.
#[derive(Debug, Clone, Copy)]
struct Purchase {
    date: NaiveDate,
    valid_days: i32,
    product_count: i32,
}

/// The effect of one operation on a voucher.
#[derive(Debug, Clone, Copy)]
struct Change {
    delta: i32,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    purchase: Option<Purchase>,
}

impl Change {
    /// A balance change that keeps the current window.
    fn delta(voucher: &voucher::Model, delta: i32) -> Self {
        Self {
            delta,
            start_date: voucher.start_date,
            end_date: voucher.end_date,
            purchase: None,
        }
    }
}

/// Applies balance changes to users' vouchers.
#[derive(Debug, Clone, Copy)]
pub struct VoucherLedger<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> VoucherLedger<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds a purchased bundle of `count` classes valid for `valid_days`.
    ///
    /// If the current window is still open on `purchase_date` it is extended
    /// by `valid_days`; otherwise a new window starts on `purchase_date`.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        user_id: i32,
        count: i32,
        valid_days: i32,
        purchase_date: NaiveDate,
        name: Option<String>,
    ) -> Result<VoucherStatement> {
        if count <= 0 {
            return Err(AccountsError::InvalidCount(count));
        }
        if valid_days <= 0 {
            return Err(AccountsError::InvalidCount(valid_days));
        }

        self.apply(user_id, VoucherHistoryType::VoucherAdd, name, |voucher| {
            let (start_date, end_date) = match (voucher.start_date, voucher.end_date) {
                (start, Some(end)) if end >= purchase_date => {
                    (start.or(Some(purchase_date)), add_days(end, valid_days)?)
                }
                _ => (Some(purchase_date), add_days(purchase_date, valid_days - 1)?),
            };
            Ok(Change {
                delta: count,
                start_date,
                end_date: Some(end_date),
                purchase: Some(Purchase {
                    date: purchase_date,
                    valid_days,
                    product_count: count,
                }),
            })
        })
        .await
    }

    /// Takes `count` classes back out of the balance.
    #[instrument(skip(self))]
    pub async fn refund(
        &self,
        user_id: i32,
        count: i32,
        name: Option<String>,
    ) -> Result<VoucherStatement> {
        if count <= 0 {
            return Err(AccountsError::InvalidCount(count));
        }

        self.apply(user_id, VoucherHistoryType::VoucherRefund, name, |voucher| {
            if voucher.count < count {
                return Err(AccountsError::InsufficientBalance {
                    available: voucher.count,
                    requested: count,
                });
            }
            Ok(Change::delta(voucher, -count))
        })
        .await
    }

    /// Drops the whole remaining balance.
    #[instrument(skip(self))]
    pub async fn expire(&self, user_id: i32, name: Option<String>) -> Result<VoucherStatement> {
        self.apply(user_id, VoucherHistoryType::VoucherExpiration, name, |voucher| {
            Ok(Change::delta(voucher, -voucher.count))
        })
        .await
    }

    /// Spends one class for a booking made on `today`.
    #[instrument(skip(self))]
    pub async fn use_class(
        &self,
        user_id: i32,
        today: NaiveDate,
        name: Option<String>,
    ) -> Result<VoucherStatement> {
        self.apply(user_id, VoucherHistoryType::ClassUsed, name, |voucher| {
            if voucher.count < 1 {
                return Err(AccountsError::InsufficientBalance {
                    available: voucher.count,
                    requested: 1,
                });
            }
            if !voucher.is_valid_on(today) {
                return Err(AccountsError::VoucherExpired(today));
            }
            Ok(Change::delta(voucher, -1))
        })
        .await
    }

    /// Gives back the class of a cancelled booking.
    #[instrument(skip(self))]
    pub async fn cancel_class(
        &self,
        user_id: i32,
        name: Option<String>,
    ) -> Result<VoucherStatement> {
        self.apply(user_id, VoucherHistoryType::ClassCancel, name, |voucher| {
            Ok(Change::delta(voucher, 1))
        })
        .await
    }

    /// Moves the validity window without touching the balance.
    #[instrument(skip(self))]
    pub async fn change_date(
        &self,
        user_id: i32,
        start_date: NaiveDate,
        end_date: NaiveDate,
        name: Option<String>,
    ) -> Result<VoucherStatement> {
        if start_date > end_date {
            return Err(AccountsError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }

        self.apply(user_id, VoucherHistoryType::ChangeDate, name, |_| {
            Ok(Change {
                delta: 0,
                start_date: Some(start_date),
                end_date: Some(end_date),
                purchase: None,
            })
        })
        .await
    }

    /// Expires every voucher whose window ended before `today` while
    /// credits were left. Returns how many vouchers were expired.
    #[instrument(skip(self))]
    pub async fn expire_due(&self, today: NaiveDate) -> Result<usize> {
        let due = Voucher::find()
            .filter(voucher::Column::Count.gt(0))
            .filter(voucher::Column::EndDate.lt(today))
            .order_by_asc(voucher::Column::Id)
            .all(self.db)
            .await?;
        debug!("{} vouchers past their end date", due.len());

        let mut expired = 0;
        for voucher in due {
            let owner = CustomUser::find()
                .filter(custom_user::Column::VoucherId.eq(voucher.id))
                .order_by_asc(custom_user::Column::Id)
                .one(self.db)
                .await?;
            match owner {
                Some(owner) => {
                    self.expire(owner.id, None).await?;
                    expired += 1;
                }
                None => warn!(voucher_id = voucher.id, "Skipping voucher without owner"),
            }
        }

        info!("Expired {} vouchers as of {}", expired, today);
        Ok(expired)
    }

    async fn apply<F>(
        &self,
        user_id: i32,
        kind: VoucherHistoryType,
        name: Option<String>,
        change: F,
    ) -> Result<VoucherStatement>
    where
        F: FnOnce(&voucher::Model) -> Result<Change>,
    {
        let txn = self.db.begin().await?;

        let user = CustomUser::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or(AccountsError::UserNotFound(user_id))?;
        let current = voucher_of(&txn, user).await?;

        let change = change(&current)?;
        let applied_count = current
            .count
            .checked_add(change.delta)
            .ok_or(AccountsError::InvalidCount(change.delta))?;
        if applied_count < 0 {
            return Err(AccountsError::InsufficientBalance {
                available: current.count,
                requested: -change.delta,
            });
        }

        let mut active = current.into_active_model();
        active.count = Set(applied_count);
        active.start_date = Set(change.start_date);
        active.end_date = Set(change.end_date);
        if let Some(purchase) = change.purchase {
            active.last_purchase_date = Set(Some(purchase.date));
            active.last_valid_days = Set(Some(purchase.valid_days));
            active.last_product_count = Set(Some(purchase.product_count));
        }
        let voucher = active.update(&txn).await?;

        let entry = voucher_history::ActiveModel {
            user_id: Set(user_id),
            kind: Set(Some(kind)),
            name: Set(Some(name.unwrap_or_else(|| kind.label().to_string()))),
            count: Set(change.delta),
            applied_count: Set(voucher.count),
            applied_date: Set(voucher.window()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            user_id,
            kind = kind.as_str(),
            delta = change.delta,
            applied_count = voucher.count,
            "Voucher updated"
        );
        Ok(VoucherStatement { voucher, entry })
    }
}

/// The user's voucher, created empty on first use.
async fn voucher_of(txn: &DatabaseTransaction, user: custom_user::Model) -> Result<voucher::Model> {
    if let Some(voucher_id) = user.voucher_id {
        if let Some(voucher) = Voucher::find_by_id(voucher_id).one(txn).await? {
            return Ok(voucher);
        }
        warn!(user_id = user.id, voucher_id, "Voucher reference is dangling");
    }

    let voucher = voucher::ActiveModel {
        count: Set(0),
        last_valid_days: Set(Some(voucher::DEFAULT_VALID_DAYS)),
        last_product_count: Set(Some(0)),
        ..Default::default()
    }
    .insert(txn)
    .await?;
    debug!(user_id = user.id, voucher_id = voucher.id, "Created voucher");

    let mut user = user.into_active_model();
    user.voucher_id = Set(Some(voucher.id));
    user.update(txn).await?;

    Ok(voucher)
}

fn add_days(day: NaiveDate, days: i32) -> Result<NaiveDate> {
    day.checked_add_signed(Duration::days(i64::from(days)))
        .ok_or(AccountsError::InvalidCount(days))
}

/// The voucher of a user, if one was ever created.
pub async fn voucher_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Option<voucher::Model>> {
    let user = CustomUser::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(AccountsError::UserNotFound(user_id))?;
    match user.voucher_id {
        Some(voucher_id) => Ok(Voucher::find_by_id(voucher_id).one(db).await?),
        None => Ok(None),
    }
}

/// Ledger entries of a user, newest first.
pub async fn history_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<voucher_history::Model>> {
    Ok(VoucherHistory::find()
        .filter(voucher_history::Column::UserId.eq(user_id))
        .order_by_desc(voucher_history::Column::Id)
        .all(db)
        .await?)
}
