use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use std::fmt;

use super::custom_user;

/// Default validity of a purchased bundle, in days.
pub const DEFAULT_VALID_DAYS: i32 = 7;

/// Class credit balance of a user together with its validity window.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vouchers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Remaining class credits.
    #[sea_orm(default_value = "0")]
    pub count: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub last_purchase_date: Option<NaiveDate>,
    /// Validity (days) of the last purchased bundle.
    pub last_valid_days: Option<i32>,
    /// Size of the last purchased bundle.
    pub last_product_count: Option<i32>,
    pub created: DateTimeUtc,
    pub modified: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "custom_user::Entity")]
    Owner,
}

impl Related<custom_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

timestamped_behavior!();

impl Model {
    /// The validity window rendered as `start~end`, if the voucher has one.
    pub fn window(&self) -> Option<String> {
        format_window(self.start_date, self.end_date)
    }

    /// Whether `day` falls inside the validity window.
    ///
    /// A voucher without dates never expires.
    pub fn is_valid_on(&self, day: NaiveDate) -> bool {
        let after_start = self.start_date.is_none_or(|start| start <= day);
        let before_end = self.end_date.is_none_or(|end| day <= end);
        after_start && before_end
    }
}

/// Renders a validity window, `None` when neither bound is set.
pub fn format_window(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<String> {
    if start.is_none() && end.is_none() {
        return None;
    }
    let fmt_day = |day: Option<NaiveDate>| day.map(|d| d.to_string()).unwrap_or_default();
    Some(format!("{}~{}", fmt_day(start), fmt_day(end)))
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start_date {
            Some(start) => {
                let end = self.end_date.map(|d| d.to_string()).unwrap_or_default();
                write!(f, "{}개 ({}~{})", self.count, start, end)
            }
            None => write!(f, "{}개 (기간 없음)", self.count),
        }
    }
}
