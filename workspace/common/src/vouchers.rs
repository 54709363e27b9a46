use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

/// Largest bundle a single `add` or `refund` may move.
pub const MAX_OPERATION_COUNT: i32 = 1000;
/// Longest validity a single purchase may carry, in days.
pub const MAX_VALID_DAYS: i32 = 3650;
/// Length of the `voucher_histories.name` column.
pub const MAX_ENTRY_NAME_LEN: usize = 60;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct VoucherDto {
    pub id: i32,
    /// Remaining class credits
    pub count: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub last_purchase_date: Option<NaiveDate>,
    pub last_valid_days: Option<i32>,
    pub last_product_count: Option<i32>,
    /// Human readable summary, e.g. `3개 (2024-03-01~2024-03-08)`
    pub display: String,
}

/// One ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct VoucherHistoryDto {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub type_display_name: Option<String>,
    pub name: Option<String>,
    /// Signed change of the balance
    pub count: i32,
    /// Balance after the change
    pub applied_count: i32,
    /// Validity window after the change
    pub applied_date: Option<String>,
    pub created: DateTime<Utc>,
}

/// A balance change requested by staff.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum VoucherOperation {
    /// Add a purchased bundle.
    Add {
        count: i32,
        valid_days: i32,
        /// Defaults to today
        purchase_date: Option<NaiveDate>,
        name: Option<String>,
    },
    Refund {
        count: i32,
        name: Option<String>,
    },
    Expire {
        name: Option<String>,
    },
    ChangeDate {
        start_date: NaiveDate,
        end_date: NaiveDate,
        name: Option<String>,
    },
    ClassUsed {
        name: Option<String>,
    },
    ClassCancel {
        name: Option<String>,
    },
}

fn check_range(errors: &mut ValidationErrors, field: &'static str, value: i32, max: i32) {
    if !(1..=max).contains(&value) {
        let mut error = ValidationError::new("range");
        error.message = Some(Cow::Owned(format!("must be between 1 and {}", max)));
        error.add_param(Cow::Borrowed("value"), &value);
        errors.add(field, error);
    }
}

impl VoucherOperation {
    pub fn name(&self) -> Option<&str> {
        match self {
            VoucherOperation::Add { name, .. }
            | VoucherOperation::Refund { name, .. }
            | VoucherOperation::Expire { name }
            | VoucherOperation::ChangeDate { name, .. }
            | VoucherOperation::ClassUsed { name }
            | VoucherOperation::ClassCancel { name } => name.as_deref(),
        }
    }
}

impl Validate for VoucherOperation {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match self {
            VoucherOperation::Add {
                count, valid_days, ..
            } => {
                check_range(&mut errors, "count", *count, MAX_OPERATION_COUNT);
                check_range(&mut errors, "valid_days", *valid_days, MAX_VALID_DAYS);
            }
            VoucherOperation::Refund { count, .. } => {
                check_range(&mut errors, "count", *count, MAX_OPERATION_COUNT);
            }
            _ => {}
        }
        if self
            .name()
            .is_some_and(|name| name.chars().count() > MAX_ENTRY_NAME_LEN)
        {
            let mut error = ValidationError::new("length");
            error.message = Some(Cow::Owned(format!(
                "must be at most {} characters",
                MAX_ENTRY_NAME_LEN
            )));
            errors.add("name", error);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Voucher state after an operation together with the ledger entry it wrote.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct VoucherStatementDto {
    pub voucher: VoucherDto,
    pub entry: VoucherHistoryDto,
}
