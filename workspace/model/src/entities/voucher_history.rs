use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::custom_user;

/// Kind of balance change recorded in the voucher ledger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum VoucherHistoryType {
    #[sea_orm(string_value = "voucher_add")]
    VoucherAdd,
    #[sea_orm(string_value = "voucher_refund")]
    VoucherRefund,
    #[sea_orm(string_value = "voucher_expiration")]
    VoucherExpiration,
    #[sea_orm(string_value = "class_used")]
    ClassUsed,
    #[sea_orm(string_value = "class_cancel")]
    ClassCancel,
    #[sea_orm(string_value = "change_date")]
    ChangeDate,
}

impl VoucherHistoryType {
    /// Stored value of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VoucherAdd => "voucher_add",
            Self::VoucherRefund => "voucher_refund",
            Self::VoucherExpiration => "voucher_expiration",
            Self::ClassUsed => "class_used",
            Self::ClassCancel => "class_cancel",
            Self::ChangeDate => "change_date",
        }
    }

    /// Label shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Self::VoucherAdd => "수강권 추가",
            Self::VoucherRefund => "수강권 환불",
            Self::VoucherExpiration => "수강권 만료",
            Self::ClassUsed => "수업 예약",
            Self::ClassCancel => "수업 예약 취소",
            Self::ChangeDate => "기간 변경",
        }
    }
}

/// One entry of the append-only voucher ledger.
///
/// `count` is the signed change and `applied_count` the balance right after
/// the change; `applied_date` is the validity window after the change.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "voucher_histories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    #[sea_orm(column_name = "type")]
    pub kind: Option<VoucherHistoryType>,
    /// Description shown to the user.
    pub name: Option<String>,
    #[sea_orm(default_value = "0")]
    pub count: i32,
    #[sea_orm(default_value = "0")]
    pub applied_count: i32,
    pub applied_date: Option<String>,
    pub created: DateTimeUtc,
    pub modified: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "custom_user::Entity",
        from = "Column::UserId",
        to = "custom_user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<custom_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

timestamped_behavior!();

impl Model {
    pub fn type_display_name(&self) -> Option<&'static str> {
        self.kind.map(|kind| kind.label())
    }

    /// `"{username}-{type}/{name}"`, the way staff see an entry next to its owner.
    pub fn describe(&self, owner: &custom_user::Model) -> String {
        format!(
            "{}-{}/{}",
            owner,
            self.type_display_name().unwrap_or_default(),
            self.name.as_deref().unwrap_or_default()
        )
    }
}

impl fmt::Display for VoucherHistoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
