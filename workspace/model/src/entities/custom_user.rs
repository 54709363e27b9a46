use sea_orm::entity::prelude::*;
use std::fmt;

use super::{message_token, teacher_group, voucher, voucher_history};

/// Country prefix that gets a domestic trunk zero when displayed.
const KOREAN_COUNTRY_PREFIX: &str = "+82";

/// An account of the booking service.
///
/// The email address is the login identifier. Role flags (`is_teacher`,
/// `is_operator`, `is_staff`, `is_superuser`) and the social login flags are
/// independent booleans, so one account can hold several roles at once.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Argon2 PHC string, an unusable marker starting with `!`, or `-` once withdrawn.
    pub password: String,
    pub last_login: Option<DateTimeUtc>,
    #[sea_orm(default_value = "false")]
    pub is_superuser: bool,
    /// Display name (the messenger name for social accounts).
    pub username: Option<String>,
    /// Name given when booking a class.
    pub reservation_username: Option<String>,
    #[sea_orm(unique)]
    pub email: String,
    pub phone_number: Option<String>,
    #[sea_orm(default_value = "false")]
    pub is_staff: bool,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    pub date_joined: DateTimeUtc,
    #[sea_orm(default_value = "false")]
    pub is_kakao: bool,
    #[sea_orm(default_value = "false")]
    pub is_facebook: bool,
    #[sea_orm(default_value = "false")]
    pub is_google: bool,
    #[sea_orm(default_value = "false")]
    pub is_teacher: bool,
    #[sea_orm(default_value = "false")]
    pub is_operator: bool,
    #[sea_orm(default_value = "false")]
    pub done_tutorial: bool,
    pub postcode: Option<String>,
    pub address: Option<String>,
    pub teacher_group_id: Option<i32>,
    pub voucher_id: Option<i32>,
    #[sea_orm(column_type = "Text")]
    pub staff_memo: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "teacher_group::Entity",
        from = "Column::TeacherGroupId",
        to = "teacher_group::Column::Id",
        on_delete = "SetNull"
    )]
    TeacherGroup,
    #[sea_orm(
        belongs_to = "voucher::Entity",
        from = "Column::VoucherId",
        to = "voucher::Column::Id",
        on_delete = "SetNull"
    )]
    Voucher,
    #[sea_orm(has_many = "voucher_history::Entity")]
    VoucherHistory,
    #[sea_orm(has_many = "message_token::Entity")]
    MessageToken,
}

impl Related<teacher_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeacherGroup.def()
    }
}

impl Related<voucher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Voucher.def()
    }
}

impl Related<voucher_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoucherHistory.def()
    }
}

impl Related<message_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MessageToken.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Phone number as shown to staff.
    ///
    /// Korean international numbers get the trunk zero back, so
    /// `+821012345678` becomes `+82 01012345678`.
    pub fn formatted_phone_number(&self) -> Option<String> {
        self.phone_number.as_deref().map(format_phone_number)
    }
}

/// Formats a raw phone number, see [`Model::formatted_phone_number`].
pub fn format_phone_number(phone_number: &str) -> String {
    match phone_number.strip_prefix(KOREAN_COUNTRY_PREFIX) {
        Some(rest) => format!("{} 0{}", KOREAN_COUNTRY_PREFIX, rest),
        None => phone_number.to_string(),
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username.as_deref().unwrap_or_default())
    }
}
