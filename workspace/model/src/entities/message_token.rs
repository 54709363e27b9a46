use sea_orm::entity::prelude::*;

use super::custom_user;

/// A push notification (FCM) token registered by a device.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "message_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    #[sea_orm(column_type = "Text", unique)]
    pub fcm_token: String,
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
