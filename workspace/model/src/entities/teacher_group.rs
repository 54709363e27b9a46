use sea_orm::entity::prelude::*;
use std::fmt;

use super::custom_user;

/// A named grouping of teachers, e.g. a branch or a curriculum team.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "teacher_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: Option<String>,
    pub created: DateTimeUtc,
    pub modified: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "custom_user::Entity")]
    Member,
}

impl Related<custom_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

timestamped_behavior!();

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name.as_deref().unwrap_or_default())
    }
}
