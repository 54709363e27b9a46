//! Role views over the `users` table.
//!
//! Customers, teachers, staff and operators share one table. Each role is a
//! filter over the account flags rather than a table of its own, so an
//! account can show up under several roles.

use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, Select};
use std::fmt;
use std::str::FromStr;

use crate::entities::custom_user::{self, Column};

/// A role view over the accounts table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Social login accounts that are neither staff nor superusers.
    Customer,
    Teacher,
    /// Staff members and superusers.
    Staff,
    Operator,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Customer, Role::Teacher, Role::Staff, Role::Operator];

    /// Filter selecting the accounts of this role.
    pub fn condition(self) -> Condition {
        match self {
            Role::Customer => Condition::all()
                .add(
                    Condition::any()
                        .add(Column::IsKakao.eq(true))
                        .add(Column::IsFacebook.eq(true))
                        .add(Column::IsGoogle.eq(true)),
                )
                .add(Column::IsStaff.eq(false))
                .add(Column::IsSuperuser.eq(false)),
            Role::Teacher => Condition::all().add(Column::IsTeacher.eq(true)),
            Role::Staff => Condition::any()
                .add(Column::IsStaff.eq(true))
                .add(Column::IsSuperuser.eq(true)),
            Role::Operator => Condition::all().add(Column::IsOperator.eq(true)),
        }
    }

    /// Select over the accounts of this role.
    pub fn find(self) -> Select<custom_user::Entity> {
        custom_user::Entity::find().filter(self.condition())
    }

    /// In-memory counterpart of [`Role::condition`].
    pub fn matches(self, user: &custom_user::Model) -> bool {
        match self {
            Role::Customer => {
                (user.is_kakao || user.is_facebook || user.is_google)
                    && !user.is_staff
                    && !user.is_superuser
            }
            Role::Teacher => user.is_teacher,
            Role::Staff => user.is_staff || user.is_superuser,
            Role::Operator => user.is_operator,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Teacher => "teacher",
            Role::Staff => "staff",
            Role::Operator => "operator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
