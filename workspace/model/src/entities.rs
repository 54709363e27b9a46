//! SeaORM entities of the booking service.
//!
//! Accounts live in `users`; teacher groups, vouchers, the voucher ledger
//! and push tokens hang off them.

/// Fills `created` on insert and `modified` on every save.
macro_rules! timestamped_behavior {
    () => {
        #[async_trait::async_trait]
        impl ActiveModelBehavior for ActiveModel {
            async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
            where
                C: sea_orm::ConnectionTrait,
            {
                let now = chrono::Utc::now();
                if insert && self.created.is_not_set() {
                    self.created = sea_orm::ActiveValue::Set(now);
                }
                self.modified = sea_orm::ActiveValue::Set(now);
                Ok(self)
            }
        }
    };
}

pub mod custom_user;
pub mod message_token;
pub mod teacher_group;
pub mod voucher;
pub mod voucher_history;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::custom_user::Entity as CustomUser;
    pub use super::message_token::Entity as MessageToken;
    pub use super::teacher_group::Entity as TeacherGroup;
    pub use super::voucher::Entity as Voucher;
    pub use super::voucher_history::Entity as VoucherHistory;
}
