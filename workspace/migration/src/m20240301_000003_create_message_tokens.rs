use sea_orm_migration::{prelude::*, schema::*};

use crate::m20240301_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MessageTokens::Table)
                    .if_not_exists()
                    .col(pk_auto(MessageTokens::Id))
                    .col(integer(MessageTokens::UserId))
                    .col(text(MessageTokens::FcmToken).unique_key())
                    .col(timestamp_with_time_zone(MessageTokens::Created))
                    .col(timestamp_with_time_zone(MessageTokens::Modified))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_tokens_user")
                            .from(MessageTokens::Table, MessageTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MessageTokens::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum MessageTokens {
    Table,
    Id,
    UserId,
    FcmToken,
    Created,
    Modified,
}
