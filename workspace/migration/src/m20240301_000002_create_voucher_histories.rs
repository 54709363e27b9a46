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
                    .table(VoucherHistories::Table)
                    .if_not_exists()
                    .col(pk_auto(VoucherHistories::Id))
                    .col(integer(VoucherHistories::UserId))
                    .col(string_len_null(VoucherHistories::Type, 20))
                    .col(string_len_null(VoucherHistories::Name, 60))
                    .col(integer(VoucherHistories::Count).default(0))
                    .col(integer(VoucherHistories::AppliedCount).default(0))
                    .col(string_len_null(VoucherHistories::AppliedDate, 60))
                    .col(timestamp_with_time_zone(VoucherHistories::Created))
                    .col(timestamp_with_time_zone(VoucherHistories::Modified))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voucher_histories_user")
                            .from(VoucherHistories::Table, VoucherHistories::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_voucher_histories_user")
                    .table(VoucherHistories::Table)
                    .col(VoucherHistories::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VoucherHistories::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum VoucherHistories {
    Table,
    Id,
    UserId,
    #[sea_orm(iden = "type")]
    Type,
    Name,
    Count,
    AppliedCount,
    AppliedDate,
    Created,
    Modified,
}
