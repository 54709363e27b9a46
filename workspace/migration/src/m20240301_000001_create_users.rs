use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create teacher_groups table
        manager
            .create_table(
                Table::create()
                    .table(TeacherGroups::Table)
                    .if_not_exists()
                    .col(pk_auto(TeacherGroups::Id))
                    .col(string_len_null(TeacherGroups::Name, 30))
                    .col(timestamp_with_time_zone(TeacherGroups::Created))
                    .col(timestamp_with_time_zone(TeacherGroups::Modified))
                    .to_owned(),
            )
            .await?;

        // Create vouchers table
        manager
            .create_table(
                Table::create()
                    .table(Vouchers::Table)
                    .if_not_exists()
                    .col(pk_auto(Vouchers::Id))
                    .col(integer(Vouchers::Count).default(0))
                    .col(date_null(Vouchers::StartDate))
                    .col(date_null(Vouchers::EndDate))
                    .col(date_null(Vouchers::LastPurchaseDate))
                    .col(integer_null(Vouchers::LastValidDays).default(7))
                    .col(integer_null(Vouchers::LastProductCount).default(0))
                    .col(timestamp_with_time_zone(Vouchers::Created))
                    .col(timestamp_with_time_zone(Vouchers::Modified))
                    .to_owned(),
            )
            .await?;

        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_len(Users::Password, 128))
                    .col(timestamp_with_time_zone_null(Users::LastLogin))
                    .col(boolean(Users::IsSuperuser).default(false))
                    .col(string_len_null(Users::Username, 150))
                    .col(string_len_null(Users::ReservationUsername, 150))
                    .col(string_len(Users::Email, 254).unique_key())
                    .col(string_len_null(Users::PhoneNumber, 20))
                    .col(boolean(Users::IsStaff).default(false))
                    .col(boolean(Users::IsActive).default(true))
                    .col(timestamp_with_time_zone(Users::DateJoined))
                    .col(boolean(Users::IsKakao).default(false))
                    .col(boolean(Users::IsFacebook).default(false))
                    .col(boolean(Users::IsGoogle).default(false))
                    .col(boolean(Users::IsTeacher).default(false))
                    .col(boolean(Users::IsOperator).default(false))
                    .col(boolean(Users::DoneTutorial).default(false))
                    .col(string_len_null(Users::Postcode, 10))
                    .col(string_len_null(Users::Address, 300))
                    .col(integer_null(Users::TeacherGroupId))
                    .col(integer_null(Users::VoucherId))
                    .col(text(Users::StaffMemo).default(""))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_teacher_group")
                            .from(Users::Table, Users::TeacherGroupId)
                            .to(TeacherGroups::Table, TeacherGroups::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_voucher")
                            .from(Users::Table, Users::VoucherId)
                            .to(Vouchers::Table, Vouchers::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Vouchers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TeacherGroups::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Password,
    LastLogin,
    IsSuperuser,
    Username,
    ReservationUsername,
    Email,
    PhoneNumber,
    IsStaff,
    IsActive,
    DateJoined,
    IsKakao,
    IsFacebook,
    IsGoogle,
    IsTeacher,
    IsOperator,
    DoneTutorial,
    Postcode,
    Address,
    TeacherGroupId,
    VoucherId,
    StaffMemo,
}

#[derive(DeriveIden)]
enum TeacherGroups {
    Table,
    Id,
    Name,
    Created,
    Modified,
}

#[derive(DeriveIden)]
enum Vouchers {
    Table,
    Id,
    Count,
    StartDate,
    EndDate,
    LastPurchaseDate,
    LastValidDays,
    LastProductCount,
    Created,
    Modified,
}
