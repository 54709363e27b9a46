use accounts::VoucherStatement;
use common::{
    MessageTokenDto, TeacherDto, TeacherGroupDto, UserDto, VoucherDto, VoucherHistoryDto,
    VoucherStatementDto,
};
use model::entities::{custom_user, message_token, teacher_group, voucher, voucher_history};

/// User as the user themselves sees it.
pub fn user_dto(user: &custom_user::Model) -> UserDto {
    UserDto {
        id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
        reservation_username: user.reservation_username.clone(),
        phone_number: user.phone_number.clone(),
        formatted_phone_number: user.formatted_phone_number(),
        is_kakao: user.is_kakao,
        is_facebook: user.is_facebook,
        is_google: user.is_google,
        is_teacher: user.is_teacher,
        is_operator: user.is_operator,
        is_staff: user.is_staff,
        is_superuser: user.is_superuser,
        is_active: user.is_active,
        done_tutorial: user.done_tutorial,
        postcode: user.postcode.clone(),
        address: user.address.clone(),
        teacher_group_id: user.teacher_group_id,
        voucher_id: user.voucher_id,
        date_joined: user.date_joined,
        last_login: user.last_login,
        staff_memo: None,
    }
}

/// User as staff see it, including the staff memo.
pub fn staff_user_dto(user: &custom_user::Model) -> UserDto {
    UserDto {
        staff_memo: Some(user.staff_memo.clone()),
        ..user_dto(user)
    }
}

pub fn teacher_dto(user: &custom_user::Model) -> TeacherDto {
    TeacherDto {
        id: user.id,
        username: user.username.clone(),
        teacher_group_id: user.teacher_group_id,
    }
}

pub fn teacher_group_dto(group: &teacher_group::Model) -> TeacherGroupDto {
    TeacherGroupDto {
        id: group.id,
        name: group.name.clone(),
        created: group.created,
        modified: group.modified,
    }
}

pub fn message_token_dto(token: &message_token::Model) -> MessageTokenDto {
    MessageTokenDto {
        id: token.id,
        fcm_token: token.fcm_token.clone(),
        created: token.created,
    }
}

pub fn voucher_dto(voucher: &voucher::Model) -> VoucherDto {
    VoucherDto {
        id: voucher.id,
        count: voucher.count,
        start_date: voucher.start_date,
        end_date: voucher.end_date,
        last_purchase_date: voucher.last_purchase_date,
        last_valid_days: voucher.last_valid_days,
        last_product_count: voucher.last_product_count,
        display: voucher.to_string(),
    }
}

pub fn voucher_history_dto(entry: &voucher_history::Model) -> VoucherHistoryDto {
    VoucherHistoryDto {
        id: entry.id,
        kind: entry.kind.map(|kind| kind.as_str().to_string()),
        type_display_name: entry.type_display_name().map(str::to_string),
        name: entry.name.clone(),
        count: entry.count,
        applied_count: entry.applied_count,
        applied_date: entry.applied_date.clone(),
        created: entry.created,
    }
}

pub fn voucher_statement_dto(statement: &VoucherStatement) -> VoucherStatementDto {
    VoucherStatementDto {
        voucher: voucher_dto(&statement.voucher),
        entry: voucher_history_dto(&statement.entry),
    }
}
