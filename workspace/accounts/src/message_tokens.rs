//! Push notification tokens of user devices.

use model::entities::message_token::{self, Column, Entity as MessageToken};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info, instrument};

use crate::error::{AccountsError, Result};

/// Registers a device token for a user.
///
/// A token is unique across users: registering a token already held by
/// another account moves it to `user_id`.
#[instrument(skip(db, fcm_token))]
pub async fn register(
    db: &DatabaseConnection,
    user_id: i32,
    fcm_token: &str,
) -> Result<message_token::Model> {
    let fcm_token = fcm_token.trim();
    if fcm_token.is_empty() {
        return Err(AccountsError::InvalidMessageToken);
    }

    let existing = MessageToken::find()
        .filter(Column::FcmToken.eq(fcm_token))
        .one(db)
        .await?;

    match existing {
        Some(token) if token.user_id == user_id => {
            debug!(token_id = token.id, "Token already registered");
            Ok(token)
        }
        Some(token) => {
            info!(token_id = token.id, from = token.user_id, "Moving token to another user");
            let mut token = token.into_active_model();
            token.user_id = Set(user_id);
            Ok(token.update(db).await?)
        }
        None => {
            let token = message_token::ActiveModel {
                user_id: Set(user_id),
                fcm_token: Set(fcm_token.to_string()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            info!(token_id = token.id, "Registered message token");
            Ok(token)
        }
    }
}

pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<message_token::Model>> {
    Ok(MessageToken::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

/// Removes a token of the user. Returns whether anything was removed.
#[instrument(skip(db, fcm_token))]
pub async fn remove(db: &DatabaseConnection, user_id: i32, fcm_token: &str) -> Result<bool> {
    let result = MessageToken::delete_many()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::FcmToken.eq(fcm_token.trim()))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}
