use model::entities::{
    custom_user::{self, Entity as CustomUser},
    teacher_group::{self, Entity as TeacherGroup},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use tracing::{info, instrument};

use crate::error::{AccountsError, Result};

#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, name: Option<String>) -> Result<teacher_group::Model> {
    let group = teacher_group::ActiveModel {
        name: Set(name),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(group_id = group.id, "Created teacher group");
    Ok(group)
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<teacher_group::Model>> {
    Ok(TeacherGroup::find()
        .order_by_asc(teacher_group::Column::Id)
        .all(db)
        .await?)
}

pub async fn get(db: &DatabaseConnection, group_id: i32) -> Result<teacher_group::Model> {
    TeacherGroup::find_by_id(group_id)
        .one(db)
        .await?
        .ok_or(AccountsError::TeacherGroupNotFound(group_id))
}

#[instrument(skip(db))]
pub async fn rename(
    db: &DatabaseConnection,
    group_id: i32,
    name: Option<String>,
) -> Result<teacher_group::Model> {
    let mut group = get(db, group_id).await?.into_active_model();
    group.name = Set(name);
    Ok(group.update(db).await?)
}

/// Deletes a group; its members stay as teachers without a group.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, group_id: i32) -> Result<()> {
    let txn = db.begin().await?;

    let group = TeacherGroup::find_by_id(group_id)
        .one(&txn)
        .await?
        .ok_or(AccountsError::TeacherGroupNotFound(group_id))?;

    let cleared = CustomUser::update_many()
        .col_expr(
            custom_user::Column::TeacherGroupId,
            Expr::value(Option::<i32>::None),
        )
        .filter(custom_user::Column::TeacherGroupId.eq(group_id))
        .exec(&txn)
        .await?;
    group.delete(&txn).await?;

    txn.commit().await?;
    info!(group_id, members = cleared.rows_affected, "Deleted teacher group");
    Ok(())
}

/// Puts a user into a group, or takes them out of any with `None`.
#[instrument(skip(db))]
pub async fn assign(
    db: &DatabaseConnection,
    user_id: i32,
    group_id: Option<i32>,
) -> Result<custom_user::Model> {
    if let Some(group_id) = group_id {
        get(db, group_id).await?;
    }
    let user = CustomUser::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(AccountsError::UserNotFound(user_id))?;

    let mut user = user.into_active_model();
    user.teacher_group_id = Set(group_id);
    Ok(user.update(db).await?)
}

pub async fn members(db: &DatabaseConnection, group_id: i32) -> Result<Vec<custom_user::Model>> {
    let group = get(db, group_id).await?;
    Ok(group
        .find_related(CustomUser)
        .order_by_asc(custom_user::Column::Id)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{create_test_user, setup_db};

    #[tokio::test]
    async fn test_create_rename_list() {
        let db = setup_db().await;

        let seoul = create(&db, Some("Seoul".to_string())).await.unwrap();
        create(&db, None).await.unwrap();

        let renamed = rename(&db, seoul.id, Some("Gangnam".to_string()))
            .await
            .unwrap();
        assert_eq!(renamed.to_string(), "Gangnam");
        assert!(renamed.modified >= seoul.modified);

        let groups = list(&db).await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name.as_deref(), Some("Gangnam"));
        assert_eq!(groups[1].to_string(), "");

        assert!(matches!(
            rename(&db, 999, None).await,
            Err(AccountsError::TeacherGroupNotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_assign_and_delete_keeps_members() {
        let db = setup_db().await;
        let group = create(&db, Some("Busan".to_string())).await.unwrap();
        let teacher = create_test_user(&db, "teacher@example.com").await;

        let assigned = assign(&db, teacher.id, Some(group.id)).await.unwrap();
        assert_eq!(assigned.teacher_group_id, Some(group.id));
        assert_eq!(members(&db, group.id).await.unwrap().len(), 1);

        assert!(matches!(
            assign(&db, teacher.id, Some(999)).await,
            Err(AccountsError::TeacherGroupNotFound(999))
        ));

        delete(&db, group.id).await.unwrap();
        let teacher = CustomUser::find_by_id(teacher.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(teacher.teacher_group_id, None);
        assert!(list(&db).await.unwrap().is_empty());

        assert!(matches!(
            delete(&db, group.id).await,
            Err(AccountsError::TeacherGroupNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unassign() {
        let db = setup_db().await;
        let group = create(&db, Some("Daegu".to_string())).await.unwrap();
        let teacher = create_test_user(&db, "t2@example.com").await;

        assign(&db, teacher.id, Some(group.id)).await.unwrap();
        let cleared = assign(&db, teacher.id, None).await.unwrap();
        assert_eq!(cleared.teacher_group_id, None);
        assert!(members(&db, group.id).await.unwrap().is_empty());
    }
}
