use crate::entities::{user, zero_timestamp};
use crate::nullable;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod api;

/// A registered user.
///
/// Every field is optional on input; missing fields take their zero value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct User {
    /// Server-assigned identifier
    #[serde(deserialize_with = "nullable::or_default")]
    pub id: Uuid,
    #[serde(deserialize_with = "nullable::or_default")]
    pub full_name: String,
    #[serde(deserialize_with = "nullable::or_default")]
    pub email: String,
    /// Registration timestamp (RFC 3339)
    #[serde(deserialize_with = "nullable::or_zero_timestamp")]
    pub registration: DateTime<Utc>,
    /// Free-text role
    #[serde(deserialize_with = "nullable::or_default")]
    pub role: String,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            full_name: String::new(),
            email: String::new(),
            registration: zero_timestamp(),
            role: String::new(),
        }
    }
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            full_name: model.full_name,
            email: model.email,
            registration: model.registration,
            role: model.role,
        }
    }
}

impl From<User> for user::ActiveModel {
    fn from(user: User) -> Self {
        Self {
            id: ActiveValue::Set(user.id),
            full_name: ActiveValue::Set(user.full_name),
            email: ActiveValue::Set(user.email),
            registration: ActiveValue::Set(user.registration),
            role: ActiveValue::Set(user.role),
        }
    }
}

/// Error type for UserService operations.
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// No row exists for the requested ID.
    #[error("User with ID {0} not found")]
    UserNotFound(Uuid),
    /// Represents a database error.
    #[error(transparent)]
    Database(#[from] DbErr),
}

pub struct UserService<'a> {
    db: &'a DatabaseConnection,
}

impl UserService<'_> {
    pub fn new(db: &DatabaseConnection) -> UserService<'_> {
        UserService { db }
    }

    /// Retrieves all users, in the store's natural order.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_users(&self) -> Result<Vec<User>, UserServiceError> {
        let users = user::Entity::find()
            .all(self.db)
            .await?
            .into_iter()
            .map(User::from)
            .collect();
        Ok(users)
    }

    /// Inserts `user` under a freshly generated ID. Any ID already on `user` is ignored.
    ///
    /// # Returns
    ///
    /// The stored user, including its new ID.
    #[tracing::instrument(skip(self))]
    pub async fn create_user(&self, user: User) -> Result<User, UserServiceError> {
        let user = User {
            id: Uuid::new_v4(),
            ..user
        };
        let created_model = user::ActiveModel::from(user).insert(self.db).await?;
        Ok(User::from(created_model))
    }

    /// Retrieves a user by ID.
    ///
    /// Unlike the project and task lookups, a missing row is reported as
    /// [`UserServiceError::UserNotFound`] rather than `Ok(None)`.
    #[tracing::instrument(skip(self))]
    pub async fn get_user_by_id(&self, id: Uuid) -> Result<User, UserServiceError> {
        let user_model = user::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(UserServiceError::UserNotFound(id))?;
        Ok(User::from(user_model))
    }

    /// Overwrites every column of the row with `user.id`.
    ///
    /// The affected row count is not checked: updating an unknown ID succeeds
    /// without changing anything.
    #[tracing::instrument(skip(self))]
    pub async fn update_user(&self, user: User) -> Result<User, UserServiceError> {
        let mut active_model = user::ActiveModel::from(user.clone());
        active_model.id = ActiveValue::NotSet;
        user::Entity::update_many()
            .set(active_model)
            .filter(user::Column::Id.eq(user.id))
            .exec(self.db)
            .await?;
        Ok(user)
    }

    /// Deletes a user by ID. Deleting an unknown ID is not an error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_user_by_id(&self, id: Uuid) -> Result<(), UserServiceError> {
        user::Entity::delete_by_id(id).exec(self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn can_fill_missing_fields_with_zero_values() {
        let user: User = serde_json::from_value(json!({ "full_name": "Ada" })).unwrap();
        assert_eq!(
            user,
            User {
                full_name: "Ada".to_string(),
                ..User::default()
            }
        );
        assert_eq!(
            serde_json::to_value(&user).unwrap()["registration"],
            json!("0001-01-01T00:00:00Z")
        );
    }

    #[test]
    fn can_read_explicit_nulls_as_zero_values() {
        let user: User = serde_json::from_value(json!({
            "id": null,
            "full_name": null,
            "email": "ada@example.com",
            "registration": null,
            "role": null
        }))
        .unwrap();
        assert_eq!(
            user,
            User {
                email: "ada@example.com".to_string(),
                ..User::default()
            }
        );
    }

    #[test]
    fn can_reject_wrongly_typed_fields() {
        let result = serde_json::from_value::<User>(json!({ "email": 42 }));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn can_report_database_errors_from_service() {
        let state = crate::test_support::failing_store();
        let service = UserService::new(&state.db);
        let result = service.get_user_by_id(Uuid::new_v4()).await;
        assert!(matches!(result, Err(UserServiceError::Database(_))));
    }
}
