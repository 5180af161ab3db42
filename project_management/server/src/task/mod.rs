use crate::entities::{task, zero_timestamp};
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

/// A unit of work inside a project.
///
/// `priority` and `state` are free text. `assignee` and `project_id` are
/// loose references that are never checked against the other tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Task {
    /// Server-assigned identifier
    #[serde(deserialize_with = "nullable::or_default")]
    pub id: Uuid,
    #[serde(deserialize_with = "nullable::or_default")]
    pub title: String,
    #[serde(deserialize_with = "nullable::or_default")]
    pub description: String,
    #[serde(deserialize_with = "nullable::or_default")]
    pub priority: String,
    #[serde(deserialize_with = "nullable::or_default")]
    pub state: String,
    /// ID of the assigned user
    #[serde(deserialize_with = "nullable::or_default")]
    pub assignee: Uuid,
    /// ID of the owning project
    #[serde(deserialize_with = "nullable::or_default")]
    pub project_id: Uuid,
    /// Set by the client, not by the server
    #[serde(deserialize_with = "nullable::or_zero_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "nullable::or_zero_timestamp")]
    pub completed_at: DateTime<Utc>,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            title: String::new(),
            description: String::new(),
            priority: String::new(),
            state: String::new(),
            assignee: Uuid::nil(),
            project_id: Uuid::nil(),
            created_at: zero_timestamp(),
            completed_at: zero_timestamp(),
        }
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            priority: model.priority,
            state: model.state,
            assignee: model.assignee,
            project_id: model.project_id,
            created_at: model.created_at,
            completed_at: model.completed_at,
        }
    }
}

impl From<Task> for task::ActiveModel {
    fn from(task: Task) -> Self {
        Self {
            id: ActiveValue::Set(task.id),
            title: ActiveValue::Set(task.title),
            description: ActiveValue::Set(task.description),
            priority: ActiveValue::Set(task.priority),
            state: ActiveValue::Set(task.state),
            assignee: ActiveValue::Set(task.assignee),
            project_id: ActiveValue::Set(task.project_id),
            created_at: ActiveValue::Set(task.created_at),
            completed_at: ActiveValue::Set(task.completed_at),
        }
    }
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// Represents a database error.
    #[error(transparent)]
    Database(#[from] DbErr),
}

pub struct TaskService<'a> {
    db: &'a DatabaseConnection,
}

impl TaskService<'_> {
    pub fn new(db: &DatabaseConnection) -> TaskService<'_> {
        TaskService { db }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_all_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = task::Entity::find()
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Inserts `task` under a freshly generated ID. All other fields,
    /// timestamps included, are stored as given.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, task: Task) -> Result<Task, TaskServiceError> {
        let task = Task {
            id: Uuid::new_v4(),
            ..task
        };
        let created_model = task::ActiveModel::from(task).insert(self.db).await?;
        Ok(Task::from(created_model))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: Uuid) -> Result<Option<Task>, TaskServiceError> {
        let task_model = task::Entity::find_by_id(id).one(self.db).await?;
        Ok(task_model.map(Task::from))
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_task(&self, task: Task) -> Result<Task, TaskServiceError> {
        let mut active_model = task::ActiveModel::from(task.clone());
        active_model.id = ActiveValue::NotSet;
        task::Entity::update_many()
            .set(active_model)
            .filter(task::Column::Id.eq(task.id))
            .exec(self.db)
            .await?;
        Ok(task)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_task_by_id(&self, id: Uuid) -> Result<(), TaskServiceError> {
        task::Entity::delete_by_id(id).exec(self.db).await?;
        Ok(())
    }
}
