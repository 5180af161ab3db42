use crate::entities::{project, zero_timestamp};
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

/// A project with a date range and a managing user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Project {
    /// Server-assigned identifier
    #[serde(deserialize_with = "nullable::or_default")]
    pub id: Uuid,
    #[serde(deserialize_with = "nullable::or_default")]
    pub title: String,
    #[serde(deserialize_with = "nullable::or_default")]
    pub description: String,
    #[serde(deserialize_with = "nullable::or_zero_timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(deserialize_with = "nullable::or_zero_timestamp")]
    pub end_date: DateTime<Utc>,
    /// ID of the managing user (not checked)
    #[serde(deserialize_with = "nullable::or_default")]
    pub manager_id: Uuid,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            title: String::new(),
            description: String::new(),
            start_date: zero_timestamp(),
            end_date: zero_timestamp(),
            manager_id: Uuid::nil(),
        }
    }
}

impl From<project::Model> for Project {
    fn from(model: project::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            start_date: model.start_date,
            end_date: model.end_date,
            manager_id: model.manager_id,
        }
    }
}

impl From<Project> for project::ActiveModel {
    fn from(project: Project) -> Self {
        Self {
            id: ActiveValue::Set(project.id),
            title: ActiveValue::Set(project.title),
            description: ActiveValue::Set(project.description),
            start_date: ActiveValue::Set(project.start_date),
            end_date: ActiveValue::Set(project.end_date),
            manager_id: ActiveValue::Set(project.manager_id),
        }
    }
}

/// Error type for ProjectService operations.
#[derive(Debug, thiserror::Error)]
pub enum ProjectServiceError {
    /// Represents a database error.
    #[error(transparent)]
    Database(#[from] DbErr),
}

pub struct ProjectService<'a> {
    db: &'a DatabaseConnection,
}

impl ProjectService<'_> {
    pub fn new(db: &DatabaseConnection) -> ProjectService<'_> {
        ProjectService { db }
    }

    /// Retrieves all projects, in the store's natural order.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_projects(&self) -> Result<Vec<Project>, ProjectServiceError> {
        let projects = project::Entity::find()
            .all(self.db)
            .await?
            .into_iter()
            .map(Project::from)
            .collect();
        Ok(projects)
    }

    /// Inserts `project` under a freshly generated ID.
    #[tracing::instrument(skip(self))]
    pub async fn create_project(&self, project: Project) -> Result<Project, ProjectServiceError> {
        let project = Project {
            id: Uuid::new_v4(),
            ..project
        };
        let created_model = project::ActiveModel::from(project).insert(self.db).await?;
        Ok(Project::from(created_model))
    }

    /// Retrieves a project by ID, `None` when there is no such row.
    #[tracing::instrument(skip(self))]
    pub async fn get_project_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Project>, ProjectServiceError> {
        let project_model = project::Entity::find_by_id(id).one(self.db).await?;
        Ok(project_model.map(Project::from))
    }

    /// Overwrites every column of the row with `project.id`.
    /// Succeeds without effect when the ID is unknown.
    #[tracing::instrument(skip(self))]
    pub async fn update_project(&self, project: Project) -> Result<Project, ProjectServiceError> {
        let mut active_model = project::ActiveModel::from(project.clone());
        active_model.id = ActiveValue::NotSet;
        project::Entity::update_many()
            .set(active_model)
            .filter(project::Column::Id.eq(project.id))
            .exec(self.db)
            .await?;
        Ok(project)
    }

    /// Deletes a project by ID. Deleting an unknown ID is not an error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_project_by_id(&self, id: Uuid) -> Result<(), ProjectServiceError> {
        project::Entity::delete_by_id(id).exec(self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn can_parse_rfc3339_dates() {
        let project: Project = serde_json::from_value(json!({
            "title": "Launch",
            "start_date": "2024-01-01T00:00:00Z",
            "end_date": "2024-06-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(project.start_date.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(project.end_date.to_rfc3339(), "2024-06-01T00:00:00+00:00");
        assert_eq!(project.manager_id, Uuid::nil());
        assert_eq!(project.description, "");
    }

    #[test]
    fn can_read_explicit_nulls_as_zero_values() {
        let project: Project = serde_json::from_value(json!({
            "title": "Launch",
            "description": null,
            "start_date": null,
            "end_date": null,
            "manager_id": null
        }))
        .unwrap();
        assert_eq!(
            project,
            Project {
                title: "Launch".to_string(),
                ..Project::default()
            }
        );
        assert_eq!(project.start_date, zero_timestamp());
    }

    #[test]
    fn can_keep_id_out_of_update_columns() {
        let project = Project {
            id: Uuid::new_v4(),
            ..Project::default()
        };
        let mut active_model = project::ActiveModel::from(project);
        active_model.id = ActiveValue::NotSet;
        assert!(active_model.title.is_set());
        assert!(!active_model.id.is_set());
    }
}
