use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{OrgDirectory, UserDirectory};
use crate::database::{
    models::{Department, DirectoryCounts, Project, Team, UserProfile},
    types::TeamRow,
    utils::sql,
};
use crate::error::AppError;

const TEAM_SELECT: &str = r#"
    SELECT
        t.id,
        t.name,
        t.department_id,
        COALESCE(
            ARRAY(SELECT tm.user_id FROM team_members tm WHERE tm.team_id = t.id ORDER BY tm.user_id),
            '{}'
        ) AS member_ids,
        COALESCE(
            ARRAY(SELECT tp.project_id FROM team_projects tp WHERE tp.team_id = t.id ORDER BY tp.project_id),
            '{}'
        ) AS project_ids
    FROM
        teams t
"#;

/// Read-only access to the directory tables shared with the directory services.
#[derive(Clone)]
pub struct PgDirectoryRepository {
    pool: PgPool,
}

impl PgDirectoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self, table: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl UserDirectory for PgDirectoryRepository {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let user = sqlx::query_as::<_, UserProfile>(&sql(r#"
            SELECT
                id,
                name,
                email,
                role,
                available_hours,
                is_active,
                created_at
            FROM
                users
            WHERE
                id = ?
        "#))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, AppError> {
        let users = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT
                id,
                name,
                email,
                role,
                available_hours,
                is_active,
                created_at
            FROM
                users
            ORDER BY
                name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}

#[async_trait]
impl OrgDirectory for PgDirectoryRepository {
    async fn find_team(&self, id: Uuid) -> Result<Option<Team>, AppError> {
        let row = sqlx::query_as::<_, TeamRow>(&sql(&format!("{TEAM_SELECT} WHERE t.id = ?")))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Team::from))
    }

    async fn list_teams(&self) -> Result<Vec<Team>, AppError> {
        let rows = sqlx::query_as::<_, TeamRow>(&format!("{TEAM_SELECT} ORDER BY t.name ASC"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Team::from).collect())
    }

    async fn find_department(&self, id: Uuid) -> Result<Option<Department>, AppError> {
        let department =
            sqlx::query_as::<_, Department>(&sql("SELECT id, name FROM departments WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(department)
    }

    async fn list_departments(&self) -> Result<Vec<Department>, AppError> {
        let departments =
            sqlx::query_as::<_, Department>("SELECT id, name FROM departments ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(departments)
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>(&sql(
            "SELECT id, name, status FROM projects WHERE id = ?",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let projects =
            sqlx::query_as::<_, Project>("SELECT id, name, status FROM projects ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(projects)
    }

    async fn counts(&self) -> Result<DirectoryCounts, AppError> {
        Ok(DirectoryCounts {
            users: self.count("users").await?,
            teams: self.count("teams").await?,
            departments: self.count("departments").await?,
            projects: self.count("projects").await?,
            products: self.count("products").await?,
        })
    }
}
