mod activity;
mod catalog;
mod contracts;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;
use crate::models::{ProgressMilestone, Project, UserProfile};

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(config.database_url()?)
            .await
            .context("connecting to the database")?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("running migrations")?;
        tracing::info!("database schema is up to date");
        Ok(())
    }

    // User operations
    pub async fn get_users(&self) -> Result<Vec<UserProfile>> {
        let users = sqlx::query_as::<_, UserProfile>("SELECT * FROM users ORDER BY full_name ASC")
            .fetch_all(self.get_pool())
            .await?;

        Ok(users)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserProfile>> {
        let user = sqlx::query_as::<_, UserProfile>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(user)
    }

    pub async fn create_user(&self, user: &UserProfile) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO users (email, full_name, role)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }

    pub async fn update_user(&self, user: &UserProfile) -> Result<()> {
        sqlx::query("UPDATE users SET email = $1, full_name = $2, role = $3 WHERE id = $4")
            .bind(&user.email)
            .bind(&user.full_name)
            .bind(user.role.as_str())
            .bind(user.id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    pub async fn delete_user(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    // Project operations
    pub async fn get_projects(&self) -> Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY name ASC")
            .fetch_all(self.get_pool())
            .await?;

        Ok(projects)
    }

    pub async fn get_project(&self, id: i32) -> Result<Project> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_one(self.get_pool())
            .await
            .with_context(|| format!("project {id} not found"))?;

        Ok(project)
    }

    pub async fn create_project(&self, project: &Project) -> Result<i32> {
        // the exchange rate is captured here once and never rewritten
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO projects (name, client, status, budget_usd, currency, currency_country,
                                  exchange_rate, location, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&project.name)
        .bind(&project.client)
        .bind(project.status.as_str())
        .bind(project.budget_usd)
        .bind(&project.currency)
        .bind(&project.currency_country)
        .bind(project.exchange_rate)
        .bind(&project.location)
        .bind(project.start_date)
        .bind(project.end_date)
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }

    /// Update editable project fields. Currency settings are not touched.
    pub async fn update_project(&self, project: &Project) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE projects
            SET name = $1, client = $2, status = $3, budget_usd = $4,
                location = $5, start_date = $6, end_date = $7
            WHERE id = $8
            "#,
        )
        .bind(&project.name)
        .bind(&project.client)
        .bind(project.status.as_str())
        .bind(project.budget_usd)
        .bind(&project.location)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.id)
        .execute(self.get_pool())
        .await?;

        Ok(())
    }

    pub async fn delete_project(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    // Progress milestone operations
    pub async fn get_progress_milestones(&self, project_id: i32) -> Result<Vec<ProgressMilestone>> {
        let milestones = sqlx::query_as::<_, ProgressMilestone>(
            "SELECT * FROM progress_milestones WHERE project_id = $1 ORDER BY order_index ASC",
        )
        .bind(project_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(milestones)
    }

    pub async fn get_progress_milestone(&self, id: i32) -> Result<ProgressMilestone> {
        let milestone = sqlx::query_as::<_, ProgressMilestone>("SELECT * FROM progress_milestones WHERE id = $1")
            .bind(id)
            .fetch_one(self.get_pool())
            .await
            .with_context(|| format!("progress milestone {id} not found"))?;

        Ok(milestone)
    }

    pub async fn create_progress_milestone(&self, milestone: &ProgressMilestone) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO progress_milestones (project_id, name, percent_complete, order_index, due_date)
            VALUES ($1, $2, $3,
                    COALESCE((SELECT MAX(order_index) FROM progress_milestones WHERE project_id = $1), 0) + 1,
                    $4)
            RETURNING id
            "#,
        )
        .bind(milestone.project_id)
        .bind(&milestone.name)
        .bind(milestone.percent_complete)
        .bind(milestone.due_date)
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }

    pub async fn update_progress_milestone(&self, milestone: &ProgressMilestone) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE progress_milestones
            SET name = $1, percent_complete = $2, due_date = $3
            WHERE id = $4
            "#,
        )
        .bind(&milestone.name)
        .bind(milestone.percent_complete)
        .bind(milestone.due_date)
        .bind(milestone.id)
        .execute(self.get_pool())
        .await?;

        Ok(())
    }

    pub async fn delete_progress_milestone(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM progress_milestones WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }
}

/// Initialize the database connection pool
pub async fn init(config: &Config) -> Result<Database> {
    let db = Database::new(config).await?;
    tracing::debug!(max_connections = config.db_max_connections, "database pool ready");

    Ok(db)
}
