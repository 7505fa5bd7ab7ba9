//! Repository for the `users` table.

use depot_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::User;

const COLUMNS: &str = "id, username, display_name, role, is_active, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    pub async fn create(
        pool: &PgPool,
        username: &str,
        display_name: &str,
        role: &str,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, display_name, role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(display_name)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active users holding any of `roles`, ordered by id.
    pub async fn list_active_by_roles(
        pool: &PgPool,
        roles: &[String],
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE is_active = true AND role = ANY($1)
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(roles)
            .fetch_all(pool)
            .await
    }
}
