//! User rows as the approval workflow sees them.

use depot_core::roles::Role;
use depot_core::store::DirectoryUser;
use depot_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::RowDecodeError;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<User> for DirectoryUser {
    type Error = RowDecodeError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        let role = user.role.parse::<Role>().map_err(RowDecodeError)?;
        Ok(DirectoryUser {
            user_id: user.id,
            role,
        })
    }
}
