//! PostgreSQL collection store
//!
//! Collections map onto three tables (see [`crate::database::ensure_schema`]):
//! the `users` collection becomes one row per user, `inventory_<id>` and
//! `mailbox_<id>` become `user_data` rows keyed by `(user_id, data_type)`, and
//! everything else is a single JSONB document in `collections`.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use super::CollectionStore;
use crate::error::{StorageError, StorageResult};

const USERS: &str = "users";
const PER_USER_TYPES: [&str; 2] = ["inventory", "mailbox"];

#[derive(Debug, PartialEq)]
enum Target<'a> {
    Users,
    UserData { user_id: Uuid, data_type: &'a str },
    Shared,
}

fn target(name: &str) -> Target<'_> {
    if name == USERS {
        return Target::Users;
    }

    if let Some((prefix, id)) = name.split_once('_') {
        if PER_USER_TYPES.contains(&prefix) {
            if let Ok(user_id) = Uuid::parse_str(id) {
                return Target::UserData {
                    user_id,
                    data_type: prefix,
                };
            }
        }
    }

    Target::Shared
}

/// Collection store backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an initialised pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn read_users(&self) -> StorageResult<Option<Value>> {
        let rows = sqlx::query(
            r#"
            SELECT email, profile
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut users = Map::new();
        for row in rows {
            users.insert(row.get("email"), row.get("profile"));
        }

        Ok(Some(Value::Object(users)))
    }

    async fn write_users(&self, data: &Value) -> StorageResult<()> {
        let invalid = |reason: &str| StorageError::InvalidDocument {
            collection: USERS.to_string(),
            reason: reason.to_string(),
        };

        let users = data
            .as_object()
            .ok_or_else(|| invalid("expected an object keyed by email"))?;

        let mut rows = Vec::with_capacity(users.len());
        for profile in users.values() {
            let id = profile
                .get("id")
                .and_then(Value::as_str)
                .and_then(|id| Uuid::parse_str(id).ok())
                .ok_or_else(|| invalid("user without a valid id"))?;
            let username = profile
                .get("username")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid("user without a username"))?;
            let email = profile
                .get("email")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid("user without an email"))?;
            rows.push((id, username, email, profile));
        }

        let ids: Vec<Uuid> = rows.iter().map(|(id, ..)| *id).collect();

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM users WHERE NOT (id = ANY($1))")
            .bind(&ids)
            .execute(&mut *tx)
            .await?;

        for (id, username, email, profile) in rows {
            sqlx::query(
                r#"
                INSERT INTO users (id, username, email, profile)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE
                SET username = EXCLUDED.username,
                    email = EXCLUDED.email,
                    profile = EXCLUDED.profile,
                    updated_at = NOW()
                "#,
            )
            .bind(id)
            .bind(username)
            .bind(email)
            .bind(profile)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn read_user_data(&self, user_id: Uuid, data_type: &str) -> StorageResult<Option<Value>> {
        let row = sqlx::query(
            r#"
            SELECT value
            FROM user_data
            WHERE user_id = $1 AND data_type = $2
            "#,
        )
        .bind(user_id)
        .bind(data_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.get("value")))
    }

    async fn write_user_data(&self, user_id: Uuid, data_type: &str, data: &Value) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_data (user_id, data_type, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, data_type) DO UPDATE
            SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(data_type)
        .bind(data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn read_shared(&self, name: &str) -> StorageResult<Option<Value>> {
        let row = sqlx::query("SELECT data FROM collections WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("data")))
    }

    async fn write_shared(&self, name: &str, data: &Value) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO collections (name, data)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE
            SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(name)
        .bind(data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CollectionStore for PgStore {
    async fn read(&self, name: &str) -> StorageResult<Option<Value>> {
        match target(name) {
            Target::Users => self.read_users().await,
            Target::UserData { user_id, data_type } => self.read_user_data(user_id, data_type).await,
            Target::Shared => self.read_shared(name).await,
        }
    }

    async fn write(&self, name: &str, data: &Value) -> StorageResult<()> {
        debug!("Writing collection {} to PostgreSQL", name);
        match target(name) {
            Target::Users => self.write_users(data).await,
            Target::UserData { user_id, data_type } => {
                self.write_user_data(user_id, data_type, data).await
            }
            Target::Shared => self.write_shared(name, data).await,
        }
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        let mut names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT 'users'::text AS name FROM users HAVING COUNT(*) > 0
            UNION ALL
            SELECT data_type || '_' || user_id::text FROM user_data
            UNION ALL
            SELECT name FROM collections
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_routing() {
        let id = Uuid::new_v4();

        assert_eq!(target("users"), Target::Users);
        assert_eq!(
            target(&format!("inventory_{id}")),
            Target::UserData {
                user_id: id,
                data_type: "inventory"
            }
        );
        assert_eq!(
            target(&format!("mailbox_{id}")),
            Target::UserData {
                user_id: id,
                data_type: "mailbox"
            }
        );
        assert_eq!(target("game_sessions"), Target::Shared);
        assert_eq!(target("inventory_not-a-uuid"), Target::Shared);
        assert_eq!(target("transactions"), Target::Shared);
    }
}
