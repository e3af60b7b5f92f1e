//! Conversation Group Repository Implementation
//!
//! PostgreSQL implementation of conversation group persistence. Leaving a
//! group runs the lookup and delete in one transaction so the reported
//! remaining membership matches what was committed.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{Connection, Group, GroupRepository};
use crate::shared::error::AppError;

/// PostgreSQL group repository implementation.
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    /// Creates a new PgGroupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load a group and its connections. Returns None if the group row is
    /// absent; a group with no connections still loads (empty groups are
    /// retained).
    async fn load(&self, name: &str) -> Result<Option<Group>, AppError> {
        let rows = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT g.name, c.connection_id, c.username
            FROM groups g
            LEFT JOIN connections c ON c.group_name = g.name
            WHERE g.name = $1
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        Ok(assemble_group(rows))
    }
}

/// Internal row type for group queries. The connection columns are NULL for
/// an empty group (LEFT JOIN).
#[derive(Debug, sqlx::FromRow)]
struct GroupRow {
    name: String,
    connection_id: Option<String>,
    username: Option<String>,
}

fn assemble_group(rows: Vec<GroupRow>) -> Option<Group> {
    let mut rows = rows.into_iter();
    let first = rows.next()?;

    let mut group = Group::new(first.name.clone());
    for row in std::iter::once(first).chain(rows) {
        if let (Some(connection_id), Some(username)) = (row.connection_id, row.username) {
            group.connections.push(Connection::new(connection_id, username));
        }
    }
    Some(group)
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Group>, AppError> {
        self.load(name).await
    }

    async fn find_for_connection(&self, connection_id: &str) -> Result<Option<Group>, AppError> {
        let name = sqlx::query_scalar::<_, String>(
            "SELECT group_name FROM connections WHERE connection_id = $1",
        )
        .bind(connection_id)
        .fetch_optional(&self.pool)
        .await?;

        match name {
            Some(name) => self.load(&name).await,
            None => Ok(None),
        }
    }

    async fn get_or_create(&self, name: &str) -> Result<Group, AppError> {
        sqlx::query("INSERT INTO groups (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&self.pool)
            .await?;

        self.load(name)
            .await?
            .ok_or_else(|| AppError::Persistence(format!("failed to create group {name}")))
    }

    async fn join_connection(
        &self,
        name: &str,
        connection: &Connection,
    ) -> Result<Group, AppError> {
        let result = sqlx::query(
            "INSERT INTO connections (connection_id, group_name, username) VALUES ($1, $2, $3)",
        )
        .bind(&connection.connection_id)
        .bind(name)
        .bind(&connection.username)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Persistence(format!(
                "failed to join connection to group {name}"
            )));
        }

        self.load(name)
            .await?
            .ok_or_else(|| AppError::Persistence(format!("group {name} vanished after join")))
    }

    async fn leave_connection(&self, connection_id: &str) -> Result<Group, AppError> {
        let mut tx = self.pool.begin().await?;

        let name = sqlx::query_scalar::<_, String>(
            "SELECT group_name FROM connections WHERE connection_id = $1",
        )
        .bind(connection_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("no group contains connection {connection_id}"))
        })?;

        sqlx::query("DELETE FROM connections WHERE connection_id = $1")
            .bind(connection_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.load(&name)
            .await?
            .ok_or_else(|| AppError::Persistence(format!("group {name} vanished after leave")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_empty_group_from_left_join() {
        let rows = vec![GroupRow {
            name: "alice-bob".into(),
            connection_id: None,
            username: None,
        }];
        let group = assemble_group(rows).unwrap();
        assert_eq!(group.name, "alice-bob");
        assert!(group.connections.is_empty());
    }

    #[test]
    fn assemble_group_with_connections() {
        let rows = vec![
            GroupRow {
                name: "alice-bob".into(),
                connection_id: Some("c1".into()),
                username: Some("alice".into()),
            },
            GroupRow {
                name: "alice-bob".into(),
                connection_id: Some("c2".into()),
                username: Some("bob".into()),
            },
        ];
        let group = assemble_group(rows).unwrap();
        assert_eq!(group.connections.len(), 2);
        assert!(group.has_user("alice"));
        assert!(group.has_user("bob"));
    }

    #[test]
    fn assemble_nothing_from_no_rows() {
        assert!(assemble_group(Vec::new()).is_none());
    }
}
