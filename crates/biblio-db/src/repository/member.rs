//! # Member Repository
//!
//! Member lookups for the Query Surface.
//!
//! Registration, authentication, and profile management belong to an
//! external collaborator; the engine only ever checks existence. The insert
//! path here is the storage primitive that collaborator (and the seed tool,
//! and tests) uses.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use biblio_core::Member;

/// Repository for member read paths.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    pool: SqlitePool,
}

impl MemberRepository {
    /// Creates a new MemberRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MemberRepository { pool }
    }

    /// Gets a member by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            SELECT id, first_name, last_name, email, phone, address, created_at
            FROM members
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// Checks whether a member exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Inserts a new member record.
    pub async fn insert(&self, member: &Member) -> DbResult<()> {
        debug!(member_id = %member.id, email = %member.email, "Inserting member");

        sqlx::query(
            r#"
            INSERT INTO members (id, first_name, last_name, email, phone, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&member.id)
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(&member.address)
        .bind(member.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts registered members (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to build a new member record with generated id and timestamp.
pub fn new_member(first_name: &str, last_name: &str, email: &str) -> Member {
    Member {
        id: Uuid::new_v4().to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        phone: None,
        address: None,
        created_at: Utc::now(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.members();

        let ada = new_member("Ada", "Lovelace", "ada@example.com");
        repo.insert(&ada).await.unwrap();

        assert!(repo.exists(&ada.id).await.unwrap());
        assert!(!repo.exists("no-such-member").await.unwrap());

        let found = repo.get_by_id(&ada.id).await.unwrap().unwrap();
        assert_eq!(found.full_name(), "Ada Lovelace");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.members();

        repo.insert(&new_member("Ada", "Lovelace", "ada@example.com"))
            .await
            .unwrap();
        let err = repo
            .insert(&new_member("Augusta", "King", "ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
