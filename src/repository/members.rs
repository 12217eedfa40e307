//! Members repository for database operations

use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::member::{Member, NewMember, UpdateMember},
};

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Sqlite>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// List all members, newest first
    pub async fn list(&self) -> AppResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(
            "SELECT id, name, address, phone FROM members ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("SELECT id, name, address, phone FROM members WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Insert a new member
    pub async fn create(&self, member: &NewMember) -> AppResult<Member> {
        let member = sqlx::query_as::<_, Member>(
            "INSERT INTO members (name, address, phone) VALUES (?, ?, ?) RETURNING id, name, address, phone",
        )
        .bind(&member.name)
        .bind(&member.address)
        .bind(&member.phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(member)
    }

    /// Update profile fields; absent fields are left untouched
    pub async fn update(&self, id: i64, member: &UpdateMember) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(
            r#"
            UPDATE members
            SET name = COALESCE(?, name),
                address = COALESCE(?, address),
                phone = COALESCE(?, phone)
            WHERE id = ?
            RETURNING id, name, address, phone
            "#,
        )
        .bind(&member.name)
        .bind(&member.address)
        .bind(&member.phone)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Count member rows.
    ///
    /// Inspection hook for tests and maintenance; no request path calls it.
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Delete a member unless they still hold an open loan.
    /// Their credential row goes with them (ON DELETE CASCADE).
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM members
            WHERE id = ?1
              AND NOT EXISTS (
                  SELECT 1 FROM loans WHERE member_id = ?1 AND status = 'open'
              )
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if deleted > 0 {
            return Ok(());
        }

        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if exists > 0 {
            Err(AppError::Conflict(
                "Member cannot be deleted while holding active loans".to_string(),
            ))
        } else {
            Err(AppError::NotFound(format!("Member with id {} not found", id)))
        }
    }
}
