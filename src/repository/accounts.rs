//! Credential repository: staff accounts and member accounts

use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::{
        account::{MemberAccount, StaffAccount},
        member::{Member, NewMember},
    },
};

const USERNAME_TAKEN: &str = "Username is already taken";

#[derive(Clone)]
pub struct AccountsRepository {
    pool: Pool<Sqlite>,
}

impl AccountsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Insert a staff account, returning its id
    pub async fn create_staff(&self, username: &str, password_hash: &str) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO staff_accounts (username, password_hash) VALUES (?, ?) RETURNING id",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::on_unique_violation(e, USERNAME_TAKEN))
    }

    /// Get staff account by username
    pub async fn get_staff_by_username(&self, username: &str) -> AppResult<Option<StaffAccount>> {
        let account = sqlx::query_as::<_, StaffAccount>(
            "SELECT id, username, password_hash FROM staff_accounts WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    /// Get member account by username
    pub async fn get_member_by_username(&self, username: &str) -> AppResult<Option<MemberAccount>> {
        let account = sqlx::query_as::<_, MemberAccount>(
            r#"
            SELECT id, username, password_hash, api_key, member_id
            FROM member_accounts
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    /// Resolve an issued access key to its member account
    pub async fn get_member_by_api_key(&self, api_key: &str) -> AppResult<Option<MemberAccount>> {
        let account = sqlx::query_as::<_, MemberAccount>(
            r#"
            SELECT id, username, password_hash, api_key, member_id
            FROM member_accounts
            WHERE api_key = ?
            "#,
        )
        .bind(api_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    /// Create the member profile and its credential in one transaction.
    ///
    /// A taken username aborts the transaction, so the profile row inserted
    /// first is rolled back with it.
    pub async fn register_member(
        &self,
        member: &NewMember,
        username: &str,
        password_hash: &str,
        api_key: &str,
    ) -> AppResult<Member> {
        let mut tx = self.pool.begin().await?;

        let profile = sqlx::query_as::<_, Member>(
            "INSERT INTO members (name, address, phone) VALUES (?, ?, ?) RETURNING id, name, address, phone",
        )
        .bind(&member.name)
        .bind(&member.address)
        .bind(&member.phone)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO member_accounts (username, password_hash, api_key, member_id)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(api_key)
        .bind(profile.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::on_unique_violation(e, USERNAME_TAKEN))?;

        tx.commit().await?;

        Ok(profile)
    }

    /// Store a new access key for a member account
    pub async fn set_api_key(&self, account_id: i64, api_key: &str) -> AppResult<()> {
        let updated = sqlx::query("UPDATE member_accounts SET api_key = ? WHERE id = ?")
            .bind(api_key)
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::on_unique_violation(e, "Access key is already in use"))?
            .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound(format!(
                "Member account with id {} not found",
                account_id
            )));
        }
        Ok(())
    }
}
