//! Loans repository: the ledger keeping book stock and open loans consistent.
//!
//! For every book, `stock + open loans` is conserved by the three writers
//! below. Each of them runs as one transaction whose first statement is a
//! conditional write, so two concurrent requests can never both act on the
//! same copy or the same open loan.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanDetails, LoanStatus, MemberLoan, ReturnRecord},
};

const LOAN_DETAILS_SELECT: &str = r#"
    SELECT l.id, l.book_id, b.title AS book_title,
           l.member_id, m.name AS member_name,
           l.loan_date, l.status
    FROM loans l
    LEFT JOIN books b ON l.book_id = b.id
    LEFT JOIN members m ON l.member_id = m.id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Sqlite>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get one loan with book title and member name
    pub async fn get_details(&self, id: i64) -> AppResult<LoanDetails> {
        let sql = format!("{} WHERE l.id = ?", LOAN_DETAILS_SELECT);
        sqlx::query_as::<_, LoanDetails>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// All loans, newest first
    pub async fn list(&self) -> AppResult<Vec<LoanDetails>> {
        let sql = format!("{} ORDER BY l.id DESC", LOAN_DETAILS_SELECT);
        let loans = sqlx::query_as::<_, LoanDetails>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    /// Loans of one member for the dashboard, newest first
    pub async fn list_for_member(&self, member_id: i64) -> AppResult<Vec<MemberLoan>> {
        let loans = sqlx::query_as::<_, MemberLoan>(
            r#"
            SELECT l.id AS loan_id, l.book_id, b.title AS book_title,
                   l.loan_date, l.status
            FROM loans l
            LEFT JOIN books b ON l.book_id = b.id
            WHERE l.member_id = ?
            ORDER BY l.id DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// Count open loans against a book.
    ///
    /// Inspection hook for tests and maintenance; no request path calls it.
    pub async fn count_open_for_book(&self, book_id: i64) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE book_id = ? AND status = 'open'")
                .bind(book_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Take one copy of the book and open a loan for the member.
    ///
    /// The stock decrement only matches while `stock > 0`; when it matches
    /// nothing, no loan is written.
    pub async fn create(&self, book_id: i64, member_id: i64, loan_date: NaiveDate) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let taken = sqlx::query("UPDATE books SET stock = stock - 1 WHERE id = ? AND stock > 0")
            .bind(book_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if taken == 0 {
            let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE id = ?")
                .bind(book_id)
                .fetch_one(&mut *tx)
                .await?;

            return Err(if exists > 0 {
                AppError::Conflict("Book is out of stock".to_string())
            } else {
                AppError::NotFound(format!("Book with id {} not found", book_id))
            });
        }

        let member_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE id = ?")
            .bind(member_id)
            .fetch_one(&mut *tx)
            .await?;

        if member_exists == 0 {
            // Dropping the transaction puts the copy back.
            return Err(AppError::NotFound(format!("Member with id {} not found", member_id)));
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (book_id, member_id, loan_date, status)
            VALUES (?, ?, ?, ?)
            RETURNING id, book_id, member_id, loan_date, status
            "#,
        )
        .bind(book_id)
        .bind(member_id)
        .bind(loan_date)
        .bind(LoanStatus::Open)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(loan)
    }

    /// Close an open loan, put the copy back on the shelf and record the return
    pub async fn return_loan(&self, loan_id: i64, returned_at: DateTime<Utc>) -> AppResult<(Loan, ReturnRecord)> {
        let mut tx = self.pool.begin().await?;

        let closed = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET status = ?
            WHERE id = ? AND status = ?
            RETURNING id, book_id, member_id, loan_date, status
            "#,
        )
        .bind(LoanStatus::Returned)
        .bind(loan_id)
        .bind(LoanStatus::Open)
        .fetch_optional(&mut *tx)
        .await?;

        let loan = match closed {
            Some(loan) => loan,
            None => {
                let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE id = ?")
                    .bind(loan_id)
                    .fetch_one(&mut *tx)
                    .await?;

                return Err(if exists > 0 {
                    AppError::Conflict("Loan already returned".to_string())
                } else {
                    AppError::NotFound(format!("Loan with id {} not found", loan_id))
                });
            }
        };

        if let Some(book_id) = loan.book_id {
            sqlx::query("UPDATE books SET stock = stock + 1 WHERE id = ?")
                .bind(book_id)
                .execute(&mut *tx)
                .await?;
        }

        let record = sqlx::query_as::<_, ReturnRecord>(
            r#"
            INSERT INTO returns (loan_id, return_date, fine)
            VALUES (?, ?, 0)
            RETURNING id, loan_id, return_date, fine
            "#,
        )
        .bind(loan.id)
        .bind(returned_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((loan, record))
    }

    /// Remove a loan. An open loan also gives its copy back; a returned
    /// loan already did.
    pub async fn delete(&self, loan_id: i64) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>(
            "DELETE FROM loans WHERE id = ? RETURNING id, book_id, member_id, loan_date, status",
        )
        .bind(loan_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        if loan.status == LoanStatus::Open {
            if let Some(book_id) = loan.book_id {
                sqlx::query("UPDATE books SET stock = stock + 1 WHERE id = ?")
                    .bind(book_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        Ok(loan)
    }
}
