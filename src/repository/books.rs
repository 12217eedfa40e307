//! Books repository for database operations

use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// List all books, newest first
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT id, title, stock FROM books ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT id, title, stock FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Insert a new book
    pub async fn create(&self, title: &str, stock: i64) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            "INSERT INTO books (title, stock) VALUES (?, ?) RETURNING id, title, stock",
        )
        .bind(title)
        .bind(stock)
        .fetch_one(&self.pool)
        .await?;
        Ok(book)
    }

    /// Update title and/or stock; absent fields are left untouched
    pub async fn update(&self, id: i64, book: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE(?, title),
                stock = COALESCE(?, stock)
            WHERE id = ?
            RETURNING id, title, stock
            "#,
        )
        .bind(&book.title)
        .bind(book.stock)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book unless an open loan still references it
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM books
            WHERE id = ?1
              AND NOT EXISTS (
                  SELECT 1 FROM loans WHERE book_id = ?1 AND status = 'open'
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

        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if exists > 0 {
            Err(AppError::Conflict(
                "Book cannot be deleted while it is on loan".to_string(),
            ))
        } else {
            Err(AppError::NotFound(format!("Book with id {} not found", id)))
        }
    }
}
