//! Catalog service: books and member profiles

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book::{Book, CreateBook, UpdateBook},
        member::{CreateMember, Member, NewMember, UpdateMember},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        let book = book.trimmed();
        book.validate()?;
        let created = self.repository.books.create(&book.title, book.stock).await?;
        tracing::info!("Book created: id={} stock={}", created.id, created.stock);
        Ok(created)
    }

    /// Direct edit of title or stock
    pub async fn update_book(&self, id: i64, book: UpdateBook) -> AppResult<Book> {
        let book = book.trimmed();
        book.validate()?;
        self.repository.books.update(id, &book).await
    }

    /// Delete a book; refused while any copy is out on loan
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Book deleted: id={}", id);
        Ok(())
    }

    pub async fn list_members(&self) -> AppResult<Vec<Member>> {
        self.repository.members.list().await
    }

    pub async fn get_member(&self, id: i64) -> AppResult<Member> {
        self.repository.members.get_by_id(id).await
    }

    pub async fn create_member(&self, member: CreateMember) -> AppResult<Member> {
        let member = member.trimmed();
        member.validate()?;
        let created = self.repository.members.create(&NewMember::from(member)).await?;
        tracing::info!("Member created: id={}", created.id);
        Ok(created)
    }

    pub async fn update_member(&self, id: i64, member: UpdateMember) -> AppResult<Member> {
        let member = member.trimmed();
        member.validate()?;
        self.repository.members.update(id, &member).await
    }

    /// Delete a member; refused while they hold an open loan
    pub async fn delete_member(&self, id: i64) -> AppResult<()> {
        self.repository.members.delete(id).await?;
        tracing::info!("Member deleted: id={}", id);
        Ok(())
    }
}
