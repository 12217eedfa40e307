//! Book (buku) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    /// Copies currently available for loan
    pub stock: i64,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[serde(alias = "judul")]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default, alias = "stok")]
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i64,
}

impl CreateBook {
    /// Trim the title so that a blank one fails validation
    pub fn trimmed(mut self) -> Self {
        super::trim_field(&mut self.title);
        self
    }
}

/// Update book request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[serde(alias = "judul")]
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[serde(alias = "stok")]
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i64>,
}

impl UpdateBook {
    pub fn trimmed(mut self) -> Self {
        if let Some(title) = self.title.as_mut() {
            super::trim_field(title);
        }
        self
    }
}
