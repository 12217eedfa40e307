//! Pustaka Library Lending Server
//!
//! A REST JSON API for a small library: book catalog, members, loans and
//! returns, with the stock of every book kept consistent with its open loans.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire services over an already-migrated pool
    pub fn new(config: AppConfig, pool: sqlx::SqlitePool) -> Self {
        let repository = repository::Repository::new(pool);
        let services = services::Services::new(repository, config.auth.clone());

        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
