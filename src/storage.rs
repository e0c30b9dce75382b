//! Persistence collaborators for snippets and user accounts.
//!
//! Handlers and middleware only ever see the [`SnippetStore`] and
//! [`UserStore`] traits; [`Storage`] bundles one implementation of each.

mod memory;
mod postgres;

use std::sync::Arc;

use secrecy::Secret;
use sqlx::PgPool;

use crate::domain::{NewUser, Snippet, SnippetExpiry, User};
use crate::utils::error_chain_fmt;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("A user with this email address already exists.")]
    DuplicateEmail,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[async_trait::async_trait]
pub trait SnippetStore: Send + Sync {
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expiry: SnippetExpiry,
    ) -> Result<i64, anyhow::Error>;

    /// Unexpired snippet with this id, if any.
    async fn get(&self, id: i64) -> Result<Option<Snippet>, anyhow::Error>;

    /// The ten most recently created unexpired snippets, newest first.
    async fn latest(&self) -> Result<Vec<Snippet>, anyhow::Error>;
}

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, new_user: NewUser) -> Result<i64, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<User>, anyhow::Error>;

    /// Id and password hash of the *active* account registered under `email`.
    async fn get_stored_credentials(
        &self,
        email: &str,
    ) -> Result<Option<(i64, Secret<String>)>, anyhow::Error>;

    async fn get_password_hash(
        &self,
        id: i64,
    ) -> Result<Option<Secret<String>>, anyhow::Error>;

    async fn update_password_hash(
        &self,
        id: i64,
        password_hash: Secret<String>,
    ) -> Result<(), anyhow::Error>;
}

/// The storage handles shared by every worker.
#[derive(Clone)]
pub struct Storage {
    pub snippets: Arc<dyn SnippetStore>,
    pub users: Arc<dyn UserStore>,
}

impl Storage {
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            snippets: store.clone(),
            users: store,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PostgresStore::new(pool));
        Self {
            snippets: store.clone(),
            users: store,
        }
    }
}
