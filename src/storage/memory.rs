use std::collections::BTreeMap;

use anyhow::Context;
use chrono::Utc;
use parking_lot::RwLock;
use secrecy::Secret;

use crate::domain::{NewUser, Snippet, SnippetExpiry, User};
use crate::storage::{SnippetStore, StoreError, UserStore};

const LATEST_LIMIT: usize = 10;

struct StoredUser {
    user: User,
    password_hash: Secret<String>,
}

#[derive(Default)]
struct Tables {
    snippets: BTreeMap<i64, Snippet>,
    users: BTreeMap<i64, StoredUser>,
    last_snippet_id: i64,
    last_user_id: i64,
}

/// Process-local storage, used for development and the test-suite.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the `active` flag of an account. Returns `false` if it does not exist.
    pub fn set_active(&self, id: i64, active: bool) -> bool {
        match self.tables.write().users.get_mut(&id) {
            Some(stored) => {
                stored.user.active = active;
                true
            }
            None => false,
        }
    }

    /// Drop an account entirely. Returns `false` if it did not exist.
    pub fn remove_user(&self, id: i64) -> bool {
        self.tables.write().users.remove(&id).is_some()
    }
}

#[async_trait::async_trait]
impl SnippetStore for InMemoryStore {
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expiry: SnippetExpiry,
    ) -> Result<i64, anyhow::Error> {
        let created = Utc::now();
        let mut tables = self.tables.write();
        tables.last_snippet_id += 1;
        let id = tables.last_snippet_id;
        tables.snippets.insert(
            id,
            Snippet {
                id,
                title: title.to_owned(),
                content: content.to_owned(),
                created,
                expires: created + expiry.duration(),
            },
        );
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<Snippet>, anyhow::Error> {
        let now = Utc::now();
        Ok(self
            .tables
            .read()
            .snippets
            .get(&id)
            .filter(|snippet| !snippet.is_expired(now))
            .cloned())
    }

    async fn latest(&self) -> Result<Vec<Snippet>, anyhow::Error> {
        let now = Utc::now();
        let tables = self.tables.read();
        let mut snippets: Vec<Snippet> = tables
            .snippets
            .values()
            .filter(|snippet| !snippet.is_expired(now))
            .cloned()
            .collect();
        snippets.sort_by(|a, b| (b.created, b.id).cmp(&(a.created, a.id)));
        snippets.truncate(LATEST_LIMIT);
        Ok(snippets)
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryStore {
    async fn insert(&self, new_user: NewUser) -> Result<i64, StoreError> {
        let mut tables = self.tables.write();
        if tables
            .users
            .values()
            .any(|stored| stored.user.email == new_user.email)
        {
            return Err(StoreError::DuplicateEmail);
        }
        tables.last_user_id += 1;
        let id = tables.last_user_id;
        tables.users.insert(
            id,
            StoredUser {
                user: User {
                    id,
                    name: new_user.name,
                    email: new_user.email,
                    created: Utc::now(),
                    active: true,
                },
                password_hash: new_user.password_hash,
            },
        );
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<User>, anyhow::Error> {
        Ok(self
            .tables
            .read()
            .users
            .get(&id)
            .map(|stored| stored.user.clone()))
    }

    async fn get_stored_credentials(
        &self,
        email: &str,
    ) -> Result<Option<(i64, Secret<String>)>, anyhow::Error> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|stored| stored.user.active && stored.user.email == email)
            .map(|stored| (stored.user.id, stored.password_hash.clone())))
    }

    async fn get_password_hash(
        &self,
        id: i64,
    ) -> Result<Option<Secret<String>>, anyhow::Error> {
        Ok(self
            .tables
            .read()
            .users
            .get(&id)
            .map(|stored| stored.password_hash.clone()))
    }

    async fn update_password_hash(
        &self,
        id: i64,
        password_hash: Secret<String>,
    ) -> Result<(), anyhow::Error> {
        let mut tables = self.tables.write();
        let stored = tables
            .users
            .get_mut(&id)
            .with_context(|| format!("No user with id {}", id))?;
        stored.password_hash = password_hash;
        Ok(())
    }
}
