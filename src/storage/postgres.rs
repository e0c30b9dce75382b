use anyhow::Context;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use sqlx::PgPool;

use crate::domain::{NewUser, Snippet, SnippetExpiry, User};
use crate::storage::{SnippetStore, StoreError, UserStore};

// Name of the unique constraint guarding `users.email`.
const EMAIL_CONSTRAINT: &str = "users_uc_email";

type SnippetRow = (i64, String, String, DateTime<Utc>, DateTime<Utc>);
type UserRow = (i64, String, String, DateTime<Utc>, bool);

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn snippet_from_row((id, title, content, created, expires): SnippetRow) -> Snippet {
    Snippet {
        id,
        title,
        content,
        created,
        expires,
    }
}

#[async_trait::async_trait]
impl SnippetStore for PostgresStore {
    #[tracing::instrument(name = "Insert snippet", skip(self, content))]
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expiry: SnippetExpiry,
    ) -> Result<i64, anyhow::Error> {
        let days = i32::try_from(expiry.days()).context("Expiry does not fit in an i32")?;
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO snippets (title, content, created, expires)
            VALUES ($1, $2, now(), now() + make_interval(days => $3))
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(days)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert a new snippet.")
    }

    #[tracing::instrument(name = "Get snippet", skip(self))]
    async fn get(&self, id: i64) -> Result<Option<Snippet>, anyhow::Error> {
        let row = sqlx::query_as::<_, SnippetRow>(
            r#"
            SELECT id, title, content, created, expires
            FROM snippets
            WHERE expires > now() AND id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to perform a query to retrieve a snippet.")?;
        Ok(row.map(snippet_from_row))
    }

    #[tracing::instrument(name = "Get latest snippets", skip(self))]
    async fn latest(&self) -> Result<Vec<Snippet>, anyhow::Error> {
        let rows = sqlx::query_as::<_, SnippetRow>(
            r#"
            SELECT id, title, content, created, expires
            FROM snippets
            WHERE expires > now()
            ORDER BY created DESC, id DESC
            LIMIT 10
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to perform a query to retrieve the latest snippets.")?;
        Ok(rows.into_iter().map(snippet_from_row).collect())
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresStore {
    #[tracing::instrument(name = "Insert user", skip(self, new_user), fields(email = %new_user.email))]
    async fn insert(&self, new_user: NewUser) -> Result<i64, StoreError> {
        let outcome = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (name, email, hashed_password, created)
            VALUES ($1, $2, $3, now())
            RETURNING id
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(new_user.password_hash.expose_secret())
        .fetch_one(&self.pool)
        .await;

        match outcome {
            Ok(id) => Ok(id),
            Err(sqlx::Error::Database(e)) if e.constraint() == Some(EMAIL_CONSTRAINT) => {
                Err(StoreError::DuplicateEmail)
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context("Failed to insert a new user.")
                .into()),
        }
    }

    #[tracing::instrument(name = "Get user", skip(self))]
    async fn get(&self, id: i64) -> Result<Option<User>, anyhow::Error> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, created, active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to perform a query to retrieve a user.")?;
        Ok(row.map(|(id, name, email, created, active)| User {
            id,
            name,
            email,
            created,
            active,
        }))
    }

    #[tracing::instrument(name = "Get stored credentials", skip(self, email))]
    async fn get_stored_credentials(
        &self,
        email: &str,
    ) -> Result<Option<(i64, Secret<String>)>, anyhow::Error> {
        let row = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT id, hashed_password
            FROM users
            WHERE email = $1 AND active = TRUE
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to perform a query to retrieve stored credentials.")?
        .map(|(id, hash)| (id, Secret::new(hash)));
        Ok(row)
    }

    #[tracing::instrument(name = "Get password hash", skip(self))]
    async fn get_password_hash(
        &self,
        id: i64,
    ) -> Result<Option<Secret<String>>, anyhow::Error> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT hashed_password FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to perform a query to retrieve a password hash.")?;
        Ok(hash.map(Secret::new))
    }

    #[tracing::instrument(name = "Change password", skip(self, password_hash))]
    async fn update_password_hash(
        &self,
        id: i64,
        password_hash: Secret<String>,
    ) -> Result<(), anyhow::Error> {
        sqlx::query("UPDATE users SET hashed_password = $1 WHERE id = $2")
            .bind(password_hash.expose_secret())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to change user's password in the database.")?;
        Ok(())
    }
}
