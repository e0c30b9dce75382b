use anyhow::Context;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use secrecy::{ExposeSecret, Secret};

use crate::storage::UserStore;
use crate::telemetry::spawn_blocking_with_tracing;
use crate::utils::error_chain_fmt;

// Verified when the email is unknown, so both failure paths cost the same.
const FALLBACK_PASSWORD_HASH: &str = "$argon2id$v=19$m=15000,t=2,p=1$\
    gZiV/M1gPc22ElAH/Jh1Hw$\
    CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

#[derive(thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials.")]
    InvalidCredentials(#[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

pub struct Credentials {
    pub email: String,
    pub password: Secret<String>,
}

#[tracing::instrument(name = "Validate credentials", skip(credentials, users))]
pub async fn validate_credentials(
    credentials: Credentials,
    users: &dyn UserStore,
) -> Result<i64, AuthError> {
    let mut user_id = None;
    let mut expected_password_hash = Secret::new(FALLBACK_PASSWORD_HASH.to_string());

    if let Some((stored_user_id, stored_password_hash)) = users
        .get_stored_credentials(&credentials.email)
        .await
        .map_err(AuthError::UnexpectedError)?
    {
        user_id = Some(stored_user_id);
        expected_password_hash = stored_password_hash;
    }

    spawn_blocking_with_tracing(move || {
        verify_password_hash(expected_password_hash, credentials.password)
    })
    .await
    // spawn blocking is fallible - we have a nested result
    .context("Failed to spawn blocking task.")??;

    // Only reached if the fallback hash matched, which it never should.
    user_id.ok_or_else(|| AuthError::InvalidCredentials(anyhow::anyhow!("Unknown email.")))
}

/// Check `password_candidate` against a PHC-formatted hash.
///
/// Only a genuine mismatch counts as bad credentials; a hash that cannot be
/// parsed or a hasher failure is an unexpected error, never a success.
#[tracing::instrument(
    name = "Verify password hash",
    skip(expected_password_hash, password_candidate)
)]
pub fn verify_password_hash(
    expected_password_hash: Secret<String>,
    password_candidate: Secret<String>,
) -> Result<(), AuthError> {
    let expected_password_hash = PasswordHash::new(expected_password_hash.expose_secret())
        .context("Failed to parse hash in PHC string format.")?;

    match Argon2::default().verify_password(
        password_candidate.expose_secret().as_bytes(),
        &expected_password_hash,
    ) {
        Ok(()) => Ok(()),
        Err(argon2::password_hash::Error::Password) => Err(AuthError::InvalidCredentials(
            anyhow::anyhow!("Invalid password."),
        )),
        Err(e) => Err(AuthError::UnexpectedError(
            anyhow::anyhow!(e).context("Failed to verify the password hash."),
        )),
    }
}

pub fn compute_password_hash(password: Secret<String>) -> Result<Secret<String>, anyhow::Error> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let password_hash = Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(15000, 2, 1, None).map_err(|e| anyhow::anyhow!(e))?,
    )
    .hash_password(password.expose_secret().as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!(e))
    .context("Failed to hash password.")?
    .to_string();
    Ok(Secret::new(password_hash))
}

/// Hash on the blocking pool.
pub async fn hash_password(password: Secret<String>) -> Result<Secret<String>, anyhow::Error> {
    spawn_blocking_with_tracing(move || compute_password_hash(password))
        .await
        .context("Failed to spawn blocking task.")?
}

#[tracing::instrument(name = "Change password", skip(current_password, password, users))]
pub async fn change_password(
    user_id: i64,
    current_password: Secret<String>,
    password: Secret<String>,
    users: &dyn UserStore,
) -> Result<(), AuthError> {
    let expected_password_hash = users
        .get_password_hash(user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No user with id {}.", user_id))?;

    spawn_blocking_with_tracing(move || {
        verify_password_hash(expected_password_hash, current_password)
    })
    .await
    .context("Failed to spawn blocking task.")??;

    let password_hash = hash_password(password).await?;
    users.update_password_hash(user_id, password_hash).await?;
    Ok(())
}
