//! Typed access to the per-request session.

use std::future::{ready, Ready};

use actix_session::{Session, SessionExt, SessionGetError, SessionInsertError};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const USER_ID_KEY: &str = "authenticated_user_id";
const FLASH_KEY: &str = "flash";
const REDIRECT_PATH_KEY: &str = "redirect_path_after_login";

#[derive(Clone)]
pub struct TypedSession(Session);

impl TypedSession {
    /// The session of the request (or response) being processed.
    pub fn of(req: &impl SessionExt) -> Self {
        Self(req.get_session())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionGetError> {
        self.0.get(key)
    }

    pub fn insert<T: Serialize>(&self, key: &str, value: T) -> Result<(), SessionInsertError> {
        self.0.insert(key, value)
    }

    /// Read a value and clear it in the same step.
    pub fn pop<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionGetError> {
        let value = self.0.get(key)?;
        if value.is_some() {
            self.0.remove(key);
        }
        Ok(value)
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.entries().contains_key(key)
    }

    pub fn renew(&self) {
        self.0.renew();
    }

    pub fn purge(&self) {
        self.0.purge();
    }

    pub fn insert_user_id(&self, user_id: i64) -> Result<(), SessionInsertError> {
        self.insert(USER_ID_KEY, user_id)
    }

    pub fn get_user_id(&self) -> Result<Option<i64>, SessionGetError> {
        self.get(USER_ID_KEY)
    }

    pub fn remove_user_id(&self) {
        self.remove(USER_ID_KEY);
    }

    pub fn insert_flash(&self, message: &str) -> Result<(), SessionInsertError> {
        self.insert(FLASH_KEY, message)
    }

    pub fn pop_flash(&self) -> Result<Option<String>, SessionGetError> {
        self.pop(FLASH_KEY)
    }

    pub fn insert_redirect_after_login(&self, path: &str) -> Result<(), SessionInsertError> {
        self.insert(REDIRECT_PATH_KEY, path)
    }

    pub fn pop_redirect_after_login(&self) -> Result<Option<String>, SessionGetError> {
        self.pop(REDIRECT_PATH_KEY)
    }
}

impl FromRequest for TypedSession {
    // This is a complicated way of saying
    // "We return the same error returned by the
    // implementation of `FromRequest` for `Session`".
    type Error = <Session as FromRequest>::Error;
    type Future = Ready<Result<TypedSession, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(TypedSession(req.get_session())))
    }
}
