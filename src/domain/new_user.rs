use secrecy::Secret;

/// A validated signup, with the password already hashed.
#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: Secret<String>,
}
