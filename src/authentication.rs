mod middleware;
mod password;

pub use middleware::{authenticate, require_authentication, RequestContext, LOGIN_PATH};
pub use password::{change_password, hash_password, validate_credentials, AuthError, Credentials};
