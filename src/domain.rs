mod new_user;
mod snippet;
mod user;

pub use new_user::NewUser;
pub use snippet::{Snippet, SnippetExpiry};
pub use user::User;
