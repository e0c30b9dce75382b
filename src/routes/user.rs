mod login;
mod logout;
mod password;
mod profile;
mod signup;

pub use login::{login, login_form};
pub use logout::log_out;
pub use password::{change_password, change_password_form};
pub use profile::profile;
pub use signup::{signup, signup_form};
