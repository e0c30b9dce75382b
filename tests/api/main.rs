mod change_password;
mod csrf;
mod helpers;
mod logout;
mod security_headers;
mod signup;
mod snippets;
