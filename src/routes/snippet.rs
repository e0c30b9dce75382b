mod create;
mod show;

pub use create::{create_snippet, create_snippet_form};
pub use show::show_snippet;
