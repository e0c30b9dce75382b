//! HTML pages and the route table for the session-backed part of the site.

mod health_check;
mod home;
mod page;
mod snippet;
mod user;

use actix_web::dev::ResourceDef;
use actix_web::guard::{self, Guard};
use actix_web::web;
use actix_web_lab::middleware::from_fn;

use crate::authentication::require_authentication;

pub use health_check::ping;
pub use home::{about, home};
pub use page::Page;
pub use snippet::{create_snippet, create_snippet_form, show_snippet};
pub use user::{change_password, change_password_form, log_out, login, login_form, profile, signup, signup_form};

/// Every path [`configure`] registers.
const PAGE_PATHS: &[&str] = &[
    "/",
    "/about",
    "/snippet/create",
    "/snippet/{id}",
    "/user/signup",
    "/user/login",
    "/user/logout",
    "/user/profile",
    "/user/change-password",
];

/// Matches requests for one of the pages, so that anything else skips the
/// page middleware and reaches the application's 404 untouched.
pub fn page_guard() -> impl Guard {
    let pages: Vec<ResourceDef> = PAGE_PATHS
        .iter()
        .map(|path| ResourceDef::new(*path))
        .collect();
    guard::fn_guard(move |ctx| {
        let path = ctx.head().uri.path();
        pages.iter().any(|page| page.is_match(path))
    })
}

/// Register every page. Resources marked with the gate require a logged-in user.
///
/// `/snippet/create` is registered ahead of `/snippet/{id}` so the literal
/// segment wins.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(home))
        .route("/about", web::get().to(about))
        .service(
            web::resource("/snippet/create")
                .route(web::get().to(create_snippet_form))
                .route(web::post().to(create_snippet))
                .wrap(from_fn(require_authentication)),
        )
        .route("/snippet/{id}", web::get().to(show_snippet))
        .service(
            web::resource("/user/signup")
                .route(web::get().to(signup_form))
                .route(web::post().to(signup)),
        )
        .service(
            web::resource("/user/login")
                .route(web::get().to(login_form))
                .route(web::post().to(login)),
        )
        .service(
            web::resource("/user/logout")
                .route(web::post().to(log_out))
                .wrap(from_fn(require_authentication)),
        )
        .service(
            web::resource("/user/profile")
                .route(web::get().to(profile))
                .wrap(from_fn(require_authentication)),
        )
        .service(
            web::resource("/user/change-password")
                .route(web::get().to(change_password_form))
                .route(web::post().to(change_password))
                .wrap(from_fn(require_authentication)),
        );
}
