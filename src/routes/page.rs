//! Shared page layout and the data every rendered page receives.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::ContentType;
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use chrono::{DateTime, Datelike, Utc};
use htmlescape::encode_minimal;

use crate::authentication::RequestContext;
use crate::forms::Form;
use crate::middleware::{CsrfToken, CSRF_FIELD};
use crate::session_state::TypedSession;
use crate::utils::e500;

/// Per-request state needed to render the layout.
pub struct Page {
    session: TypedSession,
    context: RequestContext,
    csrf_token: CsrfToken,
}

impl FromRequest for Page {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::extract_from(req))
    }
}

impl Page {
    fn extract_from(req: &HttpRequest) -> Result<Self, actix_web::Error> {
        Ok(Self {
            session: TypedSession::of(req),
            context: RequestContext::from_extensions(req),
            csrf_token: CsrfToken::from_extensions(req)?,
        })
    }

    pub fn session(&self) -> &TypedSession {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.context.is_authenticated()
    }

    /// Hidden input every form posting back to us must include.
    pub fn csrf_field(&self) -> String {
        format!(
            r#"<input type="hidden" name="{}" value="{}">"#,
            CSRF_FIELD,
            encode_minimal(self.csrf_token.as_str())
        )
    }

    /// Wrap `main` in the layout. The flash message is consumed here, so it
    /// only ever shows on a page that was actually rendered.
    pub fn render(&self, title: &str, main: &str) -> Result<HttpResponse, actix_web::Error> {
        let flash = self
            .session
            .pop_flash()
            .map_err(e500)?
            .map(|flash| format!(r#"<div class="flash">{}</div>"#, encode_minimal(&flash)))
            .unwrap_or_default();

        let nav = if self.is_authenticated() {
            format!(
                r#"<div>
            <a href="/">Home</a>
            <a href="/about">About</a>
            <a href="/snippet/create">Create snippet</a>
        </div>
        <div>
            <a href="/user/profile">Profile</a>
            <form action="/user/logout" method="POST">
                {}
                <button>Logout</button>
            </form>
        </div>"#,
                self.csrf_field()
            )
        } else {
            r#"<div>
            <a href="/">Home</a>
            <a href="/about">About</a>
        </div>
        <div>
            <a href="/user/signup">Signup</a>
            <a href="/user/login">Login</a>
        </div>"#
                .to_owned()
        };

        Ok(HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(format!(
                r#"<!doctype html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{title} - Snippetbox</title>
    <link rel="stylesheet" href="/static/css/main.css">
</head>
<body>
    <header>
        <h1><a href="/">Snippetbox</a></h1>
    </header>
    <nav>
        {nav}
    </nav>
    <main>
        {flash}
        {main}
    </main>
    <footer>Powered by <a href="https://www.rust-lang.org/">Rust</a> in {year}</footer>
</body>
</html>"#,
                title = encode_minimal(title),
                nav = nav,
                flash = flash,
                main = main,
                year = Utc::now().year(),
            )))
    }
}

/// `02 Jan 2006 at 15:04`
pub fn human_date(t: DateTime<Utc>) -> String {
    t.format("%d %b %Y at %H:%M").to_string()
}

/// The escaped submitted value of `field`, for re-displaying a form.
pub fn value(form: &Form, field: &str) -> String {
    encode_minimal(form.get(field))
}

/// One `<label class="error">` per message recorded against `field`.
pub fn field_errors(form: &Form, field: &str) -> String {
    form.errors()
        .messages(field)
        .iter()
        .map(|message| format!(r#"<label class="error">{}</label>"#, encode_minimal(message)))
        .collect()
}
