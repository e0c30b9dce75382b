use actix_web::{web, HttpResponse};
use secrecy::Secret;

use crate::authentication::{validate_credentials, AuthError, Credentials};
use crate::forms::Form;
use crate::routes::page::{field_errors, value, Page};
use crate::storage::UserStore;
use crate::utils::{e400, e500, see_other};

const DEFAULT_LANDING_PAGE: &str = "/snippet/create";

fn render_form(page: &Page, form: &Form) -> Result<HttpResponse, actix_web::Error> {
    let generic_error = form
        .errors()
        .get("generic")
        .map(|message| {
            format!(
                r#"<div class="error">{}</div>"#,
                htmlescape::encode_minimal(message)
            )
        })
        .unwrap_or_default();

    let main = format!(
        r#"<form action="/user/login" method="POST" novalidate>
    {csrf}
    {generic_error}
    <div>
        <label>Email:</label>
        {email_errors}
        <input type="email" name="email" value="{email}">
    </div>
    <div>
        <label>Password:</label>
        <input type="password" name="password">
    </div>
    <div>
        <input type="submit" value="Login">
    </div>
</form>"#,
        csrf = page.csrf_field(),
        generic_error = generic_error,
        email_errors = field_errors(form, "email"),
        email = value(form, "email"),
    );
    page.render("Login", &main)
}

pub async fn login_form(page: Page) -> Result<HttpResponse, actix_web::Error> {
    render_form(&page, &Form::default())
}

#[tracing::instrument(
    name = "Log in",
    skip(page, body, users),
    fields(user_id = tracing::field::Empty)
)]
pub async fn login(
    page: Page,
    body: web::Bytes,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, actix_web::Error> {
    let mut form = Form::parse(&body).map_err(e400)?;
    let credentials = Credentials {
        email: form.get("email").to_owned(),
        password: Secret::new(form.get("password").to_owned()),
    };

    let user_id = match validate_credentials(credentials, users.get_ref()).await {
        Ok(user_id) => user_id,
        Err(AuthError::InvalidCredentials(e)) => {
            tracing::info!(error.cause_chain = ?e, "Rejected login attempt");
            form.add_error("generic", "Email or Password is incorrect");
            return render_form(&page, &form);
        }
        Err(e @ AuthError::UnexpectedError(_)) => return Err(e500(e)),
    };
    tracing::Span::current().record("user_id", &user_id);

    let session = page.session();
    let target = session.pop_redirect_after_login().map_err(e500)?;
    session.renew();
    session.insert_user_id(user_id).map_err(e500)?;

    Ok(see_other(target.as_deref().unwrap_or(DEFAULT_LANDING_PAGE)))
}
