use actix_web::{web, HttpResponse};
use secrecy::Secret;

use crate::authentication::{self, AuthError, LOGIN_PATH};
use crate::forms::Form;
use crate::routes::page::{field_errors, Page};
use crate::storage::UserStore;
use crate::utils::{e400, e500, see_other};

fn render_form(page: &Page, form: &Form) -> Result<HttpResponse, actix_web::Error> {
    let main = format!(
        r#"<h2>Change Password</h2>
<form action="/user/change-password" method="POST" novalidate>
    {csrf}
    <div>
        <label>Current password:</label>
        {current_errors}
        <input type="password" name="current_password">
    </div>
    <div>
        <label>New password:</label>
        {new_errors}
        <input type="password" name="new_password">
    </div>
    <div>
        <label>Confirm new password:</label>
        {confirmation_errors}
        <input type="password" name="new_password_confirmation">
    </div>
    <div>
        <input type="submit" value="Change password">
    </div>
</form>"#,
        csrf = page.csrf_field(),
        current_errors = field_errors(form, "current_password"),
        new_errors = field_errors(form, "new_password"),
        confirmation_errors = field_errors(form, "new_password_confirmation"),
    );
    page.render("Change Password", &main)
}

pub async fn change_password_form(page: Page) -> Result<HttpResponse, actix_web::Error> {
    render_form(&page, &Form::default())
}

#[tracing::instrument(name = "Change password form", skip(page, body, users))]
pub async fn change_password(
    page: Page,
    body: web::Bytes,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, actix_web::Error> {
    let Some(user_id) = page.session().get_user_id().map_err(e500)? else {
        return Ok(see_other(LOGIN_PATH));
    };

    let mut form = Form::parse(&body).map_err(e400)?;
    form.required(&["current_password", "new_password", "new_password_confirmation"])
        .min_length("new_password", 10);
    if form.get("new_password") != form.get("new_password_confirmation") {
        form.add_error("new_password_confirmation", "Passwords do not match");
    }
    if !form.valid() {
        return render_form(&page, &form);
    }

    let outcome = authentication::change_password(
        user_id,
        Secret::new(form.get("current_password").to_owned()),
        Secret::new(form.get("new_password").to_owned()),
        users.get_ref(),
    )
    .await;
    match outcome {
        Ok(()) => {}
        Err(AuthError::InvalidCredentials(_)) => {
            form.add_error("current_password", "Current password is incorrect");
            return render_form(&page, &form);
        }
        Err(e @ AuthError::UnexpectedError(_)) => return Err(e500(e)),
    }

    page.session()
        .insert_flash("Your password has been updated!")
        .map_err(e500)?;
    Ok(see_other("/user/profile"))
}
