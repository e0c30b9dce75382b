use actix_web::{web, HttpResponse};
use secrecy::Secret;

use crate::authentication::hash_password;
use crate::domain::NewUser;
use crate::forms::{Form, EMAIL_RX};
use crate::routes::page::{field_errors, value, Page};
use crate::storage::{StoreError, UserStore};
use crate::utils::{e400, e500, see_other};

fn render_form(page: &Page, form: &Form) -> Result<HttpResponse, actix_web::Error> {
    let main = format!(
        r#"<form action="/user/signup" method="POST" novalidate>
    {csrf}
    <div>
        <label>Name:</label>
        {name_errors}
        <input type="text" name="name" value="{name}">
    </div>
    <div>
        <label>Email:</label>
        {email_errors}
        <input type="email" name="email" value="{email}">
    </div>
    <div>
        <label>Password:</label>
        {password_errors}
        <input type="password" name="password">
    </div>
    <div>
        <input type="submit" value="Signup">
    </div>
</form>"#,
        csrf = page.csrf_field(),
        name_errors = field_errors(form, "name"),
        name = value(form, "name"),
        email_errors = field_errors(form, "email"),
        email = value(form, "email"),
        password_errors = field_errors(form, "password"),
    );
    page.render("Signup", &main)
}

pub async fn signup_form(page: Page) -> Result<HttpResponse, actix_web::Error> {
    render_form(&page, &Form::default())
}

#[tracing::instrument(name = "Sign up", skip(page, body, users))]
pub async fn signup(
    page: Page,
    body: web::Bytes,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, actix_web::Error> {
    let mut form = Form::parse(&body).map_err(e400)?;
    form.required(&["name", "email", "password"])
        .max_length("name", 255)
        .max_length("email", 255)
        .matches_pattern("email", &EMAIL_RX)
        .min_length("password", 10);
    if !form.valid() {
        return render_form(&page, &form);
    }

    let password_hash = hash_password(Secret::new(form.get("password").to_owned()))
        .await
        .map_err(e500)?;
    let new_user = NewUser {
        name: form.get("name").to_owned(),
        email: form.get("email").to_owned(),
        password_hash,
    };
    match users.insert(new_user).await {
        Ok(user_id) => tracing::info!(user_id, "Registered a new user"),
        Err(StoreError::DuplicateEmail) => {
            form.add_error("email", "Address is already in use");
            return render_form(&page, &form);
        }
        Err(e) => return Err(e500(e)),
    }

    page.session()
        .insert_flash("Your signup was successful. Please log in.")
        .map_err(e500)?;
    Ok(see_other("/user/login"))
}
