use actix_web::{web, HttpResponse};

use crate::domain::SnippetExpiry;
use crate::forms::Form;
use crate::routes::page::{field_errors, value, Page};
use crate::storage::SnippetStore;
use crate::utils::{e400, e500, see_other};

fn render_form(page: &Page, form: &Form) -> Result<HttpResponse, actix_web::Error> {
    let expires = match form.get("expires") {
        "" => "365",
        submitted => submitted,
    };
    let radio = |days: &str, label: &str| {
        let checked = if expires == days { " checked" } else { "" };
        format!(
            r#"<input type="radio" name="expires" value="{days}"{checked}> {label}"#,
            days = days,
            checked = checked,
            label = label,
        )
    };

    let main = format!(
        r#"<form action="/snippet/create" method="POST">
    {csrf}
    <div>
        <label>Title:</label>
        {title_errors}
        <input type="text" name="title" value="{title}">
    </div>
    <div>
        <label>Content:</label>
        {content_errors}
        <textarea name="content">{content}</textarea>
    </div>
    <div>
        <label>Delete in:</label>
        {expires_errors}
        {one_year}
        {one_week}
        {one_day}
    </div>
    <div>
        <input type="submit" value="Publish snippet">
    </div>
</form>"#,
        csrf = page.csrf_field(),
        title_errors = field_errors(form, "title"),
        title = value(form, "title"),
        content_errors = field_errors(form, "content"),
        content = value(form, "content"),
        expires_errors = field_errors(form, "expires"),
        one_year = radio("365", "One Year"),
        one_week = radio("7", "One Week"),
        one_day = radio("1", "One Day"),
    );
    page.render("Create a New Snippet", &main)
}

pub async fn create_snippet_form(page: Page) -> Result<HttpResponse, actix_web::Error> {
    render_form(&page, &Form::default())
}

#[tracing::instrument(name = "Create snippet", skip(page, body, snippets))]
pub async fn create_snippet(
    page: Page,
    body: web::Bytes,
    snippets: web::Data<dyn SnippetStore>,
) -> Result<HttpResponse, actix_web::Error> {
    let mut form = Form::parse(&body).map_err(e400)?;
    form.required(&["title", "content", "expires"])
        .max_length("title", 100)
        .permitted_values("expires", &SnippetExpiry::PERMITTED);
    if !form.valid() {
        return render_form(&page, &form);
    }

    let expiry = SnippetExpiry::try_from(form.get("expires")).map_err(e500)?;
    let id = snippets
        .insert(form.get("title"), form.get("content"), expiry)
        .await
        .map_err(e500)?;
    tracing::info!(snippet_id = id, "Created snippet");

    page.session()
        .insert_flash("Snippet successfully created!")
        .map_err(e500)?;
    Ok(see_other(&format!("/snippet/{}", id)))
}
