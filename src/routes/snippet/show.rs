use actix_web::{web, HttpResponse};
use htmlescape::encode_minimal;

use crate::routes::page::{human_date, Page};
use crate::storage::SnippetStore;
use crate::utils::{e404, e500};

/// Only positive integers name a snippet; anything else is a missing page.
fn parse_snippet_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id >= 1)
}

#[tracing::instrument(name = "Show snippet", skip(page, snippets))]
pub async fn show_snippet(
    page: Page,
    path: web::Path<String>,
    snippets: web::Data<dyn SnippetStore>,
) -> Result<HttpResponse, actix_web::Error> {
    let raw_id = path.into_inner();
    let id = parse_snippet_id(&raw_id)
        .ok_or_else(|| e404(format!("{:?} is not a valid snippet id", raw_id)))?;
    let snippet = snippets
        .get(id)
        .await
        .map_err(e500)?
        .ok_or_else(|| e404(format!("No snippet with id {}", id)))?;

    let main = format!(
        r#"<div class="snippet">
    <div class="metadata">
        <strong>{title}</strong>
        <span>#{id}</span>
    </div>
    <pre><code>{content}</code></pre>
    <div class="metadata">
        <time>Created: {created}</time>
        <time>Expires: {expires}</time>
    </div>
</div>"#,
        title = encode_minimal(&snippet.title),
        id = snippet.id,
        content = encode_minimal(&snippet.content),
        created = human_date(snippet.created),
        expires = human_date(snippet.expires),
    );
    page.render(&format!("Snippet #{}", snippet.id), &main)
}
