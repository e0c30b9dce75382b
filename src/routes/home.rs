use actix_web::{web, HttpResponse};
use htmlescape::encode_minimal;

use crate::routes::page::{human_date, Page};
use crate::storage::SnippetStore;
use crate::utils::e500;

pub async fn home(
    page: Page,
    snippets: web::Data<dyn SnippetStore>,
) -> Result<HttpResponse, actix_web::Error> {
    let latest = snippets.latest().await.map_err(e500)?;

    let main = if latest.is_empty() {
        "<h2>Latest Snippets</h2>\n<p>There's nothing to see here... yet!</p>".to_owned()
    } else {
        let rows: String = latest
            .iter()
            .map(|snippet| {
                format!(
                    r#"
        <tr>
            <td><a href="/snippet/{id}">{title}</a></td>
            <td>{created}</td>
            <td>#{id}</td>
        </tr>"#,
                    id = snippet.id,
                    title = encode_minimal(&snippet.title),
                    created = human_date(snippet.created),
                )
            })
            .collect();
        format!(
            r#"<h2>Latest Snippets</h2>
<table>
    <tr>
        <th>Title</th>
        <th>Created</th>
        <th>ID</th>
    </tr>{}
</table>"#,
            rows
        )
    };

    page.render("Home", &main)
}

pub async fn about(page: Page) -> Result<HttpResponse, actix_web::Error> {
    page.render(
        "About",
        r#"<h2>About</h2>
<p>Snippetbox is a place to paste and share short pieces of text. Snippets
expire after a day, a week or a year.</p>"#,
    )
}
