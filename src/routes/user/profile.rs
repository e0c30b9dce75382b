use actix_web::{web, HttpResponse};
use htmlescape::encode_minimal;

use crate::authentication::LOGIN_PATH;
use crate::routes::page::{human_date, Page};
use crate::storage::UserStore;
use crate::utils::{e500, see_other};

pub async fn profile(
    page: Page,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, actix_web::Error> {
    let user = match page.session().get_user_id().map_err(e500)? {
        Some(user_id) => users.get(user_id).await.map_err(e500)?,
        None => None,
    };
    let Some(user) = user else {
        return Ok(see_other(LOGIN_PATH));
    };

    let main = format!(
        r#"<h2>User Profile</h2>
<table>
    <tr>
        <th>Name</th>
        <td>{name}</td>
    </tr>
    <tr>
        <th>Email</th>
        <td>{email}</td>
    </tr>
    <tr>
        <th>Joined</th>
        <td>{joined}</td>
    </tr>
    <tr>
        <th>Password</th>
        <td><a href="/user/change-password">Change password</a></td>
    </tr>
</table>"#,
        name = encode_minimal(&user.name),
        email = encode_minimal(&user.email),
        joined = human_date(user.created),
    );
    page.render("User Profile", &main)
}
