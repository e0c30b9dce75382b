use actix_web::HttpResponse;

use crate::session_state::TypedSession;
use crate::utils::{e500, see_other};

pub async fn log_out(session: TypedSession) -> Result<HttpResponse, actix_web::Error> {
    session.remove_user_id();
    session
        .insert_flash("You've been logged out successfully!")
        .map_err(e500)?;
    Ok(see_other("/"))
}
