use actix_web::error::InternalError;
use actix_web::http::header::{ContentType, LOCATION};
use actix_web::http::StatusCode;
use actix_web::HttpResponse;

/// Respond with the canonical status text and nothing else.
///
/// The error is kept on the response so the server-error reporter can log it,
/// but the client never sees its details.
fn status_response<T>(e: T, status: StatusCode) -> actix_web::Error
where
    T: std::fmt::Debug + std::fmt::Display + 'static,
{
    let response = HttpResponse::build(status)
        .content_type(ContentType::plaintext())
        .body(status.canonical_reason().unwrap_or_default());
    InternalError::from_response(e, response).into()
}

// Return an opaque 500 while preserving the error root's cause for logging.
pub fn e500<T>(e: T) -> actix_web::Error
where
    T: std::fmt::Debug + std::fmt::Display + 'static,
{
    status_response(e, StatusCode::INTERNAL_SERVER_ERROR)
}

// Return a 400 with the user-representation of the validation error as body.
pub fn e400<T>(e: T) -> actix_web::Error
where
    T: std::fmt::Debug + std::fmt::Display + 'static,
{
    status_response(e, StatusCode::BAD_REQUEST)
}

/// Missing resources and malformed identifiers look exactly the same.
pub fn e404<T>(e: T) -> actix_web::Error
where
    T: std::fmt::Debug + std::fmt::Display + 'static,
{
    status_response(e, StatusCode::NOT_FOUND)
}

pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .finish()
}

/// Fallback for every path no route claims.
pub async fn not_found() -> Result<HttpResponse, actix_web::Error> {
    Err(e404("no route matched the request path"))
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
