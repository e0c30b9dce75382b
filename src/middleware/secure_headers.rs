use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::error::InternalError;
use actix_web::http::header::{HeaderMap, HeaderValue, X_FRAME_OPTIONS, X_XSS_PROTECTION};
use actix_web_lab::middleware::Next;

/// Stamp the browser-hardening headers on a response, replacing any existing values.
pub fn set_security_headers(headers: &mut HeaderMap) {
    headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("deny"));
}

/// Every response leaves with the security headers, error pages included.
pub async fn secure_headers(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    match next.call(req).await {
        Ok(res) => {
            let mut res = res.map_into_boxed_body();
            set_security_headers(res.headers_mut());
            Ok(res)
        }
        Err(e) => {
            let mut response = e.error_response();
            set_security_headers(response.headers_mut());
            Err(InternalError::from_response(e, response).into())
        }
    }
}
