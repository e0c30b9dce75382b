//! Cross-site request forgery protection.
//!
//! Each session holds a random secret. Pages receive a *masked* copy of it
//! (`otp || otp ^ secret`, base64) which changes on every request, and every
//! state-changing request must send one back, either in the `X-CSRF-Token`
//! header or in the `csrf_token` form field.

use std::future::{ready, Ready};

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::http::header::CONTENT_TYPE;
use actix_web::http::Method;
use actix_web::{web, FromRequest, HttpMessage, HttpRequest};
use actix_web_lab::middleware::Next;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use subtle::ConstantTimeEq;

use crate::forms::FormValues;
use crate::session_state::TypedSession;
use crate::utils::{e400, e500};

/// Name of the hidden form field carrying the token.
pub const CSRF_FIELD: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";
const CSRF_SESSION_KEY: &str = "csrf_token";
const SECRET_LEN: usize = 32;

/// The masked token to embed in the page being rendered.
#[derive(Debug, Clone)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn from_extensions(req: &impl HttpMessage) -> Result<Self, actix_web::Error> {
        req.extensions()
            .get::<Self>()
            .cloned()
            .ok_or_else(|| e500("The CSRF middleware is not mounted on this route."))
    }
}

impl FromRequest for CsrfToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_extensions(req))
    }
}

fn is_method_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// Reject unsafe requests without a valid token; hand every request a fresh one.
///
/// Must run inside the session middleware.
pub async fn verify_csrf(
    mut req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    let session = TypedSession::of(&req);
    let secret = match session_secret(&session) {
        Ok(secret) => secret,
        Err(e) => return Ok(req.error_response(e500(e))),
    };

    if !is_method_safe(req.method()) {
        let submitted = match submitted_token(&mut req).await {
            Ok(submitted) => submitted,
            Err(e) => return Ok(req.error_response(e400(e))),
        };
        let accepted = submitted
            .as_deref()
            .map(|token| token_matches(&secret, token))
            .unwrap_or(false);
        if !accepted {
            tracing::warn!(
                method = %req.method(),
                path = %req.path(),
                token_present = submitted.is_some(),
                "Rejected a request with a missing or invalid CSRF token."
            );
            return Ok(req.error_response(e400("CSRF token missing or invalid")));
        }
    }

    req.extensions_mut().insert(CsrfToken(mask(&secret)));
    next.call(req)
        .await
        .map(ServiceResponse::map_into_boxed_body)
}

/// The session's secret, minted on first use.
fn session_secret(session: &TypedSession) -> Result<Vec<u8>, anyhow::Error> {
    let stored = session
        .get::<String>(CSRF_SESSION_KEY)?
        .and_then(|encoded| URL_SAFE_NO_PAD.decode(encoded).ok())
        .filter(|secret| secret.len() == SECRET_LEN);
    if let Some(secret) = stored {
        return Ok(secret);
    }

    let mut secret = vec![0u8; SECRET_LEN];
    rand::thread_rng().fill(&mut secret[..]);
    session.insert(CSRF_SESSION_KEY, URL_SAFE_NO_PAD.encode(&secret))?;
    Ok(secret)
}

/// Token from the header, or else from an urlencoded body.
///
/// Reading the body consumes the payload, so it is put back for the handler.
async fn submitted_token(req: &mut ServiceRequest) -> Result<Option<String>, actix_web::Error> {
    if let Some(value) = req.headers().get(CSRF_HEADER) {
        return Ok(value.to_str().ok().map(str::to_owned));
    }

    let is_form = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false);
    if !is_form {
        return Ok(None);
    }

    let body = req.extract::<web::Bytes>().await?;
    req.set_payload(bytes_to_payload(body.clone()));

    Ok(FormValues::parse(&body)
        .ok()
        .map(|values| values.get(CSRF_FIELD).to_owned())
        .filter(|token| !token.is_empty()))
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut payload) = actix_http::h1::Payload::create(true);
    payload.unread_data(buf);
    Payload::from(payload)
}

fn mask(secret: &[u8]) -> String {
    let mut otp = vec![0u8; secret.len()];
    rand::thread_rng().fill(&mut otp[..]);
    let masked: Vec<u8> = otp.iter().zip(secret).map(|(a, b)| a ^ b).collect();
    otp.extend(masked);
    URL_SAFE_NO_PAD.encode(otp)
}

fn unmask(token: &str) -> Option<Vec<u8>> {
    let raw = URL_SAFE_NO_PAD.decode(token).ok()?;
    if raw.len() != 2 * SECRET_LEN {
        return None;
    }
    let (otp, masked) = raw.split_at(SECRET_LEN);
    Some(otp.iter().zip(masked).map(|(a, b)| a ^ b).collect())
}

fn token_matches(secret: &[u8], token: &str) -> bool {
    match unmask(token) {
        Some(candidate) => candidate.ct_eq(secret).into(),
        None => false,
    }
}
