use std::future::{ready, Ready};

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderValue, CACHE_CONTROL};
use actix_web::{web, FromRequest, HttpMessage, HttpRequest};
use actix_web_lab::middleware::Next;

use crate::session_state::TypedSession;
use crate::storage::UserStore;
use crate::utils::{e500, see_other};

pub const LOGIN_PATH: &str = "/user/login";

/// What the authentication resolver found out about the current request.
///
/// `is_authenticated` stays `None` on routes the resolver does not cover,
/// which reads as "not authenticated".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    is_authenticated: Option<bool>,
}

impl RequestContext {
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated == Some(true)
    }

    pub(crate) fn from_extensions(req: &impl HttpMessage) -> Self {
        req.extensions().get::<Self>().copied().unwrap_or_default()
    }
}

impl FromRequest for RequestContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::from_extensions(req)))
    }
}

/// Decide whether the session belongs to a live account.
///
/// A user id pointing at a deleted or deactivated account is dropped from the
/// session, so the next request does not have to look it up again.
pub async fn authenticate(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    let session = TypedSession::of(&req);
    let Some(users) = req.app_data::<web::Data<dyn UserStore>>().cloned() else {
        return Ok(req.error_response(e500("No user store is registered.")));
    };

    let is_authenticated = match session.get_user_id() {
        Err(e) => return Ok(req.error_response(e500(e))),
        Ok(None) => false,
        Ok(Some(user_id)) => match users.get(user_id).await {
            Ok(Some(user)) if user.active => true,
            Ok(_) => {
                tracing::info!(user_id, "Session refers to a missing or inactive user.");
                session.remove_user_id();
                false
            }
            Err(e) => return Ok(req.error_response(e500(e))),
        },
    };

    req.extensions_mut().insert(RequestContext {
        is_authenticated: Some(is_authenticated),
    });
    next.call(req)
        .await
        .map(ServiceResponse::map_into_boxed_body)
}

/// Send anonymous visitors to the login page, remembering where they wanted to go.
///
/// Pages behind the gate are never cached.
pub async fn require_authentication(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    if !RequestContext::from_extensions(&req).is_authenticated() {
        let session = TypedSession::of(&req);
        if let Err(e) = session.insert_redirect_after_login(req.path()) {
            return Ok(req.error_response(e500(e)));
        }
        return Ok(req.into_response(see_other(LOGIN_PATH)));
    }

    let mut res = next.call(req).await?.map_into_boxed_body();
    res.headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(res)
}
