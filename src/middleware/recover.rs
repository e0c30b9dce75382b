//! Outermost layer: turns panics into 500s and reports every server error.

use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::error::InternalError;
use actix_web::http::header::{ContentType, HeaderValue, CONNECTION};
use actix_web::http::{Method, StatusCode};
use actix_web::{web, HttpResponse};
use actix_web_lab::middleware::Next;
use futures::FutureExt;

use crate::middleware::secure_headers::set_security_headers;

/// Whether 500 responses should expose the error and a backtrace.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugMode(pub bool);

pub async fn recover_panic(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    let debug = req
        .app_data::<web::Data<DebugMode>>()
        .map(|mode| mode.0)
        .unwrap_or(false);
    let method = req.method().clone();
    let path = req.path().to_owned();

    match AssertUnwindSafe(next.call(req)).catch_unwind().await {
        Ok(Ok(res)) => Ok(report_server_error(res.map_into_boxed_body(), debug)),
        Ok(Err(e)) => Err(report_failed_call(e, &method, &path, debug)),
        Err(panic) => {
            let error = anyhow::anyhow!("handler panicked: {}", panic_message(&*panic));
            let detail =
                log_server_error(&error.to_string(), &format!("{:?}", error), &method, &path);

            let mut response = HttpResponse::InternalServerError();
            // The connection may be in an unknown state; do not reuse it.
            response
                .force_close()
                .insert_header((CONNECTION, HeaderValue::from_static("close")))
                .content_type(ContentType::plaintext());
            let mut response = if debug {
                response.body(detail)
            } else {
                response.body(canonical_reason(StatusCode::INTERNAL_SERVER_ERROR))
            };
            set_security_headers(response.headers_mut());
            Err(InternalError::from_response(error, response).into())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

fn canonical_reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or_default()
}

/// Log a server error with its cause chain and a backtrace. Returns the
/// detail shown to the client in debug mode.
fn log_server_error(message: &str, cause_chain: &str, method: &Method, path: &str) -> String {
    let backtrace = Backtrace::force_capture();
    tracing::error!(
        error.message = %message,
        error.cause_chain = %cause_chain,
        backtrace = %backtrace,
        "Server error while handling {} {}",
        method,
        path,
    );
    format!("{}\n\n{}\n{}", message, cause_chain, backtrace)
}

/// Log the error behind a 5xx response, and in debug mode send it to the client.
fn report_server_error(res: ServiceResponse<BoxBody>, debug: bool) -> ServiceResponse<BoxBody> {
    if !res.status().is_server_error() {
        return res;
    }
    let Some(error) = res.response().error() else {
        return res;
    };
    let detail = log_server_error(
        &error.to_string(),
        &format!("{:?}", error),
        res.request().method(),
        res.request().path(),
    );

    if !debug {
        return res;
    }
    let (request, response) = res.into_parts();
    ServiceResponse::new(request, response.set_body(detail).map_into_boxed_body())
}

/// Same as [`report_server_error`], for an error the inner layers did not
/// turn into a response themselves.
fn report_failed_call(
    e: actix_web::Error,
    method: &Method,
    path: &str,
    debug: bool,
) -> actix_web::Error {
    let response = e.error_response();
    if !response.status().is_server_error() {
        return InternalError::from_response(e, response).into();
    }
    let detail = log_server_error(&e.to_string(), &format!("{:?}", e), method, path);
    let response = if debug {
        response.set_body(detail).map_into_boxed_body()
    } else {
        response
    };
    InternalError::from_response(e, response).into()
}
