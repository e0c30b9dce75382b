use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web_lab::middleware::Next;

/// One line per request. Runs inside the root span opened by
/// `tracing_actix_web::TracingLogger`, which carries the request id.
pub async fn log_request(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let client_addr = req
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "-".to_owned());

    tracing::info!(
        client_addr = %client_addr,
        protocol = ?req.version(),
        method = %req.method(),
        uri = %req.uri(),
        "received request"
    );

    next.call(req).await
}
