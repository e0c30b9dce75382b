use actix_web::HttpResponse;

/// Liveness check; sits outside the session layer so it never touches storage.
pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}
