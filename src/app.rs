//! app.rs
use crate::handlers::bulk_handler;
use actix_web::web;

/// Límite del body JSON; los adjuntos llegan en base64.
const JSON_LIMIT_BYTES: usize = 64 * 1024 * 1024;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().limit(JSON_LIMIT_BYTES))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(bulk_handler::health_endpoint))
                .service(
                    web::scope("/bulk")
                        .route("/send", web::post().to(bulk_handler::bulk_send_endpoint))
                        .route(
                            "/logs/{filename}",
                            web::get().to(bulk_handler::download_log_endpoint),
                        ),
                ),
        );
}
