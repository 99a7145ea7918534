use actix_web::{web, App, HttpServer};
use dotenv::dotenv;

use crate::config::server_config::ServerConfig;
use crate::config::whatsapp_config::WhatsAppConfig;
use crate::logger::init_logger;
use crate::services::bulk_send_service::BulkSendService;
use crate::services::result_log_service::ResultLogService;

mod app;
mod config;
mod errors;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    // Falla rápido si falta el token o el phone_number_id
    let wa_config = WhatsAppConfig::from_env()?;
    log::info!(
        "Usando API {} para phone_number_id={} (concurrencia={}, intentos={})",
        wa_config.api_version,
        wa_config.phone_number_id,
        wa_config.concurrency_limit,
        wa_config.retry.retries
    );

    let bulk_service = BulkSendService::new(&wa_config)?;
    let log_service = ResultLogService::new(wa_config.log_dir.clone());
    std::fs::create_dir_all(log_service.log_dir())?;

    let server = ServerConfig::from_env();
    log::info!("Levantando servidor en {}:{}", server.host, server.port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(bulk_service.clone()))
            .app_data(web::Data::new(log_service.clone()))
            .configure(app::init_app)
    })
    .workers(server.workers)
    .bind((server.host.as_str(), server.port))?
    .run()
    .await?;

    Ok(())
}
