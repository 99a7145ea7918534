//! logger.rs
//! Inicialización de env_logger para el servicio de envíos.

/// Nivel por defecto si RUST_LOG no está definido.
const DEFAULT_FILTER: &str = "info,actix_web=warn";

pub fn init_logger() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_secs()
        .init();
}
