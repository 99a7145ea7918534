//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod bulk_send_service;
pub mod dispatch_service;
pub mod media_service;
pub mod request_builder_service;
pub mod result_log_service;
pub mod whatsapp_client;
