//! config/mod.rs
//! Configuración global del servicio.

pub mod server_config;
pub mod whatsapp_config;
