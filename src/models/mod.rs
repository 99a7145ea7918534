//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod bulk_model;
pub mod contact_model;
pub mod dispatch_model;
pub mod media_model;
