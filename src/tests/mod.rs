//! tests/mod.rs
//! Pruebas unitarias del servicio.

mod config_tests;
mod dispatch_tests;
mod result_log_tests;
