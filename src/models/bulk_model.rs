//! models/bulk_model.rs
//! Request/response del endpoint de envío masivo.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{dispatch_model::DispatchResult, media_model::MediaAssetInput};

#[derive(Debug, Clone, Deserialize)]
pub struct BulkSendRequest {
    /// Filas de la planilla ya parseadas; cada una con `phone` (o `phone_number`).
    pub contacts: Vec<Map<String, Value>>,

    /// Plantilla del texto, con `{campo}` por contacto.
    pub message: Option<String>,

    pub image: Option<MediaAssetInput>,
    pub document: Option<MediaAssetInput>,

    #[serde(default)]
    pub dry_run: bool,

    /// Si viene en false no se escribe el CSV de resultados.
    #[serde(default = "default_true")]
    pub write_log: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkSendResponse {
    pub success: bool,
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub dry_run: bool,
    pub log_file: Option<String>,
    pub results: Vec<DispatchResult>,
}
