//! errors.rs
//! Taxonomía de errores del envío masivo.

use thiserror::Error;

/// Errores del dispatcher. Solo `Config`, `Upload`, `InvalidContact` e
/// `InvalidAsset` abortan la operación completa; el resto termina dentro
/// del resultado de cada mensaje.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("configuración inválida: {0}")]
    Config(String),

    #[error("contacto inválido: {0}")]
    InvalidContact(String),

    #[error("adjunto inválido: {0}")]
    InvalidAsset(String),

    /// Falló la subida del media. Se conserva status y body crudos.
    #[error("fallo al subir media (status={status:?}): {message}; body={body}")]
    Upload {
        status: Option<u16>,
        body: String,
        message: String,
    },

    #[error("la plantilla usa el campo '{field}' que no existe en el contacto")]
    MissingField { field: String },

    #[error("plantilla mal formada: {0}")]
    MalformedTemplate(String),

    /// Conexión, timeout o respuesta no parseable. Se reintenta.
    #[error("error transitorio de red: {0}")]
    Transient(String),

    /// Respuesta bien formada pero no 2xx. No se reintenta.
    #[error("el proveedor rechazó el mensaje (status={status})")]
    Rejected {
        status: u16,
        body: serde_json::Value,
    },
}

impl DispatchError {
    pub fn upload(status: Option<u16>, body: impl Into<String>, message: impl Into<String>) -> Self {
        DispatchError::Upload {
            status,
            body: body.into(),
            message: message.into(),
        }
    }

    /// `MissingField` y `MalformedTemplate` forman el TemplateError.
    pub fn is_template_error(&self) -> bool {
        matches!(
            self,
            DispatchError::MissingField { .. } | DispatchError::MalformedTemplate(_)
        )
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, DispatchError::Transient(_))
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(e: reqwest::Error) -> Self {
        DispatchError::Transient(e.to_string())
    }
}

pub type BulkResult<T> = Result<T, DispatchError>;
