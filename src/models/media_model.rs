//! models/media_model.rs
//! Imagen o documento a enviar, antes y después de resolverse.

use bytes::Bytes;
use serde::Deserialize;

use crate::errors::{BulkResult, DispatchError};

/// De dónde sale el media. Solo una representación por envío.
#[derive(Debug, Clone)]
pub enum MediaSource {
    /// Bytes crudos pendientes de subir al endpoint /media.
    Upload { data: Bytes, mime_type: String },
    /// Id ya asignado por el proveedor.
    Handle(String),
    /// URL pública o data-URI; se manda tal cual como `link`.
    Link(String),
}

#[derive(Debug, Clone)]
pub struct MediaAsset {
    pub source: MediaSource,
    pub filename: Option<String>,
}

impl MediaAsset {
    pub fn upload(data: impl Into<Bytes>, filename: impl Into<String>, mime_type: impl Into<String>) -> Self {
        MediaAsset {
            source: MediaSource::Upload {
                data: data.into(),
                mime_type: mime_type.into(),
            },
            filename: Some(filename.into()),
        }
    }

    pub fn link(url: impl Into<String>, filename: Option<String>) -> Self {
        MediaAsset {
            source: MediaSource::Link(url.into()),
            filename,
        }
    }

    pub fn handle(id: impl Into<String>, filename: Option<String>) -> Self {
        MediaAsset {
            source: MediaSource::Handle(id.into()),
            filename,
        }
    }

    pub fn needs_upload(&self) -> bool {
        matches!(self.source, MediaSource::Upload { .. })
    }
}

/// Referencia lista para meter en el payload del mensaje.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRef {
    Id(String),
    Link(String),
    /// Dry-run: el upload se omite y nunca se manda nada.
    Deferred,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub reference: MediaRef,
    pub filename: Option<String>,
}

/// Forma en que el cliente manda el media por JSON:
/// `{ "url": ... }`, `{ "id": ... }` o `{ "data": <base64>, "mime_type": ..., "filename": ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaAssetInput {
    pub url: Option<String>,
    pub id: Option<String>,
    pub data: Option<String>,
    pub mime_type: Option<String>,
    pub filename: Option<String>,
}

impl MediaAssetInput {
    pub fn into_asset(self, default_mime: &str) -> BulkResult<MediaAsset> {
        let given = [self.url.is_some(), self.id.is_some(), self.data.is_some()]
            .iter()
            .filter(|b| **b)
            .count();
        if given != 1 {
            return Err(DispatchError::InvalidAsset(
                "se espera exactamente uno de 'url', 'id' o 'data'".to_string(),
            ));
        }

        if let Some(url) = self.url {
            return Ok(MediaAsset::link(url, self.filename));
        }
        if let Some(id) = self.id {
            return Ok(MediaAsset::handle(id, self.filename));
        }

        let encoded = self.data.unwrap_or_default();
        let data = base64::decode(encoded.trim())
            .map_err(|e| DispatchError::InvalidAsset(format!("base64 inválido: {}", e)))?;
        if data.is_empty() {
            return Err(DispatchError::InvalidAsset("el adjunto está vacío".to_string()));
        }
        let mime_type = self.mime_type.unwrap_or_else(|| default_mime.to_string());
        let filename = self
            .filename
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| default_filename(&mime_type));
        Ok(MediaAsset::upload(data, filename, mime_type))
    }
}

/// Nombre que ve el destinatario cuando el cliente no manda uno:
/// `documento.pdf`, `imagen.jpg`, etc.
pub fn default_filename(mime_type: &str) -> String {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let (top, sub) = essence.split_once('/').unwrap_or((essence.as_str(), ""));

    let stem = match top {
        "image" => "imagen",
        "video" => "video",
        "audio" => "audio",
        _ => "documento",
    };
    let ext = match sub {
        "jpeg" | "pjpeg" => "jpg",
        "plain" => "txt",
        "msword" => "doc",
        "vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        "vnd.ms-excel" => "xls",
        "vnd.openxmlformats-officedocument.spreadsheetml.sheet" => "xlsx",
        "svg+xml" => "svg",
        other if !other.is_empty() && other.chars().all(|c| c.is_ascii_alphanumeric()) => other,
        _ => "bin",
    };
    format!("{}.{}", stem, ext)
}
