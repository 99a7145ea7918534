//! services/media_service.rs
//! Resuelve imagen/documento a una referencia reutilizable (una sola subida por asset).

use std::sync::Arc;

use serde_json::Value;

use crate::{
    errors::{BulkResult, DispatchError},
    models::media_model::{MediaAsset, MediaRef, MediaSource, ResolvedMedia},
    services::whatsapp_client::MessageTransport,
};

/// Rutas donde puede venir el id del media, en orden de precedencia.
/// La primera con un string no vacío gana.
pub const HANDLE_CANDIDATES: &[&[&str]] = &[
    &["id"],
    &["media_id"],
    &["h"],
    &["media", "id"],
    &["data", "id"],
];

#[derive(Clone)]
pub struct MediaService {
    transport: Arc<dyn MessageTransport>,
}

impl MediaService {
    pub fn new(transport: Arc<dyn MessageTransport>) -> Self {
        Self { transport }
    }

    /// URL/data-URI/id pasan sin red. Bytes crudos => un POST /media.
    pub async fn resolve(&self, asset: &MediaAsset) -> BulkResult<ResolvedMedia> {
        let reference = match &asset.source {
            MediaSource::Link(url) => MediaRef::Link(url.clone()),
            MediaSource::Handle(id) => MediaRef::Id(id.clone()),
            MediaSource::Upload { data, mime_type } => {
                let filename = asset.filename.as_deref().unwrap_or("upload");
                let raw = self
                    .transport
                    .upload_media(data.clone(), filename, mime_type)
                    .await?;

                if !(200..300).contains(&raw.status) {
                    log::error!(
                        "(resolve) Upload rechazado status={} body='{}'",
                        raw.status,
                        raw.text
                    );
                    return Err(DispatchError::upload(
                        Some(raw.status),
                        raw.text,
                        "status no exitoso",
                    ));
                }

                let json: Value = serde_json::from_str(&raw.text).map_err(|e| {
                    DispatchError::upload(
                        Some(raw.status),
                        raw.text.clone(),
                        format!("respuesta no parseable: {}", e),
                    )
                })?;

                let id = extract_handle(&json).ok_or_else(|| {
                    DispatchError::upload(
                        Some(raw.status),
                        raw.text.clone(),
                        "no se encontró id del media en la respuesta",
                    )
                })?;

                log::info!("(resolve) Media '{}' subido con id={}", filename, id);
                MediaRef::Id(id)
            }
        };

        Ok(ResolvedMedia {
            reference,
            filename: asset.filename.clone(),
        })
    }

    /// En dry-run no se sube nada.
    pub fn deferred(asset: &MediaAsset) -> ResolvedMedia {
        ResolvedMedia {
            reference: MediaRef::Deferred,
            filename: asset.filename.clone(),
        }
    }
}

pub fn extract_handle(body: &Value) -> Option<String> {
    HANDLE_CANDIDATES.iter().find_map(|path| {
        let found = path.iter().try_fold(body, |node, key| node.get(*key))?;
        match found {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    })
}
