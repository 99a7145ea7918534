//! services/whatsapp_client.rs
//! Cliente HTTP para la Cloud API de WhatsApp (POST /messages y /media).

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client};
use serde_json::Value;

use crate::{
    config::whatsapp_config::WhatsAppConfig,
    errors::{BulkResult, DispatchError},
};

/// Respuesta parseada de POST /messages (2xx o no).
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: Value,
}

impl ProviderResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Respuesta cruda de POST /media; el parseo lo hace el resolver.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub text: String,
}

/// Lo que el dispatcher necesita del proveedor.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// `Ok` con cualquier respuesta JSON bien formada; `Err(Transient)` si
    /// la conexión falla, hay timeout o el body no es JSON.
    async fn send_message(&self, payload: &Value) -> BulkResult<ProviderResponse>;

    /// Sube el archivo en multipart. Errores de red salen como `Upload`.
    async fn upload_media(&self, data: Bytes, filename: &str, mime_type: &str)
        -> BulkResult<RawResponse>;
}

#[derive(Clone)]
pub struct WhatsAppClient {
    http_client: Client,
    messages_url: String,
    media_url: String,
    auth_header: String,
}

impl WhatsAppClient {
    /// Un solo pool compartido; como máximo 2x la concurrencia en idle.
    pub fn new(config: &WhatsAppConfig) -> BulkResult<Self> {
        config.validate()?;
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(config.concurrency_limit.saturating_mul(2))
            .build()
            .map_err(|e| DispatchError::Config(format!("No se pudo crear el cliente HTTP: {}", e)))?;

        Ok(Self {
            http_client,
            messages_url: config.messages_url(),
            media_url: config.media_url(),
            auth_header: config.auth_header(),
        })
    }
}

#[async_trait]
impl MessageTransport for WhatsAppClient {
    async fn send_message(&self, payload: &Value) -> BulkResult<ProviderResponse> {
        let resp = self
            .http_client
            .post(&self.messages_url)
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .json(payload)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let text = resp.text().await?;
        let body = serde_json::from_str::<Value>(&text).map_err(|e| {
            DispatchError::Transient(format!(
                "respuesta no parseable (status={}): {}; body='{}'",
                status, e, text
            ))
        })?;

        Ok(ProviderResponse { status, body })
    }

    async fn upload_media(
        &self,
        data: Bytes,
        filename: &str,
        mime_type: &str,
    ) -> BulkResult<RawResponse> {
        log::info!(
            "(upload_media) Subiendo '{}' ({} bytes, mime={})",
            filename,
            data.len(),
            mime_type
        );

        let file_part = multipart::Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str(mime_type)
            .map_err(|e| DispatchError::upload(None, "", format!("MIME inválido: {}", e)))?;

        let form = multipart::Form::new()
            .text("messaging_product", "whatsapp")
            .text("type", mime_type.to_string())
            .part("file", file_part);

        let resp = self
            .http_client
            .post(&self.media_url)
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DispatchError::upload(None, "", format!("fallo de red: {}", e)))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| DispatchError::upload(Some(status), "", format!("no se pudo leer el body: {}", e)))?;

        Ok(RawResponse { status, text })
    }
}
