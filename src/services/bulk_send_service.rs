//! services/bulk_send_service.rs
//! Orquesta el envío masivo: resolver media -> construir requests -> despachar.

use std::sync::Arc;

use crate::{
    config::whatsapp_config::WhatsAppConfig,
    errors::BulkResult,
    models::{
        contact_model::Contact,
        dispatch_model::DispatchReport,
        media_model::{MediaAsset, ResolvedMedia},
    },
    services::{
        dispatch_service::DispatchService,
        media_service::MediaService,
        request_builder_service::build_requests,
        whatsapp_client::{MessageTransport, WhatsAppClient},
    },
};

/// Todo lo que entrega el colaborador de UI para un envío.
#[derive(Debug, Clone, Default)]
pub struct BulkSendJob {
    pub contacts: Vec<Contact>,
    pub template: Option<String>,
    pub image: Option<MediaAsset>,
    pub document: Option<MediaAsset>,
}

#[derive(Clone)]
pub struct BulkSendService {
    media_service: MediaService,
    dispatch_service: DispatchService,
}

impl BulkSendService {
    /// Crea el servicio con el cliente real de WhatsApp.
    pub fn new(config: &WhatsAppConfig) -> BulkResult<Self> {
        let client = WhatsAppClient::new(config)?;
        Ok(Self::with_transport(config, Arc::new(client)))
    }

    pub fn with_transport(config: &WhatsAppConfig, transport: Arc<dyn MessageTransport>) -> Self {
        Self {
            media_service: MediaService::new(transport.clone()),
            dispatch_service: DispatchService::new(
                transport,
                config.concurrency_limit,
                config.retry,
            ),
        }
    }

    /// Un error al resolver media aborta antes de enviar cualquier mensaje.
    pub async fn run<F>(
        &self,
        job: &BulkSendJob,
        dry_run: bool,
        on_progress: F,
    ) -> BulkResult<DispatchReport>
    where
        F: FnMut(usize, usize),
    {
        log::info!(
            "(run) Envío masivo a {} contactos. texto={}, imagen={}, documento={}, dry_run={}",
            job.contacts.len(),
            job.template.as_deref().map(|t| !t.trim().is_empty()).unwrap_or(false),
            job.image.is_some(),
            job.document.is_some(),
            dry_run
        );

        let image = self.resolve_optional(job.image.as_ref(), dry_run).await?;
        let document = self.resolve_optional(job.document.as_ref(), dry_run).await?;

        let requests = build_requests(
            &job.contacts,
            job.template.as_deref(),
            image.as_ref(),
            document.as_ref(),
        );

        Ok(self
            .dispatch_service
            .dispatch(requests, dry_run, on_progress)
            .await)
    }

    async fn resolve_optional(
        &self,
        asset: Option<&MediaAsset>,
        dry_run: bool,
    ) -> BulkResult<Option<ResolvedMedia>> {
        match asset {
            None => Ok(None),
            Some(asset) if dry_run && asset.needs_upload() => {
                log::info!(
                    "(resolve_optional) dry_run: se omite la subida de {:?}",
                    asset.filename
                );
                Ok(Some(MediaService::deferred(asset)))
            }
            Some(asset) => self.media_service.resolve(asset).await.map(Some),
        }
    }
}
