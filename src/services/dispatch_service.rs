//! services/dispatch_service.rs
//! Envío en paralelo con límite de concurrencia, reintentos y progreso.

use std::sync::Arc;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::{
    config::whatsapp_config::RetryPolicy,
    errors::DispatchError,
    models::dispatch_model::{DispatchReport, DispatchResult, MessageRequest, PlannedRequest},
    services::whatsapp_client::MessageTransport,
};

#[derive(Clone)]
pub struct DispatchService {
    transport: Arc<dyn MessageTransport>,
    concurrency_limit: usize,
    retry: RetryPolicy,
}

impl DispatchService {
    pub fn new(
        transport: Arc<dyn MessageTransport>,
        concurrency_limit: usize,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            concurrency_limit: concurrency_limit.max(1),
            retry,
        }
    }

    /// Ejecuta todos los requests y devuelve el reporte en orden de finalización.
    /// `on_progress(completados, total)` se llama una vez por resultado terminal.
    pub async fn dispatch<F>(
        &self,
        requests: Vec<PlannedRequest>,
        dry_run: bool,
        mut on_progress: F,
    ) -> DispatchReport
    where
        F: FnMut(usize, usize),
    {
        let total = requests.len();
        log::info!(
            "(dispatch) Iniciando envío de {} mensajes (concurrencia={}, intentos={}, dry_run={})",
            total,
            self.concurrency_limit,
            self.retry.retries,
            dry_run
        );

        // Un permiso = una llamada HTTP en vuelo. Al liberarse, el siguiente entra.
        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let mut pending: FuturesUnordered<_> = requests
            .into_iter()
            .map(|planned| {
                log::debug!(
                    "(dispatch) Encolando {} para {}",
                    planned.kind().as_str(),
                    planned.recipient()
                );
                let transport = self.transport.clone();
                let semaphore = semaphore.clone();
                let retry = self.retry;
                async move { run_request(transport, semaphore, retry, planned, dry_run).await }
            })
            .collect();

        let mut results = Vec::with_capacity(total);
        while let Some(result) = pending.next().await {
            if !result.ok {
                log::error!(
                    "(dispatch) Falló {} a {}: {}",
                    result.kind.as_str(),
                    result.phone,
                    result.error.as_deref().unwrap_or("sin detalle")
                );
            }
            results.push(result);
            log::debug!("(dispatch) Progreso {}/{}", results.len(), total);
            on_progress(results.len(), total);
        }

        let report = DispatchReport { total, results };
        debug_assert!(report.is_complete());
        log::info!(
            "(dispatch) Finalizado: {} ok, {} fallidos de {}",
            report.succeeded(),
            report.failed(),
            report.total
        );
        report
    }
}

async fn run_request(
    transport: Arc<dyn MessageTransport>,
    semaphore: Arc<Semaphore>,
    retry: RetryPolicy,
    planned: PlannedRequest,
    dry_run: bool,
) -> DispatchResult {
    let request = match planned {
        PlannedRequest::Invalid {
            recipient,
            kind,
            error,
        } => return DispatchResult::failure(&recipient, kind, &error, 0),
        PlannedRequest::Ready(request) => request,
    };

    if dry_run {
        return DispatchResult::dry_run(&request.recipient, request.kind);
    }

    send_with_retry(transport.as_ref(), &semaphore, retry, &request).await
}

/// Pending -> InFlight -> {Success | RetryScheduled -> InFlight | Failed}
async fn send_with_retry(
    transport: &dyn MessageTransport,
    semaphore: &Semaphore,
    retry: RetryPolicy,
    request: &MessageRequest,
) -> DispatchResult {
    let mut attempt: u32 = 0;

    loop {
        attempt = attempt.saturating_add(1);

        let outcome = {
            // El permiso se suelta antes del backoff.
            let _permit = match semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => {
                    let error = DispatchError::Transient("semaphore cerrado".to_string());
                    return DispatchResult::failure(&request.recipient, request.kind, &error, attempt);
                }
            };
            transport.send_message(&request.body).await
        };

        match outcome {
            Ok(resp) if resp.is_success() => {
                return DispatchResult::success(
                    &request.recipient,
                    request.kind,
                    resp.status,
                    resp.body,
                    attempt,
                );
            }
            Ok(resp) => {
                // Rechazo determinístico: reintentar no cambia nada.
                let error = DispatchError::Rejected {
                    status: resp.status,
                    body: resp.body,
                };
                return DispatchResult::failure(&request.recipient, request.kind, &error, attempt);
            }
            Err(error) if error.is_transient() && attempt < retry.retries => {
                let wait = retry.backoff_for(attempt);
                log::warn!(
                    "(send_with_retry) Intento {}/{} falló para {} ({}): {}. Reintentando en {:?}",
                    attempt,
                    retry.retries,
                    request.recipient,
                    request.kind.as_str(),
                    error,
                    wait
                );
                tokio::time::sleep(wait).await;
            }
            Err(error) => {
                return DispatchResult::failure(&request.recipient, request.kind, &error, attempt);
            }
        }
    }
}
