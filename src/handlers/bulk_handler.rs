//! handlers/bulk_handler.rs
//! Endpoints del envío masivo y descarga de logs.

use actix_files::NamedFile;
use actix_web::{http::StatusCode, web, HttpResponse};
use serde_json::json;

use crate::{
    errors::{BulkResult, DispatchError},
    models::{
        bulk_model::{BulkSendRequest, BulkSendResponse},
        contact_model::Contact,
    },
    services::{
        bulk_send_service::{BulkSendJob, BulkSendService},
        result_log_service::ResultLogService,
    },
};

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";
const DEFAULT_DOCUMENT_MIME: &str = "application/pdf";

/// Convierte el JSON recibido en el job que entiende el servicio.
pub fn job_from_request(req: BulkSendRequest) -> BulkResult<BulkSendJob> {
    if req.contacts.is_empty() {
        return Err(DispatchError::InvalidContact(
            "la lista de contactos está vacía".to_string(),
        ));
    }

    let contacts = req
        .contacts
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Contact::from_json(row).map_err(|e| match e {
                DispatchError::InvalidContact(msg) => {
                    DispatchError::InvalidContact(format!("fila {}: {}", i.saturating_add(1), msg))
                }
                other => other,
            })
        })
        .collect::<BulkResult<Vec<_>>>()?;

    let image = req
        .image
        .map(|i| i.into_asset(DEFAULT_IMAGE_MIME))
        .transpose()?;
    let document = req
        .document
        .map(|d| d.into_asset(DEFAULT_DOCUMENT_MIME))
        .transpose()?;

    Ok(BulkSendJob {
        contacts,
        template: req.message,
        image,
        document,
    })
}

fn error_status(e: &DispatchError) -> StatusCode {
    match e {
        DispatchError::InvalidContact(_) | DispatchError::InvalidAsset(_) => {
            StatusCode::BAD_REQUEST
        }
        e if e.is_template_error() => StatusCode::BAD_REQUEST,
        DispatchError::Upload { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(e: &DispatchError) -> HttpResponse {
    HttpResponse::build(error_status(e)).json(json!({
        "success": false,
        "error": e.to_string()
    }))
}

/// POST /api/bulk/send
pub async fn bulk_send_endpoint(
    bulk_service: web::Data<BulkSendService>,
    log_service: web::Data<ResultLogService>,
    body: web::Json<BulkSendRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    let dry_run = req.dry_run;
    let write_log = req.write_log;

    let job = match job_from_request(req) {
        Ok(job) => job,
        Err(e) => {
            log::error!("(bulk_send_endpoint) Request inválido: {}", e);
            return error_response(&e);
        }
    };

    let report = match bulk_service
        .run(&job, dry_run, |done, total| {
            log::info!("(bulk_send_endpoint) Progreso {}/{}", done, total);
        })
        .await
    {
        Ok(report) => report,
        Err(e) => {
            log::error!("(bulk_send_endpoint) Envío abortado: {}", e);
            return error_response(&e);
        }
    };

    let log_file = if write_log {
        match log_service.write_report(&report) {
            Ok(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
            Err(e) => {
                // El envío ya se hizo; no fallamos por el log.
                log::error!("(bulk_send_endpoint) No se pudo guardar el log: {:?}", e);
                None
            }
        }
    } else {
        None
    };

    let failed = report.failed();
    HttpResponse::Ok().json(BulkSendResponse {
        success: failed == 0,
        total: report.total,
        sent: report.succeeded(),
        failed,
        dry_run,
        log_file: log_file.map(|name| format!("/api/bulk/logs/{}", urlencoding::encode(&name))),
        results: report.results,
    })
}

/// GET /api/bulk/logs/{filename}
/// Sirve el CSV de resultados generado por un envío anterior.
pub async fn download_log_endpoint(
    log_service: web::Data<ResultLogService>,
    path: web::Path<String>,
) -> Result<NamedFile, actix_web::Error> {
    let filename = path.into_inner();
    let log_path = log_service
        .resolve(&filename)
        .ok_or_else(|| actix_web::error::ErrorNotFound("Log no encontrado"))?;

    Ok(NamedFile::open(log_path)?.set_content_disposition(
        actix_web::http::header::ContentDisposition::attachment(filename),
    ))
}

/// GET /api/health
pub async fn health_endpoint() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
