//! services/result_log_service.rs
//! Guarda el reporte como CSV (una fila por resultado) para descargarlo después.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Local;
use uuid::Uuid;

use crate::models::dispatch_model::DispatchReport;

const LOG_PREFIX: &str = "results_";

#[derive(Clone, Debug)]
pub struct ResultLogService {
    log_dir: PathBuf,
}

impl ResultLogService {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Escribe `results_<YYYYmmdd_HHMMSS>_<id>.csv` y retorna la ruta.
    pub fn write_report(&self, report: &DispatchReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.log_dir)
            .with_context(|| format!("No se pudo crear {:?}", self.log_dir))?;

        let short_id = Uuid::new_v4().simple().to_string();
        let file_name = format!(
            "{}{}_{}.csv",
            LOG_PREFIX,
            Local::now().format("%Y%m%d_%H%M%S"),
            &short_id[..8]
        );
        let path = self.log_dir.join(file_name);

        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("No se pudo abrir {:?}", path))?;
        writer.write_record(["phone", "kind", "status", "message_id", "error", "dry_run"])?;

        for result in &report.results {
            let status = match (result.dry_run, result.ok, result.status) {
                (true, _, _) => "dry_run".to_string(),
                (false, _, Some(code)) => code.to_string(),
                (false, true, None) => "ok".to_string(),
                (false, false, None) => "error".to_string(),
            };
            writer.write_record([
                result.phone.as_str(),
                result.kind.as_str(),
                status.as_str(),
                result.message_id().unwrap_or(""),
                result.error.as_deref().unwrap_or(""),
                if result.dry_run { "true" } else { "false" },
            ])?;
        }
        writer.flush().context("No se pudo escribir el log de resultados")?;

        log::info!(
            "(write_report) Log con {} filas guardado en {:?}",
            report.results.len(),
            path
        );
        Ok(path)
    }

    /// Ruta de un log existente. `None` si el nombre no es uno de nuestros archivos.
    pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        let valid = file_name.starts_with(LOG_PREFIX)
            && file_name.ends_with(".csv")
            && !file_name.contains(['/', '\\'])
            && !file_name.contains("..");
        if !valid {
            return None;
        }
        let path = self.log_dir.join(file_name);
        path.is_file().then_some(path)
    }
}
