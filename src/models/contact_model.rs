//! models/contact_model.rs
//! Un contacto = una fila de la planilla, con `phone` normalizado.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{BulkResult, DispatchError};

/// Columna alternativa usada por las planillas viejas.
const LEGACY_PHONE_COLUMN: &str = "phone_number";

#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    phone: String,
    fields: HashMap<String, String>,
}

impl Contact {
    /// Normaliza `phone` a solo dígitos. Si no hay `phone` se usa `phone_number`.
    pub fn from_fields(fields: HashMap<String, String>) -> BulkResult<Self> {
        let raw_phone = fields
            .get("phone")
            .filter(|p| !p.trim().is_empty())
            .or_else(|| fields.get(LEGACY_PHONE_COLUMN))
            .ok_or_else(|| {
                DispatchError::InvalidContact("el contacto no tiene columna 'phone'".to_string())
            })?;

        let phone = normalize_phone(raw_phone)?;
        if phone.is_empty() {
            return Err(DispatchError::InvalidContact(format!(
                "teléfono sin dígitos: '{}'",
                raw_phone
            )));
        }

        let mut fields = fields;
        fields.insert("phone".to_string(), phone.clone());
        Ok(Contact { phone, fields })
    }

    /// Variante para filas que llegan como objeto JSON (números, null, etc.).
    pub fn from_json(row: &Map<String, Value>) -> BulkResult<Self> {
        let fields = row
            .iter()
            .map(|(k, v)| (k.clone(), json_to_field(v)))
            .collect();
        Contact::from_fields(fields)
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

/// Deja solo dígitos. Acepta floats de planilla ("18095551234.0",
/// "1.8095551234e10"); una notación científica que no da un entero es error.
pub fn normalize_phone(raw: &str) -> BulkResult<String> {
    let trimmed = raw.trim();
    if trimmed.contains(['e', 'E']) {
        return trimmed
            .parse::<f64>()
            .ok()
            .and_then(whole_number)
            .ok_or_else(|| {
                DispatchError::InvalidContact(format!(
                    "teléfono en notación científica inválido: '{}'",
                    raw
                ))
            });
    }

    // Pandas suele leer la columna como float: "18095551234.0"
    let trimmed = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    Ok(trimmed.chars().filter(|c| c.is_ascii_digit()).collect())
}

fn whole_number(f: f64) -> Option<String> {
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < 1e18).then(|| format!("{:.0}", f))
}

fn json_to_field(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64()
                    .and_then(whole_number)
                    .unwrap_or_else(|| n.to_string())
            }
        }
        other => other.to_string(),
    }
}
