//! models/dispatch_model.rs
//! Mensajes construidos y resultados del envío.

use serde::Serialize;
use serde_json::Value;

use crate::errors::DispatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Document,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::Document => "document",
        }
    }
}

/// Payload listo para POST /messages. Inmutable una vez construido.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRequest {
    pub recipient: String,
    pub kind: MessageKind,
    pub body: Value,
}

/// Lo que sale del builder: un request listo, o uno que ya falló
/// (plantilla inválida para ese contacto) y no debe tocar la red.
#[derive(Debug, Clone)]
pub enum PlannedRequest {
    Ready(MessageRequest),
    Invalid {
        recipient: String,
        kind: MessageKind,
        error: DispatchError,
    },
}

impl PlannedRequest {
    pub fn recipient(&self) -> &str {
        match self {
            PlannedRequest::Ready(req) => &req.recipient,
            PlannedRequest::Invalid { recipient, .. } => recipient,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            PlannedRequest::Ready(req) => req.kind,
            PlannedRequest::Invalid { kind, .. } => *kind,
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Resultado terminal de un mensaje. Siempre lleva `phone` y `kind`
/// para no tener que correlacionar por posición.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchResult {
    pub phone: String,
    pub kind: MessageKind,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub dry_run: bool,
    pub attempts: u32,
}

impl DispatchResult {
    pub fn dry_run(phone: &str, kind: MessageKind) -> Self {
        DispatchResult {
            phone: phone.to_string(),
            kind,
            ok: true,
            status: None,
            body: None,
            error: None,
            dry_run: true,
            attempts: 0,
        }
    }

    pub fn success(phone: &str, kind: MessageKind, status: u16, body: Value, attempts: u32) -> Self {
        DispatchResult {
            phone: phone.to_string(),
            kind,
            ok: true,
            status: Some(status),
            body: Some(body),
            error: None,
            dry_run: false,
            attempts,
        }
    }

    pub fn failure(phone: &str, kind: MessageKind, error: &DispatchError, attempts: u32) -> Self {
        let (status, body) = match error {
            DispatchError::Rejected { status, body } => (Some(*status), Some(body.clone())),
            _ => (None, None),
        };
        DispatchResult {
            phone: phone.to_string(),
            kind,
            ok: false,
            status,
            body,
            error: Some(error.to_string()),
            dry_run: false,
            attempts,
        }
    }

    /// `messages[0].id` de la respuesta del proveedor, si existe.
    pub fn message_id(&self) -> Option<&str> {
        self.body
            .as_ref()?
            .get("messages")?
            .get(0)?
            .get("id")?
            .as_str()
    }
}

/// Resultados en orden de finalización + total fijado antes de enviar.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub total: usize,
    pub results: Vec<DispatchResult>,
}

impl DispatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.ok).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.ok).count()
    }

    pub fn is_complete(&self) -> bool {
        self.results.len() == self.total
    }
}
