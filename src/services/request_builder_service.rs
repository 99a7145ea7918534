//! services/request_builder_service.rs
//! Expande contactos x tipos de payload en una lista plana de requests.

use serde_json::{json, Map, Value};

use crate::{
    errors::{BulkResult, DispatchError},
    models::{
        contact_model::Contact,
        dispatch_model::{MessageKind, MessageRequest, PlannedRequest},
        media_model::{MediaRef, ResolvedMedia},
    },
};

/// Sustituye cada `{campo}` con el valor del contacto.
/// `{{` y `}}` son llaves literales. Un campo inexistente es error.
/// El nombre se toma literal (`{ name }` busca " name "); `{name:>6}` y
/// `{name!r}` se rechazan como plantilla mal formada.
pub fn render_template(template: &str, contact: &Contact) -> BulkResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut inner = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    if next == '{' {
                        return Err(DispatchError::MalformedTemplate(
                            "'{' anidado dentro de un placeholder".to_string(),
                        ));
                    }
                    inner.push(next);
                }
                if !closed {
                    return Err(DispatchError::MalformedTemplate(
                        "'{' sin cerrar".to_string(),
                    ));
                }

                let field = inner.as_str();
                if field.is_empty() {
                    return Err(DispatchError::MalformedTemplate(
                        "placeholder vacío '{}'".to_string(),
                    ));
                }
                if field.contains([':', '!']) {
                    return Err(DispatchError::MalformedTemplate(format!(
                        "formato no soportado en '{{{}}}'",
                        field
                    )));
                }

                let value = contact.get(field).ok_or_else(|| DispatchError::MissingField {
                    field: field.to_string(),
                })?;
                out.push_str(value);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(DispatchError::MalformedTemplate(
                    "'}' sin abrir".to_string(),
                ));
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

/// Cuerpo común de todos los mensajes.
fn envelope(phone: &str, kind: MessageKind, content: Value) -> Value {
    let mut body = Map::new();
    body.insert("messaging_product".to_string(), json!("whatsapp"));
    body.insert("to".to_string(), json!(phone));
    body.insert("type".to_string(), json!(kind.as_str()));
    body.insert(kind.as_str().to_string(), content);
    Value::Object(body)
}

fn media_object(media: &ResolvedMedia, with_filename: bool) -> Value {
    let mut obj = Map::new();
    match &media.reference {
        MediaRef::Id(id) => {
            obj.insert("id".to_string(), json!(id));
        }
        MediaRef::Link(link) => {
            obj.insert("link".to_string(), json!(link));
        }
        MediaRef::Deferred => {}
    }
    if with_filename {
        if let Some(name) = &media.filename {
            obj.insert("filename".to_string(), json!(name));
        }
    }
    Value::Object(obj)
}

pub fn text_request(phone: &str, text: &str) -> MessageRequest {
    MessageRequest {
        recipient: phone.to_string(),
        kind: MessageKind::Text,
        body: envelope(phone, MessageKind::Text, json!({ "body": text })),
    }
}

pub fn image_request(phone: &str, image: &ResolvedMedia) -> MessageRequest {
    MessageRequest {
        recipient: phone.to_string(),
        kind: MessageKind::Image,
        body: envelope(phone, MessageKind::Image, media_object(image, false)),
    }
}

pub fn document_request(phone: &str, document: &ResolvedMedia) -> MessageRequest {
    MessageRequest {
        recipient: phone.to_string(),
        kind: MessageKind::Document,
        body: envelope(phone, MessageKind::Document, media_object(document, true)),
    }
}

/// Por contacto: texto (si la plantilla renderiza a algo), imagen y documento.
/// Un error de plantilla solo invalida el texto de ese contacto.
pub fn build_requests(
    contacts: &[Contact],
    template: Option<&str>,
    image: Option<&ResolvedMedia>,
    document: Option<&ResolvedMedia>,
) -> Vec<PlannedRequest> {
    let template = template.filter(|t| !t.trim().is_empty());
    let mut planned = Vec::new();

    for contact in contacts {
        let phone = contact.phone();

        if let Some(tpl) = template {
            match render_template(tpl, contact) {
                Ok(text) if text.trim().is_empty() => {
                    log::debug!("(build_requests) Texto vacío para {}, se omite", phone);
                }
                Ok(text) => planned.push(PlannedRequest::Ready(text_request(phone, &text))),
                Err(error) => {
                    log::warn!("(build_requests) Plantilla inválida para {}: {}", phone, error);
                    planned.push(PlannedRequest::Invalid {
                        recipient: phone.to_string(),
                        kind: MessageKind::Text,
                        error,
                    });
                }
            }
        }

        if let Some(img) = image {
            planned.push(PlannedRequest::Ready(image_request(phone, img)));
        }

        if let Some(doc) = document {
            planned.push(PlannedRequest::Ready(document_request(phone, doc)));
        }
    }

    planned
}
