// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Inbound bus item decoding (§3, §6).
//!
//! A bus item wraps exactly one root element (`event`, `ticket`,
//! `computation_order`, or anything else) inside an `<item id="...">`
//! envelope. The root element name classifies the payload; namespaces are
//! read but not enforced beyond that classification (§6 lists the exact
//! namespaces a production deployment uses).

use crate::WireError;
use quick_xml::events::Event as XmlEvent;
use quick_xml::reader::Reader;
use vigil_core::{EventPayload, Message, MessageId, Payload, TicketPayload};

/// Decode one bus item into a [`Message`]. The message id (`item`'s `id`
/// attribute) is required; its absence is an [`WireError::InvalidMessage`]
/// (§4.5: "if missing, drop with an error log").
pub fn decode_item(xml: &str) -> Result<Message, WireError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut id: Option<String> = None;
    let mut payload: Option<Payload> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            XmlEvent::Start(ref e) if local_name(e.name().as_ref()) == "item" => {
                id = attr(e, "id");
            }
            XmlEvent::Start(ref e) if payload.is_none() => {
                let name = local_name(e.name().as_ref()).to_string();
                payload = Some(decode_root(&mut reader, &name)?);
            }
            XmlEvent::Empty(ref e) if payload.is_none() => {
                // Self-closing root element: no fields to collect.
                let name = local_name(e.name().as_ref());
                payload = Some(match name {
                    "event" => {
                        return Err(WireError::InvalidMessage("event missing <state>".to_string()))
                    }
                    "ticket" => Payload::Ticket(TicketPayload::default()),
                    "computation_order" => Payload::ComputationOrder(Vec::new()),
                    _ => Payload::Other,
                });
            }
            XmlEvent::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let id = id.ok_or_else(|| WireError::InvalidMessage("missing item id".to_string()))?;
    let payload = payload.unwrap_or(Payload::Other);
    Ok(Message::new(MessageId::new(id), payload))
}

fn decode_root(reader: &mut Reader<&[u8]>, name: &str) -> Result<Payload, WireError> {
    match name {
        "event" => Ok(Payload::Event(decode_event_body(reader)?)),
        "ticket" => Ok(Payload::Ticket(decode_ticket_body(reader)?)),
        "computation_order" => Ok(Payload::ComputationOrder(decode_computation_order_body(reader)?)),
        _ => {
            skip_to_end(reader, name)?;
            Ok(Payload::Other)
        }
    }
}

/// Reads child elements of the current (already-open) element until its
/// matching end tag, collecting `(local_name, text)` pairs. `Empty` tags
/// yield an empty string body.
fn collect_fields(
    reader: &mut Reader<&[u8]>,
    root_name: &str,
) -> Result<Vec<(String, String)>, WireError> {
    let mut fields = Vec::new();
    let mut buf = Vec::new();
    let mut current: Option<String> = None;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            XmlEvent::Start(ref e) => {
                current = Some(local_name(e.name().as_ref()).to_string());
                text.clear();
            }
            XmlEvent::Empty(ref e) => {
                fields.push((local_name(e.name().as_ref()).to_string(), String::new()));
            }
            XmlEvent::Text(ref e) => {
                if current.is_some() {
                    text.push_str(&e.unescape()?);
                }
            }
            XmlEvent::End(ref e) => {
                let name = local_name(e.name().as_ref());
                if name == root_name {
                    break;
                }
                if current.as_deref() == Some(name) {
                    if let Some(finished) = current.take() {
                        fields.push((finished, std::mem::take(&mut text)));
                    }
                }
            }
            XmlEvent::Eof => {
                return Err(WireError::InvalidMessage(format!(
                    "unexpected eof inside <{root_name}>"
                )));
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(fields)
}

fn skip_to_end(reader: &mut Reader<&[u8]>, root_name: &str) -> Result<(), WireError> {
    let mut depth = 0u32;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            XmlEvent::Start(ref e) if local_name(e.name().as_ref()) == root_name => depth += 1,
            XmlEvent::End(ref e) if local_name(e.name().as_ref()) == root_name => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            XmlEvent::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

fn decode_event_body(reader: &mut Reader<&[u8]>) -> Result<EventPayload, WireError> {
    let mut payload = EventPayload::default();
    let mut saw_state = false;
    for (name, value) in collect_fields(reader, "event")? {
        match name.as_str() {
            "host" => payload.host = non_empty(value),
            "service" => payload.service = non_empty(value),
            "state" => {
                payload.state = value;
                saw_state = true;
            }
            "timestamp" => {
                payload.timestamp = value.trim().parse().map_err(|_| {
                    WireError::InvalidMessage(format!("invalid timestamp {value:?}"))
                })?;
            }
            "message" => payload.message = value,
            "impacted_HLS" => {
                if !value.is_empty() {
                    payload.impacted_hls.push(value);
                }
            }
            "ticket_id" => payload.ticket_id = non_empty(value),
            "acknowledgement_status" => payload.acknowledgement_status = non_empty(value),
            _ => {}
        }
    }
    if !saw_state || payload.state.is_empty() {
        return Err(WireError::InvalidMessage("event missing <state>".to_string()));
    }
    Ok(payload)
}

fn decode_ticket_body(reader: &mut Reader<&[u8]>) -> Result<TicketPayload, WireError> {
    let mut payload = TicketPayload::default();
    for (name, value) in collect_fields(reader, "ticket")? {
        match name.as_str() {
            "host" => payload.host = non_empty(value),
            "service" => payload.service = non_empty(value),
            "ticket_id" => payload.ticket_id = non_empty(value),
            "acknowledgement_status" => payload.acknowledgement_status = non_empty(value),
            "message" => payload.message = non_empty(value),
            _ => {}
        }
    }
    Ok(payload)
}

fn decode_computation_order_body(reader: &mut Reader<&[u8]>) -> Result<Vec<String>, WireError> {
    let mut hls = Vec::new();
    for (name, value) in collect_fields(reader, "computation_order")? {
        if name == "hls" && !value.is_empty() && !hls.contains(&value) {
            hls.push(value);
        }
    }
    Ok(hls)
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn local_name(qualified: &[u8]) -> &str {
    let s = std::str::from_utf8(qualified).unwrap_or("");
    s.rsplit(':').next().unwrap_or(s)
}

fn attr(e: &quick_xml::events::BytesStart, key: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| local_name(a.key.as_ref()) == key)
        .and_then(|a| a.unescape_value().ok().map(|s| s.into_owned()))
}

#[cfg(test)]
#[path = "decode_tests.rs"]
mod tests;
