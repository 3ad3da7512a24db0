// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Outbound bus item encoding (§4.7, §6): the post-correlation state
//! republication and the correvent notification, in the same `<item id=…>`
//! envelope the Ingestor reads (§6: "in the same framing").

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event as XmlEvent};
use quick_xml::writer::Writer;
use vigil_core::{AckStatus, RawEventId, StateName};

fn ack_str(ack: AckStatus) -> &'static str {
    match ack {
        AckStatus::None => "NONE",
        AckStatus::Ack => "ACK",
        AckStatus::Closed => "CLOSED",
    }
}

/// A state republication for one SupItem, produced after every successfully
/// processed event (§4.7).
pub struct StateUpdate<'a> {
    pub message_id: &'a str,
    pub host: Option<&'a str>,
    pub service: Option<&'a str>,
    pub state: StateName,
    pub timestamp: i64,
    pub message: &'a str,
}

pub fn encode_state_update(update: &StateUpdate<'_>) -> String {
    let mut writer = Writer::new(Vec::new());
    item_envelope(&mut writer, update.message_id, |w| {
        element(w, "state", "…/state", |w| {
            if let Some(host) = update.host {
                leaf(w, "host", host);
            }
            if let Some(service) = update.service {
                leaf(w, "service", service);
            }
            leaf(w, "state", update.state.as_str());
            leaf(w, "timestamp", &update.timestamp.to_string());
            leaf(w, "message", update.message);
        });
    });
    finish(writer)
}

/// A correvent notification, emitted unless the event targeted the HLS
/// sentinel (§4.7).
pub struct CorreventNotification<'a> {
    pub message_id: &'a str,
    pub correvent_id: &'a str,
    pub cause_host: Option<&'a str>,
    pub cause_service: Option<&'a str>,
    pub priority: i32,
    pub ack: AckStatus,
    pub members: &'a [RawEventId],
}

#[allow(clippy::expect_used)]
pub fn encode_correvent_notification(notification: &CorreventNotification<'_>) -> String {
    let mut writer = Writer::new(Vec::new());
    item_envelope(&mut writer, notification.message_id, |w| {
        element(w, "correlated_event", "…/correlated_event", |w| {
            leaf(w, "correvent_id", notification.correvent_id);
            if let Some(host) = notification.cause_host {
                leaf(w, "cause_host", host);
            }
            if let Some(service) = notification.cause_service {
                leaf(w, "cause_service", service);
            }
            leaf(w, "priority", &notification.priority.to_string());
            leaf(w, "ack", ack_str(notification.ack));
            w.create_element("members")
                .write_inner_content::<_, quick_xml::Error>(|w| {
                    for member in notification.members {
                        leaf(w, "raw_event_id", member.as_str());
                    }
                    Ok(())
                })
                .expect("writing to an in-memory buffer never fails");
        });
    });
    finish(writer)
}

#[allow(clippy::expect_used)]
fn item_envelope(writer: &mut Writer<Vec<u8>>, id: &str, body: impl FnOnce(&mut Writer<Vec<u8>>)) {
    let mut start = BytesStart::new("item");
    start.push_attribute(("id", id));
    writer.write_event(XmlEvent::Start(start)).expect("in-memory write");
    body(writer);
    writer.write_event(XmlEvent::End(BytesEnd::new("item"))).expect("in-memory write");
}

#[allow(clippy::expect_used)]
fn element(writer: &mut Writer<Vec<u8>>, name: &str, namespace: &str, body: impl FnOnce(&mut Writer<Vec<u8>>)) {
    let mut start = BytesStart::new(name);
    start.push_attribute(("xmlns", namespace));
    writer.write_event(XmlEvent::Start(start)).expect("in-memory write");
    body(writer);
    writer.write_event(XmlEvent::End(BytesEnd::new(name))).expect("in-memory write");
}

#[allow(clippy::expect_used)]
fn leaf(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) {
    writer.write_event(XmlEvent::Start(BytesStart::new(name))).expect("in-memory write");
    writer.write_event(XmlEvent::Text(BytesText::new(text))).expect("in-memory write");
    writer.write_event(XmlEvent::End(BytesEnd::new(name))).expect("in-memory write");
}

#[allow(clippy::expect_used)]
fn finish(writer: Writer<Vec<u8>>) -> String {
    String::from_utf8(writer.into_inner()).expect("writer only ever receives &str/UTF-8 input")
}

#[cfg(test)]
#[path = "encode_tests.rs"]
mod tests;
