//! Phoenix channel frames spoken by Supabase Realtime.
//!
//! Outbound frames are built as JSON text; inbound text is decoded into
//! [`Inbound`] so the socket task only has to dispatch.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cell::Cell;

use crate::config::WidgetConfig;
use crate::error::RealtimeError;
use crate::models::review::Review;

pub const HEARTBEAT_TOPIC: &str = "phoenix";

/// One Phoenix message, as sent on the wire (protocol `vsn=1.0.0`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

impl Frame {
    fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// What a section's channel listens for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSpec {
    pub topic: String,
    pub schema: String,
    pub table: String,
    pub filter: String,
    pub access_token: String,
}

impl ChannelSpec {
    pub fn for_post(config: &WidgetConfig, post_id: &str) -> Self {
        Self {
            topic: config.channel_topic(post_id),
            schema: config.schema.clone(),
            table: config.table.clone(),
            filter: format!("post_id=eq.{post_id}"),
            access_token: config.anon_key.clone(),
        }
    }
}

/// Monotonic message refs, shared by everything writing to one socket.
#[derive(Debug, Default)]
pub struct RefCounter(Cell<u64>);

impl RefCounter {
    pub fn next(&self) -> String {
        let next = self.0.get() + 1;
        self.0.set(next);
        next.to_string()
    }
}

pub fn join(spec: &ChannelSpec, reference: &str) -> String {
    Frame {
        topic: spec.topic.clone(),
        event: "phx_join".to_string(),
        payload: json!({
            "config": {
                "broadcast": { "ack": false, "self": false },
                "presence": { "key": "" },
                "postgres_changes": [{
                    "event": "INSERT",
                    "schema": spec.schema,
                    "table": spec.table,
                    "filter": spec.filter,
                }],
                "private": false,
            },
            "access_token": spec.access_token,
        }),
        reference: Some(reference.to_string()),
    }
    .encode()
}

pub fn heartbeat(reference: &str) -> String {
    Frame {
        topic: HEARTBEAT_TOPIC.to_string(),
        event: "heartbeat".to_string(),
        payload: json!({}),
        reference: Some(reference.to_string()),
    }
    .encode()
}

pub fn leave(topic: &str, reference: &str) -> String {
    Frame {
        topic: topic.to_string(),
        event: "phx_leave".to_string(),
        payload: json!({}),
        reference: Some(reference.to_string()),
    }
    .encode()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A row was inserted under the channel's filter
    Insert(Review),
    /// Server accepted the join
    Joined,
    /// Server rejected the join
    JoinFailed(String),
    /// Channel-level error reported by the server
    ChannelError(String),
    /// Server closed the channel
    Closed,
    /// Heartbeat replies, presence, other topics
    Ignored,
}

/// Decode one text frame received for `topic`, whose join used `join_ref`.
pub fn decode(text: &str, topic: &str, join_ref: &str) -> Result<Inbound, RealtimeError> {
    let frame: Frame = serde_json::from_str(text)?;
    if frame.topic != topic {
        return Ok(Inbound::Ignored);
    }

    let inbound = match frame.event.as_str() {
        "postgres_changes" => decode_change(&frame.payload)?,
        "phx_reply" if frame.reference.as_deref() == Some(join_ref) => {
            match frame.payload.get("status").and_then(Value::as_str) {
                Some("ok") => Inbound::Joined,
                _ => Inbound::JoinFailed(frame.payload["response"].to_string()),
            }
        }
        "phx_error" => Inbound::ChannelError(frame.payload.to_string()),
        "phx_close" => Inbound::Closed,
        "system" if frame.payload.get("status").and_then(Value::as_str) == Some("error") => {
            let message = frame
                .payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown realtime error");
            Inbound::ChannelError(message.to_string())
        }
        _ => Inbound::Ignored,
    };
    Ok(inbound)
}

fn decode_change(payload: &Value) -> Result<Inbound, RealtimeError> {
    let data = &payload["data"];
    if data["type"].as_str() != Some("INSERT") {
        return Ok(Inbound::Ignored);
    }
    if let Some(errors) = data.get("errors").filter(|errors| !errors.is_null()) {
        return Ok(Inbound::ChannelError(errors.to_string()));
    }
    let record = data
        .get("record")
        .cloned()
        .ok_or_else(|| RealtimeError::Protocol("INSERT change without a record".to_string()))?;
    Ok(Inbound::Insert(serde_json::from_value(record)?))
}
