// src/models/review.rs
use chrono::{DateTime, NaiveDateTime, Utc};
use leptos::logging::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::utils::time::format_timestamp;

/// Server-assigned row identity. Supabase tables use either a bigint or a
/// uuid/text primary key, so both are accepted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(id) => write!(f, "{}", id),
            RowId::Text(id) => write!(f, "{}", id),
        }
    }
}

/// A stored review row as returned by the query, insert and realtime paths.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Review {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    #[serde(default)]
    pub post_id: String,     // Scope key; used for filtering, never rendered
    pub text: String,
    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload. Only built from input that is non-empty after trimming.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub post_id: String,
    pub text: String,
}

impl NewReview {
    pub fn from_input(post_id: &str, raw_text: &str) -> Option<Self> {
        let text = raw_text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            post_id: post_id.to_string(),
            text: text.to_string(),
        })
    }
}

/// The two-line block a container shows for one review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReview {
    pub text: String,
    pub timestamp: String,
}

impl RenderedReview {
    pub fn from_review(review: &Review) -> Self {
        let created_at = review.created_at.unwrap_or_else(Utc::now);
        Self {
            text: review.text.clone(),
            timestamp: format_timestamp(&created_at),
        }
    }
}

/// Parses the timestamp shapes PostgREST and the realtime feed emit.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    // An unreadable timestamp must not fail the whole row or its list.
    Ok(raw.and_then(|value| match parse_timestamp(&value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!("[REVIEWS] Ignoring unreadable created_at {:?}: {}", value, err);
            None
        }
    }))
}
