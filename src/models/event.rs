use crate::error::{ApiError, Result};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parse a local ISO-8601 timestamp. An RFC 3339 offset, if present, is
/// dropped and the wall-clock time kept.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.naive_local());
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

/// A structured event produced from free text, and the body accepted by the
/// event-creation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedEvent {
    pub club_id: Uuid,
    pub title: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start_time: NaiveDateTime,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub end_time: NaiveDateTime,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl ExtractedEvent {
    /// Shape checks shared by every producer of events and by event creation.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ApiError::InvalidInput("title is required".to_string()));
        }

        if self.end_time <= self.start_time {
            return Err(ApiError::InvalidInput(
                "endTime must be after startTime".to_string(),
            ));
        }

        Ok(())
    }
}

/// Request body for `POST /api/events/parse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseEventRequest {
    #[serde(default)]
    pub text: String,
}

/// Response body for `POST /api/events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}
