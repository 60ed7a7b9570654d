//! Call detail record value objects

use serde::{Deserialize, Deserializer};

/// A single call detail record as returned by the call-history endpoint.
///
/// The upstream API has used different spellings over time, so each field
/// accepts both the current and the legacy name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallRecord {
    #[serde(rename = "uniqueId", alias = "uniqueid", default)]
    pub unique_id: String,

    /// Path of the recording on the platform, e.g. `2018/08/10/abc.mp3`.
    /// Empty or missing when the call was not recorded.
    #[serde(rename = "recording", alias = "filename", default)]
    pub recording: Option<String>,

    /// Call duration in seconds
    #[serde(default)]
    pub duration: f64,

    /// Asterisk linked id; addresses the recording on legacy routes
    #[serde(
        rename = "linkedId",
        alias = "linkedid",
        default,
        deserialize_with = "string_or_number"
    )]
    pub linked_id: Option<String>,
}

/// Some PBX versions send the linked id as a JSON number
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl CallRecord {
    /// The recording reference, if the call carries a non-empty one
    pub fn recording_reference(&self) -> Option<&str> {
        self.recording.as_deref().filter(|r| !r.is_empty())
    }
}

/// One page of call history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallPage {
    pub items: Vec<CallRecord>,
    /// Target of the `next` relation, if the API advertised one
    pub next_link: Option<String>,
    /// Total page count derived from a `last` relation
    pub total_pages: Option<u32>,
}

impl CallPage {
    /// A page without pagination metadata (single-shot response)
    pub fn single(items: Vec<CallRecord>) -> Self {
        Self {
            items,
            next_link: None,
            total_pages: None,
        }
    }

    pub fn has_next(&self) -> bool {
        self.next_link.is_some()
    }
}
