//! Selection of recordings from raw call records

use std::collections::{HashMap, HashSet};

use crate::domain::call::{AudioExtension, CallRecord};

/// Two distinct raw references that the extension override mapped onto
/// the same reference. Only one download is made for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideCollision {
    pub kept: String,
    pub dropped: String,
    pub rewritten: String,
}

/// Recordings picked out of a call list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSelection {
    /// Number of calls that carried a recording, before deduplication
    pub matched_calls: usize,
    /// Total duration of the matched calls in seconds
    pub total_duration_secs: f64,
    /// Unique references in first-seen order
    pub references: Vec<String>,
    pub collisions: Vec<OverrideCollision>,
    /// Reference -> linked id of the first call that carried one
    pub linked_ids: HashMap<String, String>,
}

impl RecordingSelection {
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Total duration in minutes, rounded to one decimal for display
    pub fn total_duration_minutes(&self) -> String {
        format!("{:.1}", self.total_duration_secs / 60.0)
    }
}

/// Keep calls with a recording, apply the extension override and
/// deduplicate by the resulting reference.
pub fn select_recordings(
    records: &[CallRecord],
    extension_override: Option<AudioExtension>,
) -> RecordingSelection {
    let mut selection = RecordingSelection::default();
    let mut seen: HashSet<String> = HashSet::new();
    // rewritten reference -> raw reference that produced it first
    let mut origins: HashMap<String, String> = HashMap::new();

    for record in records {
        let Some(raw) = record.recording_reference() else {
            continue;
        };

        selection.matched_calls += 1;
        selection.total_duration_secs += record.duration;

        let reference = match extension_override {
            Some(ext) => ext.rewrite(raw),
            None => raw.to_string(),
        };

        match origins.get(&reference) {
            Some(first) if first != raw => {
                let already_reported = selection
                    .collisions
                    .iter()
                    .any(|c| c.dropped == raw && c.rewritten == reference);
                if !already_reported {
                    selection.collisions.push(OverrideCollision {
                        kept: first.clone(),
                        dropped: raw.to_string(),
                        rewritten: reference.clone(),
                    });
                }
            }
            Some(_) => {}
            None => {
                origins.insert(reference.clone(), raw.to_string());
            }
        }

        if let Some(linked_id) = record.linked_id.as_deref().filter(|id| !id.is_empty()) {
            selection
                .linked_ids
                .entry(reference.clone())
                .or_insert_with(|| linked_id.to_string());
        }

        if seen.insert(reference.clone()) {
            selection.references.push(reference);
        }
    }

    selection
}
