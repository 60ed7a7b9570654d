//! Call history filter value object

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InvalidExtensionError;

/// Audio container the recordings can be requested in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioExtension {
    Mp3,
    Wav,
}

impl AudioExtension {
    /// File extension without the leading dot
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }

    /// Rewrite a trailing `.mp3`/`.wav` (any case) to this extension.
    /// References with any other suffix are returned unchanged.
    pub fn rewrite(&self, reference: &str) -> String {
        match reference.rfind('.') {
            Some(dot)
                if [Self::Mp3, Self::Wav]
                    .iter()
                    .any(|ext| reference[dot + 1..].eq_ignore_ascii_case(ext.as_str())) =>
            {
                format!("{}.{}", &reference[..dot], self.as_str())
            }
            _ => reference.to_string(),
        }
    }
}

impl fmt::Display for AudioExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AudioExtension {
    type Err = InvalidExtensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "wav" => Ok(Self::Wav),
            _ => Err(InvalidExtensionError {
                input: s.to_string(),
            }),
        }
    }
}

/// Filter applied to the call-history query.
/// Built once from the parsed arguments and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFilter {
    /// Start of the range, passed through verbatim (e.g. `2018-08-01`)
    pub start_time: String,
    pub end_time: String,
    pub queues: Vec<String>,
    pub extension_override: Option<AudioExtension>,
}

impl CallFilter {
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
            queues: Vec::new(),
            extension_override: None,
        }
    }

    pub fn with_queues(mut self, queues: Vec<String>) -> Self {
        self.queues = queues;
        self
    }

    pub fn with_extension(mut self, extension: Option<AudioExtension>) -> Self {
        self.extension_override = extension;
        self
    }

    /// Queue names as the JSON array the API expects, or None when unfiltered
    pub fn queues_query(&self) -> Option<String> {
        if self.queues.is_empty() {
            None
        } else {
            serde_json::to_string(&self.queues).ok()
        }
    }
}

/// Split a comma-separated queue list, trimming names and dropping blanks
pub fn parse_queue_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_replaces_mp3_with_wav() {
        assert_eq!(AudioExtension::Wav.rewrite("call_5.mp3"), "call_5.wav");
    }

    #[test]
    fn rewrite_is_case_insensitive() {
        assert_eq!(AudioExtension::Mp3.rewrite("2018/08/01/a.WAV"), "2018/08/01/a.mp3");
    }

    #[test]
    fn rewrite_keeps_matching_extension() {
        assert_eq!(AudioExtension::Mp3.rewrite("a.mp3"), "a.mp3");
    }

    #[test]
    fn rewrite_leaves_unknown_suffix_alone() {
        assert_eq!(AudioExtension::Wav.rewrite("a.ogg"), "a.ogg");
        assert_eq!(AudioExtension::Wav.rewrite("mp3"), "mp3");
        assert_eq!(AudioExtension::Wav.rewrite("notmp3"), "notmp3");
    }

    #[test]
    fn parses_extension() {
        assert_eq!("mp3".parse::<AudioExtension>().unwrap(), AudioExtension::Mp3);
        assert_eq!("WAV".parse::<AudioExtension>().unwrap(), AudioExtension::Wav);
        assert!("flac".parse::<AudioExtension>().is_err());
    }

    #[test]
    fn queue_list_is_trimmed() {
        assert_eq!(
            parse_queue_list("Queue1, Queue2 ,,"),
            vec!["Queue1".to_string(), "Queue2".to_string()]
        );
    }

    #[test]
    fn queues_query_is_json_array() {
        let filter = CallFilter::new("2018-08-01", "2018-08-31")
            .with_queues(vec!["Sales".into(), "Support".into()]);
        assert_eq!(filter.queues_query().as_deref(), Some(r#"["Sales","Support"]"#));
    }

    #[test]
    fn queues_query_absent_without_queues() {
        let filter = CallFilter::new("2018-08-01", "2018-08-31");
        assert!(filter.queues_query().is_none());
    }
}
