//! Download target value object

use std::fmt;
use std::path::{Path, PathBuf};

/// Default local root for downloaded recordings
pub const DEFAULT_OUTPUT_DIR: &str = "downloads";

/// A recording to fetch and where to store it.
///
/// The destination is derived only from the reference and the output root,
/// so the same reference always lands on the same path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DownloadTarget {
    reference: String,
    destination: PathBuf,
    linked_id: Option<String>,
}

impl DownloadTarget {
    /// Build the target for a (possibly extension-rewritten) reference
    pub fn new(reference: impl Into<String>, output_root: &Path) -> Self {
        let reference = reference.into();
        let destination = destination_for(&reference, output_root);
        Self {
            reference,
            destination,
            linked_id: None,
        }
    }

    /// Attach the linked id of the call, used by legacy recording routes.
    /// The destination does not change.
    pub fn with_linked_id(mut self, linked_id: Option<String>) -> Self {
        self.linked_id = linked_id.filter(|id| !id.is_empty());
        self
    }

    /// Reference used to address the recording on the API
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn linked_id(&self) -> Option<&str> {
        self.linked_id.as_deref()
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

impl fmt::Display for DownloadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference)
    }
}

/// Replace characters that are not safe in file names
pub fn sanitize_file_name(name: &str) -> String {
    name.replace('*', "star")
}

/// Map a reference onto the output root, one directory per `/` segment.
/// Empty, `.` and `..` segments are dropped so nothing escapes the root.
fn destination_for(reference: &str, output_root: &Path) -> PathBuf {
    let sanitized = sanitize_file_name(reference);
    sanitized
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .fold(output_root.to_path_buf(), |path, segment| path.join(segment))
}
