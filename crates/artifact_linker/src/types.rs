use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Caller-assigned artifact identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(pub String);

impl ArtifactId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: ArtifactId,
    pub file_name: String,
    pub file_size: u64,
    /// First message the artifact was auto-linked to; `None` means unattached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_message_index: Option<usize>,
}

impl Artifact {
    pub fn new(id: impl Into<String>, file_name: impl Into<String>, file_size: u64) -> Self {
        Self {
            id: ArtifactId::new(id),
            file_name: file_name.into(),
            file_size,
            linked_message_index: None,
        }
    }

    /// `(fileName, fileSize)` identity used for de-duplication.
    pub(crate) fn same_file(&self, other: &Artifact) -> bool {
        self.file_size == other.file_size && self.file_name == other.file_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub attached_artifact_ids: BTreeSet<ArtifactId>,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attached_artifact_ids: BTreeSet::new(),
        }
    }

    pub fn has_artifact(&self, id: &ArtifactId) -> bool {
        self.attached_artifact_ids.contains(id)
    }
}

/// An upload that matched an artifact already in the pool and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file_name} ({file_size} bytes) is already uploaded as {existing_id}")]
pub struct DuplicateArtifact {
    pub rejected_id: ArtifactId,
    pub existing_id: ArtifactId,
    pub file_name: String,
    pub file_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkResult {
    pub updated_artifacts: Vec<Artifact>,
    pub updated_messages: Vec<ChatMessage>,
    /// Number of newly registered artifacts attached to at least one message.
    pub match_count: usize,
    pub match_descriptions: Vec<String>,
    pub duplicates: Vec<DuplicateArtifact>,
}

impl LinkResult {
    pub fn status_message(&self) -> String {
        let mut status = match self.match_count {
            0 => "No files were linked to messages.".to_string(),
            1 => "Linked 1 file to messages.".to_string(),
            n => format!("Linked {n} files to messages."),
        };
        match self.duplicates.len() {
            0 => {}
            1 => status.push_str(" Skipped 1 duplicate file."),
            n => status.push_str(&format!(" Skipped {n} duplicate files.")),
        }
        status
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemovalResult {
    pub updated_artifacts: Vec<Artifact>,
    pub updated_messages: Vec<ChatMessage>,
}
