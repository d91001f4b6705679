use std::collections::HashMap;
use std::fmt;

use export_logging::{export_debug, export_info, export_warn};

use crate::extract::{extract_file_names, file_stem, normalize_file_name};
use crate::{Artifact, ArtifactId, ChatMessage, DuplicateArtifact, LinkResult, RemovalResult};

/// Stems must be strictly longer than this to be matched on their own.
pub const DEFAULT_MIN_STEM_LEN: usize = 3;

#[derive(Debug, Clone)]
pub struct LinkSettings {
    pub min_stem_len: usize,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            min_stem_len: DEFAULT_MIN_STEM_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchStrategy {
    ExtractedName,
    FullName,
    Stem,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStrategy::ExtractedName => write!(f, "file name mentioned"),
            MatchStrategy::FullName => write!(f, "file name found in text"),
            MatchStrategy::Stem => write!(f, "name without extension found in text"),
        }
    }
}

/// Normalized file name -> indices of messages mentioning it, ascending.
type NameIndex = HashMap<String, Vec<usize>>;

#[derive(Debug, Clone, Default)]
pub struct ArtifactLinker {
    settings: LinkSettings,
}

impl ArtifactLinker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: LinkSettings) -> Self {
        Self { settings }
    }

    /// Registers `new_artifacts` and attaches each one to every message that
    /// references it. Inputs are left untouched.
    ///
    /// Uploads whose `(file_name, file_size)` is already in the pool, including
    /// earlier entries of the same batch, are reported in `duplicates` and
    /// not registered.
    pub fn process_upload(
        &self,
        new_artifacts: &[Artifact],
        current_artifacts: &[Artifact],
        current_messages: &[ChatMessage],
    ) -> LinkResult {
        let index = build_index(current_messages);
        let mut lowered: Option<Vec<String>> = None;

        let mut result = LinkResult {
            updated_artifacts: current_artifacts.to_vec(),
            updated_messages: current_messages.to_vec(),
            ..LinkResult::default()
        };

        for upload in new_artifacts {
            if let Some(existing) = result
                .updated_artifacts
                .iter()
                .find(|artifact| artifact.same_file(upload))
            {
                let duplicate = DuplicateArtifact {
                    rejected_id: upload.id.clone(),
                    existing_id: existing.id.clone(),
                    file_name: upload.file_name.clone(),
                    file_size: upload.file_size,
                };
                export_warn!("Skipping duplicate upload: {}", duplicate);
                result.duplicates.push(duplicate);
                continue;
            }

            let mut artifact = upload.clone();
            artifact.linked_message_index = None;

            let texts = lowered.get_or_insert_with(|| lowercase_texts(current_messages));
            if let Some((indices, strategy)) = self.find_matches(&artifact.file_name, &index, texts)
            {
                artifact.linked_message_index = indices.first().copied();
                for &message_index in &indices {
                    result.updated_messages[message_index]
                        .attached_artifact_ids
                        .insert(artifact.id.clone());
                }
                result.match_count += 1;
                result
                    .match_descriptions
                    .push(describe_match(&artifact.file_name, &indices, strategy));
            }
            result.updated_artifacts.push(artifact);
        }

        export_info!(
            "Processed {} uploads: {} linked, {} duplicates",
            new_artifacts.len(),
            result.match_count,
            result.duplicates.len()
        );
        result
    }

    fn find_matches(
        &self,
        file_name: &str,
        index: &NameIndex,
        lowered_texts: &[String],
    ) -> Option<(Vec<usize>, MatchStrategy)> {
        let key = normalize_file_name(file_name);
        if key.is_empty() {
            return None;
        }

        if let Some(bucket) = index.get(&key) {
            return Some((bucket.clone(), MatchStrategy::ExtractedName));
        }

        let full: Vec<usize> = matching_indices(lowered_texts, |text| contains_word(text, &key));
        if !full.is_empty() {
            return Some((full, MatchStrategy::FullName));
        }

        let stem = normalize_file_name(file_stem(file_name));
        if stem.chars().count() <= self.settings.min_stem_len {
            return None;
        }
        let by_stem = matching_indices(lowered_texts, |text| contains_word(text, &stem));
        if by_stem.is_empty() {
            None
        } else {
            Some((by_stem, MatchStrategy::Stem))
        }
    }
}

/// [`ArtifactLinker::process_upload`] with default settings.
pub fn process_artifact_upload(
    new_artifacts: &[Artifact],
    current_artifacts: &[Artifact],
    current_messages: &[ChatMessage],
) -> LinkResult {
    ArtifactLinker::new().process_upload(new_artifacts, current_artifacts, current_messages)
}

/// Deletes the artifact from the pool and detaches it from every message.
pub fn process_global_artifact_removal(
    artifact_id: &ArtifactId,
    current_artifacts: &[Artifact],
    current_messages: &[ChatMessage],
) -> RemovalResult {
    let updated_artifacts: Vec<Artifact> = current_artifacts
        .iter()
        .filter(|artifact| &artifact.id != artifact_id)
        .cloned()
        .collect();
    if updated_artifacts.len() == current_artifacts.len() {
        export_debug!("Artifact {} was not in the pool", artifact_id);
    }

    let updated_messages = current_messages
        .iter()
        .map(|message| {
            let mut message = message.clone();
            message.attached_artifact_ids.remove(artifact_id);
            message
        })
        .collect();

    RemovalResult {
        updated_artifacts,
        updated_messages,
    }
}

/// Detaches the artifact from one message only; the pool is not involved.
pub fn process_message_artifact_unlink(
    artifact_id: &ArtifactId,
    message_index: usize,
    current_messages: &[ChatMessage],
) -> Vec<ChatMessage> {
    let mut updated = current_messages.to_vec();
    match updated.get_mut(message_index) {
        Some(message) => {
            message.attached_artifact_ids.remove(artifact_id);
        }
        None => export_warn!(
            "Cannot unlink {}: message index {} out of range ({} messages)",
            artifact_id,
            message_index,
            current_messages.len()
        ),
    }
    updated
}

/// Attaches an artifact to one message by hand.
pub fn process_message_artifact_link(
    artifact_id: &ArtifactId,
    message_index: usize,
    current_messages: &[ChatMessage],
) -> Vec<ChatMessage> {
    let mut updated = current_messages.to_vec();
    match updated.get_mut(message_index) {
        Some(message) => {
            message.attached_artifact_ids.insert(artifact_id.clone());
        }
        None => export_warn!(
            "Cannot link {}: message index {} out of range ({} messages)",
            artifact_id,
            message_index,
            current_messages.len()
        ),
    }
    updated
}

fn build_index(messages: &[ChatMessage]) -> NameIndex {
    let mut index = NameIndex::new();
    for (message_index, message) in messages.iter().enumerate() {
        for name in extract_file_names(&message.text) {
            let bucket = index.entry(normalize_file_name(&name)).or_default();
            if bucket.last() != Some(&message_index) {
                bucket.push(message_index);
            }
        }
    }
    index
}

fn lowercase_texts(messages: &[ChatMessage]) -> Vec<String> {
    messages
        .iter()
        .map(|message| message.text.to_lowercase())
        .collect()
}

fn matching_indices(texts: &[String], matches: impl Fn(&str) -> bool) -> Vec<usize> {
    texts
        .iter()
        .enumerate()
        .filter(|(_, text)| matches(text))
        .map(|(i, _)| i)
        .collect()
}

/// True when `needle` occurs in `haystack` without being part of a longer name.
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(is_name_char) && !after.is_some_and(is_name_char)
    })
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn describe_match(file_name: &str, indices: &[usize], strategy: MatchStrategy) -> String {
    let list = indices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let noun = if indices.len() == 1 {
        "message"
    } else {
        "messages"
    };
    format!("{file_name} -> {noun} {list} ({strategy})")
}
