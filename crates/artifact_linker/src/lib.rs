//! Artifact linker: attaches uploaded files to the chat messages that mention them.
mod extract;
mod link;
mod types;

pub use extract::{extract_file_names, file_stem, normalize_file_name};
pub use link::{
    process_artifact_upload, process_global_artifact_removal, process_message_artifact_link,
    process_message_artifact_unlink, ArtifactLinker, LinkSettings, DEFAULT_MIN_STEM_LEN,
};
pub use types::{Artifact, ArtifactId, ChatMessage, DuplicateArtifact, LinkResult, RemovalResult};
