const MAX_EXTENSION_LEN: usize = 10;

/// Characters that never belong to a file name mentioned in prose.
const SEPARATORS: &[char] = &[
    '"', '\'', '`', '(', ')', '[', ']', '{', '}', '<', '>', '|', ',', ';', '*',
];

/// Extracts file-name-like tokens from message text, in order of appearance.
///
/// Path-like tokens contribute their last component, so `docs/report.pdf`
/// yields `report.pdf`. Names containing spaces are not recognised.
pub fn extract_file_names(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .filter_map(file_name_token)
        .map(ToOwned::to_owned)
        .collect()
}

/// Lookup key for file names: trimmed and lowercased.
pub fn normalize_file_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// File name without its extension. Dotfiles and extensionless names are returned whole.
pub fn file_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

fn file_name_token(token: &str) -> Option<&str> {
    let base = token
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(token)
        .trim_end_matches(['.', ':', '!', '?']);

    let (stem, extension) = base.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() || extension.len() > MAX_EXTENSION_LEN {
        return None;
    }
    let alphanumeric = extension.chars().all(|c| c.is_ascii_alphanumeric());
    let has_letter = extension.chars().any(|c| c.is_ascii_alphabetic());
    if alphanumeric && has_letter {
        Some(base)
    } else {
        None
    }
}
