/// Canonical comparison form of a field name: lower-cased with every
/// character other than an ASCII letter or digit removed.
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Normalizes a schema path, dropping the repeated-field marker first.
pub fn normalize_path(path: &str) -> String {
    normalize_key(&path.replace("[]", ""))
}
