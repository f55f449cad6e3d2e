//! Breed code normalization
//!
//! Free-text breed names ("Red Sindhi", "  Jersey   Cross ") are stored as
//! breed codes: lower-cased, trimmed, whitespace runs collapsed to `_`.

/// Normalize breed-name text into a breed code
///
/// # Examples
/// ```
/// use breedlog_common::breed_code::normalize_breed_name;
///
/// assert_eq!(normalize_breed_name("Red Sindhi"), "red_sindhi");
/// assert_eq!(normalize_breed_name("  Jersey \t Cross "), "jersey_cross");
/// ```
pub fn normalize_breed_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Normalize an optional override; blank input clears it
pub fn normalize_override(name: &str) -> Option<String> {
    let code = normalize_breed_name(name);
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}
