use std::collections::{BTreeMap, HashMap};

use crate::CatalogError;

/// Language id (`en_US`, `pt_BR`, `ja`) to text.
pub type LocalizedMap = BTreeMap<String, String>;

/// Normalize a language tag to its `ll_CC` language id.
///
/// Accepts `en-US`, `en_us`, `EN` and the like. Returns `None` when the tag
/// is not a language (2-3 letters) optionally followed by a region (2
/// letters or 3 digits).
pub fn normalize_language_id(tag: &str) -> Option<String> {
    let mut parts = tag.split(['-', '_']);
    let language = parts.next()?;
    if !(2..=3).contains(&language.len()) || !language.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let language = language.to_ascii_lowercase();

    let Some(region) = parts.next() else {
        return Some(language);
    };
    if parts.next().is_some() {
        return None;
    }
    let region_ok = (region.len() == 2 && region.bytes().all(|b| b.is_ascii_alphabetic()))
        || (region.len() == 3 && region.bytes().all(|b| b.is_ascii_digit()));
    if !region_ok {
        return None;
    }
    Some(format!("{language}_{}", region.to_ascii_uppercase()))
}

/// Convert a wire map keyed by language tags into a `LocalizedMap`.
pub fn to_localized_map(wire: &HashMap<String, String>) -> Result<LocalizedMap, CatalogError> {
    wire.iter()
        .map(|(tag, text)| {
            normalize_language_id(tag)
                .map(|id| (id, text.clone()))
                .ok_or_else(|| CatalogError::InvalidInput(format!("unknown language id '{tag}'")))
        })
        .collect()
}
