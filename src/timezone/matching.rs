//! City-name matching against the final segment of IANA identifiers.

/// Normalize a free-form city name towards the IANA spelling.
///
/// Surrounding whitespace is trimmed, spaces and hyphens become underscores and
/// runs of underscores collapse to one. Case is preserved.
pub fn normalize_city(input: &str) -> String {
    let mut normalized = String::with_capacity(input.len());
    for ch in input.trim().chars() {
        let ch = if ch == ' ' || ch == '-' { '_' } else { ch };
        if ch == '_' && normalized.ends_with('_') {
            continue;
        }
        normalized.push(ch);
    }
    normalized
}

/// The substring after the last `/`, or the whole name when there is none.
pub fn final_segment(name: &str) -> &str {
    name.rsplit_once('/').map_or(name, |(_, last)| last)
}

/// Catalog entries whose final segment matches `city`.
///
/// Exact (case-insensitive) matches win; substring matches are only
/// considered when there are none. Order follows `names`.
pub fn search_by_city<'a>(names: &'a [String], city: &str) -> Vec<&'a str> {
    let needle = normalize_city(city).to_lowercase();

    let exact: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|name| final_segment(name).to_lowercase() == needle)
        .collect();
    if !exact.is_empty() {
        return exact;
    }

    names
        .iter()
        .map(String::as_str)
        .filter(|name| final_segment(name).to_lowercase().contains(&needle))
        .collect()
}
