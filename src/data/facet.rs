use std::collections::BTreeSet;

use super::model::Boat;

/// Distinct non-empty builders, sorted alphabetically.
pub fn available_builders(boats: &[Boat]) -> Vec<String> {
    distinct_sorted(boats.iter().map(|b| b.builder.as_str()))
}

/// Distinct non-empty models, sorted alphabetically.
///
/// When `selected_builders` is non-empty only listings from those builders
/// contribute; otherwise every listing does.
pub fn available_models(boats: &[Boat], selected_builders: &BTreeSet<String>) -> Vec<String> {
    distinct_sorted(
        boats
            .iter()
            .filter(|b| selected_builders.is_empty() || selected_builders.contains(&b.builder))
            .map(|b| b.model.as_str()),
    )
}

/// Case-insensitive substring narrowing for the sidebar search boxes.
pub fn search_options<'a>(options: &'a [String], query: &str) -> Vec<&'a str> {
    let needle = query.trim().to_lowercase();
    options
        .iter()
        .map(String::as_str)
        .filter(|o| needle.is_empty() || o.to_lowercase().contains(&needle))
        .collect()
}

/// Drop selections that are not in `available`. Returns true if anything was removed.
pub fn retain_available(selected: &mut BTreeSet<String>, available: &[String]) -> bool {
    let before = selected.len();
    selected.retain(|s| available.iter().any(|a| a == s));
    selected.len() != before
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
