//! Result rendering for the command line.

use adresse::MatchResult;

/// One JSON object per match: the matched span and every present field.
pub fn to_json(result: &MatchResult) -> serde_json::Result<String> {
    serde_json::to_string(result)
}

/// `field=value` pairs in field order, separated by ` | `.
pub fn to_text(result: &MatchResult) -> String {
    result
        .fields
        .iter()
        .map(|(field, found)| format!("{field}={}", found.value))
        .collect::<Vec<_>>()
        .join(" | ")
}
