use serde_json::Value;

/// Sanitize a free-text JSON field. Anything but a string becomes `""`.
pub fn sanitize(value: &Value) -> String {
    match value {
        Value::String(s) => sanitize_str(s),
        _ => String::new(),
    }
}

/// Trim surrounding whitespace (including the byte order mark), then remove
/// every `<` and `>`.
///
/// Removal happens after trimming, so whitespace next to a stripped bracket
/// survives: `"< a >"` becomes `" a "`.
pub fn sanitize_str(input: &str) -> String {
    input
        .trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
        .replace(['<', '>'], "")
}
