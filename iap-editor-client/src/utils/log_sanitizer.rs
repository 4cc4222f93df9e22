//! Keeps response bodies from flooding debug logs.

/// Bytes of a body kept in log output.
const TRUNCATE_LIMIT: usize = 256;

/// Truncate a string for logging, cutting on a character boundary.
pub(crate) fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        return s.to_string();
    }
    let cut = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= TRUNCATE_LIMIT)
        .last()
        .unwrap_or(0);
    format!("{}... [truncated, total {} bytes]", &s[..cut], s.len())
}
