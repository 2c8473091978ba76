//! Latest-value token extraction.
//!
//! Sensor streams are newline-terminated text. One bounded read may carry a
//! partial value, exactly one value, or several coalesced values; in every
//! case the whole trimmed read replaces whatever the source reported before.
//! Only the instantaneous latest reading matters downstream, so earlier
//! values buffered within the same read are deliberately not preserved.

/// Extract the current token from the bytes of one bounded read.
///
/// Decodes lossily as UTF-8 and strips trailing CR/LF. Embedded line breaks
/// are kept as-is: the read content, not a single line, is the token.
pub fn latest_token(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.trim_end_matches(['\r', '\n']).to_string()
}

/// Parse a token as a numeric reading. Returns `None` for anything that is
/// not a number; callers decide whether to retain a previous value.
pub fn parse_value(token: &str) -> Option<f64> {
    token.trim().parse().ok()
}
