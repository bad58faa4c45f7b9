//! Logging helpers for user-entered text (player, habit and location names, notes).
//! Keeps every log record on a single line and caps how much free text gets logged.

const MAX_PREVIEW: usize = 120;

/// Escape a user string for single-line logging.
///
/// Newlines, carriage returns and tabs become `\n`, `\r`, `\t`; other control
/// characters become `\u{..}`. Input longer than the preview limit is cut and
/// suffixed with an ellipsis.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 4);
    let mut chars = s.chars();
    for _ in 0..MAX_PREVIEW {
        match chars.next() {
            Some('\n') => out.push_str("\\n"),
            Some('\r') => out.push_str("\\r"),
            Some('\t') => out.push_str("\\t"),
            Some(c) if c.is_control() => out.extend(c.escape_unicode()),
            Some(c) => out.push(c),
            None => return out,
        }
    }
    if chars.next().is_some() {
        out.push('…');
    }
    out
}
