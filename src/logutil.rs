//! Player names arrive from the chat platform unfiltered; this keeps them
//! from breaking single-line log records.

const MAX_NAME_CHARS: usize = 64;

/// Escape control characters and cap length so a user-supplied name logs
/// as one short line.
pub fn sanitize_for_log(name: &str) -> String {
    let mut out = String::with_capacity(name.len().min(MAX_NAME_CHARS) + 4);
    for (i, ch) in name.trim().chars().enumerate() {
        if i == MAX_NAME_CHARS {
            out.push('…');
            break;
        }
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push(' '),
            c if c.is_control() => out.extend(c.escape_unicode()),
            c => out.push(c),
        }
    }
    out
}
