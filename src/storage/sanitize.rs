//! File name sanitization
//!
//! Requested identifiers come straight from user queries, so they are reduced
//! to a single safe path component before touching the backing store.

/// Name used when nothing usable is left
pub const FALLBACK_NAME: &str = "file";

/// Longest name kept, in bytes
pub const MAX_NAME_LEN: usize = 255;

const UNSAFE_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Reduce `name` to a single safe file name component.
///
/// Whitespace runs collapse to one space, path separators and other unsafe
/// characters are removed, reserved device names and blank results become
/// `file`, and names starting with `.` get `file` prepended so `..` can never
/// survive.
pub fn sanitize(name: &str) -> String {
    let normalized = name.split_whitespace().collect::<Vec<_>>().join(" ");
    let filtered: String = normalized
        .chars()
        .filter(|c| !c.is_control() && !UNSAFE_CHARS.contains(c))
        .collect();
    let filtered = filtered.trim();

    let mut sanitized = if filtered.is_empty()
        || RESERVED_NAMES.contains(&filtered.to_ascii_uppercase().as_str())
    {
        FALLBACK_NAME.to_string()
    } else if filtered.starts_with('.') {
        format!("{}{}", FALLBACK_NAME, filtered)
    } else {
        filtered.to_string()
    };

    truncate(&mut sanitized, MAX_NAME_LEN);
    sanitized
}

fn truncate(s: &mut String, max_len: usize) {
    if s.len() <= max_len {
        return;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}
