//! Best-effort conversion of terminal output into chat-friendly text.
//!
//! This is not a terminal emulator. It handles the two things that make raw
//! shell output unreadable in a chat transcript: text a line-clear erased,
//! and leftover control sequences. Anything else (cursor movement, colors,
//! sequences split across reads) is simply dropped or passed through.

use regex::Regex;
use std::sync::LazyLock;

/// Everything on a line up to and including an "erase in line" sequence.
static CLEARED_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\n]*\x1b\[K").expect("escape: static regex pattern must compile")
});

/// An escape, optional `[`, numeric parameters, and a final word character.
static ESCAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[?[0-9;]*\w").expect("escape: static regex pattern must compile")
});

/// Remove erased text and control sequences from `text`.
///
/// Removing one sequence can splice together the pieces of another
/// (`"\x1b\x1b[0mA"` leaves `"\x1bA"`), so both passes repeat until nothing
/// changes. Every pass that matches shortens the text, which bounds the loop
/// and makes the function idempotent.
pub fn strip_escape_codes(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let after_clears = CLEARED_LINE_RE.replace_all(&current, "");
        let stripped = ESCAPE_RE.replace_all(&after_clears, "").into_owned();
        if stripped.len() == current.len() {
            return stripped;
        }
        current = stripped;
    }
}
