//! Turning a decoded block of shell output into a chat message.

use shellbot_terminal::strip_escape_codes;

/// A block ready for delivery: a plain body and a preformatted HTML body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub plain: String,
    pub html: String,
}

/// Clean up a decoded block for the transcript.
///
/// Strips control sequences and carriage returns and drops trailing
/// newlines. Returns `None` when nothing visible is left.
pub fn render_block(raw: &str) -> Option<RenderedMessage> {
    let text = strip_escape_codes(raw).replace('\r', "");
    let text = text.trim_end_matches('\n');
    if text.is_empty() {
        return None;
    }

    Some(RenderedMessage {
        plain: text.to_string(),
        html: format!("<pre><code>{}</code></pre>", escape_html(text)),
    })
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
