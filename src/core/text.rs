//! # Message Content Pipeline
//!
//! Turns raw message text from the archive into an inert, displayable body.
//! The steps always run in this order:
//!
//! ```text
//! raw ──► decode entities ──► neutralize controls ──► linkify ──► split lines
//!        "&quot;" → '"'       ESC → U+FFFD            www.x → Link   '\n' → new line
//! ```
//!
//! The result is a [`Body`]: lines of [`Fragment`]s. Fragments are plain data,
//! so nothing in a message can turn into markup or terminal control sequences.
//! [`Body::to_html`] renders the same body as escaped HTML.

use std::sync::LazyLock;

use regex::Regex;

/// URL-looking substrings: `http`, `https`, `ftp` and `file` schemes, or a bare `www.` prefix.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:https?|ftp|file)://[-A-Z0-9+&@#/%?=~_|!:,.;]*[-A-Z0-9+&@#/%=~_|]|\bwww\.[-A-Z0-9+&@#/%?=~_|!:,.;]*[-A-Z0-9+&@#/%=~_|]",
    )
    .expect("URL pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Link { href: String, text: String },
}

impl Fragment {
    pub fn text(&self) -> &str {
        match self {
            Fragment::Text(text) | Fragment::Link { text, .. } => text,
        }
    }
}

/// Displayable message body: one `Vec<Fragment>` per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    pub lines: Vec<Vec<Fragment>>,
}

impl Body {
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.iter().all(|f| f.text().is_empty()))
    }

    /// Plain text of each line, links included verbatim.
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| line.iter().map(Fragment::text).collect())
            .collect()
    }

    pub fn links(&self) -> impl Iterator<Item = &Fragment> {
        self.lines
            .iter()
            .flatten()
            .filter(|f| matches!(f, Fragment::Link { .. }))
    }

    /// HTML rendition: escaped text, anchors opening in a new context, `<br>` between lines.
    pub fn to_html(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(|fragment| match fragment {
                        Fragment::Text(text) => escape_html(text),
                        Fragment::Link { href, text } => format!(
                            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                            escape_html(href),
                            escape_html(text)
                        ),
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("<br>")
    }
}

/// Run the full pipeline over raw message content.
pub fn render_content(raw: &str) -> Body {
    let decoded = decode_entities(raw);
    let inert = neutralize_controls(&decoded);
    split_lines(linkify(&inert))
}

/// Escape the five HTML-sensitive characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode character references the way a browser does in text content:
/// the full HTML named table, legacy names without `;`, and numeric
/// references. Unknown references are kept as written.
pub fn decode_entities(raw: &str) -> String {
    htmlize::unescape(raw).into_owned()
}

/// Replace control characters that a terminal would interpret (ESC, BEL, C1, …)
/// with U+FFFD. Newlines are kept, tabs become spaces, carriage returns are dropped.
pub fn neutralize_controls(text: &str) -> String {
    text.chars()
        .filter(|&c| c != '\r')
        .map(|c| match c {
            '\n' => c,
            '\t' => ' ',
            c if c.is_control() => char::REPLACEMENT_CHARACTER,
            c => c,
        })
        .collect()
}

/// Split text into text and link fragments. Bare `www.` links get an `http://` href.
pub fn linkify(text: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut last = 0;
    for m in URL_PATTERN.find_iter(text) {
        if m.start() > last {
            fragments.push(Fragment::Text(text[last..m.start()].to_string()));
        }
        let url = m.as_str();
        let href = if url.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("www.")) {
            format!("http://{url}")
        } else {
            url.to_string()
        };
        fragments.push(Fragment::Link {
            href,
            text: url.to_string(),
        });
        last = m.end();
    }
    if last < text.len() {
        fragments.push(Fragment::Text(text[last..].to_string()));
    }
    fragments
}

fn split_lines(fragments: Vec<Fragment>) -> Body {
    let mut lines: Vec<Vec<Fragment>> = vec![Vec::new()];
    for fragment in fragments {
        match fragment {
            Fragment::Text(text) => {
                let mut pieces = text.split('\n');
                if let Some(first) = pieces.next()
                    && !first.is_empty()
                    && let Some(line) = lines.last_mut()
                {
                    line.push(Fragment::Text(first.to_string()));
                }
                for piece in pieces {
                    let mut line = Vec::new();
                    if !piece.is_empty() {
                        line.push(Fragment::Text(piece.to_string()));
                    }
                    lines.push(line);
                }
            }
            link => {
                if let Some(line) = lines.last_mut() {
                    line.push(link);
                }
            }
        }
    }
    Body { lines }
}
