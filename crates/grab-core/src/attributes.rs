//! Media attribute extraction.
//!
//! Reads `name="value"` pairs from the embed elements (`<object>`, `<embed>`,
//! `<iframe>`, `<video>`) and shortcode tokens of a markup fragment. All other
//! tags are stripped first so that wrapper markup cannot contribute attributes.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Tags whose attributes describe the media itself.
const MEDIA_TAGS: [&str; 4] = ["object", "embed", "iframe", "video"];

/// Any opening or closing HTML tag.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9-]*)\b[^>]*>").unwrap());

/// Opening media tag or shortcode token carrying attributes.
static CARRIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:object|embed|iframe|video)\b([^>]*)>|\[[a-z0-9_][a-z0-9_.-]*\s([^\]]*)\]")
        .unwrap()
});

/// Attributes parsed from one media fragment.
///
/// Names are lowercased. When several media elements carry the same
/// attribute, the first one wins.
///
/// # Example
///
/// ```
/// use grab_core::MediaAttributes;
///
/// let attrs = MediaAttributes::extract(r#"<div class="wrap"><iframe src="x" width="640" height='360'></iframe></div>"#);
/// assert_eq!(attrs.get("src"), Some("x"));
/// assert_eq!(attrs.size(), Some((640.0, 360.0)));
/// assert_eq!(attrs.get("class"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaAttributes {
    attrs: HashMap<String, String>,
}

impl MediaAttributes {
    /// Extract media attributes from a markup fragment.
    ///
    /// Returns an empty mapping when the fragment has no media element or
    /// shortcode token.
    #[must_use]
    pub fn extract(html: &str) -> Self {
        let restricted = TAG_RE.replace_all(html, |caps: &regex::Captures| {
            let name = caps[2].to_ascii_lowercase();
            if MEDIA_TAGS.contains(&name.as_str()) {
                caps[0].to_owned()
            } else {
                String::new()
            }
        });

        let mut attrs = HashMap::new();
        for caps in CARRIER_RE.captures_iter(&restricted) {
            let Some(list) = caps.get(1).or_else(|| caps.get(2)) else {
                continue;
            };
            for (name, value) in parse_attribute_list(list.as_str()) {
                attrs.entry(name).or_insert(value);
            }
        }

        Self { attrs }
    }

    /// Get an attribute value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Positive numeric `width` and `height`, if both are present.
    #[must_use]
    pub fn size(&self) -> Option<(f64, f64)> {
        Some((self.positive("width")?, self.positive("height")?))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    fn positive(&self, name: &str) -> Option<f64> {
        let value: f64 = self.get(name)?.trim().parse().ok()?;
        (value.is_finite() && value > 0.0).then_some(value)
    }
}

/// Parse an attribute list such as `src="a" width=640 allowfullscreen`.
///
/// Supports `key="value"`, `key='value'`, `key=value` and bare boolean keys.
/// A trailing self-closing `/` is ignored.
fn parse_attribute_list(s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut remaining = s.trim();

    while !remaining.is_empty() {
        let name_end = remaining
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/' || c == '>')
            .unwrap_or(remaining.len());

        if name_end == 0 {
            // Skip stray character
            let skip = remaining.chars().next().map_or(1, char::len_utf8);
            remaining = remaining[skip..].trim_start();
            continue;
        }

        let name = remaining[..name_end].to_ascii_lowercase();
        let after_name = remaining[name_end..].trim_start();

        if let Some(after_eq) = after_name.strip_prefix('=') {
            let (value, rest) = parse_value(after_eq.trim_start());
            attrs.push((name, value.to_owned()));
            remaining = rest.trim_start();
        } else {
            attrs.push((name, String::new()));
            remaining = after_name;
        }
    }

    attrs
}

/// Parse one attribute value, returning (value, rest).
fn parse_value(s: &str) -> (&str, &str) {
    for quote in ['"', '\''] {
        if let Some(stripped) = s.strip_prefix(quote) {
            return match stripped.find(quote) {
                Some(end) => (&stripped[..end], &stripped[end + 1..]),
                // Unterminated quote: take the rest
                None => (stripped, ""),
            };
        }
    }

    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    (&s[..end], &s[end..])
}
