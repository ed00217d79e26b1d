//! Shortcode catalog and scanning.
//!
//! Shortcodes are bracketed tokens in document content:
//! - `[tag attr="value"]` - standalone
//! - `[tag attr="value" /]` - self-closing
//! - `[tag]content[/tag]` - enclosing
//! - `[[tag]]` - escaped, never matched

use std::collections::HashMap;

use crate::config::MediaType;

const VIDEO_SHORTCODES: &[&str] = &[
    "playlist",
    "embed",
    "video",
    "blip.tv",
    "dailymotion",
    "flickr",
    "ted",
    "vimeo",
    "vine",
    "youtube",
    "wpvideo",
];

const AUDIO_SHORTCODES: &[&str] = &["playlist", "embed", "audio", "bandcamp", "soundcloud"];

const GALLERY_SHORTCODES: &[&str] = &["gallery"];

/// Known shortcode tags per media type.
///
/// # Example
///
/// ```
/// use grab_core::{MediaType, ShortcodeCatalog};
///
/// let mut catalog = ShortcodeCatalog::default();
/// assert!(catalog.contains(MediaType::Video, "youtube"));
///
/// catalog.extend(MediaType::Video, ["peertube"]);
/// assert!(catalog.contains(MediaType::Video, "peertube"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcodeCatalog {
    tags: HashMap<MediaType, Vec<String>>,
}

impl Default for ShortcodeCatalog {
    fn default() -> Self {
        let owned = |tags: &[&str]| tags.iter().map(|&t| t.to_owned()).collect();
        Self {
            tags: HashMap::from([
                (MediaType::Video, owned(VIDEO_SHORTCODES)),
                (MediaType::Audio, owned(AUDIO_SHORTCODES)),
                (MediaType::Gallery, owned(GALLERY_SHORTCODES)),
            ]),
        }
    }
}

impl ShortcodeCatalog {
    /// Create a catalog with no known tags.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tags: HashMap::new(),
        }
    }

    /// Known tags for a media type.
    #[must_use]
    pub fn tags(&self, media_type: MediaType) -> &[String] {
        self.tags.get(&media_type).map_or(&[], Vec::as_slice)
    }

    /// Whether `tag` is known for a media type.
    #[must_use]
    pub fn contains(&self, media_type: MediaType, tag: &str) -> bool {
        self.tags(media_type).iter().any(|t| t == tag)
    }

    /// Register additional tags for a media type. Duplicates are ignored.
    pub fn extend<I, S>(&mut self, media_type: MediaType, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let known = self.tags.entry(media_type).or_default();
        for tag in tags {
            let tag = tag.into();
            if !known.contains(&tag) {
                known.push(tag);
            }
        }
    }

    /// Builder form of [`extend`](Self::extend).
    #[must_use]
    pub fn with_tags<I, S>(mut self, media_type: MediaType, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extend(media_type, tags);
        self
    }
}

/// One shortcode token found in document content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcodeMatch<'a> {
    /// Tag name, e.g. `video`.
    pub tag: &'a str,
    /// Full token text including any enclosed content and closing tag.
    pub text: &'a str,
    /// Byte offset of the token in the scanned content.
    pub start: usize,
}

/// Find all shortcode tokens in `content`, in document order.
///
/// Enclosed content is not scanned for nested tokens.
///
/// ```
/// use grab_core::scan_shortcodes;
///
/// let found = scan_shortcodes(r#"Intro [gallery ids="1,2"] then [video src="a.mp4"][/video]."#);
/// let tags: Vec<_> = found.iter().map(|m| m.tag).collect();
/// assert_eq!(tags, vec!["gallery", "video"]);
/// assert_eq!(found[1].text, r#"[video src="a.mp4"][/video]"#);
/// ```
#[must_use]
pub fn scan_shortcodes(content: &str) -> Vec<ShortcodeMatch<'_>> {
    let mut matches = Vec::new();
    let mut pos = 0;

    while let Some(offset) = content[pos..].find('[') {
        let start = pos + offset;

        // Escaped [[tag]]: skip through the doubled closing bracket
        if content[start..].starts_with("[[") {
            pos = content[start..]
                .find("]]")
                .map_or(start + 2, |i| start + i + 2);
            continue;
        }

        match parse_token(content, start) {
            Some((tag, end)) => {
                matches.push(ShortcodeMatch {
                    tag,
                    text: &content[start..end],
                    start,
                });
                pos = end;
            }
            None => pos = start + 1,
        }
    }

    matches
}

/// Parse a shortcode token starting at `start` (which holds `[`).
///
/// Returns (tag, end offset).
fn parse_token(content: &str, start: usize) -> Option<(&str, usize)> {
    let rest = &content[start + 1..];

    // Orphan closing tag
    if rest.starts_with('/') {
        return None;
    }

    let name_end = rest
        .find(|c: char| !is_tag_char(c))
        .unwrap_or(rest.len());
    if name_end == 0 {
        return None;
    }
    let tag = &rest[..name_end];

    let after_name = &rest[name_end..];
    if !(after_name.starts_with(']')
        || after_name.starts_with('/')
        || after_name.starts_with(char::is_whitespace))
    {
        return None;
    }

    let close = find_token_end(after_name)?;
    let self_closing = after_name[..close].trim_end().ends_with('/');
    let open_end = start + 1 + name_end + close + 1;

    if self_closing {
        return Some((tag, open_end));
    }

    // Enclosing form: consume through the first matching closing tag
    let closing = format!("[/{tag}]");
    let end = content[open_end..]
        .find(&closing)
        .map_or(open_end, |i| open_end + i + closing.len());

    Some((tag, end))
}

/// Find the `]` ending the opening token, skipping quoted attribute values.
fn find_token_end(s: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            (None, '[') => return None,
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Build a player shortcode for a media file, e.g. `[video src="..."]`.
///
/// The URL is escaped for use inside a double-quoted attribute.
#[must_use]
pub fn player_shortcode(media_type: MediaType, url: &str) -> String {
    format!(r#"[{media_type} src="{}"]"#, escape_attr(url))
}

/// Whether `markup` contains an invocation of the `tag` shortcode (`[tag` + whitespace).
#[must_use]
pub fn invokes_shortcode(markup: &str, tag: &str) -> bool {
    let opener = format!("[{tag}");
    markup.match_indices(&opener).any(|(i, _)| {
        markup[i + opener.len()..]
            .chars()
            .next()
            .is_some_and(char::is_whitespace)
    })
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tags(content: &str) -> Vec<&str> {
        scan_shortcodes(content).iter().map(|m| m.tag).collect()
    }

    #[test]
    fn test_catalog_defaults() {
        let catalog = ShortcodeCatalog::default();
        assert_eq!(catalog.tags(MediaType::Gallery), ["gallery"]);
        assert!(catalog.contains(MediaType::Audio, "soundcloud"));
        assert!(catalog.contains(MediaType::Video, "blip.tv"));
        assert!(!catalog.contains(MediaType::Audio, "video"));
    }

    #[test]
    fn test_catalog_extend_ignores_duplicates() {
        let catalog = ShortcodeCatalog::default().with_tags(MediaType::Gallery, ["gallery", "slider"]);
        assert_eq!(catalog.tags(MediaType::Gallery), ["gallery", "slider"]);
    }

    #[test]
    fn test_empty_catalog() {
        assert!(ShortcodeCatalog::empty().tags(MediaType::Video).is_empty());
    }

    #[test]
    fn test_scan_standalone() {
        let found = scan_shortcodes(r#"a [video src="x.mp4"] b"#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag, "video");
        assert_eq!(found[0].text, r#"[video src="x.mp4"]"#);
        assert_eq!(found[0].start, 2);
    }

    #[test]
    fn test_scan_enclosing() {
        let found = scan_shortcodes("[embed]https://example.com/v/1[/embed] after");
        assert_eq!(found[0].text, "[embed]https://example.com/v/1[/embed]");
    }

    #[test]
    fn test_scan_self_closing() {
        let found = scan_shortcodes("[audio src='a.mp3' /] more [/audio]");
        assert_eq!(found[0].text, "[audio src='a.mp3' /]");
    }

    #[test]
    fn test_scan_document_order() {
        assert_eq!(
            tags(r#"[gallery] text [video src="a.mp4"] [youtube id=1]"#),
            vec!["gallery", "video", "youtube"]
        );
    }

    #[test]
    fn test_scan_dotted_tag() {
        assert_eq!(tags("[blip.tv ?posts_id=1]"), vec!["blip.tv"]);
    }

    #[test]
    fn test_scan_skips_escaped_and_invalid() {
        assert_eq!(tags("[[video src=x]] and [/video] and [ ] and [a=b]"), Vec::<&str>::new());
    }

    #[test]
    fn test_scan_bracket_in_quoted_attribute() {
        let found = scan_shortcodes(r#"[video title="a ] b" src="x"]"#);
        assert_eq!(found[0].text, r#"[video title="a ] b" src="x"]"#);
    }

    #[test]
    fn test_scan_unterminated() {
        assert!(scan_shortcodes("[video src=\"x\"").is_empty());
    }

    #[test]
    fn test_player_shortcode_escapes_url() {
        assert_eq!(
            player_shortcode(MediaType::Audio, r#"https://x/a.mp3?a=1&b="2""#),
            r#"[audio src="https://x/a.mp3?a=1&amp;b=&quot;2&quot;"]"#
        );
    }

    #[test]
    fn test_invokes_shortcode() {
        assert!(invokes_shortcode(r#"[video src="x"][/video]"#, "video"));
        assert!(!invokes_shortcode("[videos src=x]", "video"));
        assert!(!invokes_shortcode("[video]", "video"));
        assert!(!invokes_shortcode(r#"<iframe src="x"></iframe>"#, "video"));
    }
}
