//! Mock platform for testing.
//!
//! Provides [`MockPlatform`] for unit testing without a host application.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use regex::Regex;

use crate::config::{ItemId, MediaType};
use crate::platform::{Attachment, ContentRepository, EmbedOptions, MarkupEngine};

static EMBED_HTML_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<(?:iframe|object|video|audio)\b.*?</(?:iframe|object|video|audio)>|<embed\b[^>]*>",
    )
    .unwrap()
});

/// One stored content item.
#[derive(Debug, Default)]
struct Item {
    body: String,
    item_type: String,
    mime_type: Option<String>,
    url: Option<String>,
}

/// In-memory platform with deterministic markup services.
///
/// - `expand_shortcode` wraps the invocation: `<div class="{tag}-shortcode">{fragment}</div>`
/// - `run_embed` and `resolve_autoembed` return registered outputs (empty otherwise)
/// - `embedded_html` finds `<iframe>`, `<object>`, `<embed>`, `<video>` and `<audio>` elements
/// - `sanitize_html` removes `<script>` elements
///
/// Every call is recorded and can be inspected with [`calls`](Self::calls).
///
/// # Example
///
/// ```ignore
/// use grab_core::MockPlatform;
///
/// let platform = MockPlatform::new()
///     .with_post(1, r#"Intro [video src="a.mp4"]"#)
///     .with_autoembed("https://video.example/1", r#"[video src="https://video.example/1.mp4"]"#);
/// ```
#[derive(Debug, Default)]
pub struct MockPlatform {
    items: RwLock<HashMap<ItemId, Item>>,
    attached: RwLock<HashMap<(ItemId, MediaType), Vec<Attachment>>>,
    embeds: RwLock<HashMap<String, String>>,
    autoembeds: RwLock<HashMap<String, String>>,
    calls: RwLock<Vec<String>>,
}

impl MockPlatform {
    /// Create a new empty mock platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a post with the given rendered body.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_post(self, id: ItemId, body: impl Into<String>) -> Self {
        self.items.write().unwrap().insert(
            id,
            Item {
                body: body.into(),
                item_type: "post".to_owned(),
                ..Item::default()
            },
        );
        self
    }

    /// Add an attachment item with a MIME type and file URL.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_attachment_item(
        self,
        id: ItemId,
        mime_type: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        self.items.write().unwrap().insert(
            id,
            Item {
                body: String::new(),
                item_type: "attachment".to_owned(),
                mime_type: Some(mime_type.into()),
                url: Some(url.into()),
            },
        );
        self
    }

    /// Attach a media file of `media_type` to `parent`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_attached(
        self,
        parent: ItemId,
        media_type: MediaType,
        attachment: Attachment,
    ) -> Self {
        self.attached
            .write()
            .unwrap()
            .entry((parent, media_type))
            .or_default()
            .push(attachment);
        self
    }

    /// Register the output of `run_embed` for an `[embed]` invocation.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_embed(self, fragment: impl Into<String>, output: impl Into<String>) -> Self {
        self.embeds
            .write()
            .unwrap()
            .insert(fragment.into(), output.into());
        self
    }

    /// Register the output of `resolve_autoembed` for a URL.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_autoembed(self, url: impl Into<String>, output: impl Into<String>) -> Self {
        self.autoembeds
            .write()
            .unwrap()
            .insert(url.into(), output.into());
        self
    }

    /// Recorded calls, e.g. `expand_shortcode(video)` or `run_embed(link_fallback=false)`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.write().unwrap().push(call);
    }

    fn item_field<T>(&self, id: ItemId, f: impl FnOnce(&Item) -> Option<T>) -> Option<T> {
        self.items.read().unwrap().get(&id).and_then(f)
    }
}

impl ContentRepository for MockPlatform {
    fn content_body(&self, id: ItemId) -> Option<String> {
        self.record(format!("content_body({id})"));
        self.item_field(id, |item| Some(item.body.clone()))
    }

    fn item_type(&self, id: ItemId) -> Option<String> {
        self.item_field(id, |item| Some(item.item_type.clone()))
    }

    fn mime_type(&self, id: ItemId) -> Option<String> {
        self.item_field(id, |item| item.mime_type.clone())
    }

    fn attachment_url(&self, id: ItemId) -> Option<String> {
        self.item_field(id, |item| item.url.clone())
    }

    fn attached_media(&self, media_type: MediaType, parent: ItemId) -> Vec<Attachment> {
        self.record(format!("attached_media({media_type}, {parent})"));
        self.attached
            .read()
            .unwrap()
            .get(&(parent, media_type))
            .cloned()
            .unwrap_or_default()
    }
}

impl MarkupEngine for MockPlatform {
    fn expand_shortcode(&self, tag: &str, fragment: &str) -> String {
        self.record(format!("expand_shortcode({tag})"));
        format!(r#"<div class="{tag}-shortcode">{fragment}</div>"#)
    }

    fn run_embed(&self, fragment: &str, options: EmbedOptions) -> String {
        self.record(format!("run_embed(link_fallback={})", options.link_fallback));
        self.embeds
            .read()
            .unwrap()
            .get(fragment)
            .cloned()
            .unwrap_or_default()
    }

    fn resolve_autoembed(&self, url: &str, options: EmbedOptions) -> String {
        self.record(format!("resolve_autoembed(link_fallback={})", options.link_fallback));
        self.autoembeds
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default()
    }

    fn embedded_html(&self, body: &str) -> Vec<String> {
        self.record("embedded_html".to_owned());
        EMBED_HTML_RE
            .find_iter(body)
            .map(|m| m.as_str().to_owned())
            .collect()
    }

    fn sanitize_html(&self, body: &str) -> String {
        self.record("sanitize_html".to_owned());
        let mut out = body.to_owned();
        while let Some(start) = out.find("<script") {
            let end = out[start..]
                .find("</script>")
                .map_or(out.len(), |i| start + i + "</script>".len());
            out.replace_range(start..end, "");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_html_finds_elements() {
        let platform = MockPlatform::new();
        let found = platform.embedded_html(
            r#"<p>a</p><iframe src="x"></iframe><p>b</p><embed src="y.swf" />"#,
        );
        assert_eq!(found, vec![r#"<iframe src="x"></iframe>"#, r#"<embed src="y.swf" />"#]);
    }

    #[test]
    fn test_sanitize_removes_scripts() {
        let platform = MockPlatform::new();
        assert_eq!(
            platform.sanitize_html("a<script>alert(1)</script>b"),
            "ab"
        );
    }

    #[test]
    fn test_unknown_item() {
        let platform = MockPlatform::new();
        assert_eq!(platform.content_body(9), None);
        assert_eq!(platform.item_type(9), None);
        assert!(platform.attached_media(MediaType::Audio, 9).is_empty());
    }
}
