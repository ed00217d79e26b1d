//! Collaborator traits.
//!
//! The grabber never fetches documents, executes shortcodes or parses embed
//! providers itself. Those services come from the host application through
//! [`ContentRepository`] and [`MarkupEngine`]. Implementations report misses
//! as `None`, empty strings or empty vectors; the grabber then moves on to the
//! next strategy.

use crate::config::{ItemId, MediaType};

/// Item type reported for media attachments.
pub const ATTACHMENT_ITEM_TYPE: &str = "attachment";

/// A media file attached to a content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Attachment item identifier.
    pub id: ItemId,
    /// Public URL of the media file.
    pub url: String,
}

impl Attachment {
    #[must_use]
    pub fn new(id: ItemId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
        }
    }
}

/// Options passed to embed resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedOptions {
    /// Whether an unresolvable URL may fall back to a plain `<a>` link.
    pub link_fallback: bool,
}

impl EmbedOptions {
    /// Options used while locating media: media markup or nothing.
    pub const MEDIA_ONLY: Self = Self {
        link_fallback: false,
    };
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            link_fallback: true,
        }
    }
}

/// Read access to content items and their attachments.
pub trait ContentRepository {
    /// Rendered body markup of a content item.
    fn content_body(&self, id: ItemId) -> Option<String>;

    /// Item type, e.g. `"post"` or `"attachment"`.
    fn item_type(&self, id: ItemId) -> Option<String>;

    /// MIME type of an attachment item, e.g. `"video/mp4"`.
    fn mime_type(&self, id: ItemId) -> Option<String>;

    /// File URL of an attachment item.
    fn attachment_url(&self, id: ItemId) -> Option<String>;

    /// Attachments of `media_type` belonging to `parent`, in menu order.
    fn attached_media(&self, media_type: MediaType, parent: ItemId) -> Vec<Attachment>;
}

/// Markup services: shortcode execution, embeds and sanitizing.
pub trait MarkupEngine {
    /// Execute the shortcode invocation `fragment` whose tag is `tag`.
    fn expand_shortcode(&self, tag: &str, fragment: &str) -> String;

    /// Resolve an `[embed]` shortcode invocation into provider markup.
    fn run_embed(&self, fragment: &str, options: EmbedOptions) -> String;

    /// Convert a bare URL into provider markup (or a shortcode), empty if unknown.
    fn resolve_autoembed(&self, url: &str, options: EmbedOptions) -> String;

    /// Raw embed elements (`<iframe>`, `<object>`, `<embed>`, ...) already in `body`.
    fn embedded_html(&self, body: &str) -> Vec<String>;

    /// Sanitize document body markup.
    fn sanitize_html(&self, body: &str) -> String;
}

/// Everything the grabber needs from its host.
pub trait Platform: ContentRepository + MarkupEngine {}

impl<T: ContentRepository + MarkupEngine> Platform for T {}
