//! Per-invocation grabber configuration.

use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a content item (post, page or attachment).
pub type ItemId = u64;

/// Kind of media the grabber searches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MediaType {
    Audio,
    #[default]
    Video,
    Gallery,
}

impl MediaType {
    /// All supported media types.
    pub const ALL: [Self; 3] = [Self::Audio, Self::Video, Self::Gallery];

    /// Parse a media type name.
    ///
    /// Unknown names fall back to [`MediaType::Video`].
    ///
    /// ```
    /// use grab_core::MediaType;
    ///
    /// assert_eq!(MediaType::from_name("audio"), MediaType::Audio);
    /// assert_eq!(MediaType::from_name("podcast"), MediaType::Video);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "audio" => Self::Audio,
            "gallery" => Self::Gallery,
            _ => Self::Video,
        }
    }

    /// Name used in shortcode tags and MIME primary types.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Gallery => "gallery",
        }
    }

    /// Whether this type has a player shortcode (`[audio]` / `[video]`).
    #[must_use]
    pub fn is_playable(self) -> bool {
        matches!(self, Self::Audio | Self::Video)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the shortcode strategy searches the document body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShortcodeSearch {
    /// Skip the shortcode strategy.
    Disabled,
    /// Search for the catalog's known tags.
    #[default]
    Known,
    /// Search for the catalog's known tags plus these extra tags.
    Extra(BTreeSet<String>),
}

impl ShortcodeSearch {
    /// Extra tags supplied by the caller (empty unless [`ShortcodeSearch::Extra`]).
    pub fn extra_tags(&self) -> impl Iterator<Item = &str> {
        let tags = match self {
            Self::Extra(tags) => Some(tags),
            Self::Disabled | Self::Known => None,
        };
        tags.into_iter().flatten().map(String::as_str)
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

/// Site-wide settings supplied by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteOptions {
    /// Default maximum media width (the theme's content width).
    pub content_width: u32,
    /// Site-wide switch for converting bare URLs into embeds.
    pub embed_autourls: bool,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            content_width: 640,
            embed_autourls: true,
        }
    }
}

/// Options for one grabber invocation.
///
/// Built once and never mutated after [`MediaGrabber::new`](crate::MediaGrabber::new)
/// resolves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrabberConfig {
    /// Media type to search for.
    pub media_type: MediaType,
    /// Content item whose body and attachments are searched.
    pub item_id: ItemId,
    /// Markup prepended to found media.
    pub before: String,
    /// Markup appended to found media.
    pub after: String,
    /// Whether the located fragment is removed from the document body.
    pub split: bool,
    /// Maximum media width; `0` uses [`SiteOptions::content_width`].
    pub max_width: u32,
    /// Shortcode strategy settings.
    pub shortcodes: ShortcodeSearch,
    /// Whether bare URLs on their own line are tried as autoembeds.
    pub autoembeds: bool,
    /// Whether raw embed HTML in the body is searched.
    pub embedded: bool,
    /// Whether attached media files are used as a last resort.
    pub attached: bool,
}

impl GrabberConfig {
    /// Create a config with defaults for the given content item.
    #[must_use]
    pub fn new(item_id: ItemId) -> Self {
        Self {
            media_type: MediaType::default(),
            item_id,
            before: String::new(),
            after: String::new(),
            split: false,
            max_width: 0,
            shortcodes: ShortcodeSearch::default(),
            autoembeds: true,
            embedded: true,
            attached: true,
        }
    }

    #[must_use]
    pub fn media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    /// Set the media type by name, falling back to video for unknown names.
    #[must_use]
    pub fn media_type_name(self, name: &str) -> Self {
        self.media_type(MediaType::from_name(name))
    }

    #[must_use]
    pub fn wrap(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.before = before.into();
        self.after = after.into();
        self
    }

    #[must_use]
    pub fn split(mut self, split: bool) -> Self {
        self.split = split;
        self
    }

    #[must_use]
    pub fn max_width(mut self, max_width: u32) -> Self {
        self.max_width = max_width;
        self
    }

    #[must_use]
    pub fn shortcodes(mut self, shortcodes: ShortcodeSearch) -> Self {
        self.shortcodes = shortcodes;
        self
    }

    #[must_use]
    pub fn autoembeds(mut self, enabled: bool) -> Self {
        self.autoembeds = enabled;
        self
    }

    #[must_use]
    pub fn embedded(mut self, enabled: bool) -> Self {
        self.embedded = enabled;
        self
    }

    #[must_use]
    pub fn attached(mut self, enabled: bool) -> Self {
        self.attached = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_media_type_defaults_to_video() {
        for name in ["", "image", "Audio", "VIDEO", "playlist"] {
            assert_eq!(MediaType::from_name(name), MediaType::Video, "{name}");
        }
    }

    #[test]
    fn test_known_media_types() {
        for media_type in MediaType::ALL {
            assert_eq!(MediaType::from_name(media_type.as_str()), media_type);
        }
    }

    #[test]
    fn test_config_name_fallback() {
        let config = GrabberConfig::new(7).media_type_name("slideshow");
        assert_eq!(config.media_type, MediaType::Video);
        assert_eq!(config.item_id, 7);
    }

    #[test]
    fn test_config_defaults() {
        let config = GrabberConfig::new(1);
        assert_eq!(config.shortcodes, ShortcodeSearch::Known);
        assert!(config.autoembeds && config.embedded && config.attached);
        assert!(!config.split);
        assert_eq!(config.max_width, 0);
    }

    #[test]
    fn test_extra_tags() {
        let search = ShortcodeSearch::Extra(["custom".to_owned()].into());
        assert_eq!(search.extra_tags().collect::<Vec<_>>(), vec!["custom"]);
        assert_eq!(ShortcodeSearch::Known.extra_tags().count(), 0);
        assert!(!ShortcodeSearch::Disabled.is_enabled());
    }
}
