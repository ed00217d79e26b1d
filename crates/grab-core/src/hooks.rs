//! Extension callbacks.
//!
//! Each hook is a pure transformation that defaults to identity:
//! - media: once per render, on the final markup (empty when nothing was found)
//! - shortcodes: once per shortcode scan, on the catalog tags of the media type
//! - dimensions: every time a fragment with usable dimensions is resized

use crate::attributes::MediaAttributes;
use crate::config::{GrabberConfig, MediaType};
use crate::dimensions::Dimensions;

type MediaHook = Box<dyn Fn(String, &GrabberConfig) -> String>;
type ShortcodesHook = Box<dyn Fn(MediaType, Vec<String>) -> Vec<String>>;
type DimensionsHook = Box<dyn Fn(Dimensions, &MediaAttributes, &GrabberConfig) -> Dimensions>;

/// Callbacks that let the host adjust grabber results.
///
/// # Example
///
/// ```
/// use grab_core::{Hooks, MediaType};
///
/// let hooks = Hooks::new()
///     .on_media(|media, _config| media.replace("<iframe", "<iframe loading=\"lazy\""))
///     .on_shortcodes(|media_type, mut tags| {
///         if media_type == MediaType::Video {
///             tags.push("peertube".to_owned());
///         }
///         tags
///     });
/// # let _ = hooks;
/// ```
#[derive(Default)]
pub struct Hooks {
    media: Option<MediaHook>,
    shortcodes: Option<ShortcodesHook>,
    dimensions: Option<DimensionsHook>,
}

impl Hooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter the final rendered media markup.
    #[must_use]
    pub fn on_media(mut self, f: impl Fn(String, &GrabberConfig) -> String + 'static) -> Self {
        self.media = Some(Box::new(f));
        self
    }

    /// Filter the known shortcode tags of the configured media type.
    #[must_use]
    pub fn on_shortcodes(
        mut self,
        f: impl Fn(MediaType, Vec<String>) -> Vec<String> + 'static,
    ) -> Self {
        self.shortcodes = Some(Box::new(f));
        self
    }

    /// Override the computed media dimensions.
    #[must_use]
    pub fn on_dimensions(
        mut self,
        f: impl Fn(Dimensions, &MediaAttributes, &GrabberConfig) -> Dimensions + 'static,
    ) -> Self {
        self.dimensions = Some(Box::new(f));
        self
    }

    pub(crate) fn filter_media(&self, media: String, config: &GrabberConfig) -> String {
        match &self.media {
            Some(f) => f(media, config),
            None => media,
        }
    }

    pub(crate) fn filter_shortcodes(
        &self,
        media_type: MediaType,
        tags: Vec<String>,
    ) -> Vec<String> {
        match &self.shortcodes {
            Some(f) => f(media_type, tags),
            None => tags,
        }
    }

    pub(crate) fn filter_dimensions(
        &self,
        dims: Dimensions,
        attrs: &MediaAttributes,
        config: &GrabberConfig,
    ) -> Dimensions {
        match &self.dimensions {
            Some(f) => f(dims, attrs, config),
            None => dims,
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("media", &self.media.is_some())
            .field("shortcodes", &self.shortcodes.is_some())
            .field("dimensions", &self.dimensions.is_some())
            .finish()
    }
}
