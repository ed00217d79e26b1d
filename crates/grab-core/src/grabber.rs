//! Media grabber orchestration.
//!
//! [`MediaGrabber`] handles one content item per instance:
//!
//! ```text
//! new() ──> ContentLoaded ──locate()──> Located ──render()──> Rendered
//! ```
//!
//! The location cascade runs at most once; `render`, `display` and `split`
//! all reuse its result.

use std::io::Write;

use crate::attributes::MediaAttributes;
use crate::config::{GrabberConfig, ItemId, SiteOptions};
use crate::dimensions::{DimensionResolver, Dimensions};
use crate::error::GrabberError;
use crate::hooks::Hooks;
use crate::locator::{LocateResult, MediaLocator};
use crate::platform::{MarkupEngine, Platform};
use crate::shortcode::ShortcodeCatalog;

/// Lifecycle state of a [`MediaGrabber`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabState {
    /// Document body fetched, cascade not run yet.
    ContentLoaded,
    /// Cascade finished.
    Located { found: bool },
    /// Final markup produced.
    Rendered,
}

/// Body transform removing the located fragment from its document.
///
/// Hosts register it on their body-rendering pipeline with
/// [`SplitFilter::PRIORITY`], ahead of anything that would render the
/// fragment inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitFilter {
    item_id: ItemId,
    fragment: String,
}

impl SplitFilter {
    /// Pipeline priority; lower runs earlier.
    pub const PRIORITY: i32 = 5;

    /// Content item whose body is transformed.
    #[must_use]
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// Fragment removed from the body.
    #[must_use]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Remove the fragment from `body` and sanitize the remainder.
    ///
    /// Bodies of other content items are returned unchanged.
    pub fn apply<E: MarkupEngine + ?Sized>(
        &self,
        body: &str,
        current_item: ItemId,
        engine: &E,
    ) -> String {
        if current_item != self.item_id {
            return body.to_owned();
        }

        tracing::debug!(item_id = self.item_id, "Splitting media from body");
        engine.sanitize_html(&body.replace(&self.fragment, ""))
    }
}

/// Finds, sizes and wraps the representative media of a content item.
///
/// # Example
///
/// ```ignore
/// use grab_core::{GrabberConfig, MediaGrabber, MediaType, SiteOptions};
///
/// let config = GrabberConfig::new(42)
///     .media_type(MediaType::Audio)
///     .wrap(r#"<div class="media">"#, "</div>");
/// let mut grabber = MediaGrabber::new(&platform, config, SiteOptions::default())?;
/// let media = grabber.render();
/// ```
pub struct MediaGrabber<'p, P: Platform + ?Sized> {
    platform: &'p P,
    config: GrabberConfig,
    site: SiteOptions,
    catalog: ShortcodeCatalog,
    hooks: Hooks,
    content: String,
    located: Option<LocateResult>,
    rendered: Option<String>,
}

impl<'p, P: Platform + ?Sized> MediaGrabber<'p, P> {
    /// Create a grabber and load the content item's body.
    ///
    /// A zero `max_width` is replaced by the site content width.
    ///
    /// # Errors
    ///
    /// Returns [`GrabberError::MissingWidth`] when both widths are zero.
    pub fn new(
        platform: &'p P,
        mut config: GrabberConfig,
        site: SiteOptions,
    ) -> Result<Self, GrabberError> {
        if config.max_width == 0 {
            config.max_width = site.content_width;
        }
        if config.max_width == 0 {
            return Err(GrabberError::MissingWidth);
        }

        let content = platform.content_body(config.item_id).unwrap_or_default();

        Ok(Self {
            platform,
            config,
            site,
            catalog: ShortcodeCatalog::default(),
            hooks: Hooks::default(),
            content,
            located: None,
            rendered: None,
        })
    }

    /// Replace the shortcode catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: ShortcodeCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Install extension hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Resolved configuration.
    #[must_use]
    pub fn config(&self) -> &GrabberConfig {
        &self.config
    }

    /// Rendered document body searched by the cascade.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn state(&self) -> GrabState {
        match (&self.located, &self.rendered) {
            (_, Some(_)) => GrabState::Rendered,
            (Some(located), None) => GrabState::Located {
                found: located.is_found(),
            },
            (None, None) => GrabState::ContentLoaded,
        }
    }

    /// Run the location cascade (once) and return its result.
    pub fn locate(&mut self) -> &LocateResult {
        if self.located.is_none() {
            let result = self.run_cascade();
            self.located = Some(result);
        }
        self.located.get_or_insert_with(LocateResult::default)
    }

    /// Final media markup, or an empty string when nothing was found.
    ///
    /// Found media is resized and wrapped in the configured before/after
    /// markup; the result always passes through the media hook.
    pub fn render(&mut self) -> String {
        if let Some(rendered) = &self.rendered {
            return rendered.clone();
        }

        self.locate();
        let markup = self.located.as_ref().map_or("", |r| r.markup.as_str());

        let media = if markup.is_empty() {
            String::new()
        } else {
            let filter = |dims: Dimensions, attrs: &MediaAttributes| {
                self.hooks.filter_dimensions(dims, attrs, &self.config)
            };
            let sized = DimensionResolver::new(self.config.max_width)
                .with_filter(&filter)
                .rewrite(markup);
            format!("{}{sized}{}", self.config.before, self.config.after)
        };

        let rendered = self.hooks.filter_media(media, &self.config);
        self.rendered = Some(rendered.clone());
        rendered
    }

    /// Write [`render`](Self::render) output to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`GrabberError::Io`] if writing fails.
    pub fn display<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<(), GrabberError> {
        let media = self.render();
        out.write_all(media.as_bytes())?;
        Ok(())
    }

    /// Body transform for removing the located media from the document.
    ///
    /// `None` unless splitting is enabled and the media came from the body
    /// text (shortcode, autoembed URL or embed HTML).
    pub fn split_filter(&mut self) -> Option<SplitFilter> {
        if !self.config.split {
            return None;
        }

        let item_id = self.config.item_id;
        let fragment = self.locate().original_fragment.clone()?;
        Some(SplitFilter { item_id, fragment })
    }

    /// Remove the located media from `body` if it belongs to this grabber's item.
    pub fn split(&mut self, body: &str, current_item: ItemId) -> String {
        match self.split_filter() {
            Some(filter) => filter.apply(body, current_item, self.platform),
            None => body.to_owned(),
        }
    }

    fn run_cascade(&self) -> LocateResult {
        let filter = |dims: Dimensions, attrs: &MediaAttributes| {
            self.hooks.filter_dimensions(dims, attrs, &self.config)
        };
        let resolver = DimensionResolver::new(self.config.max_width).with_filter(&filter);

        MediaLocator::new(self.platform, &self.config)
            .with_site(self.site)
            .with_catalog(&self.catalog)
            .with_hooks(&self.hooks)
            .with_resolver(resolver)
            .locate(&self.content)
    }
}

/// Render the media for `config` in one call.
///
/// # Errors
///
/// Returns [`GrabberError::MissingWidth`] when no maximum width is available.
pub fn render<P: Platform + ?Sized>(
    platform: &P,
    config: GrabberConfig,
    site: SiteOptions,
) -> Result<String, GrabberError> {
    Ok(MediaGrabber::new(platform, config, site)?.render())
}

/// Write the media for `config` to `out` in one call.
///
/// # Errors
///
/// Returns an error when no maximum width is available or writing fails.
pub fn display<P: Platform + ?Sized, W: Write + ?Sized>(
    platform: &P,
    config: GrabberConfig,
    site: SiteOptions,
    out: &mut W,
) -> Result<(), GrabberError> {
    MediaGrabber::new(platform, config, site)?.display(out)
}
