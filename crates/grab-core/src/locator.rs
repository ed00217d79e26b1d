//! Media location cascade.
//!
//! Strategies run in a fixed order and the first one producing markup wins:
//!
//! 1. [`Strategy::SelfMedia`]: the content item is itself an audio/video attachment
//! 2. [`Strategy::Shortcode`]: first known shortcode in the body
//! 3. [`Strategy::Autoembed`]: bare URL on its own line resolving to a player shortcode
//! 4. [`Strategy::Embedded`]: raw embed HTML already in the body
//! 5. [`Strategy::Attached`]: first attached file of the media type
//!
//! Embed resolution always runs with [`EmbedOptions::MEDIA_ONLY`], so a
//! strategy yields media markup or nothing, never a plain link.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{GrabberConfig, MediaType, SiteOptions};
use crate::dimensions::DimensionResolver;
use crate::hooks::Hooks;
use crate::platform::{ATTACHMENT_ITEM_TYPE, EmbedOptions, Platform};
use crate::shortcode::{ShortcodeCatalog, invokes_shortcode, player_shortcode, scan_shortcodes};

/// A URL alone on its line.
static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?im)^\s*(https?://[^\s"]+)\s*$"#).unwrap());

/// Location strategy, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    SelfMedia,
    Shortcode,
    Autoembed,
    Embedded,
    Attached,
}

impl Strategy {
    /// All strategies in the order they are tried.
    pub const ORDER: [Self; 5] = [
        Self::SelfMedia,
        Self::Shortcode,
        Self::Autoembed,
        Self::Embedded,
        Self::Attached,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SelfMedia => "self-media",
            Self::Shortcode => "shortcode",
            Self::Autoembed => "autoembed",
            Self::Embedded => "embedded",
            Self::Attached => "attached",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the location cascade.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocateResult {
    /// Media markup, empty when nothing was found.
    pub markup: String,
    /// Exact body substring the media came from (shortcode, URL or embed HTML).
    ///
    /// `None` for self-media and attached media, which are not part of the body text.
    pub original_fragment: Option<String>,
    /// Strategy that produced the markup.
    pub strategy: Option<Strategy>,
}

impl LocateResult {
    /// Whether any media was found.
    #[must_use]
    pub fn is_found(&self) -> bool {
        !self.markup.is_empty()
    }
}

/// Markup produced by one strategy.
struct Found {
    markup: String,
    fragment: Option<String>,
}

impl Found {
    fn new(markup: String) -> Option<Self> {
        (!markup.is_empty()).then_some(Self {
            markup,
            fragment: None,
        })
    }

    fn with_fragment(markup: String, fragment: &str) -> Option<Self> {
        (!markup.is_empty()).then(|| Self {
            markup,
            fragment: Some(fragment.to_owned()),
        })
    }
}

/// Runs the location cascade over a document body.
///
/// # Example
///
/// ```ignore
/// let config = GrabberConfig::new(42);
/// let result = MediaLocator::new(&platform, &config)
///     .with_site(SiteOptions::default())
///     .locate(&body);
/// if result.is_found() {
///     println!("{}", result.markup);
/// }
/// ```
pub struct MediaLocator<'a, P: Platform + ?Sized> {
    platform: &'a P,
    config: &'a GrabberConfig,
    site: SiteOptions,
    catalog: Option<&'a ShortcodeCatalog>,
    hooks: Option<&'a Hooks>,
    resolver: Option<DimensionResolver<'a>>,
}

impl<'a, P: Platform + ?Sized> MediaLocator<'a, P> {
    #[must_use]
    pub fn new(platform: &'a P, config: &'a GrabberConfig) -> Self {
        Self {
            platform,
            config,
            site: SiteOptions::default(),
            catalog: None,
            hooks: None,
            resolver: None,
        }
    }

    #[must_use]
    pub fn with_site(mut self, site: SiteOptions) -> Self {
        self.site = site;
        self
    }

    /// Use `catalog` instead of the default shortcode catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: &'a ShortcodeCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: &'a Hooks) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Resolver used to pre-size `[video]` shortcodes before expansion.
    ///
    /// Defaults to a plain resolver for the configured (or site) width.
    #[must_use]
    pub fn with_resolver(mut self, resolver: DimensionResolver<'a>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Run the cascade over `content`.
    pub fn locate(&self, content: &str) -> LocateResult {
        let span = tracing::debug_span!(
            "locate",
            item_id = self.config.item_id,
            media_type = %self.config.media_type
        );
        let _enter = span.enter();

        for strategy in Strategy::ORDER {
            if !self.is_enabled(strategy) {
                tracing::debug!(%strategy, "Strategy disabled");
                continue;
            }

            match self.run(strategy, content) {
                Some(found) => {
                    tracing::info!(
                        %strategy,
                        has_fragment = found.fragment.is_some(),
                        "Located media"
                    );
                    return LocateResult {
                        markup: found.markup,
                        original_fragment: found.fragment,
                        strategy: Some(strategy),
                    };
                }
                None => tracing::debug!(%strategy, "No media found"),
            }
        }

        LocateResult::default()
    }

    fn is_enabled(&self, strategy: Strategy) -> bool {
        match strategy {
            Strategy::SelfMedia => true,
            Strategy::Shortcode => self.config.shortcodes.is_enabled(),
            Strategy::Autoembed => self.site.embed_autourls && self.config.autoembeds,
            Strategy::Embedded => self.config.embedded,
            Strategy::Attached => self.config.attached,
        }
    }

    fn run(&self, strategy: Strategy, content: &str) -> Option<Found> {
        match strategy {
            Strategy::SelfMedia => self.locate_self_media(),
            Strategy::Shortcode => self.locate_shortcode_media(content),
            Strategy::Autoembed => self.locate_autoembed_media(content),
            Strategy::Embedded => self.locate_embedded_media(content),
            Strategy::Attached => self.locate_attached_media(),
        }
    }

    fn locate_self_media(&self) -> Option<Found> {
        let id = self.config.item_id;
        if self.platform.item_type(id)? != ATTACHMENT_ITEM_TYPE {
            return None;
        }

        let mime = self.platform.mime_type(id)?;
        let primary = mime.split_once('/').map_or(mime.as_str(), |(primary, _)| primary);
        let media_type = match primary {
            "audio" => MediaType::Audio,
            "video" => MediaType::Video,
            _ => return None,
        };

        let url = self.platform.attachment_url(id)?;
        let shortcode = player_shortcode(media_type, &url);
        Found::new(self.platform.expand_shortcode(media_type.as_str(), &shortcode))
    }

    fn locate_shortcode_media(&self, content: &str) -> Option<Found> {
        let matches = scan_shortcodes(content);
        if matches.is_empty() {
            return None;
        }

        let media_type = self.config.media_type;
        let default_catalog;
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => {
                default_catalog = ShortcodeCatalog::default();
                &default_catalog
            }
        };
        let known = catalog.tags(media_type).to_vec();
        let known = match self.hooks {
            Some(hooks) => hooks.filter_shortcodes(media_type, known),
            None => known,
        };

        let allowed: Vec<&str> = self
            .config
            .shortcodes
            .extra_tags()
            .chain(known.iter().map(String::as_str))
            .collect();

        let found = matches.iter().find(|m| allowed.contains(&m.tag))?;
        tracing::debug!(tag = found.tag, offset = found.start, "Matched shortcode");

        Found::with_fragment(self.do_shortcode(found.tag, found.text), found.text)
    }

    fn locate_autoembed_media(&self, content: &str) -> Option<Found> {
        let tag = self.config.media_type.as_str();

        for caps in BARE_URL_RE.captures_iter(content) {
            let url = &caps[1];
            let embed = self
                .platform
                .resolve_autoembed(url, EmbedOptions::MEDIA_ONLY);

            if embed.is_empty() {
                continue;
            }

            if invokes_shortcode(&embed, tag) {
                tracing::debug!(url, "Autoembed resolved to shortcode");
                return Found::with_fragment(self.do_shortcode(tag, &embed), url);
            }
        }

        None
    }

    fn locate_embedded_media(&self, content: &str) -> Option<Found> {
        let html = self.platform.embedded_html(content).into_iter().next()?;
        Found::with_fragment(html.clone(), &html)
    }

    fn locate_attached_media(&self) -> Option<Found> {
        let media_type = self.config.media_type;
        let attachment = self
            .platform
            .attached_media(media_type, self.config.item_id)
            .into_iter()
            .next()?;

        if !media_type.is_playable() {
            return None;
        }

        tracing::debug!(attachment_id = attachment.id, "Using attached media");
        let shortcode = player_shortcode(media_type, &attachment.url);
        Found::new(self.platform.expand_shortcode(media_type.as_str(), &shortcode))
    }

    /// Expand a matched shortcode.
    fn do_shortcode(&self, tag: &str, shortcode: &str) -> String {
        match tag {
            "embed" => self.platform.run_embed(shortcode, EmbedOptions::MEDIA_ONLY),
            // Size the shortcode first so the player wrapper gets the final dimensions.
            "video" => {
                let sized = match &self.resolver {
                    Some(resolver) => resolver.rewrite(shortcode),
                    None => self.default_resolver().rewrite(shortcode),
                };
                self.platform.expand_shortcode(tag, &sized)
            }
            _ => self.platform.expand_shortcode(tag, shortcode),
        }
    }

    fn default_resolver(&self) -> DimensionResolver<'static> {
        let width = match self.config.max_width {
            0 => self.site.content_width,
            width => width,
        };
        DimensionResolver::new(width)
    }
}
