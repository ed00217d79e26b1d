//! Representative media grabber.
//!
//! Finds the first audio, video or gallery embedded in a content item,
//! resizes it to a maximum width and optionally removes it from the body so
//! it can be shown elsewhere (e.g. above the title).
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Platform`] trait pair ([`ContentRepository`] + [`MarkupEngine`]) for host services
//! - [`MediaLocator`] running the five-strategy location cascade
//! - [`DimensionResolver`] for aspect-preserving resizing of embed markup
//! - [`MediaGrabber`] orchestrating locate → resize → wrap → split per item
//! - [`Hooks`] for host overrides of media, shortcode lists and dimensions
//! - [`MockPlatform`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use grab_core::{GrabberConfig, MediaGrabber, MediaType, SiteOptions};
//!
//! let config = GrabberConfig::new(42).media_type(MediaType::Video).split(true);
//! let mut grabber = MediaGrabber::new(&platform, config, SiteOptions::default())?;
//! let media = grabber.render();
//! let body = grabber.split(&body, 42);
//! ```

mod attributes;
mod config;
mod dimensions;
mod error;
mod grabber;
mod hooks;
mod locator;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod platform;
mod shortcode;

pub use attributes::MediaAttributes;
pub use config::{GrabberConfig, ItemId, MediaType, ShortcodeSearch, SiteOptions};
pub use dimensions::{DimensionResolver, Dimensions, DimensionsCallback, expand_dimensions};
pub use error::GrabberError;
pub use grabber::{GrabState, MediaGrabber, SplitFilter, display, render};
pub use hooks::Hooks;
pub use locator::{LocateResult, MediaLocator, Strategy};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockPlatform;
pub use platform::{
    ATTACHMENT_ITEM_TYPE, Attachment, ContentRepository, EmbedOptions, MarkupEngine, Platform,
};
pub use shortcode::{
    ShortcodeCatalog, ShortcodeMatch, invokes_shortcode, player_shortcode, scan_shortcodes,
};
