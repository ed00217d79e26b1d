//! Media dimension resolution and rewriting.
//!
//! Computes the final width and height of a media fragment for a maximum
//! width and rewrites the `width`/`height` markers of the fragment in place:
//! - XML-style attributes (`width="640"`, `height='360'`, `width=640`)
//! - Inline style declarations of wrapper `<div>` elements (`width: 640px`)
//!
//! Everything else in the fragment is preserved byte for byte.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::attributes::MediaAttributes;

/// Provider whose compact player only scales at its native height.
static PROVIDER_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(?:embed\.spotify\.com/|open\.spotify\.com/embed/)").unwrap()
});

/// Native height of the provider's compact player.
const PROVIDER_COMPACT_HEIGHT: f64 = 80.0;

/// Scale factor used to inflate the source box before constraining.
const EXPAND_SCALE: u64 = 1_000_000;

static WIDTH_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| attribute_regex("width"));
static HEIGHT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| attribute_regex("height"));

/// Opening HTML tag or shortcode token; attributes are only rewritten inside these.
static OPENING_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[a-zA-Z][^>]*>|\[[a-zA-Z0-9_][a-zA-Z0-9_.-]*\s[^\]]*\]").unwrap()
});

/// Opening `<div>` tag carrying an inline style.
static STYLED_DIV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<div\b[^>]*\bstyle\s*=\s*["'][^>]*>"#).unwrap());

static STYLE_WIDTH_RE: LazyLock<Regex> = LazyLock::new(|| style_regex("width"));
static STYLE_HEIGHT_RE: LazyLock<Regex> = LazyLock::new(|| style_regex("height"));

/// Match `name="v"`, `name='v'` or `name=v` preceded by whitespace or a tag/shortcode opener.
fn attribute_regex(name: &str) -> Regex {
    Regex::new(&format!(
        r#"(?i)([\s<\[]{name}\s*=\s*)(?:"([^"]*)"|'([^']*)'|([^\s"'>\]]+))"#
    ))
    .unwrap()
}

/// Match a pixel declaration like `width: 640px`, not `max-width: 640px`.
fn style_regex(name: &str) -> Regex {
    Regex::new(&format!(r#"(?i)([\s;"']{name}\s*:\s*)\d+(?:\.\d+)?(px)"#)).unwrap()
}

/// Width and height of a media element in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Callback that may override computed dimensions.
pub type DimensionsCallback<'a> = &'a dyn Fn(Dimensions, &MediaAttributes) -> Dimensions;

/// Resolves media dimensions against a maximum width and rewrites markup.
///
/// # Example
///
/// ```
/// use grab_core::DimensionResolver;
///
/// let html = r#"<iframe src="https://player.example/1" width="640" height="360"></iframe>"#;
/// let resized = DimensionResolver::new(320).rewrite(html);
/// assert_eq!(resized, r#"<iframe src="https://player.example/1" width="320" height="180"></iframe>"#);
/// ```
pub struct DimensionResolver<'a> {
    max_width: u32,
    filter: Option<DimensionsCallback<'a>>,
}

impl<'a> DimensionResolver<'a> {
    /// Create a resolver constraining media to `max_width` pixels.
    #[must_use]
    pub fn new(max_width: u32) -> Self {
        Self {
            max_width,
            filter: None,
        }
    }

    /// Let `filter` override the computed dimensions before rewriting.
    #[must_use]
    pub fn with_filter(mut self, filter: DimensionsCallback<'a>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Compute final dimensions for the given attributes.
    ///
    /// Returns `None` when `width` or `height` is missing or not a positive
    /// number, or when the resolver has no maximum width.
    #[must_use]
    pub fn resolve(&self, attrs: &MediaAttributes) -> Option<Dimensions> {
        if self.max_width == 0 {
            return None;
        }
        let (width, height) = attrs.size()?;
        let (max_width, max_height) = self.bounds(attrs, width, height);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let dims = expand_dimensions(width as u32, height as u32, max_width, max_height);
        tracing::trace!(
            width,
            height,
            max_width,
            max_height,
            new_width = dims.width,
            new_height = dims.height,
            "Resolved media dimensions"
        );

        Some(match self.filter {
            Some(filter) => filter(dims, attrs),
            None => dims,
        })
    }

    /// Resolve dimensions for `html` and rewrite its width/height markers.
    ///
    /// Returns the input unchanged when it carries no usable dimensions.
    #[must_use]
    pub fn rewrite(&self, html: &str) -> String {
        let attrs = MediaAttributes::extract(html);
        match self.resolve(&attrs) {
            Some(dims) => apply_dimensions(html, dims),
            None => html.to_owned(),
        }
    }

    /// Bounding box for the fitted media.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn bounds(&self, attrs: &MediaAttributes, width: f64, height: f64) -> (u32, u32) {
        let max_height = (f64::from(self.max_width) / (width / height)).round() as u32;

        let is_provider = attrs
            .get("src")
            .is_some_and(|src| PROVIDER_SRC_RE.is_match(src));

        // The provider's player only resizes in its compact form; any other
        // size keeps its own box.
        if is_provider && (height - PROVIDER_COMPACT_HEIGHT).abs() > f64::EPSILON {
            return (width as u32, height as u32);
        }

        (self.max_width, max_height)
    }
}

/// Fit an example box into `max_width` x `max_height`, scaling up or down.
///
/// The example box is inflated before constraining so the result fills the
/// bounding box as snugly as the aspect ratio allows.
///
/// ```
/// use grab_core::{Dimensions, expand_dimensions};
///
/// assert_eq!(expand_dimensions(640, 360, 320, 180), Dimensions::new(320, 180));
/// assert_eq!(expand_dimensions(160, 90, 320, 180), Dimensions::new(320, 180));
/// ```
#[must_use]
pub fn expand_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> Dimensions {
    constrain_dimensions(
        u64::from(width) * EXPAND_SCALE,
        u64::from(height) * EXPAND_SCALE,
        max_width,
        max_height,
    )
}

/// Scale a box down so it fits within `max_width` x `max_height`.
///
/// A zero bound means "unconstrained" on that axis.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn constrain_dimensions(width: u64, height: u64, max_width: u32, max_height: u32) -> Dimensions {
    let clamp = |v: u64| u32::try_from(v).unwrap_or(u32::MAX);

    if max_width == 0 && max_height == 0 {
        return Dimensions::new(clamp(width), clamp(height));
    }

    let (cur_w, cur_h) = (width as f64, height as f64);
    let (max_w, max_h) = (f64::from(max_width), f64::from(max_height));

    let mut width_ratio = 1.0;
    let mut height_ratio = 1.0;
    let mut did_width = false;
    let mut did_height = false;

    if max_width > 0 && width > 0 && cur_w > max_w {
        width_ratio = max_w / cur_w;
        did_width = true;
    }
    if max_height > 0 && height > 0 && cur_h > max_h {
        height_ratio = max_h / cur_h;
        did_height = true;
    }

    let smaller_ratio = f64::min(width_ratio, height_ratio);
    let larger_ratio = f64::max(width_ratio, height_ratio);

    let overflows = (cur_w * larger_ratio).round() > max_w || (cur_h * larger_ratio).round() > max_h;
    let ratio = if overflows { smaller_ratio } else { larger_ratio };

    let mut w = ((cur_w * ratio).round() as u64).max(1);
    let mut h = ((cur_h * ratio).round() as u64).max(1);

    // Round up results that land one pixel short of the bound.
    if did_width && w + 1 == u64::from(max_width) {
        w = u64::from(max_width);
    }
    if did_height && h + 1 == u64::from(max_height) {
        h = u64::from(max_height);
    }

    Dimensions::new(clamp(w), clamp(h))
}

/// Rewrite every width/height marker in `html` to `dims`.
///
/// Text between tags is never touched.
fn apply_dimensions(html: &str, dims: Dimensions) -> String {
    let result = OPENING_TAG_RE.replace_all(html, |caps: &Captures| {
        let tag = replace_attribute(&WIDTH_ATTR_RE, &caps[0], dims.width);
        replace_attribute(&HEIGHT_ATTR_RE, &tag, dims.height)
    });

    STYLED_DIV_RE
        .replace_all(&result, |caps: &Captures| {
            let tag = replace_style(&STYLE_WIDTH_RE, &caps[0], dims.width);
            replace_style(&STYLE_HEIGHT_RE, &tag, dims.height)
        })
        .into_owned()
}

fn replace_attribute(re: &Regex, html: &str, value: u32) -> String {
    re.replace_all(html, |caps: &Captures| {
        let prefix = &caps[1];
        if caps.get(2).is_some() {
            format!(r#"{prefix}"{value}""#)
        } else if caps.get(3).is_some() {
            format!("{prefix}'{value}'")
        } else {
            format!("{prefix}{value}")
        }
    })
    .into_owned()
}

fn replace_style(re: &Regex, tag: &str, value: u32) -> String {
    re.replace_all(tag, |caps: &Captures| format!("{}{value}{}", &caps[1], &caps[2]))
        .into_owned()
}
