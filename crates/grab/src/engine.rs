//! Markup engine for fixture sites.
//!
//! Expands the player shortcodes into HTML5 elements, resolves a few
//! well-known providers into iframes and finds embed HTML in bodies.

use std::fmt::Write;
use std::sync::LazyLock;

use grab_core::{EmbedOptions, MarkupEngine, MediaAttributes, MediaType, player_shortcode};
use regex::{Captures, Regex};

use crate::site::FixtureSite;

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script>").unwrap());

static EMBED_HTML_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<(?:iframe|object|video|audio)\b.*?</(?:iframe|object|video|audio)>|<embed\b[^>]*>",
    )
    .unwrap()
});

/// `[embed ...]URL[/embed]`
static EMBED_CONTENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\[embed\b[^\]]*\](.*?)\[/embed\]$").unwrap());

static VIDEO_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(?:mp4|m4v|webm|ogv|mov)(?:\?\S*)?$").unwrap());

static AUDIO_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(?:mp3|m4a|ogg|oga|wav|flac)(?:\?\S*)?$").unwrap());

/// An oEmbed-style provider: URL pattern and player builder.
struct Provider {
    name: &'static str,
    pattern: Regex,
    player: fn(&Captures) -> String,
}

static PROVIDERS: LazyLock<Vec<Provider>> = LazyLock::new(|| {
    vec![
        Provider {
            name: "youtube",
            pattern: Regex::new(
                r"(?i)^https?://(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/)([\w-]+)",
            )
            .unwrap(),
            player: |caps| iframe(&format!("https://www.youtube.com/embed/{}", &caps[1]), 640, 360),
        },
        Provider {
            name: "vimeo",
            pattern: Regex::new(r"(?i)^https?://(?:www\.)?vimeo\.com/(\d+)").unwrap(),
            player: |caps| iframe(&format!("https://player.vimeo.com/video/{}", &caps[1]), 640, 360),
        },
        Provider {
            name: "spotify",
            pattern: Regex::new(
                r"(?i)^https?://open\.spotify\.com/(track|album|playlist|episode)/(\w+)",
            )
            .unwrap(),
            player: |caps| {
                let height = if caps[1].eq_ignore_ascii_case("track") { 80 } else { 380 };
                iframe(
                    &format!("https://open.spotify.com/embed/{}/{}", &caps[1], &caps[2]),
                    300,
                    height,
                )
            },
        },
    ]
});

fn iframe(src: &str, width: u32, height: u32) -> String {
    format!(
        r#"<iframe src="{src}" width="{width}" height="{height}" frameborder="0" allowfullscreen></iframe>"#
    )
}

/// Player markup of a known provider.
fn provider_player(url: &str) -> Option<String> {
    PROVIDERS.iter().find_map(|provider| {
        let caps = provider.pattern.captures(url)?;
        tracing::debug!(provider = provider.name, url, "Resolved provider embed");
        Some((provider.player)(&caps))
    })
}

/// Media type of a direct media file URL.
fn media_file_type(url: &str) -> Option<MediaType> {
    if VIDEO_FILE_RE.is_match(url) {
        Some(MediaType::Video)
    } else if AUDIO_FILE_RE.is_match(url) {
        Some(MediaType::Audio)
    } else {
        None
    }
}

fn quote_attr(value: &str) -> String {
    value.replace('"', "&quot;")
}

fn link(url: &str) -> String {
    format!(r#"<a href="{}">{url}</a>"#, quote_attr(url))
}

/// HTML5 element for a player shortcode.
fn media_element(element: &str, attrs: &MediaAttributes) -> String {
    let mut html = format!("<{element} controls");
    for name in ["src", "width", "height", "poster"] {
        if let Some(value) = attrs.get(name) {
            let _ = write!(html, r#" {name}="{}""#, quote_attr(value));
        }
    }
    let _ = write!(html, "></{element}>");
    html
}

fn data_div(class: &str, attrs: &MediaAttributes) -> String {
    let mut html = format!(r#"<div class="{class}""#);
    for name in ["type", "ids"] {
        if let Some(value) = attrs.get(name) {
            let _ = write!(html, r#" data-{name}="{}""#, quote_attr(value));
        }
    }
    html.push_str("></div>");
    html
}

impl FixtureSite {
    /// Embed markup for a URL, without link fallback.
    fn embed_url(&self, url: &str) -> String {
        if let Some(player) = provider_player(url) {
            return player;
        }
        match media_file_type(url) {
            Some(media_type) => {
                self.expand_shortcode(media_type.as_str(), &player_shortcode(media_type, url))
            }
            None => String::new(),
        }
    }
}

impl MarkupEngine for FixtureSite {
    fn expand_shortcode(&self, tag: &str, fragment: &str) -> String {
        let attrs = MediaAttributes::extract(fragment);
        match tag {
            "video" | "audio" => media_element(tag, &attrs),
            "gallery" | "playlist" => data_div(tag, &attrs),
            "embed" => self.run_embed(fragment, EmbedOptions::default()),
            _ => String::new(),
        }
    }

    fn run_embed(&self, fragment: &str, options: EmbedOptions) -> String {
        let url = EMBED_CONTENT_RE
            .captures(fragment.trim())
            .map(|caps| caps[1].trim().to_owned())
            .or_else(|| {
                let attrs = MediaAttributes::extract(fragment);
                attrs.get("src").or_else(|| attrs.get("url")).map(str::to_owned)
            });
        let Some(url) = url.filter(|url| !url.is_empty()) else {
            return String::new();
        };

        let html = self.embed_url(&url);
        if html.is_empty() && options.link_fallback {
            return link(&url);
        }
        html
    }

    fn resolve_autoembed(&self, url: &str, options: EmbedOptions) -> String {
        if let Some(media_type) = media_file_type(url) {
            return player_shortcode(media_type, url);
        }
        match provider_player(url) {
            Some(player) => player,
            None if options.link_fallback => link(url),
            None => String::new(),
        }
    }

    fn embedded_html(&self, body: &str) -> Vec<String> {
        EMBED_HTML_RE
            .find_iter(body)
            .map(|m| m.as_str().to_owned())
            .collect()
    }

    fn sanitize_html(&self, body: &str) -> String {
        SCRIPT_RE.replace_all(body, "").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn site() -> FixtureSite {
        FixtureSite::from_json(r#"{ "items": [] }"#).unwrap()
    }

    #[test]
    fn test_expand_video() {
        assert_eq!(
            site().expand_shortcode("video", r#"[video src="a.mp4" width="640" height="360"]"#),
            r#"<video controls src="a.mp4" width="640" height="360"></video>"#
        );
    }

    #[test]
    fn test_expand_audio_and_gallery() {
        let site = site();
        assert_eq!(
            site.expand_shortcode("audio", r#"[audio src="a.mp3"]"#),
            r#"<audio controls src="a.mp3"></audio>"#
        );
        assert_eq!(
            site.expand_shortcode("gallery", r#"[gallery ids="1,2,3"]"#),
            r#"<div class="gallery" data-ids="1,2,3"></div>"#
        );
        assert_eq!(site.expand_shortcode("vine", "[vine id=1]"), "");
    }

    #[test]
    fn test_run_embed_provider() {
        assert_eq!(
            site().run_embed(
                "[embed]https://youtu.be/abc_1[/embed]",
                EmbedOptions::MEDIA_ONLY
            ),
            r#"<iframe src="https://www.youtube.com/embed/abc_1" width="640" height="360" frameborder="0" allowfullscreen></iframe>"#
        );
    }

    #[test]
    fn test_run_embed_link_fallback() {
        let site = site();
        let fragment = "[embed]https://unknown.example/page[/embed]";
        assert_eq!(site.run_embed(fragment, EmbedOptions::MEDIA_ONLY), "");
        assert_eq!(
            site.run_embed(fragment, EmbedOptions::default()),
            r#"<a href="https://unknown.example/page">https://unknown.example/page</a>"#
        );
    }

    #[test]
    fn test_autoembed_media_file_is_shortcode() {
        assert_eq!(
            site().resolve_autoembed("https://cdn.example/clip.mp4", EmbedOptions::MEDIA_ONLY),
            r#"[video src="https://cdn.example/clip.mp4"]"#
        );
    }

    #[test]
    fn test_autoembed_spotify_track() {
        let html = site().resolve_autoembed(
            "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC",
            EmbedOptions::MEDIA_ONLY,
        );
        assert!(html.contains(r#"src="https://open.spotify.com/embed/track/4uLU6hMCjMI75M1A2tKUQC""#));
        assert!(html.contains(r#"height="80""#));
    }

    #[test]
    fn test_embedded_html() {
        let found = site().embedded_html(
            r#"<p>x</p><audio src="a.mp3"></audio><embed src="b.swf"><iframe src="c"></iframe>"#,
        );
        assert_eq!(
            found,
            vec![
                r#"<audio src="a.mp3"></audio>"#,
                r#"<embed src="b.swf">"#,
                r#"<iframe src="c"></iframe>"#,
            ]
        );
    }

    #[test]
    fn test_sanitize_drops_scripts() {
        assert_eq!(
            site().sanitize_html("a<script type=\"x\">evil()</script>b<SCRIPT>x</SCRIPT>"),
            "ab"
        );
    }
}
