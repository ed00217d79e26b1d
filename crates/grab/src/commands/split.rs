//! `grab split` command implementation.

use std::io::Write;
use std::path::Path;

use grab_config::Config;
use grab_core::{ContentRepository, ItemId, SplitFilter};

use super::GrabArgs;
use super::render::grabber;
use crate::error::CliError;
use crate::output::Output;
use crate::site::FixtureSite;

/// Execute the split command.
///
/// Prints the item's body with the located media removed. The body is
/// printed unchanged when there is nothing to split.
pub(crate) fn execute(args: &GrabArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let output = Output::new();
    let (config, site) = args.prepare(config_path, Some(true))?;

    let body = match split_body(&site, &config, args.item)? {
        Some(body) => body,
        None => {
            output.warning(&format!("No media to split from item {}", args.item));
            site.content_body(args.item).unwrap_or_default()
        }
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{body}")?;
    Ok(())
}

/// Body of `item` with its media fragment removed, if there is one.
fn split_body(
    site: &FixtureSite,
    config: &Config,
    item: ItemId,
) -> Result<Option<String>, CliError> {
    let mut grabber = grabber(site, config, item)?;
    let Some(filter) = grabber.split_filter() else {
        return Ok(None);
    };

    tracing::info!(
        item,
        fragment = filter.fragment(),
        priority = SplitFilter::PRIORITY,
        "Removing media from body"
    );
    Ok(Some(filter.apply(grabber.content(), item, site)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"{
        "items": [
            { "id": 1, "body": "<p>Intro</p><iframe src=\"https://www.youtube.com/embed/xyz\"></iframe><p>Outro</p><script>track()</script>" },
            { "id": 5, "body": "<p>Intro</p>\nhttps://youtu.be/xyz\n" },
            { "id": 2, "body": "before [video src=\"a.mp4\"] after" },
            { "id": 3, "body": "<p>Text</p>" },
            { "id": 4, "type": "attachment", "parent": 3, "mime_type": "video/mp4", "url": "v.mp4" }
        ]
    }"#;

    fn split(item: ItemId) -> Option<String> {
        let site = FixtureSite::from_json(FIXTURE).unwrap();
        let mut config = Config::default();
        config.media.split = true;
        split_body(&site, &config, item).unwrap()
    }

    #[test]
    fn test_split_shortcode() {
        assert_eq!(split(2).as_deref(), Some("before  after"));
    }

    #[test]
    fn test_split_embedded_html_and_sanitize() {
        assert_eq!(split(1).as_deref(), Some("<p>Intro</p><p>Outro</p>"));
    }

    #[test]
    fn test_provider_url_is_not_autoembed_media() {
        // Provider players are iframes, not [video] invocations
        assert_eq!(split(5), None);
    }

    #[test]
    fn test_split_attached_media_has_no_fragment() {
        assert_eq!(split(3), None);
    }

    #[test]
    fn test_split_requires_flag() {
        let site = FixtureSite::from_json(FIXTURE).unwrap();
        let config = Config::default();
        assert_eq!(split_body(&site, &config, 2).unwrap(), None);
    }
}
