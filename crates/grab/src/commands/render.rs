//! `grab render` command implementation.

use std::io::Write;
use std::path::Path;

use grab_config::Config;
use grab_core::{ItemId, MediaGrabber, MediaType};

use super::GrabArgs;
use crate::error::CliError;
use crate::output::Output;
use crate::site::FixtureSite;

/// Execute the render command.
///
/// Prints the media markup to stdout, or a warning when none was found.
pub(crate) fn execute(args: &GrabArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let output = Output::new();
    let (config, site) = args.prepare(config_path, None)?;

    let mut grabber = grabber(&site, &config, args.item)?;
    if grabber.render().is_empty() {
        let media_type = MediaType::from_name(&config.media.media_type);
        output.warning(&format!("No {media_type} found in item {}", args.item));
        return Ok(());
    }

    let mut stdout = std::io::stdout().lock();
    grabber.display(&mut stdout)?;
    writeln!(stdout)?;
    Ok(())
}

pub(super) fn grabber<'s>(
    site: &'s FixtureSite,
    config: &Config,
    item: ItemId,
) -> Result<MediaGrabber<'s, FixtureSite>, CliError> {
    Ok(MediaGrabber::new(
        site,
        config.grabber_config(item),
        config.site_options(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"{
        "items": [
            { "id": 1, "body": "<p>Intro</p>\n[gallery ids=\"4\"]\n[video src=\"https://cdn.example/a.mp4\" width=\"1280\" height=\"720\"]" },
            { "id": 2, "body": "<p>Listen</p>\nhttps://cdn.example/song.mp3\n" },
            { "id": 3, "body": "<p>Text</p>" },
            { "id": 4, "type": "attachment", "parent": 3, "mime_type": "audio/ogg", "url": "https://cdn.example/b.ogg" },
            { "id": 5, "body": "[embed]https://open.spotify.com/track/abc[/embed]" }
        ]
    }"#;

    fn render(item: ItemId, toml: &str) -> String {
        let site = FixtureSite::from_json(FIXTURE).unwrap();
        let config: Config = toml::from_str(toml).unwrap();
        grabber(&site, &config, item).unwrap().render()
    }

    #[test]
    fn test_render_video_shortcode() {
        assert_eq!(
            render(1, "[media]\nmax_width = 320\nbefore = \"<figure>\"\nafter = \"</figure>\""),
            r#"<figure><video controls src="https://cdn.example/a.mp4" width="320" height="180"></video></figure>"#
        );
    }

    #[test]
    fn test_render_autoembed_audio() {
        assert_eq!(
            render(2, "[media]\ntype = \"audio\""),
            r#"<audio controls src="https://cdn.example/song.mp3"></audio>"#
        );
    }

    #[test]
    fn test_render_attached_audio() {
        assert_eq!(
            render(3, "[media]\ntype = \"audio\""),
            r#"<audio controls src="https://cdn.example/b.ogg"></audio>"#
        );
    }

    #[test]
    fn test_render_spotify_compact_player_uses_max_width() {
        assert_eq!(
            render(5, "[media]\ntype = \"audio\"\nmax_width = 500"),
            r#"<iframe src="https://open.spotify.com/embed/track/abc" width="500" height="133" frameborder="0" allowfullscreen></iframe>"#
        );
    }

    #[test]
    fn test_render_nothing_found() {
        assert_eq!(render(3, "[media]\ntype = \"video\""), "");
    }
}
