//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod split;

use std::path::{Path, PathBuf};

use clap::Args;
use grab_config::{CliSettings, Config};
use grab_core::ItemId;

use crate::error::CliError;
use crate::site::FixtureSite;

/// Arguments shared by the grab commands.
#[derive(Args)]
pub(crate) struct GrabArgs {
    /// JSON site fixture with content items and attachments.
    #[arg(short, long)]
    fixture: PathBuf,

    /// Content item to grab media from.
    #[arg(short, long)]
    item: ItemId,

    /// Media type: audio, video or gallery (overrides config).
    #[arg(short = 't', long = "type")]
    media_type: Option<String>,

    /// Maximum media width in pixels (overrides config).
    #[arg(short, long)]
    width: Option<u32>,

    /// Markup inserted before found media (overrides config).
    #[arg(long)]
    before: Option<String>,

    /// Markup inserted after found media (overrides config).
    #[arg(long)]
    after: Option<String>,

    /// Do not search bare URLs.
    #[arg(long)]
    no_autoembeds: bool,
}

impl GrabArgs {
    /// Load the configuration and the fixture, checking the item exists.
    fn prepare(
        &self,
        config_path: Option<&Path>,
        split: Option<bool>,
    ) -> Result<(Config, FixtureSite), CliError> {
        let cli_settings = CliSettings {
            media_type: self.media_type.clone(),
            max_width: self.width,
            before: self.before.clone(),
            after: self.after.clone(),
            split,
            autoembeds: self.no_autoembeds.then_some(false),
        };
        let config = Config::load(config_path, Some(&cli_settings))?;

        let site = FixtureSite::load(&self.fixture)?;
        if !site.contains(self.item) {
            return Err(CliError::Validation(format!(
                "Content item {} not found in {}",
                self.item,
                self.fixture.display()
            )));
        }

        Ok((config, site))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(fixture: PathBuf, item: ItemId) -> GrabArgs {
        GrabArgs {
            fixture,
            item,
            media_type: Some("audio".to_owned()),
            width: Some(320),
            before: None,
            after: None,
            no_autoembeds: true,
        }
    }

    #[test]
    fn test_prepare_applies_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("grab.toml");
        let fixture = dir.path().join("site.json");
        std::fs::write(&config_path, "[media]\nmax_width = 500\nbefore = \"<p>\"\n").unwrap();
        std::fs::write(&fixture, r#"{ "items": [ { "id": 3, "body": "" } ] }"#).unwrap();

        let (config, _site) = args(fixture, 3)
            .prepare(Some(&config_path), Some(true))
            .unwrap();
        let grabber = config.grabber_config(3);
        assert_eq!(grabber.max_width, 320);
        assert_eq!(grabber.before, "<p>");
        assert_eq!(grabber.media_type, grab_core::MediaType::Audio);
        assert!(grabber.split);
        assert!(!grabber.autoembeds);
    }

    #[test]
    fn test_prepare_unknown_item() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("grab.toml");
        let fixture = dir.path().join("site.json");
        std::fs::write(&config_path, "").unwrap();
        std::fs::write(&fixture, r#"{ "items": [] }"#).unwrap();

        let Err(err) = args(fixture, 3).prepare(Some(&config_path), None) else {
            panic!("expected missing item error");
        };
        assert!(err.to_string().contains("Content item 3 not found"));
    }
}
