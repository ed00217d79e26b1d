//! Configuration management for the media grabber.
//!
//! Parses `grab.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [site]
//! content_width = 640
//! embed_autourls = true
//!
//! [media]
//! type = "audio"
//! before = "<div class=\"media\">"
//! after = "</div>"
//! split = true
//! shortcodes = ["bunny"]
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use grab_core::{GrabberConfig, ItemId, MediaType, ShortcodeSearch, SiteOptions};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override media type name.
    pub media_type: Option<String>,
    /// Override maximum media width.
    pub max_width: Option<u32>,
    /// Override markup inserted before the media.
    pub before: Option<String>,
    /// Override markup inserted after the media.
    pub after: Option<String>,
    /// Override split flag.
    pub split: Option<bool>,
    /// Override autoembed search flag.
    pub autoembeds: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "grab.toml";

/// Upper bound for `site.content_width`.
const MAX_CONTENT_WIDTH: u32 = 10_000;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,
    /// Grabber defaults.
    pub media: MediaConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Site-wide settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Default maximum media width.
    pub content_width: u32,
    /// Whether bare URLs may be converted into embeds.
    pub embed_autourls: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let site = SiteOptions::default();
        Self {
            content_width: site.content_width,
            embed_autourls: site.embed_autourls,
        }
    }
}

/// Shortcode search setting: a switch or a list of extra tags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ShortcodesSetting {
    Enabled(bool),
    Tags(Vec<String>),
}

impl Default for ShortcodesSetting {
    fn default() -> Self {
        Self::Enabled(true)
    }
}

impl From<&ShortcodesSetting> for ShortcodeSearch {
    fn from(setting: &ShortcodesSetting) -> Self {
        match setting {
            ShortcodesSetting::Enabled(true) => Self::Known,
            ShortcodesSetting::Enabled(false) => Self::Disabled,
            ShortcodesSetting::Tags(tags) if tags.is_empty() => Self::Disabled,
            ShortcodesSetting::Tags(tags) => {
                Self::Extra(tags.iter().cloned().collect::<BTreeSet<_>>())
            }
        }
    }
}

/// Grabber defaults applied to every content item.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Media type name; unknown names mean video.
    #[serde(rename = "type")]
    pub media_type: String,
    /// Markup inserted before found media.
    pub before: String,
    /// Markup inserted after found media.
    pub after: String,
    /// Whether to remove the media from the body.
    pub split: bool,
    /// Shortcode search setting.
    pub shortcodes: ShortcodesSetting,
    /// Whether to search bare URLs.
    pub autoembeds: bool,
    /// Whether to search raw embed HTML.
    pub embedded: bool,
    /// Whether to fall back to attached files.
    pub attached: bool,
    /// Maximum media width, 0 for the site content width.
    pub max_width: u32,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            media_type: MediaType::default().as_str().to_owned(),
            before: String::new(),
            after: String::new(),
            split: false,
            shortcodes: ShortcodesSetting::default(),
            autoembeds: true,
            embedded: true,
            attached: true,
            max_width: 0,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `grab.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or the loaded values are invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(media_type) = &settings.media_type {
            self.media.media_type.clone_from(media_type);
        }
        if let Some(max_width) = settings.max_width {
            self.media.max_width = max_width;
        }
        if let Some(before) = &settings.before {
            self.media.before.clone_from(before);
        }
        if let Some(after) = &settings.after {
            self.media.after.clone_from(after);
        }
        if let Some(split) = settings.split {
            self.media.split = split;
        }
        if let Some(autoembeds) = settings.autoembeds {
            self.media.autoembeds = autoembeds;
        }
    }

    /// Site options passed to the grabber.
    #[must_use]
    pub fn site_options(&self) -> SiteOptions {
        SiteOptions {
            content_width: self.site.content_width,
            embed_autourls: self.site.embed_autourls,
        }
    }

    /// Grabber configuration for one content item.
    #[must_use]
    pub fn grabber_config(&self, item_id: ItemId) -> GrabberConfig {
        let media = &self.media;
        GrabberConfig::new(item_id)
            .media_type_name(&media.media_type)
            .wrap(media.before.clone(), media.after.clone())
            .split(media.split)
            .max_width(media.max_width)
            .shortcodes(ShortcodeSearch::from(&media.shortcodes))
            .autoembeds(media.autoembeds)
            .embedded(media.embedded)
            .attached(media.attached)
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let width = self.site.content_width;
        if width == 0 {
            return Err(ConfigError::Validation(
                "site.content_width must be greater than 0".to_owned(),
            ));
        }
        if width > MAX_CONTENT_WIDTH {
            return Err(ConfigError::Validation(format!(
                "site.content_width cannot exceed {MAX_CONTENT_WIDTH}"
            )));
        }
        if self.media.max_width > MAX_CONTENT_WIDTH {
            return Err(ConfigError::Validation(format!(
                "media.max_width cannot exceed {MAX_CONTENT_WIDTH}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.site.content_width, 640);
        assert!(config.site.embed_autourls);
        assert_eq!(config.media.media_type, "video");
        assert_eq!(config.media.shortcodes, ShortcodesSetting::Enabled(true));
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.site.content_width, 640);
        assert_eq!(config.media.max_width, 0);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[site]
content_width = 800
embed_autourls = false

[media]
type = "audio"
before = "<div>"
after = "</div>"
split = true
shortcodes = false
autoembeds = false
embedded = false
attached = false
max_width = 300
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.site.content_width, 800);
        assert!(!config.site.embed_autourls);

        let grabber = config.grabber_config(5);
        assert_eq!(grabber.item_id, 5);
        assert_eq!(grabber.media_type, MediaType::Audio);
        assert_eq!(grabber.before, "<div>");
        assert_eq!(grabber.after, "</div>");
        assert!(grabber.split);
        assert_eq!(grabber.shortcodes, ShortcodeSearch::Disabled);
        assert!(!grabber.autoembeds);
        assert!(!grabber.embedded);
        assert!(!grabber.attached);
        assert_eq!(grabber.max_width, 300);
    }

    #[test]
    fn test_parse_shortcode_tags() {
        let toml = r#"
[media]
shortcodes = ["bunny", "clip"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let grabber = config.grabber_config(1);
        assert_eq!(grabber.shortcodes.extra_tags().collect::<Vec<_>>(), vec!["bunny", "clip"]);
    }

    #[test]
    fn test_empty_shortcode_list_disables_search() {
        let setting = ShortcodesSetting::Tags(Vec::new());
        assert_eq!(ShortcodeSearch::from(&setting), ShortcodeSearch::Disabled);
    }

    #[test]
    fn test_unknown_type_means_video() {
        let toml = r#"
[media]
type = "podcast"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.grabber_config(1).media_type, MediaType::Video);
    }

    #[test]
    fn test_site_options() {
        let toml = r"
[site]
content_width = 720
";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.site_options(),
            SiteOptions {
                content_width: 720,
                embed_autourls: true,
            }
        );
    }

    #[test]
    fn test_cli_settings_override() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            media_type: Some("gallery".to_owned()),
            max_width: Some(480),
            before: Some("<p>".to_owned()),
            after: Some("</p>".to_owned()),
            split: Some(true),
            autoembeds: Some(false),
        });

        let grabber = config.grabber_config(2);
        assert_eq!(grabber.media_type, MediaType::Gallery);
        assert_eq!(grabber.max_width, 480);
        assert_eq!(grabber.before, "<p>");
        assert_eq!(grabber.after, "</p>");
        assert!(grabber.split);
        assert!(!grabber.autoembeds);
    }

    #[test]
    fn test_cli_settings_none_keeps_values() {
        let mut config = Config::default();
        config.media.before = "<x>".to_owned();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.media.before, "<x>");
        assert_eq!(config.media.max_width, 0);
    }

    #[test]
    fn test_validate_zero_width() {
        let mut config = Config::default();
        config.site.content_width = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("site.content_width must be greater than 0"));
    }

    #[test]
    fn test_validate_width_too_large() {
        let mut config = Config::default();
        config.site.content_width = 20_000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cannot exceed 10000"));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[media]\ntype = \"audio\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.media.media_type, "audio");
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grab.toml");
        std::fs::write(&path, "[site\ncontent_width = 1").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grab.toml");
        std::fs::write(&path, "[site]\ncontent_width = 0\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_applies_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grab.toml");
        std::fs::write(&path, "[media]\nmax_width = 500\n").unwrap();

        let settings = CliSettings {
            max_width: Some(320),
            ..CliSettings::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert_eq!(config.media.max_width, 320);
    }

    #[test]
    fn test_load_validates_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grab.toml");
        std::fs::write(&path, "[media]\nmax_width = 500\n").unwrap();

        let settings = CliSettings {
            max_width: Some(50_000),
            ..CliSettings::default()
        };
        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("media.max_width"));
    }

    #[test]
    fn test_discover_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        let found = Config::discover_config(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILENAME));
    }
}
