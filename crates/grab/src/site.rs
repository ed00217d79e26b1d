//! JSON site fixture.
//!
//! A fixture stands in for the host application's content store:
//!
//! ```json
//! {
//!   "items": [
//!     { "id": 1, "type": "post", "body": "<p>Intro</p>\n[video src=\"a.mp4\"]" },
//!     { "id": 2, "type": "attachment", "parent": 1,
//!       "mime_type": "audio/mpeg", "url": "https://cdn.example/a.mp3" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use grab_core::{ATTACHMENT_ITEM_TYPE, Attachment, ContentRepository, ItemId, MediaType};
use serde::Deserialize;

use crate::error::CliError;

#[derive(Debug, Deserialize)]
struct FixtureFile {
    items: Vec<FixtureItem>,
}

/// One content item of the fixture.
#[derive(Debug, Deserialize)]
struct FixtureItem {
    id: ItemId,
    #[serde(rename = "type", default = "default_item_type")]
    item_type: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    parent: Option<ItemId>,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

fn default_item_type() -> String {
    "post".to_owned()
}

/// Content items loaded from a JSON fixture, keyed by id.
#[derive(Debug)]
pub(crate) struct FixtureSite {
    items: BTreeMap<ItemId, FixtureItem>,
}

impl FixtureSite {
    /// Load a fixture file.
    pub(crate) fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)?;
        let site = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), items = site.items.len(), "Loaded site fixture");
        Ok(site)
    }

    pub(crate) fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: FixtureFile = serde_json::from_str(json)?;
        let items = file.items.into_iter().map(|item| (item.id, item)).collect();
        Ok(Self { items })
    }

    pub(crate) fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }
}

/// MIME primary type of attachments matching a media type.
fn mime_primary(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Audio => "audio",
        MediaType::Video => "video",
        MediaType::Gallery => "image",
    }
}

impl ContentRepository for FixtureSite {
    fn content_body(&self, id: ItemId) -> Option<String> {
        self.items.get(&id).map(|item| item.body.clone())
    }

    fn item_type(&self, id: ItemId) -> Option<String> {
        self.items.get(&id).map(|item| item.item_type.clone())
    }

    fn mime_type(&self, id: ItemId) -> Option<String> {
        self.items.get(&id)?.mime_type.clone()
    }

    fn attachment_url(&self, id: ItemId) -> Option<String> {
        self.items.get(&id)?.url.clone()
    }

    fn attached_media(&self, media_type: MediaType, parent: ItemId) -> Vec<Attachment> {
        let primary = mime_primary(media_type);
        self.items
            .values()
            .filter(|item| item.item_type == ATTACHMENT_ITEM_TYPE && item.parent == Some(parent))
            .filter(|item| {
                item.mime_type
                    .as_deref()
                    .is_some_and(|mime| mime.split('/').next() == Some(primary))
            })
            .filter_map(|item| Some(Attachment::new(item.id, item.url.clone()?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"{
        "items": [
            { "id": 1, "body": "Hello" },
            { "id": 4, "type": "attachment", "parent": 1, "mime_type": "image/png", "url": "a.png" },
            { "id": 3, "type": "attachment", "parent": 1, "mime_type": "audio/mpeg", "url": "b.mp3" },
            { "id": 2, "type": "attachment", "parent": 1, "mime_type": "audio/ogg", "url": "a.ogg" },
            { "id": 5, "type": "attachment", "parent": 9, "mime_type": "audio/mpeg", "url": "c.mp3" }
        ]
    }"#;

    #[test]
    fn test_items_and_defaults() {
        let site = FixtureSite::from_json(FIXTURE).unwrap();
        assert!(site.contains(1));
        assert!(!site.contains(7));
        assert_eq!(site.content_body(1).as_deref(), Some("Hello"));
        assert_eq!(site.item_type(1).as_deref(), Some("post"));
        assert_eq!(site.mime_type(1), None);
        assert_eq!(site.attachment_url(3).as_deref(), Some("b.mp3"));
    }

    #[test]
    fn test_attached_media_filters_by_type_and_parent() {
        let site = FixtureSite::from_json(FIXTURE).unwrap();
        assert_eq!(
            site.attached_media(MediaType::Audio, 1),
            vec![Attachment::new(2, "a.ogg"), Attachment::new(3, "b.mp3")]
        );
        assert_eq!(
            site.attached_media(MediaType::Gallery, 1),
            vec![Attachment::new(4, "a.png")]
        );
        assert!(site.attached_media(MediaType::Video, 1).is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(FixtureSite::from_json(r#"{ "items": [ { "body": "x" } ] }"#).is_err());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        std::fs::write(&path, FIXTURE).unwrap();

        let site = FixtureSite::load(&path).unwrap();
        assert!(site.contains(5));
    }
}
