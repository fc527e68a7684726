// Media catalog - the immutable list every view renders from
use serde::{Deserialize, Serialize};

use crate::config::MediaEntry;
use crate::view_filter::ALL;

/// Stable item identifier: position in the catalog
pub type ItemId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// One image or video of the collection
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub id: ItemId,
    pub src: String,
    pub kind: MediaKind,
    pub category: String,
    pub title: String,
    pub description: String,
    pub featured: bool,
}

impl MediaItem {
    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

/// Ordered, read-only media collection.
/// Insertion order is the default display order and the modal navigation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaCatalog {
    items: Vec<MediaItem>,
}

impl MediaCatalog {
    /// Build the catalog from config entries, skipping entries that lack a
    /// source, category or title.
    pub fn from_entries(entries: &[MediaEntry]) -> Self {
        let mut items = Vec::with_capacity(entries.len());

        for entry in entries {
            if entry.src.trim().is_empty() || entry.category.trim().is_empty() || entry.title.trim().is_empty() {
                tracing::warn!("Skipping invalid catalog entry: {:?}", entry.src);
                continue;
            }

            items.push(MediaItem {
                id: items.len(),
                src: entry.src.clone(),
                kind: entry.kind,
                category: entry.category.clone(),
                title: entry.title.clone(),
                description: entry.description.clone(),
                featured: entry.featured,
            });
        }

        tracing::info!("Loaded catalog with {} items", items.len());
        Self { items }
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&MediaItem> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items shown in the carousel, in catalog order
    pub fn featured(&self) -> Vec<&MediaItem> {
        self.items.iter().filter(|item| item.featured).collect()
    }

    /// Number of items in a category; `"all"` counts everything
    pub fn count_in(&self, tag: &str) -> usize {
        if tag == ALL {
            return self.items.len();
        }
        self.items.iter().filter(|item| item.category == tag).count()
    }

    pub fn count_kind(&self, kind: MediaKind) -> usize {
        self.items.iter().filter(|item| item.kind == kind).count()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn entry(src: &str, kind: MediaKind, category: &str, featured: bool) -> MediaEntry {
        MediaEntry {
            src: src.to_string(),
            kind,
            category: category.to_string(),
            title: format!("Title {src}"),
            description: String::new(),
            featured,
        }
    }

    /// 3 images, 2 videos; categories a, a, b, b, a
    pub(crate) fn sample_catalog() -> MediaCatalog {
        MediaCatalog::from_entries(&[
            entry("0.jpg", MediaKind::Image, "a", true),
            entry("1.jpg", MediaKind::Image, "a", false),
            entry("2.mp4", MediaKind::Video, "b", true),
            entry("3.mp4", MediaKind::Video, "b", false),
            entry("4.jpg", MediaKind::Image, "a", true),
        ])
    }

    #[test]
    fn ids_follow_insertion_order() {
        let catalog = sample_catalog();
        assert_eq!(catalog.len(), 5);
        for (position, item) in catalog.items().iter().enumerate() {
            assert_eq!(item.id, position);
        }
        assert_eq!(catalog.get(2).map(|i| i.kind), Some(MediaKind::Video));
        assert!(catalog.get(5).is_none());
    }

    #[test]
    fn invalid_entries_are_skipped_and_ids_stay_dense() {
        let mut bad = entry("", MediaKind::Image, "a", false);
        bad.title = "No source".to_string();
        let catalog = MediaCatalog::from_entries(&[
            entry("0.jpg", MediaKind::Image, "a", false),
            bad,
            entry("2.jpg", MediaKind::Image, "", false),
            entry("3.jpg", MediaKind::Image, "b", false),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).map(|i| i.src.as_str()), Some("3.jpg"));
        assert_eq!(catalog.get(1).map(|i| i.id), Some(1));
    }

    #[test]
    fn counts_and_featured_subset() {
        let catalog = sample_catalog();
        assert_eq!(catalog.count_in("all"), 5);
        assert_eq!(catalog.count_in("a"), 3);
        assert_eq!(catalog.count_in("missing"), 0);
        assert_eq!(catalog.count_kind(MediaKind::Video), 2);

        let featured: Vec<ItemId> = catalog.featured().iter().map(|i| i.id).collect();
        assert_eq!(featured, vec![0, 2, 4]);
    }

    #[test]
    fn empty_catalog_is_not_an_error() {
        let catalog = MediaCatalog::from_entries(&[]);
        assert!(catalog.is_empty());
        assert!(catalog.featured().is_empty());
    }
}
