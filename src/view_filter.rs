// View derivation - category filter and shuffle over the catalog
use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::{MediaCatalog, MediaItem};

/// Tag selecting the whole catalog
pub const ALL: &str = "all";
/// Tag selecting a shuffled permutation
pub const SHUFFLE: &str = "shuffle";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    All,
    Category(String),
    Shuffled,
}

impl ViewMode {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            ALL => ViewMode::All,
            SHUFFLE => ViewMode::Shuffled,
            other => ViewMode::Category(other.to_string()),
        }
    }

    /// Tag used to look up the mode's display name
    pub fn tag(&self) -> &str {
        match self {
            ViewMode::All => ALL,
            ViewMode::Category(tag) => tag,
            ViewMode::Shuffled => SHUFFLE,
        }
    }
}

/// Snapshot of what the gallery displays.
/// Replaced as a whole on every filter or shuffle, never edited in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    mode: ViewMode,
    items: Vec<MediaItem>,
}

impl ViewState {
    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Items of one category in catalog order. `"all"` yields the full catalog.
pub fn filter_by_category(catalog: &MediaCatalog, tag: &str) -> ViewState {
    if tag == ALL {
        return ViewState {
            mode: ViewMode::All,
            items: catalog.items().to_vec(),
        };
    }

    ViewState {
        mode: ViewMode::Category(tag.to_string()),
        items: catalog
            .items()
            .iter()
            .filter(|item| item.category == tag)
            .cloned()
            .collect(),
    }
}

/// Fresh Fisher-Yates permutation of the whole catalog.
/// The only non-deterministic derivation; pass a seeded rng to reproduce it.
pub fn shuffle<R: Rng + ?Sized>(catalog: &MediaCatalog, rng: &mut R) -> ViewState {
    let mut items = catalog.items().to_vec();
    items.shuffle(rng);
    ViewState {
        mode: ViewMode::Shuffled,
        items,
    }
}

/// Derive the view for a mode
pub fn derive<R: Rng + ?Sized>(catalog: &MediaCatalog, mode: &ViewMode, rng: &mut R) -> ViewState {
    match mode {
        ViewMode::All => filter_by_category(catalog, ALL),
        ViewMode::Category(tag) => filter_by_category(catalog, tag),
        ViewMode::Shuffled => shuffle(catalog, rng),
    }
}
