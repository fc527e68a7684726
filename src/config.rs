// Gallery configuration - breakpoints, thresholds, categories and the media catalog
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::MediaKind;
use crate::error::ConfigError;
use crate::feedback::Notice;

/// Default document compiled into the binary
const BUILTIN_CONFIG: &str = include_str!("../config/gallery.json");

/// Complete gallery configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Directory media `src` values are resolved against
    pub asset_root: PathBuf,
    pub breakpoints: Breakpoints,
    pub carousel: CarouselMetrics,
    pub touch: TouchConfig,
    pub performance: PerformanceConfig,
    pub categories: Vec<CategoryInfo>,
    pub sections: Sections,
    pub messages: Messages,
    pub media_items: Vec<MediaEntry>,
}

/// Viewport widths separating device classes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    pub mobile: f32,
    pub tablet: f32,
    pub desktop: f32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            mobile: 768.0,
            tablet: 1024.0,
            desktop: 1280.0,
        }
    }
}

/// Width and trailing gap of one carousel tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileMetrics {
    pub width: f32,
    pub gap: f32,
}

impl TileMetrics {
    /// Distance between the left edges of two neighbouring tiles
    pub fn stride(&self) -> f32 {
        self.width + self.gap
    }
}

/// Carousel tile sizes per device class and autoplay pace
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselMetrics {
    pub mobile: TileMetrics,
    pub tablet: TileMetrics,
    pub desktop: TileMetrics,
    pub wide: TileMetrics,
    /// Autoplay interval; 0 turns autoplay off
    pub autoplay_ms: u64,
}

impl Default for CarouselMetrics {
    fn default() -> Self {
        Self {
            mobile: TileMetrics { width: 280.0, gap: 16.0 },
            tablet: TileMetrics { width: 320.0, gap: 16.0 },
            desktop: TileMetrics { width: 350.0, gap: 24.0 },
            wide: TileMetrics { width: 380.0, gap: 32.0 },
            autoplay_ms: 6000,
        }
    }
}

/// Touch and pointer gesture thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchConfig {
    pub min_swipe_distance: f32,
    pub max_tap_duration_ms: u64,
    pub max_tap_distance: f32,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            min_swipe_distance: 50.0,
            max_tap_duration_ms: 300,
            max_tap_distance: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Quiet window for coalescing resize and scroll bursts
    pub debounce_ms: u64,
    /// Tiles closer than this to the visible area are revealed
    pub reveal_margin: f32,
    pub reveal_fade_secs: f32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 250,
            reveal_margin: 50.0,
            reveal_fade_secs: 0.4,
        }
    }
}

/// Category tag and its display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub key: String,
    pub name: String,
}

/// Which page sections are present. A disabled section renders nothing
/// and ignores every input aimed at it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sections {
    pub gallery: bool,
    pub carousel: bool,
    pub modal: bool,
    pub video_controls: bool,
}

impl Default for Sections {
    fn default() -> Self {
        Self {
            gallery: true,
            carousel: true,
            modal: true,
            video_controls: true,
        }
    }
}

/// User-facing strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub video_error: String,
    pub image_error: String,
    pub empty_view: String,
    pub empty_featured: String,
    pub notice_playing: String,
    pub notice_paused: String,
    pub notice_completed: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            video_error: "Video no disponible".to_string(),
            image_error: "Imagen no disponible".to_string(),
            empty_view: "No se encontraron elementos".to_string(),
            empty_featured: "No hay piezas destacadas disponibles".to_string(),
            notice_playing: "Reproduciendo".to_string(),
            notice_paused: "Pausado".to_string(),
            notice_completed: "Video completado".to_string(),
        }
    }
}

impl Messages {
    pub fn notice(&self, notice: Notice) -> &str {
        match notice {
            Notice::Playing => &self.notice_playing,
            Notice::Paused => &self.notice_paused,
            Notice::Completed => &self.notice_completed,
        }
    }
}

/// Raw catalog entry as written in the config document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub src: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub featured: bool,
}

impl GalleryConfig {
    /// Load configuration.
    ///
    /// An explicit path must load. Without one, the per-user config file is
    /// used when present, otherwise the built-in document.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(path) = Self::default_path().filter(|p| p.exists()) {
            return Self::from_file(&path);
        }

        Self::builtin()
    }

    /// The configuration compiled into the binary
    pub fn builtin() -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(BUILTIN_CONFIG)?)
    }

    /// Read a config document; a relative `asset_root` is anchored at the
    /// document's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if config.asset_root.is_relative() {
            if let Some(parent) = path.parent() {
                config.asset_root = parent.join(&config.asset_root);
            }
        }

        Ok(config)
    }

    /// Per-user config file location
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "esmeraldas", "EmeraldGallery")
            .map(|dirs| dirs.config_dir().join("gallery.json"))
    }

    /// Resolve a media `src` to a filesystem path
    pub fn resolve_src(&self, src: &str) -> PathBuf {
        let path = Path::new(src);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.asset_root.join(path)
        }
    }

    /// Display name for a category tag, falling back to the tag itself
    pub fn category_name<'a>(&'a self, tag: &'a str) -> &'a str {
        self.categories
            .iter()
            .find(|c| c.key == tag)
            .map(|c| c.name.as_str())
            .unwrap_or(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_config_parses_with_catalog() {
        let config = GalleryConfig::builtin().expect("builtin config");
        assert!(!config.media_items.is_empty());
        assert_eq!(config.touch.min_swipe_distance, 50.0);
        assert_eq!(config.category_name("coleccion1"), "Colección Premium");
    }

    #[test]
    fn missing_sections_take_defaults() {
        let config: GalleryConfig = serde_json::from_str(
            r#"{ "media_items": [ { "src": "a.jpg", "type": "image", "category": "a", "title": "A" } ] }"#,
        )
        .expect("partial config");

        assert_eq!(config.breakpoints, Breakpoints::default());
        assert_eq!(config.touch.max_tap_duration_ms, 300);
        assert_eq!(config.carousel.autoplay_ms, 6000);
        assert!(config.sections.carousel);
        assert_eq!(config.messages.notice(Notice::Completed), "Video completado");
        assert_eq!(config.media_items[0].kind, MediaKind::Image);
        assert!(!config.media_items[0].featured);
    }

    #[test]
    fn relative_asset_root_is_anchored_at_config_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gallery.json");
        let mut file = std::fs::File::create(&path).expect("create");
        file.write_all(br#"{ "asset_root": "media" }"#).expect("write");

        let config = GalleryConfig::from_file(&path).expect("load");
        assert_eq!(config.asset_root, dir.path().join("media"));
        assert_eq!(
            config.resolve_src("img/gema1.jpg"),
            dir.path().join("media").join("img/gema1.jpg")
        );
    }

    #[test]
    fn explicit_path_errors_are_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            GalleryConfig::load(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").expect("write");
        assert!(matches!(
            GalleryConfig::load(Some(&broken)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn unknown_category_name_falls_back_to_tag() {
        let config = GalleryConfig::default();
        assert_eq!(config.category_name("misc"), "misc");
    }
}
