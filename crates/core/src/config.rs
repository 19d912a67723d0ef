//! View configuration
//!
//! Settings can be built programmatically or loaded from a JSON file.
//! Missing fields take their default values.

use crate::canvas::{Color, DEFAULT_SPINNER_ICON_SIZE};
use crate::error::ConfigError;
use pageview_scheduler::JobPriority;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Priority of box extraction jobs
pub const PAGE_BOXES_PRIORITY: u32 = 100;

/// Priority of page image jobs
pub const PAGE_IMG_PRIORITY: u32 = 500;

/// Configuration of a page view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Draw the outline of every loaded box over the page image
    pub show_all_boxes: bool,

    /// Vertical gap between consecutive pages, in pixels
    pub page_spacing: f64,

    /// Edge of the loading spinner icon, in pixels
    pub spinner_icon_size: f64,

    /// Fill color of pages whose image is not loaded yet
    pub placeholder_color: Color,

    /// Outline color of boxes
    pub box_color: Color,

    /// Priority of page image jobs (smaller runs first)
    pub img_priority: u32,

    /// Priority of box extraction jobs (smaller runs first)
    pub boxes_priority: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            show_all_boxes: false,
            page_spacing: 10.0,
            spinner_icon_size: DEFAULT_SPINNER_ICON_SIZE,
            placeholder_color: Color::PLACEHOLDER,
            box_color: Color::BOX_OUTLINE,
            img_priority: PAGE_IMG_PRIORITY,
            boxes_priority: PAGE_BOXES_PRIORITY,
        }
    }
}

impl ViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_show_all_boxes(mut self, show: bool) -> Self {
        self.show_all_boxes = show;
        self
    }

    pub fn with_page_spacing(mut self, spacing: f64) -> Self {
        self.page_spacing = spacing;
        self
    }

    pub fn with_spinner_icon_size(mut self, size: f64) -> Self {
        self.spinner_icon_size = size;
        self
    }

    pub fn with_priorities(mut self, img: u32, boxes: u32) -> Self {
        self.img_priority = img;
        self.boxes_priority = boxes;
        self
    }

    pub fn img_priority(&self) -> JobPriority {
        JobPriority::new(self.img_priority)
    }

    pub fn boxes_priority(&self) -> JobPriority {
        JobPriority::new(self.boxes_priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ViewConfig::default();
        assert!(!config.show_all_boxes);
        assert_eq!(config.spinner_icon_size, 48.0);
        assert_eq!(config.placeholder_color, Color::rgb(0.85, 0.85, 0.85));
        // Box jobs go before image jobs
        assert!(config.boxes_priority().runs_before(config.img_priority()));
    }

    #[test]
    fn test_builder() {
        let config = ViewConfig::new()
            .with_show_all_boxes(true)
            .with_page_spacing(0.0)
            .with_spinner_icon_size(32.0)
            .with_priorities(10, 20);
        assert!(config.show_all_boxes);
        assert_eq!(config.page_spacing, 0.0);
        assert_eq!(config.spinner_icon_size, 32.0);
        assert_eq!(config.img_priority().value(), 10);
        assert_eq!(config.boxes_priority().value(), 20);
    }

    #[test]
    fn test_load_partial_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "show_all_boxes": true, "page_spacing": 4.0 }}"#).unwrap();

        let config = ViewConfig::from_json_file(file.path()).unwrap();
        assert!(config.show_all_boxes);
        assert_eq!(config.page_spacing, 4.0);
        assert_eq!(config.img_priority, PAGE_IMG_PRIORITY);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ViewConfig::from_json_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = ViewConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
