//! Error types for page loading and view configuration

use crate::page::PageId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a page backend while loading content
///
/// Loader jobs log these and swallow them: the page keeps showing its
/// placeholder until it scrolls out of view and back.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to decode image of page {page}: {source}")]
    Image {
        page: PageId,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to read page {page}: {source}")]
    Io {
        page: PageId,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract boxes of page {page}: {reason}")]
    Boxes { page: PageId, reason: String },

    #[error("Page {0} not found")]
    PageNotFound(PageId),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Errors raised while loading a view configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
