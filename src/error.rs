use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotatorError {
    /// Unusable setup: no images, unreadable folder, bad config file.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("at least {required} points needed, polygon has {count}")]
    InsufficientPoints { count: usize, required: usize },

    #[error("segmentation failed: {0}")]
    Segmentation(#[from] SegmentationError),

    #[error("could not write mask {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("could not load image {path:?}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl AnnotatorError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Failures of the rectangle-seeded segmentation. Always recoverable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SegmentationError {
    #[error("selection rectangle {width}x{height} has no area")]
    DegenerateRect { width: u32, height: u32 },

    #[error("selection rectangle does not fit a {image_width}x{image_height} image")]
    RectOutOfBounds { image_width: u32, image_height: u32 },

    /// The graph-cut backend rejected the input or produced an unknown label.
    #[error("grabCut: {0}")]
    Backend(String),
}
