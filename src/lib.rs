//! Binary mask annotation for anomaly-detection datasets.
//!
//! The session core ([`session::AnnotationSession`]) is independent of any
//! windowing toolkit; [`app`] adapts it to eframe/egui.

pub mod app;
pub mod compositor;
pub mod config;
pub mod error;
pub mod grabcut;
pub mod image_set;
pub mod mask;
pub mod polygon;
pub mod segment;
pub mod session;
