//! Toolkit-independent annotation session.
//!
//! Every method corresponds to one input event. Mask mutations re-render the
//! composite before returning, and user-facing messages are queued as
//! [`Notice`]s for the front end to drain.

use image::imageops::{self, FilterType};
use image::{RgbImage, RgbaImage};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::compositor::{self, OverlayStyle};
use crate::error::AnnotatorError;
use crate::image_set::ImageSet;
use crate::mask::{FillMode, MaskBuffer, Point};
use crate::polygon::{ClickAction, EditorState, Modifiers, PolygonEditor, MIN_POLYGON_POINTS};
use crate::segment::{AutoSegmenter, SelectionRect};

pub const MASK_EXTENSION: &str = "png";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
    Error(String),
    Complete(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

#[derive(Clone, Copy, Debug)]
pub struct SessionSettings {
    pub scale_factor: u32,
    pub overlay: OverlayStyle,
}

/// The image/display/mask triple for the cursor position.
struct Loaded {
    native_size: (u32, u32),
    display: RgbImage,
    mask: MaskBuffer,
    composite: RgbaImage,
}

pub struct AnnotationSession {
    images: ImageSet,
    cursor: usize,
    save_dir: PathBuf,
    settings: SessionSettings,
    segmenter: AutoSegmenter,
    editor: PolygonEditor,
    selection: Option<SelectionRect>,
    current: Option<Loaded>,
    notices: VecDeque<Notice>,
    complete: bool,
    /// Bumped on every composite change so the front end can re-upload.
    revision: u64,
}

fn write_mask(current: &Loaded, save_dir: &Path, path: &Path) -> Result<(), AnnotatorError> {
    std::fs::create_dir_all(save_dir).map_err(|e| AnnotatorError::Persistence {
        path: save_dir.to_path_buf(),
        source: image::ImageError::IoError(e),
    })?;
    let (width, height) = current.native_size;
    current
        .mask
        .export_downscaled(width, height)
        .save(path)
        .map_err(|source| AnnotatorError::Persistence {
            path: path.to_path_buf(),
            source,
        })
}

pub fn mask_path(save_dir: &Path, image_name: &str) -> PathBuf {
    let stem = Path::new(image_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(image_name);
    save_dir.join(format!("{stem}.{MASK_EXTENSION}"))
}

impl AnnotationSession {
    /// Starts at the first image and loads it.
    pub fn new(
        images: ImageSet,
        save_dir: PathBuf,
        settings: SessionSettings,
        segmenter: AutoSegmenter,
    ) -> Self {
        let mut session = Self {
            images,
            cursor: 0,
            save_dir,
            settings,
            segmenter,
            editor: PolygonEditor::new(),
            selection: None,
            current: None,
            notices: VecDeque::new(),
            complete: false,
            revision: 0,
        };
        session.on_load_current();
        session
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn current_name(&self) -> &str {
        self.images.current(self.cursor)
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn composite(&self) -> Option<&RgbaImage> {
        self.current.as_ref().map(|c| &c.composite)
    }

    pub fn mask(&self) -> Option<&MaskBuffer> {
        self.current.as_ref().map(|c| &c.mask)
    }

    pub fn display_size(&self) -> Option<(u32, u32)> {
        self.current.as_ref().map(|c| c.display.dimensions())
    }

    pub fn polygon_points(&self) -> &[Point] {
        self.editor.points()
    }

    pub fn editor_state(&self) -> EditorState {
        self.editor.state()
    }

    pub fn selection(&self) -> Option<SelectionRect> {
        self.selection
    }

    pub fn title(&self) -> String {
        format!(
            "Mask Annotator - {} ({}/{})",
            self.current_name(),
            self.cursor + 1,
            self.images.len()
        )
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    fn accepts_input(&self) -> bool {
        !self.complete && self.current.is_some()
    }

    fn redraw(&mut self) {
        if let Some(current) = self.current.as_mut() {
            current.composite = compositor::render(
                &current.display,
                current.mask.as_image(),
                self.settings.overlay,
            );
        }
        self.revision += 1;
    }

    // ── Events ─────────────────────────────────────────────────────────────

    pub fn on_primary_click(&mut self, point: Point, modifiers: Modifiers) {
        if !self.accepts_input() {
            return;
        }
        match ClickAction::from_modifiers(modifiers) {
            ClickAction::Append => {
                log::debug!("polygon point {point:?}");
                self.editor.add_point(point);
            }
            ClickAction::Commit(mode) => {
                let Some(current) = self.current.as_mut() else {
                    return;
                };
                match self.editor.commit(&mut current.mask, mode) {
                    Ok(count) => {
                        log::debug!("committed {count}-point polygon as {mode:?}");
                        self.redraw();
                    }
                    Err(e) => {
                        log::warn!("{e}");
                        let verb = match mode {
                            FillMode::Set => "fill",
                            FillMode::Clear => "erase",
                        };
                        self.notices.push_back(Notice::Warning(format!(
                            "At least {MIN_POLYGON_POINTS} points needed to {verb} polygon."
                        )));
                    }
                }
            }
        }
    }

    pub fn on_secondary_click(&mut self) {
        self.editor.cancel();
    }

    pub fn on_drag_start(&mut self, point: Point) {
        if !self.accepts_input() {
            return;
        }
        self.selection = Some(SelectionRect::new(point));
    }

    pub fn on_drag(&mut self, point: Point) {
        if let Some(selection) = self.selection.as_mut() {
            selection.current = point;
        }
    }

    /// Finishes the drag and pastes whatever the segmenter finds. Any
    /// segmentation failure leaves the mask untouched and is not reported.
    pub fn on_drag_end(&mut self, point: Point) {
        let Some(mut selection) = self.selection.take() else {
            return;
        };
        selection.current = point;
        let Some(current) = self.current.as_mut() else {
            return;
        };
        let (width, height) = current.display.dimensions();
        let rect = selection.to_pixel_rect(width, height);
        match self.segmenter.segment(&current.display, rect) {
            Ok(region) => {
                current.mask.paste_region(&region.mask, region.origin);
                log::debug!("auto-segmented {rect:?}");
                self.redraw();
            }
            Err(e) => log::debug!("discarding selection {rect:?}: {e}"),
        }
    }

    /// Writes the mask at native resolution, then advances, or finishes the
    /// session on the last image. A failed write keeps the cursor in place.
    pub fn on_save(&mut self) {
        if self.complete {
            return;
        }
        let Some(current) = self.current.as_ref() else {
            return;
        };
        let path = mask_path(&self.save_dir, self.current_name());
        if let Err(e) = write_mask(current, &self.save_dir, &path) {
            log::error!("{e}");
            self.notices.push_back(Notice::Error(e.to_string()));
            return;
        }
        log::info!("saved mask {}", path.display());
        self.notices
            .push_back(Notice::Info(format!("Mask saved as: {}", path.display())));

        if self.cursor >= self.images.last_index() {
            log::info!("all {} images annotated", self.images.len());
            self.complete = true;
            self.editor.cancel();
            self.selection = None;
            self.notices
                .push_back(Notice::Complete("All images annotated.".to_string()));
            return;
        }
        self.cursor = self.images.advance(self.cursor);
        self.on_load_current();
    }

    /// Moves without saving. An unfinished polygon is dropped.
    pub fn on_navigate(&mut self, direction: Direction) {
        if self.complete {
            return;
        }
        let next = match direction {
            Direction::Previous => self.images.retreat(self.cursor),
            Direction::Next => self.images.advance(self.cursor),
        };
        if next == self.cursor {
            return;
        }
        log::info!("navigate {direction:?} to {}", self.images.current(next));
        self.cursor = next;
        self.on_load_current();
    }

    /// Replaces the image/display/mask triple with the one at the cursor.
    pub fn on_load_current(&mut self) {
        self.editor.cancel();
        self.selection = None;
        self.current = None;
        let path = self.images.path(self.cursor);
        match self.load(&path) {
            Ok(loaded) => {
                log::info!(
                    "loaded {} ({}x{})",
                    path.display(),
                    loaded.native_size.0,
                    loaded.native_size.1
                );
                self.current = Some(loaded);
            }
            Err(e) => {
                log::error!("{e}");
                self.notices.push_back(Notice::Error(e.to_string()));
            }
        }
        self.redraw();
    }

    fn load(&self, path: &Path) -> Result<Loaded, AnnotatorError> {
        let source = image::open(path)
            .map_err(|source| AnnotatorError::ImageLoad {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        let (width, height) = source.dimensions();
        let scale = self.settings.scale_factor;
        let display = if scale == 1 {
            source
        } else {
            imageops::resize(&source, width * scale, height * scale, FilterType::CatmullRom)
        };
        let mask = MaskBuffer::new(display.width(), display.height());
        let composite = compositor::render(&display, mask.as_image(), self.settings.overlay);
        Ok(Loaded {
            native_size: (width, height),
            display,
            mask,
            composite,
        })
    }
}
