use eframe::egui;

use crate::mask::Point;
use crate::polygon::Modifiers;
use crate::session::{AnnotationSession, Direction, Notice};

const POINT_RADIUS: f32 = 3.0;
const PATH_WIDTH: f32 = 2.0;
const STATUS_BAR_HEIGHT: f32 = 24.0;

pub fn show_dialog(level: rfd::MessageLevel, title: &str, message: &str) {
    rfd::MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

/// Keys pressed this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Shortcuts {
    save: bool,
    previous: bool,
    next: bool,
    cancel: bool,
}

impl Shortcuts {
    fn read(input: &egui::InputState) -> Self {
        Self {
            save: input.key_pressed(egui::Key::Enter),
            previous: input.key_pressed(egui::Key::ArrowLeft),
            next: input.key_pressed(egui::Key::ArrowRight),
            cancel: input.key_pressed(egui::Key::Escape),
        }
    }

    fn apply(self, session: &mut AnnotationSession) {
        if self.save {
            session.on_save();
        }
        if self.previous {
            session.on_navigate(Direction::Previous);
        }
        if self.next {
            session.on_navigate(Direction::Next);
        }
        if self.cancel {
            session.on_secondary_click();
        }
    }
}

// ── App ─────────────────────────────────────────────────────────────────────

pub struct AnnotatorApp {
    session: AnnotationSession,
    texture: Option<egui::TextureHandle>,
    texture_revision: Option<u64>,
    shown_title: Option<String>,
    status: String,
}

impl AnnotatorApp {
    pub fn new(session: AnnotationSession) -> Self {
        Self {
            session,
            texture: None,
            texture_revision: None,
            shown_title: None,
            status: String::new(),
        }
    }

    /// Convert display-image coords to screen-space
    fn display_to_screen(canvas_rect: egui::Rect, p: Point) -> egui::Pos2 {
        canvas_rect.min + egui::vec2(p.x as f32, p.y as f32)
    }

    /// Convert screen-space coords to display-image coords
    fn screen_to_display(canvas_rect: egui::Rect, screen_pos: egui::Pos2) -> Point {
        let rel = screen_pos - canvas_rect.min;
        Point::new(rel.x.floor() as i32, rel.y.floor() as i32)
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture_revision == Some(self.session.revision()) {
            return;
        }
        self.texture_revision = Some(self.session.revision());
        let Some(composite) = self.session.composite() else {
            self.texture = None;
            return;
        };
        let size = [composite.width() as usize, composite.height() as usize];
        let pixels = composite.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        match self.texture.as_mut() {
            Some(texture) => texture.set(color_image, egui::TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture(
                    "composite",
                    color_image,
                    egui::TextureOptions::NEAREST,
                ))
            }
        }
    }

    fn sync_window(&mut self, ctx: &egui::Context) {
        let title = self.session.title();
        if self.shown_title.as_deref() == Some(title.as_str()) {
            return;
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
        if let Some((w, h)) = self.session.display_size() {
            ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(
                w as f32,
                h as f32 + STATUS_BAR_HEIGHT,
            )));
        }
        self.shown_title = Some(title);
    }

    fn handle_notices(&mut self, ctx: &egui::Context) {
        for notice in self.session.take_notices() {
            match notice {
                Notice::Info(message) => self.status = message,
                Notice::Warning(message) => {
                    show_dialog(rfd::MessageLevel::Warning, "Warning", &message)
                }
                Notice::Error(message) => {
                    self.status = message.clone();
                    show_dialog(rfd::MessageLevel::Error, "Error", &message);
                }
                Notice::Complete(message) => {
                    show_dialog(rfd::MessageLevel::Info, "Done", &message);
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            }
        }
    }

    fn draw_previews(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let points: Vec<egui::Pos2> = self
            .session
            .polygon_points()
            .iter()
            .map(|p| Self::display_to_screen(canvas_rect, *p))
            .collect();
        if points.len() > 1 {
            painter.add(egui::Shape::line(
                points.clone(),
                egui::Stroke::new(PATH_WIDTH, egui::Color32::WHITE),
            ));
        }
        for p in points {
            painter.circle_filled(p, POINT_RADIUS, egui::Color32::WHITE);
        }

        if let Some(selection) = self.session.selection() {
            let (min, max) = selection.corners();
            let a = Self::display_to_screen(canvas_rect, min);
            let b = Self::display_to_screen(canvas_rect, max);
            let outline = [a, egui::pos2(b.x, a.y), b, egui::pos2(a.x, b.y), a];
            painter.extend(egui::Shape::dashed_line(
                &outline,
                egui::Stroke::new(1.0, egui::Color32::RED),
                4.0,
                2.0,
            ));
        }
    }
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for AnnotatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.session.is_complete() {
            return;
        }

        // read under the input lock, act after it is released
        let shortcuts = ctx.input(Shortcuts::read);
        shortcuts.apply(&mut self.session);

        self.handle_notices(ctx);
        self.sync_window(ctx);
        self.ensure_texture(ctx);

        egui::TopBottomPanel::bottom("status")
            .exact_height(STATUS_BAR_HEIGHT)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(format!(
                        "{}/{}",
                        self.session.cursor() + 1,
                        self.session.image_count()
                    ));
                    ui.separator();
                    ui.label(self.status.as_str());
                });
            });

        // Canvas
        egui::CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| {
                egui::ScrollArea::both().show(ui, |ui| {
                    let size = self
                        .session
                        .display_size()
                        .map(|(w, h)| egui::vec2(w as f32, h as f32))
                        .unwrap_or(ui.available_size());
                    let (response, painter) =
                        ui.allocate_painter(size, egui::Sense::click_and_drag());
                    let canvas_rect = response.rect;

                    painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));
                    if let Some(ref tex) = self.texture {
                        painter.image(
                            tex.id(),
                            canvas_rect,
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            egui::Color32::WHITE,
                        );
                    }

                    let modifiers = ctx.input(|i| Modifiers {
                        fill: i.modifiers.shift,
                        erase: i.modifiers.ctrl,
                    });
                    let pointer = response
                        .interact_pointer_pos()
                        .or(ctx.input(|i| i.pointer.latest_pos()))
                        .map(|pos| Self::screen_to_display(canvas_rect, pos));

                    if response.clicked_by(egui::PointerButton::Primary) {
                        if let Some(p) = pointer {
                            self.session.on_primary_click(p, modifiers);
                        }
                    }
                    if response.clicked_by(egui::PointerButton::Secondary) {
                        self.session.on_secondary_click();
                    }

                    // middle button: press without movement is a zero-area drag
                    if response.clicked_by(egui::PointerButton::Middle) {
                        if let Some(p) = pointer {
                            self.session.on_drag_start(p);
                            self.session.on_drag_end(p);
                        }
                    }
                    if response.drag_started_by(egui::PointerButton::Middle) {
                        let origin = ctx
                            .input(|i| i.pointer.press_origin())
                            .map(|pos| Self::screen_to_display(canvas_rect, pos))
                            .or(pointer);
                        if let Some(p) = origin {
                            self.session.on_drag_start(p);
                        }
                    }
                    if response.dragged_by(egui::PointerButton::Middle) {
                        if let Some(p) = pointer {
                            self.session.on_drag(p);
                        }
                    }
                    if response.drag_stopped_by(egui::PointerButton::Middle) {
                        if let Some(p) = pointer {
                            self.session.on_drag_end(p);
                        }
                    }

                    self.draw_previews(&painter, canvas_rect);
                });
            });

        // results of this frame's edits
        self.handle_notices(ctx);
        if self.texture_revision != Some(self.session.revision()) {
            ctx.request_repaint();
        }
    }
}
