use clap::Parser;
use eframe::egui;

use mask_annotator::app::{show_dialog, AnnotatorApp};
use mask_annotator::compositor::OverlayStyle;
use mask_annotator::config::Config;
use mask_annotator::error::AnnotatorError;
use mask_annotator::grabcut::GrabCut;
use mask_annotator::image_set::ImageSet;
use mask_annotator::segment::AutoSegmenter;
use mask_annotator::session::{AnnotationSession, SessionSettings};

/// Draw binary ground-truth masks over a folder of images.
#[derive(Parser, Debug)]
#[command(name = "mask-annotator")]
struct Cli {
    /// Dataset category; selects <root>/<category>/<source> and <mask> folders
    #[arg(long)]
    category: String,
}

fn fatal(err: &AnnotatorError) -> ! {
    log::error!("{err}");
    show_dialog(rfd::MessageLevel::Error, "Error", &err.to_string());
    std::process::exit(1);
}

// ── Main ────────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let config = Config::load();
    let level = config
        .as_ref()
        .map(|c| c.log_level)
        .unwrap_or_default()
        .to_level_filter();
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
    let config = config.unwrap_or_else(|e| fatal(&e));

    let source_dir = config.source_dir(&cli.category);
    let mask_dir = config.mask_dir(&cli.category);
    let images = ImageSet::scan(&source_dir).unwrap_or_else(|e| fatal(&e));
    log::info!(
        "{} images in {}, masks go to {}",
        images.len(),
        source_dir.display(),
        mask_dir.display()
    );

    let settings = SessionSettings {
        scale_factor: config.scale_factor,
        overlay: OverlayStyle {
            color: config.overlay_color,
            alpha: config.overlay_alpha,
        },
    };
    let segmenter = AutoSegmenter::new(Box::new(GrabCut::default()), config.grabcut_iterations);
    let session = AnnotationSession::new(images, mask_dir, settings, segmenter);
    let title = session.title();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(&title),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(AnnotatorApp::new(session)))),
    ) {
        log::error!("application error: {e}");
        std::process::exit(1);
    }
}
