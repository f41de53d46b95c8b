//! `planview-render`: draw detection files over a floorplan image.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use image::imageops::{self, FilterType};
use planview::{RenderSession, Viewport, ViewerConfig};
use planview_raster::{PixmapSurface, load_font, load_system_font};

#[derive(Parser)]
#[command(name = "planview-render", version)]
#[command(about = "Render floorplan detection overlays to PNG")]
struct Cli {
    /// Floorplan image
    image: PathBuf,

    /// Detection JSON files, ingested in order. Put the crop manifest first;
    /// the last file is the one drawn.
    #[arg(required = true)]
    detections: Vec<PathBuf>,

    /// Output PNG
    #[arg(short, long, default_value = "overlay.png")]
    output: PathBuf,

    /// Configuration file (defaults to the user config location)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Label font (overrides the configured one)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Zoom factor; defaults to fitting the surface
    #[arg(long)]
    zoom: Option<f32>,

    /// Surface width used for fit-to-surface zoom
    #[arg(long, default_value_t = 1600)]
    surface_width: u32,

    /// Surface height used for fit-to-surface zoom
    #[arg(long, default_value_t = 1200)]
    surface_height: u32,

    #[arg(long)]
    hide_labels: bool,

    #[arg(long)]
    hide_key_points: bool,

    /// Hide a class (repeatable)
    #[arg(long = "hide-class", value_name = "NAME")]
    hide_classes: Vec<String>,

    /// Hide a dimension area index (repeatable)
    #[arg(long = "hide-dimension", value_name = "IDX")]
    hide_dimensions: Vec<i64>,

    /// Write the effective configuration back (to --config, or the user
    /// config location) so later runs start from it
    #[arg(long)]
    save_config: bool,
}

fn load_config(path: Option<&Path>) -> Result<ViewerConfig> {
    match path {
        Some(path) => ViewerConfig::load_from_path(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(ViewerConfig::load_from_default_path().unwrap_or_default()),
    }
}

fn save_config(config: &ViewerConfig, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => config
            .save_to_path(path)
            .with_context(|| format!("saving config {}", path.display())),
        None => config
            .save_to_default_path()
            .context("saving config to the user config location"),
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    if cli.save_config {
        save_config(&config, cli.config.as_deref())?;
    }

    let image = image::open(&cli.image)
        .with_context(|| format!("opening image {}", cli.image.display()))?
        .to_rgba8();

    let mut session = RenderSession::new()
        .with_style(config.style)
        .with_options(config.preferences.render_options());
    session.start_image(image.width(), image.height());

    for path in &cli.detections {
        let json = read_json(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Err(e) = session.ingest(&file_name, &json) {
            log::warn!("Skipping {}: {}", path.display(), e);
        }
    }

    if cli.hide_labels {
        session.set_show_labels(false);
    }
    if cli.hide_key_points {
        session.set_show_key_points(false);
    }
    for class in &cli.hide_classes {
        session.set_class_visible(class, false);
    }
    for &idx in &cli.hide_dimensions {
        session.set_dimension_hidden(idx, true);
    }

    let (content_w, content_h) = session
        .content_size()
        .unwrap_or((image.width(), image.height()));
    let mut viewport = Viewport::new(config.zoom);
    viewport.load_image(cli.surface_width, cli.surface_height, content_w, content_h);
    if let Some(zoom) = cli.zoom {
        viewport.set_zoom(zoom);
    }
    let zoom = viewport.zoom();
    let (scaled_w, scaled_h) = viewport.scaled_content_size();
    let width = (scaled_w.round() as u32).max(1);
    let height = (scaled_h.round() as u32).max(1);
    log::info!(
        "Rendering {}x{} at zoom {:.3} ({}%)",
        width,
        height,
        zoom,
        viewport.zoom_percentage()
    );

    let background = imageops::resize(&image, width, height, FilterType::Triangle);

    let font_path = cli.font.as_ref().or(config.preferences.font_path.as_ref());
    let font = match font_path {
        Some(path) => {
            let font =
                load_font(path).with_context(|| format!("loading font {}", path.display()))?;
            Some(font)
        }
        None => load_system_font(),
    };
    let mut surface = PixmapSurface::new(width, height)?;
    if let Some(font) = font {
        surface = surface.with_font(font);
    }

    let drawn = session.render(&mut surface, zoom);
    let output = surface.composite_over(&background)?;
    output
        .save(&cli.output)
        .with_context(|| format!("writing {}", cli.output.display()))?;

    for summary in session.class_summaries() {
        let state = if summary.visible { "" } else { " (hidden)" };
        println!("{:>6}  {}{}", summary.count, summary.name, state);
    }
    println!("{} object(s) drawn to {}", drawn, cli.output.display());
    Ok(())
}
