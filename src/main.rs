//! Command line front end for raster layers.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rastermask::{
    Annotation, ImageCompositor, MaskConfig, MaskRenderer, Raster, RasterLayerData, Viewport,
};

#[derive(Parser)]
#[command(name = "rastermask")]
#[command(about = "Inspect, render and encode raster mask layers")]
struct Cli {
    /// Configuration file (JSON). Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the masks stored in a raster layer
    Inspect {
        /// Raster layer payload (JSON)
        layer: PathBuf,

        /// Image width in pixels
        #[arg(long)]
        width: u32,
    },

    /// Draw a raster layer to a PNG file
    Render {
        /// Raster layer payload (JSON)
        layer: PathBuf,

        /// Annotation list (JSON) providing mask colours
        #[arg(long)]
        annotations: PathBuf,

        /// Image width in pixels
        #[arg(long)]
        width: u32,

        /// Output PNG file
        #[arg(long, short)]
        out: PathBuf,

        /// Scale factor applied with nearest-neighbour sampling
        #[arg(long, default_value_t = 1.0)]
        zoom: f32,

        /// Output point (x) that stays fixed while zooming
        #[arg(long, default_value_t = 0.0)]
        focus_x: f32,

        /// Output point (y) that stays fixed while zooming
        #[arg(long, default_value_t = 0.0)]
        focus_y: f32,

        /// Horizontal shift of the image in output pixels
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        pan_x: f32,

        /// Vertical shift of the image in output pixels
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        pan_y: f32,

        /// Output size as WIDTHxHEIGHT; defaults to the zoomed raster size
        #[arg(long, value_parser = parse_size)]
        canvas: Option<(u32, u32)>,

        /// Highlight segment edges, overriding the configuration
        #[arg(long)]
        edges: bool,
    },

    /// Turn a grayscale PNG labelmap into a raster layer
    Encode {
        /// Labelmap image; each gray level is a label
        png: PathBuf,

        /// Output raster layer payload (JSON)
        #[arg(long, short)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MaskConfig::load(path)
            .with_context(|| format!("failed to load config {:?}", path))?,
        None => MaskConfig::default(),
    };

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    match cli.command {
        Command::Inspect { layer, width } => inspect(&layer, width),
        Command::Render {
            layer,
            annotations,
            width,
            out,
            zoom,
            focus_x,
            focus_y,
            pan_x,
            pan_y,
            canvas,
            edges,
        } => {
            let mut settings = config.render;
            if edges {
                settings = settings.with_edge_rendering(true);
            }

            let mut viewport = Viewport::new();
            viewport.zoom_at_point(focus_x, focus_y, zoom);
            viewport.pan(pan_x, pan_y);

            let output = RenderOutput {
                path: out,
                viewport,
                canvas,
            };
            render(&layer, &annotations, width, &output, MaskRenderer::new(settings))
        }
        Command::Encode { png, out } => encode(&png, &out),
    }
}

/// Parse `WIDTHxHEIGHT`.
fn parse_size(text: &str) -> Result<(u32, u32), String> {
    let (width, height) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {:?}", text))?;
    let width = width.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let height = height.trim().parse::<u32>().map_err(|e| e.to_string())?;
    if width == 0 || height == 0 {
        return Err("canvas must not be empty".to_string());
    }
    Ok((width, height))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {:?}", path))
}

fn load_raster(path: &Path, width: u32) -> Result<Raster> {
    let layer: RasterLayerData = read_json(path)?;
    if width == 0 || layer.total_pixels % width as usize != 0 {
        bail!(
            "{} pixels cannot be split into rows of width {}",
            layer.total_pixels,
            width
        );
    }
    let height = u32::try_from(layer.total_pixels / width as usize)
        .context("raster layer is too tall")?;

    let key = path.display().to_string();
    let mut raster = Raster::new(0, key, width, height);
    raster.load_raster_layer(&layer)?;
    Ok(raster)
}

fn inspect(path: &Path, width: u32) -> Result<()> {
    let raster = load_raster(path, width)?;
    let full = raster.full_region();

    println!(
        "{}x{} raster, {} masks",
        raster.width(),
        raster.height(),
        raster.mappings().len()
    );
    for (annotation_id, label) in raster.mappings() {
        let pixels = raster.label_pixel_count(label);
        let bbox = full
            .map(|region| raster.label_bounds_within(label, region))
            .and_then(|bounds| bounds.to_bounding_box());
        match bbox {
            Some(b) => println!(
                "annotation {:>6}  label {:>3}  {:>8} px  box ({}, {}) {}x{}",
                annotation_id, label, pixels, b.x, b.y, b.w, b.h
            ),
            None => println!(
                "annotation {:>6}  label {:>3}  empty",
                annotation_id, label
            ),
        }
    }

    let unmapped: Vec<u8> = {
        let mut seen = [false; 256];
        for &value in raster.buffer() {
            seen[usize::from(value)] = true;
        }
        (1..=u8::MAX)
            .filter(|&label| seen[usize::from(label)])
            .filter(|&label| raster.get_annotation_mapping(label).is_none())
            .collect()
    };
    if !unmapped.is_empty() {
        log::warn!("Labels without an annotation: {:?}", unmapped);
    }

    Ok(())
}

struct RenderOutput {
    path: PathBuf,
    viewport: Viewport,
    /// Explicit output size; the zoomed raster size when `None`.
    canvas: Option<(u32, u32)>,
}

fn render(
    layer: &Path,
    annotations: &Path,
    width: u32,
    output: &RenderOutput,
    renderer: MaskRenderer,
) -> Result<()> {
    let mut raster = load_raster(layer, width)?;
    let annotations: Vec<Annotation> = read_json(annotations)?;

    let viewport = &output.viewport;
    let (canvas_width, canvas_height) = match output.canvas {
        Some(size) => size,
        None => {
            let target = viewport.target_rect(raster.width(), raster.height());
            (target.width.max(1), target.height.max(1))
        }
    };
    let mut compositor = ImageCompositor::new(canvas_width, canvas_height);

    renderer.render(&mut raster, &annotations, &mut compositor, viewport);

    let path = &output.path;
    compositor
        .into_canvas()
        .save(path)
        .with_context(|| format!("failed to write {:?}", path))?;
    log::info!(
        "Rendered {}x{} raster to {:?} ({}x{}) at zoom {}",
        raster.width(),
        raster.height(),
        path,
        canvas_width,
        canvas_height,
        viewport.zoom
    );
    Ok(())
}

fn encode(png: &Path, out: &Path) -> Result<()> {
    let labelmap = image::open(png)
        .with_context(|| format!("failed to open {:?}", png))?
        .to_luma8();
    let (width, height) = labelmap.dimensions();

    let mut raster = Raster::new(0, png.display().to_string(), width, height);
    raster.replace_buffer(labelmap.into_raw())?;

    // Without annotation ids at hand, each label stands for itself.
    let labels: BTreeSet<u8> = raster.buffer().iter().copied().filter(|&v| v != 0).collect();
    for &label in &labels {
        raster.set_annotation_mapping(label, u32::from(label));
    }

    let layer = raster.to_raster_layer();
    let json = serde_json::to_string(&layer)?;
    fs::write(out, json).with_context(|| format!("failed to write {:?}", out))?;

    log::info!(
        "Encoded {}x{} labelmap with {} labels into {} runs",
        width,
        height,
        labels.len(),
        layer.dense_rle.len() / 2
    );
    Ok(())
}
