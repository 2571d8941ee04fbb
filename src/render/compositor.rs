//! Display surfaces the labelmap is drawn onto.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::constants::{MAX_ZOOM, MIN_ZOOM};

/// Where an image lands on the display surface, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Pan and zoom of the image on the display surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub offset_x: f32,
    pub offset_y: f32,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// Unscaled, at the surface origin.
    pub fn new() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 1.0,
        }
    }

    /// Pan by delta in surface space.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        self.offset_x += delta_x;
        self.offset_y += delta_y;
    }

    /// Multiply the zoom by `factor`; the image pixel under `anchor` stays
    /// under it.
    pub fn zoom_at_point(&mut self, anchor_x: f32, anchor_y: f32, factor: f32) {
        let zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let scale = zoom / self.zoom;

        self.offset_x = anchor_x - (anchor_x - self.offset_x) * scale;
        self.offset_y = anchor_y - (anchor_y - self.offset_y) * scale;
        self.zoom = zoom;
    }

    /// Rectangle covered by an image of the given size.
    pub fn target_rect(&self, width: u32, height: u32) -> TargetRect {
        TargetRect {
            x: self.offset_x.round() as i64,
            y: self.offset_y.round() as i64,
            width: (width as f32 * self.zoom).round().max(0.0) as u32,
            height: (height as f32 * self.zoom).round().max(0.0) as u32,
        }
    }
}

/// Part of a scaled image that lands on the surface, along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VisibleSpan {
    source_start: u32,
    source_len: u32,
    target_start: i64,
    target_len: u32,
}

/// Source pixels of an image `source_len` wide, drawn `target_len` wide at
/// `origin`, that reach `[0, surface_len)`.
///
/// Whole source pixels are kept, so the span may start or end a little
/// outside the surface.
fn visible_span(
    origin: i64,
    target_len: u32,
    source_len: u32,
    surface_len: u32,
) -> Option<VisibleSpan> {
    let start = origin.max(0);
    let end = origin
        .saturating_add(i64::from(target_len))
        .min(i64::from(surface_len));
    if start >= end {
        return None;
    }

    let target = u128::from(target_len);
    let source = u128::from(source_len);
    let rel_start = (start - origin) as u128;
    let rel_end = (end - origin) as u128;

    let source_start = rel_start * source / target;
    let source_end = (rel_end * source).div_ceil(target).min(source);
    let scaled = |s: u128| ((s * target + source / 2) / source) as i64;
    let target_start = scaled(source_start);
    let target_end = scaled(source_end);
    if target_end <= target_start {
        return None;
    }

    Some(VisibleSpan {
        source_start: source_start as u32,
        source_len: (source_end - source_start) as u32,
        target_start: origin + target_start,
        target_len: (target_end - target_start) as u32,
    })
}

/// A surface that images can be drawn onto.
pub trait Compositor {
    /// Make the whole surface transparent.
    fn clear(&mut self);

    /// Draw `image` scaled into `target`. With `nearest` every output pixel
    /// takes the colour of exactly one source pixel.
    fn draw_image(&mut self, image: &RgbaImage, target: TargetRect, nearest: bool);
}

/// A compositor backed by an in-memory RGBA image.
#[derive(Debug, Clone)]
pub struct ImageCompositor {
    canvas: RgbaImage,
}

impl ImageCompositor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbaImage::new(width, height),
        }
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_canvas(self) -> RgbaImage {
        self.canvas
    }
}

impl Compositor for ImageCompositor {
    fn clear(&mut self) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, target: TargetRect, nearest: bool) {
        if target.width == 0 || target.height == 0 || image.width() == 0 || image.height() == 0 {
            return;
        }

        let filter = if nearest {
            FilterType::Nearest
        } else {
            FilterType::Triangle
        };

        if image.dimensions() == (target.width, target.height) {
            imageops::overlay(&mut self.canvas, image, target.x, target.y);
            return;
        }

        // Only the part of the image that reaches the canvas is scaled.
        let (width, height) = self.canvas.dimensions();
        let (Some(xs), Some(ys)) = (
            visible_span(target.x, target.width, image.width(), width),
            visible_span(target.y, target.height, image.height(), height),
        ) else {
            return;
        };

        let window = imageops::crop_imm(
            image,
            xs.source_start,
            ys.source_start,
            xs.source_len,
            ys.source_len,
        )
        .to_image();
        let scaled = imageops::resize(&window, xs.target_len, ys.target_len, filter);
        imageops::overlay(&mut self.canvas, &scaled, xs.target_start, ys.target_start);
    }
}
