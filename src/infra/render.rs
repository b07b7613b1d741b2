// ============================================================
// Layer 6 — Image and Chart Rendering
// ============================================================
// Everything the CLI "shows" is written as a PNG:
//
//   samples.png        3x3 grid of training images
//   training_rate.png  loss per epoch (line chart)
//   accuracy.png       accuracy per epoch (line chart)
//   charts.png         the two charts side by side
//   inference.png      test image beside its class-probability bars
//
// Drawing is done pixel by pixel on image::RgbImage buffers.
// Charts carry no text; the matching numbers are logged.

use anyhow::{Context, Result};
use image::{imageops, Rgb, RgbImage};
use std::path::Path;

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const AXIS:       Rgb<u8> = Rgb([40, 40, 40]);
pub const GRID:       Rgb<u8> = Rgb([225, 225, 225]);
pub const LOSS:       Rgb<u8> = Rgb([214, 39, 40]);
pub const ACCURACY:   Rgb<u8> = Rgb([31, 119, 180]);
pub const BAR:        Rgb<u8> = Rgb([44, 160, 44]);

pub const MARGIN: u32 = 16;

/// Channel-major bytes (3 × side × side) to an RGB image.
pub fn item_image(pixels: &[u8], side: u32) -> RgbImage {
    let plane = (side * side) as usize;
    RgbImage::from_fn(side, side, |x, y| {
        let i = (y * side + x) as usize;
        Rgb([pixels[i], pixels[plane + i], pixels[2 * plane + i]])
    })
}

/// Nearest-neighbour upscale so 32x32 thumbnails stay crisp.
pub fn upscale(img: &RgbImage, factor: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    imageops::resize(img, w * factor, h * factor, imageops::FilterType::Nearest)
}

/// Tile equally sized images into rows of `cols`, with `pad` pixels between tiles.
pub fn sample_grid(tiles: &[RgbImage], cols: u32, pad: u32) -> RgbImage {
    let Some(first) = tiles.first() else {
        return RgbImage::from_pixel(1, 1, BACKGROUND);
    };
    let (tw, th) = first.dimensions();
    let cols     = cols.max(1).min(tiles.len() as u32);
    let rows     = (tiles.len() as u32).div_ceil(cols);

    let width  = cols * tw + (cols + 1) * pad;
    let height = rows * th + (rows + 1) * pad;
    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);

    for (i, tile) in tiles.iter().enumerate() {
        let (col, row) = (i as u32 % cols, i as u32 / cols);
        let x = pad + col * (tw + pad);
        let y = pad + row * (th + pad);
        imageops::replace(&mut canvas, tile, x as i64, y as i64);
    }
    canvas
}

/// Horizontal composition, top-aligned, `gap` pixels apart.
pub fn side_by_side(images: &[RgbImage], gap: u32) -> RgbImage {
    let width  = images.iter().map(|i| i.width()).sum::<u32>()
        + gap * images.len().saturating_sub(1) as u32;
    let height = images.iter().map(|i| i.height()).max().unwrap_or(1);
    let mut canvas = RgbImage::from_pixel(width.max(1), height, BACKGROUND);

    let mut x = 0i64;
    for img in images {
        imageops::replace(&mut canvas, img, x, 0);
        x += (img.width() + gap) as i64;
    }
    canvas
}

/// Bresenham line, clipped to the canvas.
fn draw_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x0, mut y0) = from;
    let (x1, y1)         = to;
    let dx  = (x1 - x0).abs();
    let dy  = -(y1 - y0).abs();
    let sx  = if x0 < x1 { 1 } else { -1 };
    let sy  = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x0 >= 0 && y0 >= 0 && (x0 as u32) < img.width() && (y0 as u32) < img.height() {
            img.put_pixel(x0 as u32, y0 as u32, color);
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0  += sx;
        }
        if e2 <= dx {
            err += dx;
            y0  += sy;
        }
    }
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    for y in y0..y1.min(img.height()) {
        for x in x0..x1.min(img.width()) {
            img.put_pixel(x, y, color);
        }
    }
}

/// Empty chart: background, four horizontal grid lines, left and bottom axes.
fn chart_frame(width: u32, height: u32) -> RgbImage {
    let mut img   = RgbImage::from_pixel(width, height, BACKGROUND);
    let (l, r)    = (MARGIN as i64, (width - MARGIN) as i64);
    let (t, b)    = (MARGIN as i64, (height - MARGIN) as i64);

    for k in 1..=4 {
        let y = b - (b - t) * k / 4;
        draw_line(&mut img, (l, y), (r, y), GRID);
    }
    draw_line(&mut img, (l, t), (l, b), AXIS);
    draw_line(&mut img, (l, b), (r, b), AXIS);
    img
}

/// Polyline of `values` (one point per epoch), y scaled to the series' min..max.
pub fn line_chart(values: &[f64], width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    let width  = width.max(3 * MARGIN);
    let height = height.max(3 * MARGIN);
    let mut img = chart_frame(width, height);

    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return img;
    }
    let lo   = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let hi   = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = if hi > lo { hi - lo } else { 1.0 };

    let plot_w = (width - 2 * MARGIN) as f64;
    let plot_h = (height - 2 * MARGIN) as f64;
    let steps  = values.len().saturating_sub(1).max(1) as f64;

    let points: Vec<(i64, i64)> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, v)| {
            let x = MARGIN as f64 + plot_w * i as f64 / steps;
            let y = MARGIN as f64 + plot_h * (1.0 - (v - lo) / span);
            (x.round() as i64, y.round() as i64)
        })
        .collect();

    for pair in points.windows(2) {
        draw_line(&mut img, pair[0], pair[1], color);
    }
    for &(x, y) in &points {
        for (dx, dy) in [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)] {
            draw_line(&mut img, (x + dx, y + dy), (x + dx, y + dy), color);
        }
    }
    img
}

/// One bar per value, heights on a fixed 0..=1 scale (probabilities).
pub fn bar_chart(values: &[f32], width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    let width  = width.max(3 * MARGIN);
    let height = height.max(3 * MARGIN);
    let mut img = chart_frame(width, height);
    if values.is_empty() {
        return img;
    }

    let plot_w = width - 2 * MARGIN;
    let plot_h = (height - 2 * MARGIN) as f32;
    let slot   = plot_w / values.len() as u32;
    let bar_w  = (slot * 3 / 4).max(1);
    let bottom = height - MARGIN;

    for (i, &v) in values.iter().enumerate() {
        let bar_h = (v.clamp(0.0, 1.0) * plot_h).round() as u32;
        let x0    = MARGIN + 1 + i as u32 * slot + (slot - bar_w) / 2;
        fill_rect(&mut img, x0, bottom - bar_h, x0 + bar_w, bottom, color);
    }
    img
}

pub fn save_png(img: &RgbImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create '{}'", parent.display()))?;
    }
    img.save(path)
        .with_context(|| format!("Cannot write image '{}'", path.display()))?;
    tracing::info!("Wrote '{}'", path.display());
    Ok(())
}

pub fn load_png(path: impl AsRef<Path>) -> Result<RgbImage> {
    let path = path.as_ref();
    let img  = image::open(path)
        .with_context(|| format!("Cannot read image '{}'", path.display()))?;
    Ok(img.to_rgb8())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_image_reads_planes() {
        let mut pixels = vec![0u8; 3 * 4];
        pixels[0] = 255; // red plane, pixel (0,0)
        pixels[4 + 1] = 128; // green plane, pixel (1,0)
        pixels[8 + 3] = 64; // blue plane, pixel (1,1)

        let img = item_image(&pixels, 2);
        assert_eq!(img.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(img.get_pixel(1, 0), &Rgb([0, 128, 0]));
        assert_eq!(img.get_pixel(1, 1), &Rgb([0, 0, 64]));
    }

    #[test]
    fn test_grid_dimensions() {
        let tiles: Vec<RgbImage> = (0..9).map(|_| RgbImage::new(32, 32)).collect();
        let grid = sample_grid(&tiles, 3, 4);
        assert_eq!(grid.dimensions(), (3 * 32 + 4 * 4, 3 * 32 + 4 * 4));
        // padding stays background, tiles are black
        assert_eq!(grid.get_pixel(0, 0), &BACKGROUND);
        assert_eq!(grid.get_pixel(4, 4), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_grid_with_partial_last_row() {
        let tiles: Vec<RgbImage> = (0..4).map(|_| RgbImage::new(8, 8)).collect();
        assert_eq!(sample_grid(&tiles, 3, 0).dimensions(), (24, 16));
    }

    #[test]
    fn test_upscale_factor() {
        assert_eq!(upscale(&RgbImage::new(32, 32), 4).dimensions(), (128, 128));
    }

    #[test]
    fn test_side_by_side_width() {
        let out = side_by_side(&[RgbImage::new(10, 5), RgbImage::new(20, 8)], 3);
        assert_eq!(out.dimensions(), (33, 8));
    }

    #[test]
    fn test_line_chart_draws_series() {
        let img = line_chart(&[2.3, 1.9, 1.2, 0.8], 200, 120, LOSS);
        assert_eq!(img.dimensions(), (200, 120));
        assert!(img.pixels().any(|p| *p == LOSS));
        // first point is the maximum → top-left of the plot area
        assert_eq!(img.get_pixel(MARGIN, MARGIN), &LOSS);
    }

    #[test]
    fn test_line_chart_tolerates_flat_and_empty_series() {
        assert!(line_chart(&[1.0, 1.0], 100, 80, LOSS).pixels().any(|p| *p == LOSS));
        assert!(!line_chart(&[], 100, 80, LOSS).pixels().any(|p| *p == LOSS));
    }

    #[test]
    fn test_bar_heights_follow_values() {
        let img    = bar_chart(&[1.0, 0.0], 100, 100, BAR);
        let bottom = 100 - MARGIN - 1;
        let top    = MARGIN;
        // full bar reaches the top of the plot, empty bar draws nothing
        let first_slot  = MARGIN + 1 + 17;
        let second_slot = MARGIN + 1 + 34 + 17;
        assert_eq!(img.get_pixel(first_slot, top), &BAR);
        assert_eq!(img.get_pixel(first_slot, bottom), &BAR);
        assert_ne!(img.get_pixel(second_slot, bottom), &BAR);
    }

    #[test]
    fn test_png_written_and_read_back() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chart.png");
        let img  = bar_chart(&[0.5; 10], 120, 90, BAR);

        save_png(&img, &path).unwrap();
        let back = load_png(&path).unwrap();
        assert_eq!(back.dimensions(), (120, 90));
        assert_eq!(back.get_pixel(60, 45), img.get_pixel(60, 45));
    }
}
