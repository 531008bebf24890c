//! Render tree to PNG
//!
//! [`BitmapRasterizer`] draws filled rectangles and 8x8 bitmap glyphs onto an
//! RGBA canvas and encodes it as PNG. Characters missing from the font are
//! drawn as a hollow box, so any display name renders.

use super::card::{Node, RenderTree, GLYPH_CELL};
use crate::catalog::Rgb;
use font8x8::{
    UnicodeFonts, BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, GREEK_FONTS, HIRAGANA_FONTS, LATIN_FONTS,
};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

/// Default pixel density multiplier
pub const DEFAULT_SCALE: u32 = 3;

/// Default limit for either canvas side, in physical pixels
pub const DEFAULT_MAX_CANVAS_PX: u32 = 4096;

/// Drawn for characters the font does not cover
const MISSING_GLYPH: [u8; 8] = [0xFF, 0x81, 0x81, 0x81, 0x81, 0x81, 0x81, 0xFF];

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Scale must be at least 1")]
    InvalidScale,

    #[error("Canvas {width}x{height} exceeds the {max}px limit")]
    CanvasTooLarge { width: u64, height: u64, max: u32 },

    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterOptions {
    pub scale: u32,
    pub max_canvas_px: u32,
    /// Opaque fill behind everything; the tree's own background when `None`
    pub background: Option<Rgb>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            max_canvas_px: DEFAULT_MAX_CANVAS_PX,
            background: Some(Rgb::WHITE),
        }
    }
}

/// Encoded image plus its physical size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Turns a render tree into an image
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, tree: &RenderTree, options: &RasterOptions) -> Result<Bitmap, RasterError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapRasterizer;

impl Rasterizer for BitmapRasterizer {
    fn rasterize(&self, tree: &RenderTree, options: &RasterOptions) -> Result<Bitmap, RasterError> {
        if options.scale == 0 {
            return Err(RasterError::InvalidScale);
        }
        let width = u64::from(tree.width) * u64::from(options.scale);
        let height = u64::from(tree.height) * u64::from(options.scale);
        let max = u64::from(options.max_canvas_px);
        if width == 0 || height == 0 || width > max || height > max {
            return Err(RasterError::CanvasTooLarge {
                width,
                height,
                max: options.max_canvas_px,
            });
        }
        // Both sides fit in u32 after the check above
        let (width, height) = (width as u32, height as u32);

        let background = options.background.unwrap_or(tree.background);
        let mut canvas = Canvas {
            image: RgbaImage::from_pixel(width, height, rgba(background)),
            scale: options.scale,
        };

        for node in &tree.nodes {
            match node {
                Node::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => canvas.fill_logical(*x, *y, *width, *height, *color),
                Node::Text {
                    x,
                    y,
                    size,
                    color,
                    text,
                } => canvas.text(*x, *y, *size, *color, text),
            }
        }

        let mut png = Vec::new();
        canvas
            .image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(Bitmap { width, height, png })
    }
}

struct Canvas {
    image: RgbaImage,
    scale: u32,
}

impl Canvas {
    /// Fill a rectangle given in physical pixels, clipped to the canvas
    fn fill(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgb) {
        let x_end = x.saturating_add(width).min(self.image.width());
        let y_end = y.saturating_add(height).min(self.image.height());
        let pixel = rgba(color);
        for py in y..y_end {
            for px in x..x_end {
                self.image.put_pixel(px, py, pixel);
            }
        }
    }

    fn fill_logical(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgb) {
        let s = self.scale;
        self.fill(
            x.saturating_mul(s),
            y.saturating_mul(s),
            width.saturating_mul(s),
            height.saturating_mul(s),
            color,
        );
    }

    fn text(&mut self, x: u32, y: u32, size: u32, color: Rgb, text: &str) {
        // Physical pixels per glyph bit
        let dot = (size / GLYPH_CELL).max(1).saturating_mul(self.scale);
        let advance = dot.saturating_mul(GLYPH_CELL);
        let mut pen_x = x.saturating_mul(self.scale);
        let pen_y = y.saturating_mul(self.scale);

        for c in text.chars() {
            if pen_x >= self.image.width() {
                break;
            }
            let bitmap = glyph(c);
            for (row, bits) in bitmap.iter().enumerate() {
                for col in 0..GLYPH_CELL {
                    // Least significant bit is the leftmost pixel
                    if bits & (1 << col) != 0 {
                        self.fill(
                            pen_x + col * dot,
                            pen_y + row as u32 * dot,
                            dot,
                            dot,
                            color,
                        );
                    }
                }
            }
            pen_x = pen_x.saturating_add(advance);
        }
    }
}

fn glyph(c: char) -> [u8; 8] {
    if c.is_whitespace() {
        return [0; 8];
    }
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| GREEK_FONTS.get(c))
        .or_else(|| BOX_FONTS.get(c))
        .or_else(|| BLOCK_FONTS.get(c))
        .or_else(|| HIRAGANA_FONTS.get(c))
        .unwrap_or(MISSING_GLYPH)
}

fn rgba(color: Rgb) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, 0xFF])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::card;
    use crate::models::tests::test_profile;
    use crate::models::{BrainType, Declaration};

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn small_tree() -> RenderTree {
        RenderTree {
            width: 16,
            height: 8,
            background: Rgb::WHITE,
            nodes: vec![
                Node::Rect {
                    x: 0,
                    y: 0,
                    width: 8,
                    height: 8,
                    color: Rgb::INK,
                },
                Node::Text {
                    x: 8,
                    y: 0,
                    size: 8,
                    color: Rgb::INK,
                    text: "I".into(),
                },
            ],
        }
    }

    fn decode(bitmap: &Bitmap) -> RgbaImage {
        image::load_from_memory(&bitmap.png).unwrap().to_rgba8()
    }

    #[test]
    fn test_card_renders_png() {
        let decl =
            Declaration::new("Lee", test_profile(BrainType::Owl), "Practice daily").unwrap();
        let tree = card::render(&decl);
        let bitmap = BitmapRasterizer
            .rasterize(&tree, &RasterOptions::default())
            .unwrap();

        assert!(bitmap.png.starts_with(&PNG_SIGNATURE));
        assert_eq!(bitmap.width, card::CARD_WIDTH * DEFAULT_SCALE);
        assert_eq!(bitmap.height, card::CARD_HEIGHT * DEFAULT_SCALE);
    }

    #[test]
    fn test_scale_multiplies_pixels() {
        let options = RasterOptions {
            scale: 2,
            ..Default::default()
        };
        let image = decode(&BitmapRasterizer.rasterize(&small_tree(), &options).unwrap());
        assert_eq!(image.dimensions(), (32, 16));
        // Rect covers the left half
        assert_eq!(image.get_pixel(15, 15), &rgba(Rgb::INK));
        // Top-right corner is background
        assert_eq!(image.get_pixel(31, 0), &rgba(Rgb::WHITE));
    }

    #[test]
    fn test_background_is_opaque() {
        let mut tree = small_tree();
        tree.nodes.clear();
        let options = RasterOptions {
            scale: 1,
            background: None,
            ..Default::default()
        };
        let image = decode(&BitmapRasterizer.rasterize(&tree, &options).unwrap());
        assert!(image.pixels().all(|p| p.0[3] == 0xFF));
    }

    #[test]
    fn test_rejects_zero_scale() {
        let options = RasterOptions {
            scale: 0,
            ..Default::default()
        };
        let err = BitmapRasterizer.rasterize(&small_tree(), &options).unwrap_err();
        assert!(matches!(err, RasterError::InvalidScale));
    }

    #[test]
    fn test_rejects_oversized_canvas() {
        let options = RasterOptions {
            scale: 20,
            ..Default::default()
        };
        let decl =
            Declaration::new("Lee", test_profile(BrainType::Owl), "Practice daily").unwrap();
        let err = BitmapRasterizer
            .rasterize(&card::render(&decl), &options)
            .unwrap_err();
        assert!(matches!(err, RasterError::CanvasTooLarge { max: 4096, .. }));
    }

    #[test]
    fn test_missing_glyph_is_boxed() {
        assert_eq!(glyph('A'), BASIC_FONTS.get('A').unwrap());
        assert_eq!(glyph('한'), MISSING_GLYPH);
        assert_eq!(glyph(' '), [0; 8]);
    }

    #[test]
    fn test_text_is_clipped_not_panicking() {
        let tree = RenderTree {
            width: 8,
            height: 8,
            background: Rgb::WHITE,
            nodes: vec![Node::Text {
                x: 4,
                y: 4,
                size: 16,
                color: Rgb::INK,
                text: "overflowing".into(),
            }],
        };
        let options = RasterOptions {
            scale: 1,
            ..Default::default()
        };
        assert!(BitmapRasterizer.rasterize(&tree, &options).is_ok());
    }
}
