//! Caption overlay compositing.
//!
//! The image provider cannot render legible text, so panels are generated
//! text-free and the narrative is burned in here afterwards: one caption
//! strip at the bottom of each panel region. When no font is available the
//! strips are still drawn so the layout stays consistent; text rendering
//! just degrades to blank strips.

use std::io::Cursor;

use ab_glyph::PxScale;

pub use ab_glyph::FontVec;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::error::CoreError;
use crate::narrative::split_into_beats;

/// Caption strip height as a fraction of the panel height.
const CAPTION_STRIP_RATIO: u32 = 5;

/// Minimum caption strip height in pixels.
const MIN_STRIP_HEIGHT: u32 = 28;

/// Horizontal padding inside a caption strip.
const CAPTION_PADDING: u32 = 8;

/// Caption strip background.
const STRIP_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Caption text color.
const TEXT_COLOR: Rgba<u8> = Rgba([20, 20, 20, 255]);

// ---------------------------------------------------------------------------
// Panel geometry
// ---------------------------------------------------------------------------

/// One panel's region within the overall image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Compute the panel regions implied by the prompt layout hints.
///
/// - 1 panel: the full frame.
/// - 2 panels: stacked pair, top then bottom.
/// - 3 panels: three horizontal bands, top to bottom.
/// - 4 panels: 2x2 grid, left-to-right then top-to-bottom.
pub fn panel_regions(panel_count: u8, width: u32, height: u32) -> Vec<PanelRect> {
    match panel_count {
        1 => vec![PanelRect {
            x: 0,
            y: 0,
            width,
            height,
        }],
        2 => {
            let half = height / 2;
            vec![
                PanelRect {
                    x: 0,
                    y: 0,
                    width,
                    height: half,
                },
                PanelRect {
                    x: 0,
                    y: half,
                    width,
                    height: height - half,
                },
            ]
        }
        3 => {
            let third = height / 3;
            (0..3)
                .map(|i| PanelRect {
                    x: 0,
                    y: i * third,
                    width,
                    height: if i == 2 { height - 2 * third } else { third },
                })
                .collect()
        }
        _ => {
            let half_w = width / 2;
            let half_h = height / 2;
            vec![
                PanelRect {
                    x: 0,
                    y: 0,
                    width: half_w,
                    height: half_h,
                },
                PanelRect {
                    x: half_w,
                    y: 0,
                    width: width - half_w,
                    height: half_h,
                },
                PanelRect {
                    x: 0,
                    y: half_h,
                    width: half_w,
                    height: height - half_h,
                },
                PanelRect {
                    x: half_w,
                    y: half_h,
                    width: width - half_w,
                    height: height - half_h,
                },
            ]
        }
    }
}

// ---------------------------------------------------------------------------
// Text layout
// ---------------------------------------------------------------------------

/// Greedy word wrap to at most `max_chars` characters per line.
///
/// A single word longer than `max_chars` gets its own line rather than
/// being split mid-word.
pub fn wrap_caption(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Parse a TTF/OTF font from raw bytes.
pub fn font_from_bytes(bytes: Vec<u8>) -> Result<FontVec, CoreError> {
    FontVec::try_from_vec(bytes).map_err(|e| CoreError::Font(format!("Failed to parse font: {e}")))
}

/// Composite per-panel captions onto an encoded bitmap.
///
/// Decodes `image_bytes`, splits the narrative into one beat per panel,
/// draws a caption strip at the bottom of each panel region, renders the
/// wrapped beat text when a font is supplied, and re-encodes to PNG.
pub fn render_captions(
    image_bytes: &[u8],
    narrative: &str,
    panel_count: u8,
    font: Option<&FontVec>,
) -> Result<Vec<u8>, CoreError> {
    let mut img: RgbaImage = image::load_from_memory(image_bytes)?.to_rgba8();
    let (width, height) = img.dimensions();

    let regions = panel_regions(panel_count, width, height);
    let beats = split_into_beats(narrative, panel_count);

    for (region, beat) in regions.iter().zip(beats.iter()) {
        draw_panel_caption(&mut img, region, beat, font);
    }

    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img).write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}

/// Draw one panel's caption strip and text.
fn draw_panel_caption(img: &mut RgbaImage, region: &PanelRect, caption: &str, font: Option<&FontVec>) {
    let strip_height = (region.height / CAPTION_STRIP_RATIO).max(MIN_STRIP_HEIGHT);
    let strip_height = strip_height.min(region.height);
    let strip_y = region.y + region.height - strip_height;

    draw_filled_rect_mut(
        img,
        Rect::at(region.x as i32, strip_y as i32).of_size(region.width, strip_height),
        STRIP_COLOR,
    );

    let Some(font) = font else {
        return;
    };

    let font_px = (strip_height as f32 * 0.4).max(10.0);
    let scale = PxScale {
        x: font_px,
        y: font_px,
    };
    // Rough average glyph width of half the font size.
    let usable_width = region.width.saturating_sub(2 * CAPTION_PADDING);
    let max_chars = ((usable_width as f32 / (font_px * 0.5)) as usize).max(8);
    let max_lines = (strip_height.saturating_sub(CAPTION_PADDING) / font_px as u32).max(1) as usize;

    let lines = wrap_caption(caption, max_chars);
    for (i, line) in lines.iter().take(max_lines).enumerate() {
        let text_y = strip_y + CAPTION_PADDING / 2 + i as u32 * font_px as u32;
        draw_text_mut(
            img,
            TEXT_COLOR,
            (region.x + CAPTION_PADDING) as i32,
            text_y as i32,
            scale,
            font,
            line,
        );
    }
}
