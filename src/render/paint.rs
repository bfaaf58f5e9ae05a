use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Pixel, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::render::glyphs::{ADVANCE, GLYPH_WIDTH, glyph_pattern, text_width, unit};
use crate::render::scene::{Align, Background, CardScene, Color, Element, Glow};

const BORDER_WIDTH: f32 = 1.0;

/// Paint `scene` at `supersample` times its size, then shrink it back.
///
/// The returned image always has the scene's exact dimensions.
pub fn paint_scene(scene: &CardScene, supersample: u32) -> RgbaImage {
    let factor = supersample.max(1);
    let s = factor as f32;
    let width = scene.width * factor;
    let height = scene.height * factor;

    let mut canvas = match &scene.background {
        Background::Solid { color } => RgbaImage::from_pixel(width, height, opaque(*color)),
        Background::Gradient { base, glows } => paint_gradient(width, height, s, *base, glows),
    };

    for element in &scene.elements {
        match element {
            Element::Panel {
                x,
                y,
                width,
                height,
                radius,
                fill,
                fill_alpha,
                border,
                border_alpha,
            } => paint_panel(
                &mut canvas,
                RoundRect {
                    x: x * s,
                    y: y * s,
                    w: width * s,
                    h: height * s,
                    r: radius * s,
                },
                (*fill, *fill_alpha),
                (*border, *border_alpha),
                BORDER_WIDTH * s,
            ),
            Element::Text {
                x,
                y,
                size,
                color,
                align,
                content,
            } => {
                let left = match align {
                    Align::Left => *x,
                    Align::Right => x - text_width(content, *size),
                };
                paint_text(&mut canvas, left * s, y * s, size * s, opaque(*color), content);
            }
            Element::Rule {
                x,
                y,
                width,
                thickness,
                color,
                alpha,
            } => blend_rect(
                &mut canvas,
                x * s,
                y * s,
                width * s,
                (thickness * s).max(1.0),
                *color,
                *alpha,
            ),
        }
    }

    clear_corners(&mut canvas, scene.corner_radius * s);

    if factor == 1 {
        canvas
    } else {
        imageops::resize(&canvas, scene.width, scene.height, FilterType::Lanczos3)
    }
}

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(image: RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

fn opaque(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, 0xff])
}

fn translucent(color: Color, alpha: f32) -> Rgba<u8> {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([color.r, color.g, color.b, a])
}

fn blend_at(canvas: &mut RgbaImage, px: u32, py: u32, color: Color, alpha: f32) {
    if alpha <= 0.0 {
        return;
    }
    canvas
        .get_pixel_mut(px, py)
        .blend(&translucent(color, alpha));
}

fn paint_gradient(width: u32, height: u32, scale: f32, base: Color, glows: &[Glow]) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, opaque(base));
    for glow in glows {
        let (cx, cy) = (glow.cx * scale, glow.cy * scale);
        let (rx, ry) = (glow.rx * scale, glow.ry * scale);
        for py in 0..height {
            let dy = (py as f32 + 0.5 - cy) / ry;
            for px in 0..width {
                let dx = (px as f32 + 0.5 - cx) / rx;
                let d = (dx * dx + dy * dy).sqrt();
                let alpha = glow.alpha * (1.0 - d / glow.fade).max(0.0);
                blend_at(&mut canvas, px, py, glow.color, alpha);
            }
        }
    }
    canvas
}

#[derive(Debug, Clone, Copy)]
struct RoundRect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    r: f32,
}

impl RoundRect {
    fn inset(self, by: f32) -> Self {
        Self {
            x: self.x + by,
            y: self.y + by,
            w: (self.w - 2.0 * by).max(0.0),
            h: (self.h - 2.0 * by).max(0.0),
            r: (self.r - by).max(0.0),
        }
    }

    fn contains(&self, px: f32, py: f32) -> bool {
        if px < self.x || py < self.y || px > self.x + self.w || py > self.y + self.h {
            return false;
        }
        let r = self.r.min(self.w / 2.0).min(self.h / 2.0);
        let nx = px.clamp(self.x + r, self.x + self.w - r);
        let ny = py.clamp(self.y + r, self.y + self.h - r);
        let (dx, dy) = (px - nx, py - ny);
        dx * dx + dy * dy <= r * r
    }
}

/// Pixel span `[start, end)` covering `from..to`, clipped to `limit`.
fn span(from: f32, to: f32, limit: u32) -> std::ops::Range<u32> {
    let start = from.floor().max(0.0) as u32;
    let end = (to.ceil().max(0.0) as u32).min(limit);
    start.min(end)..end
}

fn paint_panel(
    canvas: &mut RgbaImage,
    shape: RoundRect,
    (fill, fill_alpha): (Color, f32),
    (border, border_alpha): (Color, f32),
    border_width: f32,
) {
    let inner = shape.inset(border_width);
    for py in span(shape.y, shape.y + shape.h, canvas.height()) {
        for px in span(shape.x, shape.x + shape.w, canvas.width()) {
            let (cx, cy) = (px as f32 + 0.5, py as f32 + 0.5);
            if !shape.contains(cx, cy) {
                continue;
            }
            blend_at(canvas, px, py, fill, fill_alpha);
            if !inner.contains(cx, cy) {
                blend_at(canvas, px, py, border, border_alpha);
            }
        }
    }
}

fn blend_rect(
    canvas: &mut RgbaImage,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    color: Color,
    alpha: f32,
) {
    for py in span(y, y + height, canvas.height()) {
        for px in span(x, x + width, canvas.width()) {
            blend_at(canvas, px, py, color, alpha);
        }
    }
}

/// Draw `text` with the bitmap face; `(x, y)` is the top left of the capitals.
fn paint_text(canvas: &mut RgbaImage, x: f32, y: f32, size: f32, color: Rgba<u8>, text: &str) {
    let u = unit(size);
    let cell = u.ceil().max(1.0) as u32;
    for (i, ch) in text.chars().enumerate() {
        let origin = x + i as f32 * ADVANCE * u;
        for (row, bits) in glyph_pattern(ch).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let px = (origin + col as f32 * u).round() as i32;
                let py = (y + row as f32 * u).round() as i32;
                draw_filled_rect_mut(canvas, Rect::at(px, py).of_size(cell, cell), color);
            }
        }
    }
}

/// Make every pixel outside the rounded card outline fully transparent.
fn clear_corners(canvas: &mut RgbaImage, radius: f32) {
    let (w, h) = canvas.dimensions();
    let outline = RoundRect {
        x: 0.0,
        y: 0.0,
        w: w as f32,
        h: h as f32,
        r: radius,
    };
    let reach = (radius.ceil() as u32).min(w).min(h);
    let xs = (0..reach).chain(w.saturating_sub(reach).max(reach)..w);
    for px in xs {
        let ys = (0..reach).chain(h.saturating_sub(reach).max(reach)..h);
        for py in ys {
            if !outline.contains(px as f32 + 0.5, py as f32 + 0.5) {
                canvas.put_pixel(px, py, Rgba([0, 0, 0, 0]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    const NAVY: Color = Color::rgb(0x0b, 0x12, 0x20);

    fn blank(width: u32, height: u32) -> CardScene {
        CardScene {
            width,
            height,
            corner_radius: 8.0,
            background: Background::Solid { color: NAVY },
            elements: Vec::new(),
        }
    }

    #[test]
    fn output_matches_scene_size_at_any_factor() {
        let scene = blank(60, 40);
        for factor in [1, 2, 3] {
            assert_eq!(paint_scene(&scene, factor).dimensions(), (60, 40));
        }
    }

    #[test]
    fn corners_are_transparent() {
        let image = paint_scene(&blank(60, 40), 1);
        assert_eq!(image.get_pixel(0, 0)[3], 0);
        assert_eq!(image.get_pixel(59, 39)[3], 0);
        assert_eq!(image.get_pixel(30, 20), &Rgba([0x0b, 0x12, 0x20, 0xff]));
    }

    #[test]
    fn text_is_drawn_in_its_color() {
        let mut scene = blank(40, 30);
        scene.corner_radius = 0.0;
        scene.elements.push(Element::Text {
            x: 5.0,
            y: 5.0,
            size: 18.0,
            color: WHITE,
            align: Align::Left,
            content: "I".to_string(),
        });
        let image = paint_scene(&scene, 1);
        // 'I' has a full-width top bar starting one unit in.
        assert_eq!(image.get_pixel(8, 5), &Rgba([0xff, 0xff, 0xff, 0xff]));
        assert_eq!(image.get_pixel(30, 25), &Rgba([0x0b, 0x12, 0x20, 0xff]));
    }

    #[test]
    fn right_aligned_text_ends_at_anchor() {
        let mut scene = blank(60, 20);
        scene.corner_radius = 0.0;
        scene.elements.push(Element::Text {
            x: 50.0,
            y: 2.0,
            size: 9.0,
            color: WHITE,
            align: Align::Right,
            content: "-".to_string(),
        });
        let image = paint_scene(&scene, 1);
        // A dash spans the full glyph width on its fourth row.
        assert_eq!(image.get_pixel(49, 5)[0], 0xff);
        assert_eq!(image.get_pixel(51, 5)[0], 0x0b);
    }

    #[test]
    fn translucent_rule_blends_with_background() {
        let mut scene = blank(20, 20);
        scene.corner_radius = 0.0;
        scene.elements.push(Element::Rule {
            x: 0.0,
            y: 10.0,
            width: 20.0,
            thickness: 2.0,
            color: WHITE,
            alpha: 0.5,
        });
        let image = paint_scene(&scene, 1);
        let px = image.get_pixel(10, 10);
        assert!(px[0] > 0x0b && px[0] < 0xff);
        assert_eq!(px[3], 0xff);
    }

    #[test]
    fn gradient_glow_is_strongest_at_center() {
        let mut scene = blank(100, 100);
        scene.corner_radius = 0.0;
        scene.background = Background::Gradient {
            base: NAVY,
            glows: vec![Glow {
                cx: 50.0,
                cy: 50.0,
                rx: 50.0,
                ry: 50.0,
                color: WHITE,
                alpha: 0.6,
                fade: 0.5,
            }],
        };
        let image = paint_scene(&scene, 1);
        let center = image.get_pixel(50, 50)[0];
        let edge = image.get_pixel(99, 50)[0];
        assert!(center > edge);
        assert_eq!(edge, 0x0b);
    }

    #[test]
    fn png_bytes_decode_back() {
        let bytes = encode_png(paint_scene(&blank(30, 20), 2)).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (30, 20));
    }
}
