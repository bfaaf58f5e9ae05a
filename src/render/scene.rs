//! Fully resolved visual description of a card.
//!
//! A [`CardScene`] carries every color, string, size and position needed to
//! paint the card at its export size. Coordinates are unscaled export pixels.

use serde::{Serialize, Serializer};

use crate::caption::{HASHTAG, format_pct, normalize_handle, safe_text};
use crate::core::{ModuleResult, SemesterStats, semester_stats};
use crate::layout::{CardLayout, Visibility};
use crate::render::glyphs::{cap_height, fit_text, text_width, wrap_text};
use crate::state::{AppState, CardTemplate, Theme};

const CORNER_RADIUS: f32 = 28.0;
const ROW_RADIUS: f32 = 18.0;
const LINE_HEIGHT: f32 = 1.2;
const FOOTER_LINE_HEIGHT: f32 = 1.3;
const NAME_GAP: f32 = 12.0;
const BREAKDOWN_GAP: f32 = 10.0;
const CAPTION_LINES: usize = 2;

/// Opaque sRGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`; anything else is rejected.
    pub fn parse_hex(raw: &str) -> Option<Self> {
        let hex = raw.trim().strip_prefix('#')?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Theme colors resolved to concrete values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub card: Color,
    pub primary: Color,
    pub accent: Color,
    pub text: Color,
    pub muted: Color,
}

impl Palette {
    /// Resolve a theme; unparseable entries fall back to the default theme.
    pub fn from_theme(theme: &Theme) -> Self {
        let fallback = Theme::default();
        let pick = |slot: &str, value: &str, default: &str| {
            Color::parse_hex(value).unwrap_or_else(|| {
                tracing::warn!(slot, value, "invalid theme color, using default");
                Color::parse_hex(default).unwrap_or(Color::rgb(0, 0, 0))
            })
        };
        Self {
            bg: pick("bg", &theme.bg, &fallback.bg),
            card: pick("card", &theme.card, &fallback.card),
            primary: pick("primary", &theme.primary, &fallback.primary),
            accent: pick("accent", &theme.accent, &fallback.accent),
            text: pick("text", &theme.text, &fallback.text),
            muted: pick("muted", &theme.muted, &fallback.muted),
        }
    }
}

/// Elliptical radial glow laid over the base background color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Glow {
    pub cx: f32,
    pub cy: f32,
    pub rx: f32,
    pub ry: f32,
    pub color: Color,
    /// Opacity at the center.
    pub alpha: f32,
    /// Normalized distance at which the glow has fully faded.
    pub fade: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Background {
    Solid { color: Color },
    /// Glows are painted in order, last on top.
    Gradient { base: Color, glows: Vec<Glow> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    /// `x` is the left edge.
    Left,
    /// `x` is the right edge.
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Panel {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        fill: Color,
        fill_alpha: f32,
        border: Color,
        border_alpha: f32,
    },
    /// `y` is the top of the capitals.
    Text {
        x: f32,
        y: f32,
        size: f32,
        color: Color,
        align: Align,
        content: String,
    },
    Rule {
        x: f32,
        y: f32,
        width: f32,
        thickness: f32,
        color: Color,
        alpha: f32,
    },
}

/// Everything a [`RenderSurface`](crate::render::RenderSurface) needs to paint a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardScene {
    pub width: u32,
    pub height: u32,
    pub corner_radius: f32,
    pub background: Background,
    pub elements: Vec<Element>,
}

impl CardScene {
    /// Lay out the card for `state` at its export size.
    pub fn build(state: &AppState) -> Self {
        let dims = state.format.dims();
        let stats = semester_stats(&state.modules);
        let layout = CardLayout::compute(
            state.format,
            stats.ranked.len(),
            Visibility {
                module_marks: state.show_module_marks,
                assessments: state.show_assessments_in_breakdown,
            },
        );
        let palette = Palette::from_theme(&state.theme);
        let width = dims.width as f32;
        let height = dims.height as f32;

        let background = match state.template {
            CardTemplate::Classic => Background::Solid { color: palette.bg },
            CardTemplate::Gradient => Background::Gradient {
                base: palette.bg,
                glows: vec![
                    Glow {
                        cx: 0.35 * width,
                        cy: 0.95 * height,
                        rx: 900.0,
                        ry: 700.0,
                        color: palette.text,
                        alpha: 0.10,
                        fade: 0.60,
                    },
                    Glow {
                        cx: 0.90 * width,
                        cy: 0.10 * height,
                        rx: 1000.0,
                        ry: 700.0,
                        color: palette.accent,
                        alpha: 0.52,
                        fade: 0.55,
                    },
                    Glow {
                        cx: 0.10 * width,
                        cy: 0.0,
                        rx: 1200.0,
                        ry: 700.0,
                        color: palette.primary,
                        alpha: 0.62,
                        fade: 0.55,
                    },
                ],
            },
        };

        let mut builder = SceneBuilder {
            width,
            pad: layout.inner_pad as f32,
            gap: layout.inner_gap as f32,
            layout,
            palette,
            elements: Vec::new(),
        };
        let after_hero = builder.hero(state, &stats);
        let footer_top = builder.footer(state, height);
        builder.breakdown(&stats, after_hero, footer_top - builder.gap);

        Self {
            width: dims.width,
            height: dims.height,
            corner_radius: CORNER_RADIUS,
            background,
            elements: builder.elements,
        }
    }

    /// Text runs in paint order, handy for inspection.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|el| match el {
            Element::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }
}

fn line(size: u32) -> f32 {
    size as f32 * LINE_HEIGHT
}

/// Offset from the top of a line box to the top of its capitals.
fn lead(size: u32) -> f32 {
    (line(size) - cap_height(size as f32)) / 2.0
}

struct SceneBuilder {
    width: f32,
    pad: f32,
    gap: f32,
    layout: CardLayout,
    palette: Palette,
    elements: Vec<Element>,
}

impl SceneBuilder {
    fn content_width(&self) -> f32 {
        self.width - 2.0 * self.pad
    }

    fn right_edge(&self) -> f32 {
        self.width - self.pad
    }

    /// Place one line of text whose line box starts at `top`.
    fn text(&mut self, x: f32, top: f32, size: u32, color: Color, align: Align, content: String) {
        if content.is_empty() {
            return;
        }
        self.elements.push(Element::Text {
            x,
            y: top + lead(size),
            size: size as f32,
            color,
            align,
            content,
        });
    }

    /// Headline, identity lines and the big percentage. Returns the next free y.
    fn hero(&mut self, state: &AppState, stats: &SemesterStats<'_>) -> f32 {
        let l = self.layout;
        let p = self.palette;
        let x = self.pad;
        let width = self.content_width();
        let mut y = self.pad;

        let headline = fit_text(&safe_text(&state.headline, 42), l.headline as f32, width);
        self.text(x, y, l.headline, p.text, Align::Left, headline);
        y += line(l.headline) + NAME_GAP;

        let name = fit_text(&safe_text(&state.person_name, 34), l.name as f32, width);
        self.text(x, y, l.name, p.text, Align::Left, name);
        y += line(l.name);

        let handle = normalize_handle(&state.linkedin_handle);
        if !handle.is_empty() {
            let handle_line = fit_text(&format!("LinkedIn - {handle}"), l.handle as f32, width);
            self.text(x, y, l.handle, p.muted, Align::Left, handle_line);
            y += line(l.handle);
        }
        y += self.gap / 2.0;

        let meta = l.meta as f32;
        let university = fit_text(&safe_text(&state.university, 44), meta, width / 2.0);
        let university_width = text_width(&university, meta);
        self.text(x, y, l.meta, p.text, Align::Left, university.clone());
        let course_x = if university.is_empty() {
            x
        } else {
            x + university_width + unit_gap(meta)
        };
        let course = if university.is_empty() {
            safe_text(&state.course, 48)
        } else {
            format!("• {}", safe_text(&state.course, 48))
        };
        let course = fit_text(&course, meta, x + width - course_x);
        self.text(course_x, y, l.meta, p.muted, Align::Left, course);
        y += line(l.meta);

        let when = format!(
            "{} • {}",
            safe_text(&state.semester, 18),
            safe_text(&state.year, 16)
        );
        self.text(x, y, l.meta, p.muted, Align::Left, fit_text(&when, meta, width));
        y += line(l.meta) + self.gap;

        let (pct, cls) = if stats.is_empty() {
            ("—".to_string(), "Add modules to calculate".to_string())
        } else {
            (
                format_pct(stats.average),
                stats.classification.label().to_string(),
            )
        };
        let pct_width = text_width(&pct, l.pct as f32);
        self.text(x, y, l.pct, p.accent, Align::Left, pct);
        // Bottom-align the classification with the percentage capitals.
        let cls_x = x + pct_width + self.gap;
        let cls_top = y + lead(l.pct) + cap_height(l.pct as f32) - cap_height(l.cls as f32)
            - lead(l.cls);
        let cls = fit_text(&cls, l.cls as f32, x + width - cls_x);
        self.text(cls_x, cls_top, l.cls, p.text, Align::Left, cls);
        y += line(l.pct);

        y + BREAKDOWN_GAP + self.gap
    }

    /// Caption and hashtag pinned to the bottom. Returns the footer's top edge.
    fn footer(&mut self, state: &AppState, height: f32) -> f32 {
        let l = self.layout;
        let p = self.palette;
        let width = self.content_width();
        let footer_line = l.footer as f32 * FOOTER_LINE_HEIGHT;
        let hashtag_line = l.hashtag as f32 * FOOTER_LINE_HEIGHT;
        let hashtag_width = text_width(HASHTAG, l.hashtag as f32);

        let caption_width = (width * l.footer_max).min(width - hashtag_width - self.gap);
        let caption = safe_text(&state.caption, 84);
        let lines = if caption.trim().is_empty() {
            Vec::new()
        } else {
            wrap_text(&caption, l.footer as f32, caption_width, CAPTION_LINES)
        };

        let block = (lines.len() as f32 * footer_line).max(hashtag_line);
        let top = height - self.pad - block;

        for (i, text) in lines.into_iter().enumerate() {
            let line_top = top + i as f32 * footer_line;
            self.push_footer_line(
                line_top,
                l.footer,
                footer_line,
                p.text,
                Align::Left,
                self.pad,
                text,
            );
        }
        let hashtag_top = height - self.pad - hashtag_line;
        self.push_footer_line(
            hashtag_top,
            l.hashtag,
            hashtag_line,
            p.primary,
            Align::Right,
            self.right_edge(),
            HASHTAG.to_string(),
        );
        top
    }

    #[allow(clippy::too_many_arguments)]
    fn push_footer_line(
        &mut self,
        top: f32,
        size: u32,
        line_height: f32,
        color: Color,
        align: Align,
        x: f32,
        content: String,
    ) {
        let y = top + (line_height - cap_height(size as f32)) / 2.0;
        self.elements.push(Element::Text {
            x,
            y,
            size: size as f32,
            color,
            align,
            content,
        });
    }

    /// Section header and ranked module rows between `top` and `bottom`.
    fn breakdown(&mut self, stats: &SemesterStats<'_>, top: f32, bottom: f32) {
        let l = self.layout;
        let p = self.palette;
        let x = self.pad;
        let width = self.content_width();
        let mut y = top;

        self.text(x, y, l.section_title, p.text, Align::Left, "Module breakdown".to_string());
        let sub_top = y + lead(l.section_title) + cap_height(l.section_title as f32)
            - cap_height(l.section_sub as f32)
            - lead(l.section_sub);
        self.text(
            self.right_edge(),
            sub_top,
            l.section_sub,
            p.muted,
            Align::Right,
            "Ranked by module mark".to_string(),
        );
        y += line(l.section_title);
        self.elements.push(Element::Rule {
            x,
            y,
            width,
            thickness: 2.0,
            color: p.text,
            alpha: 0.12,
        });
        y += self.gap;

        if stats.ranked.is_empty() {
            let message = fit_text(
                "Add modules and assessments to populate your wrap.",
                l.empty as f32,
                width,
            );
            self.text(x, y, l.empty, p.muted, Align::Left, message);
            return;
        }

        let row_gap = self.gap / 2.0;
        let more_size = l.rows.code;
        for (rank, result) in stats.ranked.iter().enumerate() {
            let row_height = self.row_height(result);
            let remaining = stats.ranked.len() - rank;
            let is_last = remaining == 1;
            // Keep room for the overflow notice unless this is the final row.
            let reserve = if is_last { 0.0 } else { line(more_size) };
            if y + row_height + reserve > bottom {
                tracing::debug!(shown = rank, hidden = remaining, "module rows do not fit");
                let notice = format!("+{remaining} more modules");
                self.text(x, y, more_size, p.muted, Align::Left, notice);
                return;
            }
            self.row(rank, result, y, row_height);
            y += row_height + row_gap;
        }
    }

    fn row_height(&self, result: &ModuleResult<'_>) -> f32 {
        let r = self.layout.rows;
        let left = line(r.code) + line(r.title) + self.assessment_block_height(result);
        let right = line(r.weight) + if self.layout.show_marks { line(r.mark) } else { 0.0 };
        2.0 * r.pad_y as f32 + left.max(right)
    }

    fn assessment_block_height(&self, result: &ModuleResult<'_>) -> f32 {
        let r = self.layout.rows;
        let active = active_count(result);
        let shown = active.min(self.layout.assessment_limit);
        if shown == 0 {
            return 0.0;
        }
        let mut h = r.assessment_top as f32
            + shown as f32 * line(r.assessment)
            + (shown - 1) as f32 * r.assessment_gap as f32;
        if self.layout.hidden_assessments(active).is_some() {
            h += r.assessment_gap as f32 + line(r.assessment_more);
        }
        h
    }

    fn row(&mut self, rank: usize, result: &ModuleResult<'_>, top: f32, height: f32) {
        let l = self.layout;
        let r = l.rows;
        let p = self.palette;
        let x = self.pad;
        let width = self.content_width();
        let pad_x = r.pad_x as f32;
        let inner_top = top + r.pad_y as f32;

        self.elements.push(Element::Panel {
            x,
            y: top,
            width,
            height,
            radius: ROW_RADIUS,
            fill: p.card,
            fill_alpha: 0.55,
            border: p.text,
            border_alpha: 0.08,
        });

        self.text(x + pad_x, inner_top, r.rank, p.muted, Align::Left, format!("{:02}", rank + 1));

        let right_x = x + width - pad_x;
        let mut right_width = text_width("100%", r.weight as f32);
        if l.show_marks {
            right_width = right_width.max(text_width("100%", r.mark as f32));
        }
        let main_x = x + pad_x + text_width("00", r.rank as f32) + pad_x;
        let main_width = (right_x - right_width - pad_x - main_x).max(0.0);
        let module = result.module;

        let weight = finite_weight_label(module.weight);
        self.text(right_x, inner_top, r.weight, p.muted, Align::Right, weight);
        if l.show_marks {
            let mark = format_pct(result.mark);
            self.text(right_x, inner_top + line(r.weight), r.mark, p.accent, Align::Right, mark);
        }

        let mut y = inner_top;
        let code = if module.code.is_empty() {
            format!("Module {}", rank + 1)
        } else {
            safe_text(&module.code, 16)
        };
        let code = fit_text(&code, r.code as f32, main_width);
        self.text(main_x, y, r.code, p.primary, Align::Left, code);
        y += line(r.code);

        let title = if module.title.is_empty() {
            "Untitled module".to_string()
        } else {
            safe_text(&module.title, 44)
        };
        let title = fit_text(&title, r.title as f32, main_width);
        self.text(main_x, y, r.title, p.text, Align::Left, title);
        y += line(r.title);

        if l.assessment_limit == 0 {
            return;
        }
        let active: Vec<_> = module
            .assessments
            .iter()
            .filter(|a| a.is_active())
            .collect();
        if active.is_empty() {
            return;
        }
        y += r.assessment_top as f32;
        let size = r.assessment as f32;
        for (i, assessment) in active.iter().take(l.assessment_limit).enumerate() {
            let mut meta = finite_weight_label(assessment.weight);
            if l.show_marks {
                meta.push_str(&format!(" • {}", format_pct(Some(assessment.mark))));
            }
            let meta_width = text_width(&meta, size);
            let name_width = (main_width - meta_width - unit_gap(size)).max(0.0);
            let name = fit_text(&safe_text(&assessment.display_name(i), 24), size, name_width);
            self.text(main_x, y, r.assessment, p.text, Align::Left, name);
            let meta = meta.trim().to_string();
            self.text(main_x + main_width, y, r.assessment, p.muted, Align::Right, meta);
            y += line(r.assessment) + r.assessment_gap as f32;
        }
        if let Some(hidden) = l.hidden_assessments(active.len()) {
            let notice = format!("+{hidden} more");
            self.text(main_x, y, r.assessment_more, p.muted, Align::Left, notice);
        }
    }
}

fn active_count(result: &ModuleResult<'_>) -> usize {
    result
        .module
        .assessments
        .iter()
        .filter(|a| a.is_active())
        .count()
}

/// Rounded weight such as "40%", empty when the weight is zero.
fn finite_weight_label(weight: f64) -> String {
    if weight.is_finite() && weight != 0.0 {
        format!("{}%", weight.round() as i64)
    } else {
        String::new()
    }
}

/// Horizontal space of one blank glyph.
fn unit_gap(size: f32) -> f32 {
    text_width("  ", size) - text_width(" ", size)
}
