//! Deterministic sizing for the card at each export preset.
//!
//! Every value here is a pure function of the export format, the number of
//! ranked modules and the visibility toggles. Nothing is cached.

use serde::Serialize;

use crate::state::ExportFormat;

/// Smallest size any text or spacing value may shrink to.
pub const MIN_LEGIBLE: u32 = 10;

/// Fixed pixel dimensions of an export preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportDims {
    pub width: u32,
    pub height: u32,
    pub label: &'static str,
}

impl ExportFormat {
    /// Pixel size shared by the preview and the raster export.
    pub fn dims(self) -> ExportDims {
        match self {
            ExportFormat::LinkedinSquare => ExportDims {
                width: 1200,
                height: 1200,
                label: "LinkedIn (Square)",
            },
            ExportFormat::InstagramStory => ExportDims {
                width: 1080,
                height: 1920,
                label: "Instagram (Story)",
            },
        }
    }
}

/// Which optional parts of each breakdown row are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Visibility {
    pub module_marks: bool,
    pub assessments: bool,
}

/// Per-row sizes for the module breakdown, already scaled and floored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowSizing {
    pub pad_y: u32,
    pub pad_x: u32,
    pub rank: u32,
    pub code: u32,
    pub title: u32,
    pub weight: u32,
    pub mark: u32,
    pub assessment: u32,
    pub assessment_more: u32,
    pub assessment_top: u32,
    pub assessment_gap: u32,
}

/// Every font size and spacing value needed to paint a card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CardLayout {
    pub format: ExportFormat,
    pub inner_pad: u32,
    pub inner_gap: u32,
    pub headline: u32,
    pub name: u32,
    pub handle: u32,
    pub meta: u32,
    pub pct: u32,
    pub cls: u32,
    pub section_title: u32,
    pub section_sub: u32,
    pub empty: u32,
    pub footer: u32,
    pub hashtag: u32,
    /// Fraction of the content width the caption may use.
    pub footer_max: f32,
    pub breakdown_scale: f32,
    pub rows: RowSizing,
    /// Assessment lines drawn per module; zero when assessments are hidden.
    pub assessment_limit: usize,
    pub show_marks: bool,
}

struct Preset {
    inner_pad: u32,
    inner_gap: u32,
    headline: u32,
    name: u32,
    handle: u32,
    meta: u32,
    pct: u32,
    cls: u32,
    section_title: u32,
    section_sub: u32,
    empty: u32,
    footer: u32,
    hashtag: u32,
    footer_max: f32,
    breakdown_scale: f32,
    assessment_limit: usize,
}

const SQUARE: Preset = Preset {
    inner_pad: 54,
    inner_gap: 18,
    headline: 62,
    name: 34,
    handle: 20,
    meta: 28,
    pct: 72,
    cls: 18,
    section_title: 28,
    section_sub: 24,
    empty: 22,
    footer: 36,
    hashtag: 36,
    footer_max: 0.72,
    breakdown_scale: 1.08,
    assessment_limit: 3,
};

const STORY: Preset = Preset {
    inner_pad: 62,
    inner_gap: 22,
    headline: 76,
    name: 44,
    handle: 24,
    meta: 34,
    pct: 96,
    cls: 22,
    section_title: 36,
    section_sub: 30,
    empty: 28,
    footer: 52,
    hashtag: 52,
    footer_max: 0.70,
    breakdown_scale: 1.24,
    assessment_limit: 5,
};

/// One of the five discrete row-density tiers, before format scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Density {
    pad_y: u32,
    pad_x: u32,
    rank: u32,
    code: u32,
    title: u32,
    weight: u32,
    mark: u32,
}

#[rustfmt::skip]
fn density(module_count: usize) -> Density {
    match module_count {
        0 | 1 => Density { pad_y: 14, pad_x: 16, rank: 16, code: 26, title: 30, weight: 24, mark: 34 },
        2..=3 => Density { pad_y: 13, pad_x: 15, rank: 15, code: 24, title: 27, weight: 22, mark: 31 },
        4 => Density { pad_y: 12, pad_x: 14, rank: 14, code: 22, title: 25, weight: 21, mark: 29 },
        5..=7 => Density { pad_y: 10, pad_x: 12, rank: 12, code: 19, title: 21, weight: 17, mark: 24 },
        _ => Density { pad_y: 8, pad_x: 10, rank: 11, code: 17, title: 19, weight: 15, mark: 21 },
    }
}

impl CardLayout {
    /// Size every region of the card for `module_count` ranked rows.
    pub fn compute(format: ExportFormat, module_count: usize, visibility: Visibility) -> Self {
        let preset = match format {
            ExportFormat::LinkedinSquare => &SQUARE,
            ExportFormat::InstagramStory => &STORY,
        };
        let tier = density(module_count);
        let scaled = |n: u32| scale_floor(n, preset.breakdown_scale);

        let rows = RowSizing {
            pad_y: scaled(tier.pad_y),
            pad_x: scaled(tier.pad_x),
            rank: scaled(tier.rank),
            code: scaled(tier.code),
            title: scaled(tier.title),
            weight: scaled(tier.weight),
            mark: scaled(tier.mark),
            assessment: scaled(12),
            assessment_more: scaled(11),
            assessment_top: scaled(6),
            assessment_gap: scaled(4),
        };

        Self {
            format,
            inner_pad: preset.inner_pad,
            inner_gap: preset.inner_gap,
            headline: preset.headline.max(MIN_LEGIBLE),
            name: preset.name.max(MIN_LEGIBLE),
            handle: preset.handle.max(MIN_LEGIBLE),
            meta: preset.meta.max(MIN_LEGIBLE),
            pct: preset.pct.max(MIN_LEGIBLE),
            cls: preset.cls.max(MIN_LEGIBLE),
            section_title: preset.section_title.max(MIN_LEGIBLE),
            section_sub: preset.section_sub.max(MIN_LEGIBLE),
            empty: preset.empty.max(MIN_LEGIBLE),
            footer: preset.footer.max(MIN_LEGIBLE),
            hashtag: preset.hashtag.max(MIN_LEGIBLE),
            footer_max: preset.footer_max,
            breakdown_scale: preset.breakdown_scale,
            rows,
            assessment_limit: if visibility.assessments {
                preset.assessment_limit
            } else {
                0
            },
            show_marks: visibility.module_marks,
        }
    }

    /// Smallest font size in the bundle.
    pub fn min_font_size(&self) -> u32 {
        [
            self.headline,
            self.name,
            self.handle,
            self.meta,
            self.pct,
            self.cls,
            self.section_title,
            self.section_sub,
            self.empty,
            self.footer,
            self.hashtag,
            self.rows.rank,
            self.rows.code,
            self.rows.title,
            self.rows.weight,
            self.rows.mark,
            self.rows.assessment,
            self.rows.assessment_more,
        ]
        .into_iter()
        .min()
        .unwrap_or(MIN_LEGIBLE)
    }

    /// Number of assessments hidden behind a "+N more" line, if any.
    pub fn hidden_assessments(&self, active: usize) -> Option<usize> {
        if self.assessment_limit == 0 || active <= self.assessment_limit {
            None
        } else {
            Some(active - self.assessment_limit)
        }
    }
}

fn scale_floor(n: u32, factor: f32) -> u32 {
    ((n as f32 * factor).round() as u32).max(MIN_LEGIBLE)
}

/// Preview frame chrome around the scaled card.
const PREVIEW_PAD: f64 = 10.0;
const PREVIEW_MIN_AVAIL: f64 = 200.0;
const PREVIEW_MIN_HEADER: f64 = 44.0;

/// On-screen preview size for a card that is always painted at export size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreviewFit {
    pub scale: f64,
    pub width: u32,
    pub height: u32,
}

impl PreviewFit {
    /// Shrink (never grow) the export dimensions into a preview box.
    pub fn fit(dims: ExportDims, box_width: f64, box_height: f64, header_height: f64) -> Self {
        let header = header_height.max(PREVIEW_MIN_HEADER);
        let avail_w = (box_width - PREVIEW_PAD * 2.0).max(PREVIEW_MIN_AVAIL);
        let avail_h = (box_height - PREVIEW_PAD * 2.0 - header).max(PREVIEW_MIN_AVAIL);
        let scale = 1f64
            .min(avail_w / dims.width as f64)
            .min(avail_h / dims.height as f64);
        Self {
            scale,
            width: (dims.width as f64 * scale).round() as u32,
            height: (dims.height as f64 * scale).round() as u32,
        }
    }
}
