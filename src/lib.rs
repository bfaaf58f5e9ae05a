//! Grade aggregation and card rendering for a semester "wrapped" summary.

pub mod caption;
pub mod core;
pub mod export;
pub mod layout;
pub mod logging;
pub mod render;
pub mod state;

pub use crate::caption::{caption_text, format_pct, normalize_handle, safe_text};
pub use crate::core::{
    Classification, ModuleMark, ModuleResult, SemesterStats, even_split, module_mark,
    normalize_weights, semester_stats,
};
pub use export::{ExportError, ExportPipeline, sanitize_file_name};
pub use layout::{CardLayout, ExportDims, PreviewFit, Visibility};
pub use render::{CardScene, RasterSurface, RenderSurface};
pub use state::{
    AppState, Assessment, AssessmentKind, CardTemplate, ExportFormat, Module, StateError, Theme,
};
