//! Grade aggregation engine: weights, module and semester marks, banding.

pub mod classification;
pub mod marks;
pub mod weights;

pub use classification::Classification;
pub use marks::{ModuleMark, ModuleResult, SemesterStats, module_mark, semester_stats};
pub use weights::{Normalized, even_split, normalize_weights};
