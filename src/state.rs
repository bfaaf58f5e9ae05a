use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::core::weights::even_split;

const MAX_CREDITS: f64 = 200.0;

/// Errors raised by structural edits on an [`AppState`].
#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("module {index} out of range 1..{len}")]
    ModuleIndex { index: usize, len: usize },
    #[error("assessment {index} out of range 1..{len}")]
    AssessmentIndex { index: usize, len: usize },
    #[error("{0} weights are assigned automatically; turn auto weights off first")]
    WeightLocked(&'static str),
}

/// Graded item type offered by the editor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AssessmentKind {
    Overall,
    Assignment,
    Coursework,
    Exam,
    Other,
}

impl AssessmentKind {
    pub fn label(self) -> &'static str {
        match self {
            AssessmentKind::Overall => "Overall",
            AssessmentKind::Assignment => "Assignment",
            AssessmentKind::Coursework => "Coursework",
            AssessmentKind::Exam => "Exam",
            AssessmentKind::Other => "Other",
        }
    }
}

impl fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One weighted, marked component of a module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Assessment {
    pub id: String,
    /// Unknown type names load as `Other`; a blank one as no type.
    #[serde(rename = "type", deserialize_with = "assessment_kind")]
    pub kind: Option<AssessmentKind>,
    pub name: String,
    /// Percent of the module, clamped into [0, 100].
    #[serde(deserialize_with = "percent")]
    pub weight: f64,
    /// Percent score, clamped into [0, 100].
    #[serde(deserialize_with = "percent")]
    pub mark: f64,
}

impl Default for Assessment {
    fn default() -> Self {
        Self::overall()
    }
}

impl Assessment {
    /// Placeholder used whenever a module would otherwise be left empty.
    pub fn overall() -> Self {
        Self::new(AssessmentKind::Overall, 100.0)
    }

    /// Assessment appended by "add assessment".
    pub fn assignment() -> Self {
        Self::new(AssessmentKind::Assignment, 0.0)
    }

    pub fn new(kind: AssessmentKind, weight: f64) -> Self {
        Self {
            id: next_id("c"),
            kind: Some(kind),
            name: kind.label().to_string(),
            weight: clamp_number(weight, 0.0, 100.0),
            mark: 0.0,
        }
    }

    /// Assessments with neither a name nor a type take no part in any mark.
    pub fn is_active(&self) -> bool {
        !self.name.is_empty() || self.kind.is_some()
    }

    /// Label shown on the card and in summaries.
    pub fn display_name(&self, position: usize) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        match self.kind {
            Some(kind) => kind.label().to_string(),
            None => format!("Assessment {}", position + 1),
        }
    }

    pub fn set_mark(&mut self, mark: f64) {
        self.mark = clamp_number(mark, 0.0, 100.0);
    }

    /// Change the type; a name that still mirrors the old type follows along.
    pub fn set_kind(&mut self, kind: AssessmentKind) {
        let mirrors_type = match self.kind {
            Some(old) => self.name == old.label(),
            None => self.name.is_empty(),
        };
        if mirrors_type {
            self.name = kind.label().to_string();
        }
        self.kind = Some(kind);
    }
}

/// Academic course unit holding an ordered list of assessments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Module {
    pub id: String,
    pub code: String,
    pub title: String,
    /// Informational only; never used for aggregation.
    #[serde(deserialize_with = "credits")]
    pub credits: f64,
    /// Percent of the semester, clamped into [0, 100].
    #[serde(deserialize_with = "percent")]
    pub weight: f64,
    pub auto_component_weights: bool,
    pub assessments: Vec<Assessment>,
}

impl Default for Module {
    fn default() -> Self {
        Self::empty()
    }
}

impl Module {
    /// Blank module appended by "add module".
    pub fn empty() -> Self {
        Self {
            id: next_id("m"),
            code: String::new(),
            title: String::new(),
            credits: 0.0,
            weight: 100.0,
            auto_component_weights: true,
            assessments: vec![Assessment::overall()],
        }
    }

    /// Whether the module takes part in the semester aggregate.
    pub fn is_counted(&self) -> bool {
        !self.code.is_empty() || !self.title.is_empty() || !self.assessments.is_empty()
    }

    pub fn assessment_mut(&mut self, index: usize) -> Result<&mut Assessment, StateError> {
        let len = self.assessments.len();
        self.assessments
            .get_mut(index)
            .ok_or(StateError::AssessmentIndex {
                index: index + 1,
                len,
            })
    }

    /// Append a new assessment and re-split weights when auto mode owns them.
    pub fn add_assessment(&mut self) -> usize {
        self.assessments.push(Assessment::assignment());
        self.reconcile();
        self.assessments.len() - 1
    }

    /// Remove an assessment, keeping at least one in place.
    pub fn remove_assessment(&mut self, index: usize) -> Result<Assessment, StateError> {
        if index >= self.assessments.len() {
            return Err(StateError::AssessmentIndex {
                index: index + 1,
                len: self.assessments.len(),
            });
        }
        let removed = self.assessments.remove(index);
        self.reconcile();
        Ok(removed)
    }

    pub fn set_auto_component_weights(&mut self, enabled: bool) {
        self.auto_component_weights = enabled;
        self.reconcile();
    }

    /// Manually set an assessment weight; rejected while auto mode is on.
    pub fn set_assessment_weight(&mut self, index: usize, weight: f64) -> Result<(), StateError> {
        if self.auto_component_weights {
            return Err(StateError::WeightLocked("assessment"));
        }
        self.assessment_mut(index)?.weight = clamp_number(weight, 0.0, 100.0);
        Ok(())
    }

    pub fn set_credits(&mut self, credits: f64) {
        self.credits = clamp_number(credits, 0.0, MAX_CREDITS);
    }

    /// Restore structural invariants after any add/remove/toggle.
    pub fn reconcile(&mut self) {
        if self.assessments.is_empty() {
            self.assessments.push(Assessment::overall());
        }
        if self.auto_component_weights {
            let weights = even_split(self.assessments.len());
            for (assessment, weight) in self.assessments.iter_mut().zip(weights) {
                assessment.weight = weight;
            }
        }
    }

    /// Sum of every stored assessment weight, as shown next to the editor.
    pub fn stored_weight_sum(&self) -> f64 {
        self.assessments.iter().map(|a| finite_or_zero(a.weight)).sum()
    }
}

/// Colors used to paint the card, stored as `#rrggbb` strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Theme {
    pub bg: String,
    pub card: String,
    pub primary: String,
    pub accent: String,
    pub text: String,
    pub muted: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: "#070A12".to_string(),
            card: "#0B1220".to_string(),
            primary: "#7C3AED".to_string(),
            accent: "#22C55E".to_string(),
            text: "#E5E7EB".to_string(),
            muted: "#A3A3A3".to_string(),
        }
    }
}

/// Background treatment of the card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardTemplate {
    Classic,
    #[default]
    Gradient,
}

/// Fixed pixel presets the card can be exported at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    LinkedinSquare,
    InstagramStory,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::LinkedinSquare => write!(f, "linkedin_square"),
            ExportFormat::InstagramStory => write!(f, "instagram_story"),
        }
    }
}

/// Everything the editor produces: personal details, modules and design.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppState {
    pub person_name: String,
    pub university: String,
    pub course: String,
    pub semester: String,
    pub year: String,
    pub headline: String,
    pub caption: String,
    pub linkedin_handle: String,
    pub show_module_marks: bool,
    pub show_assessments_in_breakdown: bool,
    pub auto_module_weights: bool,
    pub modules: Vec<Module>,
    pub theme: Theme,
    pub template: CardTemplate,
    pub format: ExportFormat,
}

impl Default for AppState {
    fn default() -> Self {
        let mut coursework = Assessment::new(AssessmentKind::Coursework, 40.0);
        coursework.name = "Coursework 1".to_string();
        let exam = Assessment::new(AssessmentKind::Exam, 60.0);
        let sample = Module {
            code: "CS301".to_string(),
            title: "Machine Learning".to_string(),
            assessments: vec![coursework, exam],
            ..Module::empty()
        };
        Self {
            person_name: "Your Name".to_string(),
            university: "Your University".to_string(),
            course: "BSc Biology".to_string(),
            semester: "Semester 1".to_string(),
            year: format!("Year 1 • {}", academic_year_label(Utc::now().date_naive())),
            headline: "My Semester Wrapped".to_string(),
            caption: "Proud of my results this semester 🎓".to_string(),
            linkedin_handle: String::new(),
            show_module_marks: true,
            show_assessments_in_breakdown: true,
            auto_module_weights: true,
            modules: vec![sample],
            theme: Theme::default(),
            template: CardTemplate::default(),
            format: ExportFormat::default(),
        }
    }
}

impl AppState {
    /// Load a wrap document and restore its structural invariants.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to open wrap file {}", path.display()))?;
        let mut state: AppState = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse wrap file {}", path.display()))?;
        state.reconcile();
        tracing::debug!(
            path = %path.display(),
            modules = state.modules.len(),
            "loaded wrap document"
        );
        Ok(state)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut json =
            serde_json::to_string_pretty(self).context("failed to serialize wrap document")?;
        json.push('\n');
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn module_mut(&mut self, index: usize) -> Result<&mut Module, StateError> {
        let len = self.modules.len();
        self.modules.get_mut(index).ok_or(StateError::ModuleIndex {
            index: index + 1,
            len,
        })
    }

    /// Append an empty module and return its zero-based index.
    pub fn add_module(&mut self) -> usize {
        self.modules.push(Module::empty());
        self.reconcile();
        self.modules.len() - 1
    }

    /// Remove a module; the list never ends up empty through this call.
    pub fn remove_module(&mut self, index: usize) -> Result<Module, StateError> {
        if index >= self.modules.len() {
            return Err(StateError::ModuleIndex {
                index: index + 1,
                len: self.modules.len(),
            });
        }
        let removed = self.modules.remove(index);
        if self.modules.is_empty() {
            self.modules.push(Module::empty());
        }
        self.reconcile();
        Ok(removed)
    }

    pub fn set_auto_module_weights(&mut self, enabled: bool) {
        self.auto_module_weights = enabled;
        self.reconcile();
    }

    /// Manually set a module weight; rejected while auto module weights are on.
    pub fn set_module_weight(&mut self, index: usize, weight: f64) -> Result<(), StateError> {
        if self.auto_module_weights {
            return Err(StateError::WeightLocked("module"));
        }
        self.module_mut(index)?.weight = clamp_number(weight, 0.0, 100.0);
        Ok(())
    }

    pub fn reset_theme(&mut self) {
        self.theme = Theme::default();
    }

    /// Re-apply the one-assessment minimum everywhere and auto module weights.
    ///
    /// Component weights are only re-split by structural edits on a module.
    pub fn reconcile(&mut self) {
        for module in &mut self.modules {
            if module.assessments.is_empty() {
                module.assessments.push(Assessment::overall());
            }
        }
        if self.auto_module_weights {
            let weights = even_split(self.modules.len());
            for (module, weight) in self.modules.iter_mut().zip(weights) {
                module.weight = weight;
            }
        }
    }
}

/// Coerce non-finite input to `min`, then clamp into `[min, max]`.
pub fn clamp_number(value: f64, min: f64, max: f64) -> f64 {
    let value = if value.is_finite() { value } else { min };
    value.clamp(min, max)
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Label such as `2025/26`; the academic year rolls over in September.
pub fn academic_year_label(today: NaiveDate) -> String {
    let start = if today.month() >= 9 {
        today.year()
    } else {
        today.year() - 1
    };
    format!("{}/{:02}", start, (start + 1).rem_euclid(100))
}

fn next_id(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let seed = Utc::now().timestamp_subsec_nanos() as u64;
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}_{:07x}", prefix, (seed ^ (n << 20)) & 0xfff_ffff)
}

fn lenient_number(value: Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(b) => {
            if b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

fn percent<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(clamp_number(lenient_number(value), 0.0, 100.0))
}

fn assessment_kind<'de, D>(deserializer: D) -> Result<Option<AssessmentKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::String(raw) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let known = [
        AssessmentKind::Overall,
        AssessmentKind::Assignment,
        AssessmentKind::Coursework,
        AssessmentKind::Exam,
        AssessmentKind::Other,
    ];
    let kind = known
        .into_iter()
        .find(|kind| kind.label().eq_ignore_ascii_case(raw))
        .unwrap_or_else(|| {
            tracing::debug!(value = raw, "unknown assessment type, using Other");
            AssessmentKind::Other
        });
    Ok(Some(kind))
}

fn credits<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(clamp_number(lenient_number(value), 0.0, MAX_CREDITS))
}
