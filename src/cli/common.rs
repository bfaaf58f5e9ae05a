//! Shared clap helper types for CLI commands.

use clap::ValueEnum;
use semwrap::{AssessmentKind, CardTemplate, ExportFormat};

/// Export presets accepted by `--format`.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FormatArg {
    #[value(name = "linkedin-square", alias = "square")]
    LinkedinSquare,
    #[value(name = "instagram-story", alias = "story")]
    InstagramStory,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> ExportFormat {
        match value {
            FormatArg::LinkedinSquare => ExportFormat::LinkedinSquare,
            FormatArg::InstagramStory => ExportFormat::InstagramStory,
        }
    }
}

/// Card background treatments.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum TemplateArg {
    Classic,
    Gradient,
}

impl From<TemplateArg> for CardTemplate {
    fn from(value: TemplateArg) -> CardTemplate {
        match value {
            TemplateArg::Classic => CardTemplate::Classic,
            TemplateArg::Gradient => CardTemplate::Gradient,
        }
    }
}

/// Assessment types offered by `--kind`.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum AssessmentKindArg {
    Overall,
    Assignment,
    Coursework,
    Exam,
    Other,
}

impl From<AssessmentKindArg> for AssessmentKind {
    fn from(value: AssessmentKindArg) -> AssessmentKind {
        match value {
            AssessmentKindArg::Overall => AssessmentKind::Overall,
            AssessmentKindArg::Assignment => AssessmentKind::Assignment,
            AssessmentKindArg::Coursework => AssessmentKind::Coursework,
            AssessmentKindArg::Exam => AssessmentKind::Exam,
            AssessmentKindArg::Other => AssessmentKind::Other,
        }
    }
}

/// Two-state switch for toggles such as auto weights.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

impl From<Switch> for bool {
    fn from(value: Switch) -> bool {
        value == Switch::On
    }
}
