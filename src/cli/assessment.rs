//! Assessment editing commands (`semwrap assessment ...`).

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use semwrap::{Module, format_pct, module_mark};

use crate::cli::common::{AssessmentKindArg, Switch};
use crate::cli::utils::{load_wrap, parse_position, save_wrap, trim_number};

/// Available assessment subcommands.
#[derive(Subcommand, Debug)]
pub enum AssessmentCommand {
    /// Append an assessment to a module.
    Add(AssessmentAddArgs),
    /// Remove an assessment; a module never ends up without one.
    Remove(AssessmentRemoveArgs),
    /// Edit an assessment's type, name, weight or mark.
    Set(AssessmentSetArgs),
    /// Switch automatic component weights of a module on or off.
    AutoWeights(AssessmentAutoWeightsArgs),
}

/// Fields shared by `add` and `set`.
#[derive(Args, Debug)]
pub struct AssessmentFields {
    #[arg(long, value_enum)]
    pub kind: Option<AssessmentKindArg>,
    #[arg(long)]
    pub name: Option<String>,
    /// Percent of the module; requires auto component weights to be off.
    #[arg(long)]
    pub weight: Option<f64>,
    /// Percent score (0-100).
    #[arg(long)]
    pub mark: Option<f64>,
}

/// Args for `semwrap assessment add`.
#[derive(Args, Debug)]
pub struct AssessmentAddArgs {
    /// Wrap document to edit.
    pub wrap: PathBuf,
    /// Module position, starting at 1.
    #[arg(value_parser = parse_position)]
    pub module: usize,
    #[command(flatten)]
    pub fields: AssessmentFields,
}

/// Args for `semwrap assessment remove`.
#[derive(Args, Debug)]
pub struct AssessmentRemoveArgs {
    /// Wrap document to edit.
    pub wrap: PathBuf,
    /// Module position, starting at 1.
    #[arg(value_parser = parse_position)]
    pub module: usize,
    /// Assessment position within the module, starting at 1.
    #[arg(value_parser = parse_position)]
    pub assessment: usize,
}

/// Args for `semwrap assessment set`.
#[derive(Args, Debug)]
pub struct AssessmentSetArgs {
    /// Wrap document to edit.
    pub wrap: PathBuf,
    /// Module position, starting at 1.
    #[arg(value_parser = parse_position)]
    pub module: usize,
    /// Assessment position within the module, starting at 1.
    #[arg(value_parser = parse_position)]
    pub assessment: usize,
    #[command(flatten)]
    pub fields: AssessmentFields,
}

/// Args for `semwrap assessment auto-weights`.
#[derive(Args, Debug)]
pub struct AssessmentAutoWeightsArgs {
    /// Wrap document to edit.
    pub wrap: PathBuf,
    /// Module position, starting at 1.
    #[arg(value_parser = parse_position)]
    pub module: usize,
    #[arg(value_enum)]
    pub switch: Switch,
}

/// Execute an assessment command.
pub fn handle(command: AssessmentCommand) -> Result<()> {
    match command {
        AssessmentCommand::Add(args) => add(args),
        AssessmentCommand::Remove(args) => remove(args),
        AssessmentCommand::Set(args) => set(args),
        AssessmentCommand::AutoWeights(args) => auto_weights(args),
    }
}

fn add(args: AssessmentAddArgs) -> Result<()> {
    let mut state = load_wrap(&args.wrap)?;
    let module = state.module_mut(args.module)?;
    let index = module.add_assessment();
    apply_fields(module, index, args.fields)?;
    let report = mark_report(module);
    save_wrap(&args.wrap, &state)?;
    println!("Added assessment {} to module {}", index + 1, args.module + 1);
    println!("{report}");
    Ok(())
}

fn remove(args: AssessmentRemoveArgs) -> Result<()> {
    let mut state = load_wrap(&args.wrap)?;
    let module = state.module_mut(args.module)?;
    let removed = module.remove_assessment(args.assessment)?;
    let report = mark_report(module);
    save_wrap(&args.wrap, &state)?;
    println!(
        "Removed {} from module {}",
        removed.display_name(args.assessment),
        args.module + 1
    );
    println!("{report}");
    Ok(())
}

fn set(args: AssessmentSetArgs) -> Result<()> {
    let mut state = load_wrap(&args.wrap)?;
    let module = state.module_mut(args.module)?;
    apply_fields(module, args.assessment, args.fields)?;
    let report = mark_report(module);
    save_wrap(&args.wrap, &state)?;
    println!("{report}");
    Ok(())
}

fn auto_weights(args: AssessmentAutoWeightsArgs) -> Result<()> {
    let mut state = load_wrap(&args.wrap)?;
    let module = state.module_mut(args.module)?;
    module.set_auto_component_weights(args.switch.into());
    let report = mark_report(module);
    save_wrap(&args.wrap, &state)?;
    println!("{report}");
    Ok(())
}

fn apply_fields(module: &mut Module, index: usize, fields: AssessmentFields) -> Result<()> {
    if let Some(weight) = fields.weight {
        module.set_assessment_weight(index, weight)?;
    }
    let assessment = module.assessment_mut(index)?;
    if let Some(kind) = fields.kind {
        assessment.set_kind(kind.into());
    }
    if let Some(name) = fields.name {
        assessment.name = name;
    }
    if let Some(mark) = fields.mark {
        assessment.set_mark(mark);
    }
    Ok(())
}

/// One line per assessment followed by the module mark.
fn mark_report(module: &Module) -> String {
    let mut lines: Vec<String> = module
        .assessments
        .iter()
        .enumerate()
        .map(|(i, a)| {
            format!(
                "  {}. {} - weight {}%, mark {}",
                i + 1,
                a.display_name(i),
                trim_number(a.weight),
                format_pct(Some(a.mark))
            )
        })
        .collect();
    let summary = module_mark(&module.assessments);
    lines.push(format!(
        "Module mark: {} (weights sum to {}%)",
        format_pct(summary.mark),
        trim_number(summary.weight_sum)
    ));
    lines.join("\n")
}
