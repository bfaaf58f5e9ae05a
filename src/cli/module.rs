//! Module editing commands (`semwrap module ...`).

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use semwrap::{format_pct, module_mark};

use crate::cli::common::Switch;
use crate::cli::utils::{load_wrap, parse_position, save_wrap};

/// Available module subcommands.
#[derive(Subcommand, Debug)]
pub enum ModuleCommand {
    /// Append a module with a single "Overall" assessment.
    Add(ModuleAddArgs),
    /// Remove a module; the last one is replaced by an empty module.
    Remove(ModuleRemoveArgs),
    /// Edit a module's code, title, credits or weight.
    Set(ModuleSetArgs),
    /// Switch automatic semester weights on or off.
    AutoWeights(ModuleAutoWeightsArgs),
}

/// Args for `semwrap module add`.
#[derive(Args, Debug)]
pub struct ModuleAddArgs {
    /// Wrap document to edit.
    pub wrap: PathBuf,
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    /// Informational credit value (0-200).
    #[arg(long)]
    pub credits: Option<f64>,
}

/// Args for `semwrap module remove`.
#[derive(Args, Debug)]
pub struct ModuleRemoveArgs {
    /// Wrap document to edit.
    pub wrap: PathBuf,
    /// Module position, starting at 1.
    #[arg(value_parser = parse_position)]
    pub module: usize,
}

/// Args for `semwrap module set`.
#[derive(Args, Debug)]
pub struct ModuleSetArgs {
    /// Wrap document to edit.
    pub wrap: PathBuf,
    /// Module position, starting at 1.
    #[arg(value_parser = parse_position)]
    pub module: usize,
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub credits: Option<f64>,
    /// Percent of the semester; requires auto module weights to be off.
    #[arg(long)]
    pub weight: Option<f64>,
}

/// Args for `semwrap module auto-weights`.
#[derive(Args, Debug)]
pub struct ModuleAutoWeightsArgs {
    /// Wrap document to edit.
    pub wrap: PathBuf,
    #[arg(value_enum)]
    pub switch: Switch,
}

/// Execute a module command.
pub fn handle(command: ModuleCommand) -> Result<()> {
    match command {
        ModuleCommand::Add(args) => add(args),
        ModuleCommand::Remove(args) => remove(args),
        ModuleCommand::Set(args) => set(args),
        ModuleCommand::AutoWeights(args) => auto_weights(args),
    }
}

fn add(args: ModuleAddArgs) -> Result<()> {
    let mut state = load_wrap(&args.wrap)?;
    let index = state.add_module();
    let module = state.module_mut(index)?;
    if let Some(code) = args.code {
        module.code = code;
    }
    if let Some(title) = args.title {
        module.title = title;
    }
    if let Some(credits) = args.credits {
        module.set_credits(credits);
    }
    save_wrap(&args.wrap, &state)?;
    println!("Added module {}", index + 1);
    Ok(())
}

fn remove(args: ModuleRemoveArgs) -> Result<()> {
    let mut state = load_wrap(&args.wrap)?;
    let removed = state.remove_module(args.module)?;
    save_wrap(&args.wrap, &state)?;
    let label = if removed.code.is_empty() {
        format!("module {}", args.module + 1)
    } else {
        removed.code
    };
    println!("Removed {label}; {} module(s) left", state.modules.len());
    Ok(())
}

fn set(args: ModuleSetArgs) -> Result<()> {
    let mut state = load_wrap(&args.wrap)?;
    if let Some(weight) = args.weight {
        state.set_module_weight(args.module, weight)?;
    }
    let module = state.module_mut(args.module)?;
    if let Some(code) = args.code {
        module.code = code;
    }
    if let Some(title) = args.title {
        module.title = title;
    }
    if let Some(credits) = args.credits {
        module.set_credits(credits);
    }
    let mark = module_mark(&module.assessments).mark;
    save_wrap(&args.wrap, &state)?;
    println!("Module {} mark: {}", args.module + 1, format_pct(mark));
    Ok(())
}

fn auto_weights(args: ModuleAutoWeightsArgs) -> Result<()> {
    let mut state = load_wrap(&args.wrap)?;
    state.set_auto_module_weights(args.switch.into());
    save_wrap(&args.wrap, &state)?;
    let weights: Vec<String> = state
        .modules
        .iter()
        .map(|m| format!("{}%", m.weight))
        .collect();
    println!("Module weights: {}", weights.join(", "));
    Ok(())
}
