//! Wrap document commands (`semwrap wrap ...`).

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use semwrap::{AppState, format_pct, semester_stats};

use crate::cli::common::{FormatArg, Switch, TemplateArg};
use crate::cli::utils::{load_wrap, parse_color, save_wrap, trim_number};

/// Available wrap subcommands.
#[derive(Subcommand, Debug)]
pub enum WrapCommand {
    /// Create a wrap document with the default sample content.
    Init(WrapInitArgs),
    /// Print the semester summary.
    Show(WrapPathArg),
    /// Edit personal details, design and visibility toggles.
    Set(WrapSetArgs),
    /// Restore the default colors.
    ResetTheme(WrapPathArg),
}

/// Args for `semwrap wrap init`.
#[derive(Args, Debug)]
pub struct WrapInitArgs {
    /// Path of the wrap document to create.
    pub wrap: PathBuf,
    /// Overwrite an existing document.
    #[arg(long)]
    pub force: bool,
}

/// Wrap document path.
#[derive(Args, Debug)]
pub struct WrapPathArg {
    /// Wrap document.
    pub wrap: PathBuf,
}

/// Args for `semwrap wrap set`.
#[derive(Args, Debug)]
pub struct WrapSetArgs {
    /// Wrap document to edit.
    pub wrap: PathBuf,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub university: Option<String>,
    #[arg(long)]
    pub course: Option<String>,
    #[arg(long)]
    pub semester: Option<String>,
    #[arg(long)]
    pub year: Option<String>,
    #[arg(long)]
    pub headline: Option<String>,
    /// Short caption printed in the card footer.
    #[arg(long)]
    pub caption: Option<String>,
    /// LinkedIn handle, with or without the leading `@`.
    #[arg(long)]
    pub handle: Option<String>,
    /// Show module and assessment marks on the card.
    #[arg(long, value_enum)]
    pub show_marks: Option<Switch>,
    /// Show assessment lines under each module.
    #[arg(long, value_enum)]
    pub show_assessments: Option<Switch>,
    #[arg(long, value_enum)]
    pub template: Option<TemplateArg>,
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
    /// Page background color.
    #[arg(long, value_parser = parse_color)]
    pub bg: Option<String>,
    /// Panel color.
    #[arg(long, value_parser = parse_color)]
    pub card: Option<String>,
    #[arg(long, value_parser = parse_color)]
    pub primary: Option<String>,
    #[arg(long, value_parser = parse_color)]
    pub accent: Option<String>,
    #[arg(long, value_parser = parse_color)]
    pub text: Option<String>,
    #[arg(long, value_parser = parse_color)]
    pub muted: Option<String>,
}

/// Execute a wrap command.
pub fn handle(command: WrapCommand) -> Result<()> {
    match command {
        WrapCommand::Init(args) => init(args),
        WrapCommand::Show(args) => show(args),
        WrapCommand::Set(args) => set(args),
        WrapCommand::ResetTheme(args) => reset_theme(args),
    }
}

fn init(args: WrapInitArgs) -> Result<()> {
    if args.wrap.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            args.wrap.display()
        );
    }
    save_wrap(&args.wrap, &AppState::default())?;
    println!("Created wrap {}", args.wrap.display());
    Ok(())
}

fn show(args: WrapPathArg) -> Result<()> {
    let state = load_wrap(&args.wrap)?;
    print!("{}", summary(&state));
    Ok(())
}

fn set(args: WrapSetArgs) -> Result<()> {
    let mut state = load_wrap(&args.wrap)?;

    let text_fields = [
        (args.name, &mut state.person_name),
        (args.university, &mut state.university),
        (args.course, &mut state.course),
        (args.semester, &mut state.semester),
        (args.year, &mut state.year),
        (args.headline, &mut state.headline),
        (args.caption, &mut state.caption),
        (args.handle, &mut state.linkedin_handle),
    ];
    for (value, slot) in text_fields {
        if let Some(value) = value {
            *slot = value;
        }
    }

    if let Some(switch) = args.show_marks {
        state.show_module_marks = switch.into();
    }
    if let Some(switch) = args.show_assessments {
        state.show_assessments_in_breakdown = switch.into();
    }
    if let Some(template) = args.template {
        state.template = template.into();
    }
    if let Some(format) = args.format {
        state.format = format.into();
    }

    let theme = &mut state.theme;
    let colors = [
        (args.bg, &mut theme.bg),
        (args.card, &mut theme.card),
        (args.primary, &mut theme.primary),
        (args.accent, &mut theme.accent),
        (args.text, &mut theme.text),
        (args.muted, &mut theme.muted),
    ];
    for (value, slot) in colors {
        if let Some(value) = value {
            *slot = value;
        }
    }

    save_wrap(&args.wrap, &state)?;
    println!("Updated {}", args.wrap.display());
    Ok(())
}

fn reset_theme(args: WrapPathArg) -> Result<()> {
    let mut state = load_wrap(&args.wrap)?;
    state.reset_theme();
    save_wrap(&args.wrap, &state)?;
    println!("Theme reset to defaults");
    Ok(())
}

/// Human-readable semester summary used by `wrap show`.
pub fn summary(state: &AppState) -> String {
    let stats = semester_stats(&state.modules);
    let mut out = String::new();
    out.push_str(&format!("{}\n", state.headline));
    out.push_str(&format!("{} - {} - {}\n", state.person_name, state.university, state.course));
    out.push_str(&format!("{} - {}\n\n", state.semester, state.year));

    if stats.is_empty() {
        out.push_str("Semester average: - (add modules to calculate)\n");
        return out;
    }
    out.push_str(&format!(
        "Semester average: {} ({})\n",
        format_pct(stats.average),
        stats.classification
    ));
    if let Some(best) = stats.best {
        out.push_str(&format!(
            "Best module: {} {} ({})\n",
            best.module.code,
            best.module.title,
            format_pct(best.mark)
        ));
    }
    out.push_str(&format!("Modules: {}\n", stats.count));
    for (rank, result) in stats.ranked.iter().enumerate() {
        let module = result.module;
        out.push_str(&format!(
            "  {:02}. #{} {:<10} {:<32} mark {:>5}  weight {:>3}%  assessments {}%{}\n",
            rank + 1,
            result.index + 1,
            module.code,
            module.title,
            format_pct(result.mark),
            module.weight.round() as i64,
            trim_number(result.assessment_weight_sum),
            if (module.stored_weight_sum() - 100.0).abs() > 0.01 {
                "  (weights do not sum to 100)"
            } else {
                ""
            }
        ));
    }
    out
}
