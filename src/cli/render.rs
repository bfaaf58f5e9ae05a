//! Rendering commands (`semwrap render ...`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Args, Subcommand};
use semwrap::export::DEFAULT_FILE_STEM;
use semwrap::{
    AppState, CardLayout, CardScene, ExportPipeline, PreviewFit, RasterSurface, Visibility,
    semester_stats,
};

use crate::cli::common::FormatArg;
use crate::cli::utils::{load_wrap, parse_preview, write_output};

/// Available render subcommands.
#[derive(Subcommand, Debug)]
pub enum RenderCommand {
    /// Export the card as a PNG at the preset size.
    Image(RenderImageArgs),
    /// Dump the resolved card scene as JSON.
    Scene(RenderSceneArgs),
    /// Print the sizing used for the current module count.
    Layout(RenderLayoutArgs),
}

/// Args for `semwrap render image`.
#[derive(Args, Debug)]
pub struct RenderImageArgs {
    /// Wrap document to render.
    pub wrap: PathBuf,
    /// Directory the PNG is written into.
    #[arg(long = "out-dir", default_value = ".")]
    pub out_dir: PathBuf,
    /// File name; cleaned up and given a `.png` extension.
    #[arg(long, default_value = DEFAULT_FILE_STEM)]
    pub name: String,
    /// Override the document's export format.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
}

/// Args for `semwrap render scene`.
#[derive(Args, Debug)]
pub struct RenderSceneArgs {
    /// Wrap document to render.
    pub wrap: PathBuf,
    /// Output file (`-` for stdout).
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: PathBuf,
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
}

/// Args for `semwrap render layout`.
#[derive(Args, Debug)]
pub struct RenderLayoutArgs {
    /// Wrap document to size.
    pub wrap: PathBuf,
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
    /// Preview box as WIDTHxHEIGHT, e.g. 900x700.
    #[arg(long, value_parser = parse_preview)]
    pub preview: Option<(f64, f64)>,
    /// Header height inside the preview box.
    #[arg(long, default_value_t = 44.0)]
    pub header: f64,
}

/// Execute a render command.
pub fn handle(command: RenderCommand) -> Result<()> {
    match command {
        RenderCommand::Image(args) => image(args),
        RenderCommand::Scene(args) => scene(args),
        RenderCommand::Layout(args) => layout(args),
    }
}

fn load_with_format(wrap: &Path, format: Option<FormatArg>) -> Result<AppState> {
    let mut state = load_wrap(wrap)?;
    if let Some(format) = format {
        state.format = format.into();
    }
    Ok(state)
}

fn image(args: RenderImageArgs) -> Result<()> {
    let state = load_with_format(&args.wrap, args.format)?;
    // Details are logged by the pipeline; the user gets one short notice.
    let path = ExportPipeline::new(RasterSurface)
        .export(&state, &args.out_dir, &args.name)
        .map_err(|_| anyhow!("Export failed. Run with -v for details."))?;
    let dims = state.format.dims();
    println!(
        "Exported {} ({}x{}, {})",
        path.display(),
        dims.width,
        dims.height,
        dims.label
    );
    Ok(())
}

fn scene(args: RenderSceneArgs) -> Result<()> {
    let state = load_with_format(&args.wrap, args.format)?;
    let scene = CardScene::build(&state);
    let mut json = serde_json::to_string_pretty(&scene).context("failed to serialize scene")?;
    json.push('\n');
    write_output(&args.output, &json)
}

fn layout(args: RenderLayoutArgs) -> Result<()> {
    let state = load_with_format(&args.wrap, args.format)?;
    let stats = semester_stats(&state.modules);
    let layout = CardLayout::compute(
        state.format,
        stats.ranked.len(),
        Visibility {
            module_marks: state.show_module_marks,
            assessments: state.show_assessments_in_breakdown,
        },
    );
    let dims = state.format.dims();

    println!("Format: {} ({}x{})", dims.label, dims.width, dims.height);
    println!("Ranked modules: {}", stats.ranked.len());
    println!(
        "Hero: headline {} / name {} / meta {} / percent {} / class {}",
        layout.headline, layout.name, layout.meta, layout.pct, layout.cls
    );
    println!(
        "Rows: code {} / title {} / weight {} / mark {} / padding {}x{}",
        layout.rows.code,
        layout.rows.title,
        layout.rows.weight,
        layout.rows.mark,
        layout.rows.pad_x,
        layout.rows.pad_y
    );
    println!(
        "Assessments per module: {}{}",
        layout.assessment_limit,
        if layout.show_marks { "" } else { " (marks hidden)" }
    );
    println!("Smallest font: {}px", layout.min_font_size());

    if let Some((width, height)) = args.preview {
        let fit = PreviewFit::fit(dims, width, height, args.header);
        println!(
            "Preview: {}x{} at {:.1}%",
            fit.width,
            fit.height,
            fit.scale * 100.0
        );
    }
    Ok(())
}
