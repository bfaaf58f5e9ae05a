//! Caption command (`semwrap caption`).

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use semwrap::{caption_text, semester_stats};

use crate::cli::utils::{load_wrap, write_output};

/// Args for `semwrap caption`.
#[derive(Args, Debug)]
pub struct CaptionArgs {
    /// Wrap document to describe.
    pub wrap: PathBuf,
    /// Output file (`-` for stdout).
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: PathBuf,
}

/// Execute the caption command.
pub fn handle(args: CaptionArgs) -> Result<()> {
    let state = load_wrap(&args.wrap)?;
    let stats = semester_stats(&state.modules);
    let mut text = caption_text(&state, &stats);
    text.push('\n');
    write_output(&args.output, &text)
}
