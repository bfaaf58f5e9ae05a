//! Command-line interface wiring for the `semwrap` binary.
//!
//! This module owns the clap definitions and delegates execution to
//! one submodule per command family. Every command reads and, where it
//! edits, rewrites a wrap document (a JSON file).

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

pub mod assessment;
pub mod caption;
pub mod common;
pub mod module;
pub mod render;
pub mod utils;
pub mod wrap;

/// Parsed CLI entrypoint for the `semwrap` binary.
#[derive(Parser, Debug)]
#[command(
    name = "semwrap",
    version,
    about = "Aggregate a semester of marks into a shareable wrapped card"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Top-level command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// High-level command families made available to end users.
#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    Wrap(wrap::WrapCommand),
    #[command(subcommand)]
    Module(module::ModuleCommand),
    #[command(subcommand)]
    Assessment(assessment::AssessmentCommand),
    #[command(subcommand)]
    Render(render::RenderCommand),
    /// Print the copy-paste caption for a wrap.
    Caption(caption::CaptionArgs),
}

/// Execute the requested command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Wrap(cmd) => wrap::handle(cmd),
        Command::Module(cmd) => module::handle(cmd),
        Command::Assessment(cmd) => assessment::handle(cmd),
        Command::Render(cmd) => render::handle(cmd),
        Command::Caption(args) => caption::handle(args),
    }
}
