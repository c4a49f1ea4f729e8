//! Command-line interface wiring for the `cartonize` binary.
//!
//! This module owns the clap definitions and delegates execution to
//! specialized submodules that encapsulate each command family.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod common;
pub mod generate;
pub mod plan;
pub mod serial;
pub mod summary;
pub mod template;
pub mod utils;

/// Parsed CLI entrypoint for the `cartonize` binary.
#[derive(Parser, Debug)]
#[command(
    name = "cartonize",
    version,
    about = "Packaging plans, carton summaries and labels for print runs"
)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Top-level command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// High-level command families made available to end users.
#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    Serial(serial::SerialCommand),
    /// Print the packaging plan for a job.
    Plan(plan::PlanArgs),
    /// Write label PDFs and the carton summary for a job.
    Generate(generate::GenerateArgs),
    /// Write a carton summary from explicit totals.
    Summary(summary::SummaryArgs),
    #[command(subcommand)]
    Template(template::TemplateCommand),
}

/// Execute the requested command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serial(cmd) => serial::handle(cmd),
        Command::Plan(args) => plan::handle(args),
        Command::Generate(args) => generate::handle(args),
        Command::Summary(args) => summary::handle(args),
        Command::Template(cmd) => template::handle(cmd),
    }
}
