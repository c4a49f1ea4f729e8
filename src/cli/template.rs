//! Template discovery commands (`cartonize template ...`).

use anyhow::{Context, Result};
use cartonize::TemplateRegistry;
use cartonize::labels::{LabelTemplate, TemplateKind};
use clap::{Args, Subcommand};

/// Template subcommands.
#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// List all known templates.
    List,
    /// Show the layout of a template.
    Show(TemplateShowArgs),
}

/// Arguments for `cartonize template show`.
#[derive(Args, Debug)]
pub struct TemplateShowArgs {
    /// Template name to display.
    pub name: String,
}

/// Execute a template command.
pub fn handle(command: TemplateCommand) -> Result<()> {
    match command {
        TemplateCommand::List => list(),
        TemplateCommand::Show(args) => show(args),
    }
}

fn list() -> Result<()> {
    println!("Available templates:");
    let default = TemplateRegistry::default_template().name;
    for tpl in TemplateRegistry::list() {
        let marker = if tpl.name == default { " (default)" } else { "" };
        println!("  - {}{}: {}", tpl.name, marker, tpl.description);
    }
    Ok(())
}

fn show(args: TemplateShowArgs) -> Result<()> {
    let tpl = TemplateRegistry::get(&args.name)
        .with_context(|| format!("template '{}' not found", args.name))?;
    println!("Template: {} ({})", tpl.name, tpl.kind.name());
    println!("{}", tpl.description);
    match tpl.kind {
        TemplateKind::Single(single) => {
            println!("  page: {} x {} mm, one label each", single.width_mm, single.height_mm);
        }
        TemplateKind::Grid(grid) => {
            println!(
                "  page: A4, {} columns x {} rows, {} mm margin",
                grid.columns, grid.rows, grid.margin_mm
            );
            println!("  labels per page: {}", grid.columns * grid.rows);
        }
    }
    Ok(())
}
