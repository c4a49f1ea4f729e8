//! Seed serial helpers (`cartonize serial ...`).

use anyhow::Result;
use cartonize::{format_serial, parse_serial};
use clap::{Args, Subcommand};
use tracing::warn;

/// Serial subcommands.
#[derive(Subcommand, Debug)]
pub enum SerialCommand {
    /// Split a seed into prefix, number and digit width.
    Parse(SerialParseArgs),
    /// Render a serial from its parts.
    Format(SerialFormatArgs),
}

#[derive(Args, Debug)]
pub struct SerialParseArgs {
    pub seed: String,
}

#[derive(Args, Debug)]
pub struct SerialFormatArgs {
    pub prefix: String,
    pub number: u64,
    pub width: usize,
}

/// Execute a serial command.
pub fn handle(command: SerialCommand) -> Result<()> {
    match command {
        SerialCommand::Parse(args) => parse(args),
        SerialCommand::Format(args) => format(args),
    }
}

fn parse(args: SerialParseArgs) -> Result<()> {
    let serial = parse_serial(&args.seed);
    if serial.is_fallback() {
        warn!(seed = %args.seed, "seed has no usable digit run; using default serial");
    }
    println!("prefix: {}", serial.prefix);
    println!("number: {}", serial.number);
    println!("width:  {}", serial.digit_width);
    println!("serial: {serial}");
    Ok(())
}

fn format(args: SerialFormatArgs) -> Result<()> {
    println!("{}", format_serial(&args.prefix, args.number, args.width));
    Ok(())
}
