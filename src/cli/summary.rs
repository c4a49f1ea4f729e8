//! Explicit carton summaries (`cartonize summary`).

use std::path::PathBuf;

use anyhow::Result;
use cartonize::{CartonSummary, CartonSummaryWriter, ProductNames};
use clap::Args;

/// Arguments for `cartonize summary`.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// English product name.
    #[arg(long)]
    pub name: String,
    /// Chinese product name, printed before the English one.
    #[arg(long, default_value = "")]
    pub chinese_name: String,
    /// Product code used in the file name.
    #[arg(long)]
    pub code: String,
    #[arg(long)]
    pub pieces_per_box: u64,
    #[arg(long)]
    pub total_large_boxes: u64,
    #[arg(long)]
    pub boxes_per_large_box: u64,
    /// Output directory.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn handle(args: SummaryArgs) -> Result<()> {
    let names = ProductNames {
        chinese_name: args.chinese_name,
        english_name: args.name,
        product_code: args.code,
        ..ProductNames::default()
    };
    let summary = CartonSummary::new(
        names.display_name(),
        args.pieces_per_box,
        args.total_large_boxes,
        args.boxes_per_large_box,
    );
    let path = CartonSummaryWriter::new(&args.out).write(&summary, &names)?;
    println!("Wrote {}", path.display());
    Ok(())
}
