//! Packaging plans, carton summaries and labels for serialized print runs.

pub mod core;
pub mod labels;
pub mod session;
pub mod summary;
pub mod wizard;

pub use crate::core::{
    OutputError, PackageParams, PackagingMode, PackagingPlan, ProductNames, ProductionJob,
    SeedSerial, ValidationError, ValidationIssue, plan,
};
pub use labels::{LabelRenderer, TemplateRegistry};
pub use session::{GenerateError, GenerationLock, GenerationOptions, GenerationReport, generate};
pub use summary::{CartonSummary, CartonSummaryWriter};
pub use wizard::{GenerationIssue, Wizard, WizardContext, WizardStep};

use crate::core::serial;

/// Parse a seed serial; seeds without a digit run yield the default serial.
pub fn parse_serial(seed: &str) -> SeedSerial {
    serial::parse(seed)
}

/// Render `{prefix}{number}` with the number zero-padded to `digit_width`.
pub fn format_serial(prefix: &str, number: u64, digit_width: usize) -> String {
    serial::format(prefix, number, digit_width)
}
