//! Core domain primitives: serial numbers, packaging parameters, plans and
//! output naming.

pub mod error;
pub mod job;
pub mod naming;
pub mod params;
pub mod plan;
pub mod serial;

pub use error::{OutputError, ValidationError, ValidationIssue};
pub use job::ProductionJob;
pub use naming::{ProductNames, clean_name, display_name};
pub use params::{GroupCapacity, OverweightLimit, PackageParams, PackagingMode};
pub use plan::{
    BoxPartition, BoxSlot, LargeCase, PackagingPlan, PlanTotals, PrintBox, SerialRange, SmallCase,
    plan, plan_named,
};
pub use serial::SeedSerial;
