use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::error::ValidationError;
use crate::core::naming::ProductNames;
use crate::core::params::{PackageParams, PackagingMode};
use crate::core::plan::{PackagingPlan, plan_named};
use crate::core::serial::{SeedSerial, parse};

/// One production record: what to print, how many sheets, how to pack it.
///
/// Stored as a JSON document. `mode` stays a raw string so an unknown value
/// is reported by validation rather than rejected by the deserializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionJob {
    #[serde(flatten)]
    pub names: ProductNames,
    #[serde(default)]
    pub seed: String,
    pub total_sheets: i64,
    pub mode: String,
    pub params: PackageParams,
}

impl ProductionJob {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to open job file {}", path.display()))?;
        let job: ProductionJob = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse job file {}", path.display()))?;
        info!(
            path = %path.display(),
            mode = %job.mode,
            total_sheets = job.total_sheets,
            "loaded production job"
        );
        Ok(job)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize job")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write job file {}", path.display()))
    }

    pub fn seed_serial(&self) -> SeedSerial {
        let seed = parse(&self.seed);
        if seed.is_fallback() {
            debug!(seed = %self.seed, "seed parsed to fallback serial");
        }
        seed
    }

    pub fn packaging_mode(&self) -> Result<PackagingMode, ValidationError> {
        self.mode.parse()
    }

    pub fn plan(&self) -> Result<PackagingPlan, ValidationError> {
        plan_named(
            self.total_sheets,
            &self.seed_serial(),
            &self.params,
            &self.mode,
        )
    }
}
