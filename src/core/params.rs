use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::{ValidationError, ValidationIssue};

/// Packaging topology used to group boxes into cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackagingMode {
    /// Every box is its own unit; no cases.
    Regular,
    /// Boxes grouped into small cases, small cases into large cases.
    Separate,
    /// Same numbering as `Separate`, grouped as sets; honours the overweight flag.
    Set,
}

impl PackagingMode {
    pub const ALL: [PackagingMode; 3] = [
        PackagingMode::Regular,
        PackagingMode::Separate,
        PackagingMode::Set,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PackagingMode::Regular => "regular",
            PackagingMode::Separate => "separate",
            PackagingMode::Set => "set",
        }
    }

    /// Whether boxes are grouped into small and large cases.
    pub fn is_grouped(&self) -> bool {
        !matches!(self, PackagingMode::Regular)
    }
}

impl fmt::Display for PackagingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackagingMode {
    type Err = ValidationError;

    /// Exact, case-sensitive match; nothing is mapped to a default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackagingMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ValidationError::single(ValidationIssue::UnknownMode(s.to_string())))
    }
}

/// Default cap on sets per large case when a set-mode job is overweight.
pub const DEFAULT_OVERWEIGHT_SETS_PER_LARGE_CASE: i64 = 1;

/// Reduced group capacity applied to overweight set-mode jobs.
///
/// Each field, when present, caps the configured value; `None` leaves the
/// configured value alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverweightLimit {
    #[serde(default)]
    pub boxes_per_small_case: Option<i64>,
    #[serde(default)]
    pub small_cases_per_large_case: Option<i64>,
}

impl Default for OverweightLimit {
    fn default() -> Self {
        Self {
            boxes_per_small_case: None,
            small_cases_per_large_case: Some(DEFAULT_OVERWEIGHT_SETS_PER_LARGE_CASE),
        }
    }
}

impl OverweightLimit {
    pub fn unlimited() -> Self {
        Self {
            boxes_per_small_case: None,
            small_cases_per_large_case: None,
        }
    }

    fn issues(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let fields = [
            ("boxes_per_small_case", self.boxes_per_small_case),
            ("small_cases_per_large_case", self.small_cases_per_large_case),
        ];
        for (name, value) in fields {
            if let Some(value) = value.filter(|v| *v <= 0) {
                issues.push(ValidationIssue::InvalidOverweightLimit { name, value });
            }
        }
        issues
    }
}

/// Per-job packaging parameters as entered by the operator.
///
/// Counts are signed so out-of-range input reaches validation instead of
/// failing at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageParams {
    pub sheets_per_box: i64,
    #[serde(default)]
    pub boxes_per_small_case: i64,
    #[serde(default)]
    pub small_cases_per_large_case: i64,
    #[serde(default)]
    pub is_overweight: bool,
    #[serde(default)]
    pub overweight_limit: OverweightLimit,
}

impl PackageParams {
    /// Parameters for a flat job; grouping fields are ignored in regular mode.
    pub fn regular(sheets_per_box: i64) -> Self {
        Self {
            sheets_per_box,
            boxes_per_small_case: 0,
            small_cases_per_large_case: 0,
            is_overweight: false,
            overweight_limit: OverweightLimit::default(),
        }
    }

    pub fn grouped(
        sheets_per_box: i64,
        boxes_per_small_case: i64,
        small_cases_per_large_case: i64,
    ) -> Self {
        Self {
            sheets_per_box,
            boxes_per_small_case,
            small_cases_per_large_case,
            is_overweight: false,
            overweight_limit: OverweightLimit::default(),
        }
    }

    pub fn with_overweight(mut self, limit: OverweightLimit) -> Self {
        self.is_overweight = true;
        self.overweight_limit = limit;
        self
    }

    /// Collect every invariant violation for `mode` without stopping at the first.
    pub fn issues(&self, mode: PackagingMode) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.sheets_per_box <= 0 {
            issues.push(ValidationIssue::NonPositiveParameter {
                name: "sheets_per_box",
                value: self.sheets_per_box,
            });
        }
        if mode.is_grouped() {
            if self.boxes_per_small_case <= 0 {
                issues.push(ValidationIssue::NonPositiveParameter {
                    name: "boxes_per_small_case",
                    value: self.boxes_per_small_case,
                });
            }
            if self.small_cases_per_large_case <= 0 {
                issues.push(ValidationIssue::NonPositiveParameter {
                    name: "small_cases_per_large_case",
                    value: self.small_cases_per_large_case,
                });
            }
            if self
                .boxes_per_small_case
                .checked_mul(self.small_cases_per_large_case)
                .is_none()
            {
                issues.push(ValidationIssue::CapacityOverflow {
                    boxes_per_small_case: self.boxes_per_small_case,
                    small_cases_per_large_case: self.small_cases_per_large_case,
                });
            }
        }
        if mode == PackagingMode::Set && self.is_overweight {
            issues.extend(self.overweight_limit.issues());
        }
        issues
    }

    pub fn validate(&self, mode: PackagingMode) -> Result<(), ValidationError> {
        let issues = self.issues(mode);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }

    /// Group sizes actually used for partitioning in `mode`.
    ///
    /// Returns `None` for regular mode. Callers must validate first; the
    /// values are only meaningful for positive parameters.
    pub fn effective_capacity(&self, mode: PackagingMode) -> Option<GroupCapacity> {
        if !mode.is_grouped() {
            return None;
        }
        let mut capacity = GroupCapacity {
            boxes_per_small_case: self.boxes_per_small_case.max(1) as usize,
            small_cases_per_large_case: self.small_cases_per_large_case.max(1) as usize,
        };
        if mode == PackagingMode::Set && self.is_overweight {
            if let Some(limit) = self.overweight_limit.boxes_per_small_case {
                capacity.boxes_per_small_case =
                    capacity.boxes_per_small_case.min(limit.max(1) as usize);
            }
            if let Some(limit) = self.overweight_limit.small_cases_per_large_case {
                capacity.small_cases_per_large_case =
                    capacity.small_cases_per_large_case.min(limit.max(1) as usize);
            }
        }
        Some(capacity)
    }
}

/// Validated, positive group sizes for the two grouping levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCapacity {
    pub boxes_per_small_case: usize,
    pub small_cases_per_large_case: usize,
}

impl GroupCapacity {
    /// Saturates; validated parameters never reach the limit.
    pub fn boxes_per_large_case(&self) -> usize {
        self.boxes_per_small_case
            .saturating_mul(self.small_cases_per_large_case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mode_parses_exact_names_only() {
        assert_eq!("set".parse::<PackagingMode>().unwrap(), PackagingMode::Set);
        assert_eq!(
            "separate".parse::<PackagingMode>().unwrap(),
            PackagingMode::Separate
        );
        let err = "Regular".parse::<PackagingMode>().unwrap_err();
        assert_eq!(
            err.issues,
            vec![ValidationIssue::UnknownMode("Regular".into())]
        );
        assert!("".parse::<PackagingMode>().is_err());
    }

    #[test]
    fn regular_mode_ignores_grouping_fields() {
        let params = PackageParams::regular(100);
        assert!(params.validate(PackagingMode::Regular).is_ok());
        assert_eq!(params.effective_capacity(PackagingMode::Regular), None);
    }

    #[test]
    fn grouped_modes_require_positive_group_sizes() {
        let params = PackageParams::grouped(0, 0, -2);
        let issues = params.issues(PackagingMode::Separate);
        assert_eq!(issues.len(), 3);
        assert!(matches!(
            issues[2],
            ValidationIssue::NonPositiveParameter {
                name: "small_cases_per_large_case",
                value: -2
            }
        ));
    }

    #[test]
    fn overweight_only_applies_in_set_mode() {
        let params = PackageParams::grouped(100, 4, 6).with_overweight(OverweightLimit::default());
        let separate = params.effective_capacity(PackagingMode::Separate).unwrap();
        assert_eq!(separate.small_cases_per_large_case, 6);

        let set = params.effective_capacity(PackagingMode::Set).unwrap();
        assert_eq!(set.boxes_per_small_case, 4);
        assert_eq!(set.small_cases_per_large_case, 1);
    }

    #[test]
    fn overweight_limit_never_raises_capacity() {
        let limit = OverweightLimit {
            boxes_per_small_case: Some(10),
            small_cases_per_large_case: Some(2),
        };
        let params = PackageParams::grouped(100, 3, 5).with_overweight(limit);
        let cap = params.effective_capacity(PackagingMode::Set).unwrap();
        assert_eq!(
            cap,
            GroupCapacity {
                boxes_per_small_case: 3,
                small_cases_per_large_case: 2
            }
        );
        assert_eq!(cap.boxes_per_large_case(), 6);
    }

    #[test]
    fn group_product_must_fit() {
        let params = PackageParams::grouped(10, 1 << 33, 1 << 33);
        assert!(params.validate(PackagingMode::Regular).is_ok());
        let err = params.validate(PackagingMode::Separate).unwrap_err();
        assert_eq!(
            err.issues,
            vec![ValidationIssue::CapacityOverflow {
                boxes_per_small_case: 1 << 33,
                small_cases_per_large_case: 1 << 33,
            }]
        );
        assert!(PackageParams::grouped(10, i64::MAX, 1)
            .validate(PackagingMode::Set)
            .is_ok());
    }

    #[test]
    fn boxes_per_large_case_saturates() {
        let cap = GroupCapacity {
            boxes_per_small_case: usize::MAX,
            small_cases_per_large_case: 2,
        };
        assert_eq!(cap.boxes_per_large_case(), usize::MAX);
    }

    #[test]
    fn overweight_limit_is_validated_in_set_mode() {
        let limit = OverweightLimit {
            boxes_per_small_case: Some(0),
            small_cases_per_large_case: None,
        };
        let params = PackageParams::grouped(100, 3, 5).with_overweight(limit);
        assert!(params.validate(PackagingMode::Separate).is_ok());
        let err = params.validate(PackagingMode::Set).unwrap_err();
        assert_eq!(
            err.issues,
            vec![ValidationIssue::InvalidOverweightLimit {
                name: "boxes_per_small_case",
                value: 0
            }]
        );
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: PackageParams = serde_json::from_str(r#"{"sheets_per_box": 2850}"#).unwrap();
        assert_eq!(params, PackageParams::regular(2850));
    }
}
