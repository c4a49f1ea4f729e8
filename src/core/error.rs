use std::fmt;

use thiserror::Error;

/// A single user-facing reason why a plan cannot be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("total sheet count must not be negative (got {0})")]
    NegativeSheetCount(i64),
    #[error("{name} must be greater than zero (got {value})")]
    NonPositiveParameter { name: &'static str, value: i64 },
    #[error("unknown packaging mode '{0}' (expected regular, separate or set)")]
    UnknownMode(String),
    #[error("overweight limit {name} must be greater than zero (got {value})")]
    InvalidOverweightLimit { name: &'static str, value: i64 },
    #[error("serial number overflows after {prefix}{number}")]
    SerialOverflow { prefix: String, number: u64 },
    #[error(
        "{boxes_per_small_case} boxes per small case x {small_cases_per_large_case} small cases \
         per large case does not fit a box count"
    )]
    CapacityOverflow {
        boxes_per_small_case: i64,
        small_cases_per_large_case: i64,
    },
}

/// Every issue found while validating planner inputs.
///
/// The planner never returns a partial plan: it either succeeds or returns
/// this list in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn single(issue: ValidationIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }

    /// Render each issue as its own line, in the order found.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issues.as_slice() {
            [] => write!(f, "validation failed"),
            [only] => write!(f, "{only}"),
            many => {
                write!(f, "{} validation issues: ", many.len())?;
                for (idx, issue) in many.iter().enumerate() {
                    if idx > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{issue}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Failures while writing summary or label files.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to assemble workbook: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("failed to assemble PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("{0}")]
    Layout(String),
}

impl OutputError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        OutputError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl From<std::io::Error> for OutputError {
    fn from(source: std::io::Error) -> Self {
        OutputError::Io {
            path: "<memory>".to_string(),
            source,
        }
    }
}
