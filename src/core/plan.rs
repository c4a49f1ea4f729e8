use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Write;
use tracing::debug;

use crate::core::error::{ValidationError, ValidationIssue};
use crate::core::params::{GroupCapacity, PackageParams, PackagingMode};
use crate::core::serial::{SeedSerial, sub_number};

/// Position and fill of one box in the partition, before numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxSlot {
    /// 1-based position within the plan.
    pub index: usize,
    pub sheet_count: u64,
}

/// Lazy, restartable split of a sheet total into boxes.
///
/// Every box holds `sheets_per_box` sheets except the last, which holds the
/// remainder. Cloning yields an independent iterator from the same position.
#[derive(Debug, Clone)]
pub struct BoxPartition {
    total_sheets: u64,
    sheets_per_box: u64,
    box_count: usize,
    next: usize,
}

impl BoxPartition {
    /// `sheets_per_box` of zero is treated as one; validate beforehand.
    pub fn new(total_sheets: u64, sheets_per_box: u64) -> Self {
        let sheets_per_box = sheets_per_box.max(1);
        Self {
            total_sheets,
            sheets_per_box,
            box_count: total_sheets.div_ceil(sheets_per_box) as usize,
            next: 0,
        }
    }

    pub fn box_count(&self) -> usize {
        self.box_count
    }
}

impl Iterator for BoxPartition {
    type Item = BoxSlot;

    fn next(&mut self) -> Option<BoxSlot> {
        if self.next >= self.box_count {
            return None;
        }
        let index = self.next + 1;
        let sheet_count = if index == self.box_count {
            self.total_sheets - self.sheets_per_box * (self.box_count as u64 - 1)
        } else {
            self.sheets_per_box
        };
        self.next += 1;
        Some(BoxSlot { index, sheet_count })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.box_count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BoxPartition {}

/// Smallest packaged unit, carrying its printed serial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintBox {
    pub index: usize,
    pub serial: String,
    pub sheet_count: u64,
}

/// Intermediate group of boxes sharing one main number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmallCase {
    pub main_number: u64,
    /// Main serial without the per-box sub-number.
    pub serial: String,
    pub boxes: Vec<PrintBox>,
}

impl SmallCase {
    pub fn sheet_count(&self) -> u64 {
        self.boxes.iter().map(|b| b.sheet_count).sum()
    }
}

/// First and last box serial inside a large case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialRange {
    pub first: String,
    pub last: String,
}

/// Outer shipping carton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargeCase {
    pub index: usize,
    pub small_cases: Vec<SmallCase>,
    pub serial_range: SerialRange,
    pub total_box_count: usize,
}

impl LargeCase {
    fn from_small_cases(index: usize, small_cases: Vec<SmallCase>) -> Self {
        let first = small_cases
            .first()
            .and_then(|c| c.boxes.first())
            .map(|b| b.serial.clone())
            .unwrap_or_default();
        let last = small_cases
            .last()
            .and_then(|c| c.boxes.last())
            .map(|b| b.serial.clone())
            .unwrap_or_default();
        let total_box_count = small_cases.iter().map(|c| c.boxes.len()).sum();
        Self {
            index,
            small_cases,
            serial_range: SerialRange { first, last },
            total_box_count,
        }
    }

    pub fn boxes(&self) -> impl Iterator<Item = &PrintBox> {
        self.small_cases.iter().flat_map(|c| c.boxes.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanTotals {
    pub box_count: usize,
    pub small_case_count: usize,
    pub large_case_count: usize,
}

/// Fully enumerated packaging hierarchy for one production record.
///
/// Built once per request by [`plan`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackagingPlan {
    mode: PackagingMode,
    total_sheets: u64,
    sheets_per_box: u64,
    seed: SeedSerial,
    capacity: Option<GroupCapacity>,
    loose_boxes: Vec<PrintBox>,
    large_cases: Vec<LargeCase>,
    totals: PlanTotals,
}

impl PackagingPlan {
    pub fn mode(&self) -> PackagingMode {
        self.mode
    }

    pub fn total_sheets(&self) -> u64 {
        self.total_sheets
    }

    pub fn sheets_per_box(&self) -> u64 {
        self.sheets_per_box
    }

    pub fn seed(&self) -> &SeedSerial {
        &self.seed
    }

    /// Group sizes used for partitioning, after any overweight override.
    pub fn capacity(&self) -> Option<GroupCapacity> {
        self.capacity
    }

    pub fn totals(&self) -> PlanTotals {
        self.totals
    }

    pub fn large_cases(&self) -> &[LargeCase] {
        &self.large_cases
    }

    pub fn small_cases(&self) -> impl Iterator<Item = &SmallCase> {
        self.large_cases.iter().flat_map(|c| c.small_cases.iter())
    }

    /// Every box in plan order, whether held directly or inside cases.
    pub fn boxes(&self) -> impl Iterator<Item = &PrintBox> {
        self.loose_boxes
            .iter()
            .chain(self.large_cases.iter().flat_map(|c| c.boxes()))
    }

    pub fn is_empty(&self) -> bool {
        self.totals.box_count == 0
    }

    /// SHA-256 over the canonical JSON form; equal inputs give equal digests.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let mut hasher = Sha256::new();
        let buffer = serde_json::to_vec(self)?;
        hasher.update(&buffer);
        let digest = hasher.finalize();
        Ok(format!("{digest:x}"))
    }

    /// Human-readable listing of the hierarchy.
    pub fn render_listing(&self) -> String {
        let mut out = String::new();
        writeln!(
            &mut out,
            "Mode {} | seed {} | {} sheets | {} boxes, {} small cases, {} large cases",
            self.mode,
            self.seed,
            self.total_sheets,
            self.totals.box_count,
            self.totals.small_case_count,
            self.totals.large_case_count
        )
        .ok();
        for b in &self.loose_boxes {
            writeln!(
                &mut out,
                "  box {:>5}  {}  ({} sheets)",
                b.index, b.serial, b.sheet_count
            )
            .ok();
        }
        for case in &self.large_cases {
            writeln!(
                &mut out,
                "Large case {:>4} | {} .. {} | {} boxes",
                case.index, case.serial_range.first, case.serial_range.last, case.total_box_count
            )
            .ok();
            for small in &case.small_cases {
                writeln!(&mut out, "  case {}", small.serial).ok();
                for b in &small.boxes {
                    writeln!(
                        &mut out,
                        "    box {:>5}  {}  ({} sheets)",
                        b.index, b.serial, b.sheet_count
                    )
                    .ok();
                }
            }
        }
        out
    }
}

/// Build the packaging plan for one record.
///
/// Deterministic and side-effect free. Fails with every validation issue at
/// once and never returns a partial plan. A zero sheet total yields an empty
/// plan.
pub fn plan(
    total_sheets: i64,
    seed: &SeedSerial,
    params: &PackageParams,
    mode: PackagingMode,
) -> Result<PackagingPlan, ValidationError> {
    let mut issues = Vec::new();
    if total_sheets < 0 {
        issues.push(ValidationIssue::NegativeSheetCount(total_sheets));
    }
    issues.extend(params.issues(mode));
    if !issues.is_empty() {
        return Err(ValidationError::new(issues));
    }
    build(total_sheets as u64, seed, params, mode)
}

/// Like [`plan`], but takes the mode as entered and reports an unknown name
/// alongside any other issues.
pub fn plan_named(
    total_sheets: i64,
    seed: &SeedSerial,
    params: &PackageParams,
    mode: &str,
) -> Result<PackagingPlan, ValidationError> {
    match mode.parse::<PackagingMode>() {
        Ok(mode) => plan(total_sheets, seed, params, mode),
        Err(mut err) => {
            if total_sheets < 0 {
                err.issues.push(ValidationIssue::NegativeSheetCount(total_sheets));
            }
            if params.sheets_per_box <= 0 {
                err.issues.push(ValidationIssue::NonPositiveParameter {
                    name: "sheets_per_box",
                    value: params.sheets_per_box,
                });
            }
            Err(err)
        }
    }
}

fn build(
    total_sheets: u64,
    seed: &SeedSerial,
    params: &PackageParams,
    mode: PackagingMode,
) -> Result<PackagingPlan, ValidationError> {
    let sheets_per_box = params.sheets_per_box as u64;
    let partition = BoxPartition::new(total_sheets, sheets_per_box);
    let box_count = partition.box_count();
    let capacity = params.effective_capacity(mode);

    let (loose_boxes, large_cases) = match capacity {
        None => {
            ensure_numbers_fit(seed, box_count)?;
            (number_flat(partition, seed), Vec::new())
        }
        Some(capacity) => {
            let small_case_count = box_count.div_ceil(capacity.boxes_per_small_case);
            ensure_numbers_fit(seed, small_case_count)?;
            (Vec::new(), number_grouped(partition, seed, capacity))
        }
    };

    let totals = PlanTotals {
        box_count,
        small_case_count: large_cases.iter().map(|c| c.small_cases.len()).sum(),
        large_case_count: large_cases.len(),
    };
    debug!(
        mode = %mode,
        total_sheets,
        boxes = totals.box_count,
        small_cases = totals.small_case_count,
        large_cases = totals.large_case_count,
        "built packaging plan"
    );

    Ok(PackagingPlan {
        mode,
        total_sheets,
        sheets_per_box,
        seed: seed.clone(),
        capacity,
        loose_boxes,
        large_cases,
        totals,
    })
}

/// The last main number handed out is `seed.number + units - 1`.
fn ensure_numbers_fit(seed: &SeedSerial, units: usize) -> Result<(), ValidationError> {
    if units == 0 {
        return Ok(());
    }
    match seed.number.checked_add(units as u64 - 1) {
        Some(_) => Ok(()),
        None => Err(ValidationError::single(ValidationIssue::SerialOverflow {
            prefix: seed.prefix.clone(),
            number: seed.number,
        })),
    }
}

fn number_flat(partition: BoxPartition, seed: &SeedSerial) -> Vec<PrintBox> {
    partition
        .map(|slot| PrintBox {
            index: slot.index,
            serial: seed.render(seed.number + (slot.index as u64 - 1)),
            sheet_count: slot.sheet_count,
        })
        .collect()
}

/// Group sizes may be far larger than the job; every buffer is sized from
/// what is actually left to place.
fn number_grouped(
    partition: BoxPartition,
    seed: &SeedSerial,
    capacity: GroupCapacity,
) -> Vec<LargeCase> {
    let per_small = capacity.boxes_per_small_case;
    let box_count = partition.box_count();
    let mut small_cases: Vec<SmallCase> = Vec::with_capacity(box_count.div_ceil(per_small));

    for slot in partition {
        let offset = slot.index - 1;
        let sub = offset % per_small + 1;
        if sub == 1 {
            let main_number = seed.number + (offset / per_small) as u64;
            small_cases.push(SmallCase {
                main_number,
                serial: seed.render(main_number),
                boxes: Vec::with_capacity(per_small.min(box_count - offset)),
            });
        }
        if let Some(case) = small_cases.last_mut() {
            let serial = format!("{}-{}", case.serial, sub_number(sub));
            case.boxes.push(PrintBox {
                index: slot.index,
                serial,
                sheet_count: slot.sheet_count,
            });
        }
    }

    let per_large = capacity.small_cases_per_large_case;
    let case_count = small_cases.len();
    let mut groups: Vec<Vec<SmallCase>> = Vec::with_capacity(case_count.div_ceil(per_large));
    for (position, case) in small_cases.into_iter().enumerate() {
        if position % per_large == 0 {
            groups.push(Vec::with_capacity(per_large.min(case_count - position)));
        }
        if let Some(group) = groups.last_mut() {
            group.push(case);
        }
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(idx, group)| LargeCase::from_small_cases(idx + 1, group))
        .collect()
}
