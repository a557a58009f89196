//! Tolerant comparators for the final-state and constraints formats.
//!
//! Both reduce a document to keyed records (one per element of interest)
//! and compare attributes pairwise: values that parse as numbers must agree
//! within `atol + rtol * |reference|`, anything else must be equal. Each
//! missing or extra record, missing or extra attribute, and out-of-tolerance
//! value counts as one difference.

use crate::xml::{load_elements, XmlElement};
use dfl_core::DflResult;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Lines listed in a message before the remainder is summarized.
const MAX_REPORTED: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub atol: f64,
    pub rtol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            atol: 1e-5,
            rtol: 1e-5,
        }
    }
}

impl Tolerance {
    pub fn close_enough(&self, result: f64, reference: f64) -> bool {
        if result.is_nan() || reference.is_nan() {
            return result.is_nan() && reference.is_nan();
        }
        if result.is_infinite() || reference.is_infinite() {
            return result == reference;
        }
        (result - reference).abs() <= self.atol + self.rtol * reference.abs()
    }
}

/// Disagreement count plus a human-readable message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiff {
    pub count: usize,
    pub message: String,
}

impl FileDiff {
    pub fn is_identical(&self) -> bool {
        self.count == 0
    }
}

/// `compare(result, reference) -> (count, message)` for one file format.
pub trait ToleranceComparator: Send + Sync {
    fn name(&self) -> &'static str;

    fn compare(&self, result: &Path, reference: &Path) -> DflResult<FileDiff>;
}

/// Final state (IIDM): every element carrying an `id` is a record keyed by
/// local name and id.
#[derive(Debug, Clone, Default)]
pub struct FinalStateComparator {
    pub tolerance: Tolerance,
}

impl FinalStateComparator {
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }
}

impl ToleranceComparator for FinalStateComparator {
    fn name(&self) -> &'static str {
        "final state"
    }

    fn compare(&self, result: &Path, reference: &Path) -> DflResult<FileDiff> {
        let key = |element: &XmlElement| {
            element
                .id()
                .map(|id| format!("{} '{}'", element.name, id))
        };
        let result_records = records(load_elements(result)?, key);
        let reference_records = records(load_elements(reference)?, key);
        Ok(diff_records(
            &result_records,
            &reference_records,
            self.tolerance,
            &["id"],
        ))
    }
}

/// Constraints: every `limit` element is a record keyed by the monitored
/// model, limit kind, side and acceptable duration.
#[derive(Debug, Clone, Default)]
pub struct ConstraintsComparator {
    pub tolerance: Tolerance,
}

impl ConstraintsComparator {
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }
}

impl ToleranceComparator for ConstraintsComparator {
    fn name(&self) -> &'static str {
        "constraints"
    }

    fn compare(&self, result: &Path, reference: &Path) -> DflResult<FileDiff> {
        let key = |element: &XmlElement| {
            (element.name == "limit").then(|| {
                format!(
                    "limit {}/{}/side {}/{}",
                    element.attr("modelName").unwrap_or("?"),
                    element.attr("kind").unwrap_or("?"),
                    element.attr("side").unwrap_or("-"),
                    element.attr("acceptableDuration").unwrap_or("-"),
                )
            })
        };
        let result_records = records(load_elements(result)?, key);
        let reference_records = records(load_elements(reference)?, key);
        Ok(diff_records(
            &result_records,
            &reference_records,
            self.tolerance,
            &[],
        ))
    }
}

type Records = BTreeMap<String, Vec<(String, String)>>;

/// Key elements; repeated keys get an occurrence suffix so duplicates are
/// matched in document order.
fn records(elements: Vec<XmlElement>, key: impl Fn(&XmlElement) -> Option<String>) -> Records {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Records::new();
    for element in elements {
        let Some(base) = key(&element) else {
            continue;
        };
        let occurrence = seen.entry(base.clone()).or_insert(0);
        *occurrence += 1;
        let name = if *occurrence == 1 {
            base
        } else {
            format!("{base} #{occurrence}")
        };
        out.insert(name, element.attributes);
    }
    out
}

fn diff_records(result: &Records, reference: &Records, tol: Tolerance, skip: &[&str]) -> FileDiff {
    let mut lines = Vec::new();

    for (key, reference_attrs) in reference {
        let Some(result_attrs) = result.get(key) else {
            lines.push(format!("{key}: missing from result"));
            continue;
        };
        let result_map: BTreeMap<_, _> = result_attrs.iter().map(|(k, v)| (k, v)).collect();
        let reference_map: BTreeMap<_, _> = reference_attrs.iter().map(|(k, v)| (k, v)).collect();

        for (name, expected) in &reference_map {
            if skip.contains(&name.as_str()) {
                continue;
            }
            match result_map.get(name) {
                None => lines.push(format!("{key}: attribute {name} missing from result")),
                Some(actual) if !values_agree(actual, expected, tol) => lines.push(format!(
                    "{key}: attribute {name} = {actual}, reference {expected}"
                )),
                Some(_) => {}
            }
        }
        for name in result_map.keys() {
            if !skip.contains(&name.as_str()) && !reference_map.contains_key(name) {
                lines.push(format!("{key}: unexpected attribute {name}"));
            }
        }
    }
    for key in result.keys() {
        if !reference.contains_key(key) {
            lines.push(format!("{key}: not in reference"));
        }
    }

    let count = lines.len();
    let mut message = lines
        .iter()
        .take(MAX_REPORTED)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");
    if count > MAX_REPORTED {
        message.push_str(&format!("\n... and {} more", count - MAX_REPORTED));
    }
    FileDiff { count, message }
}

fn values_agree(actual: &str, expected: &str, tol: Tolerance) -> bool {
    if actual == expected {
        return true;
    }
    match (actual.trim().parse::<f64>(), expected.trim().parse::<f64>()) {
        (Ok(a), Ok(b)) => tol.close_enough(a, b),
        _ => false,
    }
}
