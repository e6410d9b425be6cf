use super::document::{Sample, LINES_FIELD};
use super::normalizer::{normalize_key, normalize_path};
use super::schema::SchemaDefinition;
use serde::Serialize;
use std::collections::HashSet;

/// A required path that only has a loosely related source field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloseMatch {
    pub target: String,
    pub candidate: String,
    pub confidence: f64,
}

/// Placement of every required schema path into exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageResult {
    pub matched: Vec<String>,
    pub close: Vec<CloseMatch>,
    pub missing: Vec<String>,
}

impl CoverageResult {
    pub fn total(&self) -> usize {
        self.matched.len() + self.close.len() + self.missing.len()
    }

    /// Matched paths count fully, close ones at `close_weight` each.
    pub fn effective_coverage(&self, close_weight: f64) -> f64 {
        self.matched.len() as f64 + self.close.len() as f64 * close_weight
    }
}

/// First-fit matcher from source field names onto the schema's required paths.
///
/// Required paths are visited in declared order and source keys in the order
/// they were first seen, so earlier paths win ties. Each source key can back
/// at most one exact match.
pub struct CoverageMatcher<'a> {
    schema: &'a SchemaDefinition,
    close_confidence: f64,
}

struct ObservedKey {
    original: String,
    normalized: String,
}

impl<'a> CoverageMatcher<'a> {
    pub fn new(schema: &'a SchemaDefinition, close_confidence: f64) -> Self {
        Self {
            schema,
            close_confidence,
        }
    }

    pub fn evaluate(&self, sample: &Sample) -> CoverageResult {
        let observed: Vec<ObservedKey> = observed_keys(sample)
            .into_iter()
            .map(|original| ObservedKey {
                normalized: normalize_key(&original),
                original,
            })
            .collect();
        let mut consumed = vec![false; observed.len()];
        let mut result = CoverageResult::default();

        for &path in self.schema.required {
            let target = normalize_path(path);
            let mut exact = None;
            let mut candidate = None;

            for (index, key) in observed.iter().enumerate() {
                if !consumed[index] && key.normalized == target {
                    exact = Some(index);
                    break;
                }

                if candidate.is_none()
                    && (key.normalized.contains(target.as_str())
                        || target.contains(key.normalized.as_str()))
                {
                    candidate = Some(index);
                }
            }

            match (exact, candidate) {
                (Some(index), _) => {
                    consumed[index] = true;
                    result.matched.push(path.to_string());
                }
                (None, Some(index)) => result.close.push(CloseMatch {
                    target: path.to_string(),
                    candidate: observed[index].original.clone(),
                    confidence: self.close_confidence,
                }),
                (None, None) => result.missing.push(path.to_string()),
            }
        }

        result
    }
}

/// Distinct source keys in first-seen order. Line item keys are reported as
/// `lines[].<key>`.
pub fn observed_keys(sample: &Sample) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    let mut record = |key: String| {
        if seen.insert(key.clone()) {
            ordered.push(key);
        }
    };

    for document in sample.documents() {
        for key in document.keys() {
            record(key.to_string());
        }
        for line in document.lines() {
            for key in line.keys() {
                record(format!("{LINES_FIELD}[].{key}"));
            }
        }
    }

    ordered
}
