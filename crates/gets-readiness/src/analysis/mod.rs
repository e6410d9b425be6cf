//! Readiness analysis of an invoice sample against a target e-invoicing schema.
//!
//! Coverage matching and rule checks run independently over the same sample;
//! their results, the row count, and the posture questionnaire are folded into
//! a [`ScoreSet`] by the [`ScoreAggregator`]. Everything here is synchronous
//! and allocation-only: one call, one fresh report.

mod config;
mod coverage;
mod document;
mod normalizer;
mod rules;
mod schema;
mod scoring;

pub use config::{AnalysisConfig, ScoreWeights, MAX_ROWS};
pub use coverage::{observed_keys, CloseMatch, CoverageMatcher, CoverageResult};
pub use document::{coerce_number, coerce_text, Document, Sample, LINES_FIELD};
pub use normalizer::{normalize_key, normalize_path};
pub use rules::{is_iso_date, RuleDetail, RuleEngine, RuleFinding, RuleId, RuleReport};
pub use schema::{SchemaDefinition, GETS_V0_1};
pub use scoring::{posture_score, Questionnaire, ScoreAggregator, ScoreSet};

use serde::Serialize;
use tracing::debug;

const NOT_AVAILABLE: &str = "N/A";

/// Caller-supplied labels that travel with a sample but never affect scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisContext {
    pub country: Option<String>,
    pub erp: Option<String>,
}

impl AnalysisContext {
    pub fn new(country: Option<String>, erp: Option<String>) -> Self {
        let clean = |value: Option<String>| {
            value
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            country: clean(country),
            erp: clean(erp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub rows_parsed: usize,
    pub lines_total: usize,
    pub country: String,
    pub erp: String,
}

/// Full outcome of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessReport {
    pub scores: ScoreSet,
    pub coverage: CoverageResult,
    pub rule_findings: Vec<RuleFinding>,
    pub gaps: Vec<String>,
    pub meta: ReportMeta,
}

/// Runs coverage, rules, and scoring over one sample.
#[derive(Debug, Clone, Default)]
pub struct ReadinessAnalyzer {
    schema: SchemaDefinition,
    config: AnalysisConfig,
}

impl ReadinessAnalyzer {
    pub fn new(schema: SchemaDefinition, config: AnalysisConfig) -> Self {
        Self { schema, config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(
        &self,
        sample: &Sample,
        rows_parsed: usize,
        questionnaire: &Questionnaire,
        context: &AnalysisContext,
    ) -> ReadinessReport {
        debug_assert!(
            sample.len() <= self.config.max_rows,
            "sample exceeds the row limit"
        );

        let coverage = CoverageMatcher::new(&self.schema, self.config.close_match_confidence)
            .evaluate(sample);
        let rules = RuleEngine::new(&self.schema, self.config.tolerance).evaluate(sample);
        let scores = ScoreAggregator::new(&self.config, self.schema.required_count()).aggregate(
            &coverage,
            rules.score,
            rows_parsed,
            questionnaire,
        );

        let gaps = rules.findings.iter().filter_map(RuleFinding::gap).collect();

        debug!(
            schema = self.schema.version,
            rows_parsed,
            matched = coverage.matched.len(),
            close = coverage.close.len(),
            missing = coverage.missing.len(),
            rules_passed = rules.passed(),
            overall = scores.overall,
            "readiness analysis complete"
        );

        ReadinessReport {
            scores,
            coverage,
            rule_findings: rules.findings,
            gaps,
            meta: ReportMeta {
                rows_parsed,
                lines_total: sample.lines_total(),
                country: label(&context.country),
                erp: label(&context.erp),
            },
        }
    }
}

fn label(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
