use super::config::AnalysisConfig;
use super::coverage::CoverageResult;
use serde::{Deserialize, Serialize};

/// Operational-readiness self assessment supplied alongside the sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Questionnaire {
    #[serde(default)]
    pub webhooks: bool,
    #[serde(default)]
    pub sandbox_env: bool,
    #[serde(default)]
    pub retries: bool,
}

impl Questionnaire {
    pub fn answered_yes(&self) -> usize {
        [self.webhooks, self.sandbox_env, self.retries]
            .into_iter()
            .filter(|answer| *answer)
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreSet {
    pub data: u8,
    pub coverage: u8,
    pub rules: u8,
    pub posture: u8,
    pub overall: u8,
}

/// Weighted combination of volume, coverage, rule compliance, and posture.
pub struct ScoreAggregator<'a> {
    config: &'a AnalysisConfig,
    required_paths: usize,
}

impl<'a> ScoreAggregator<'a> {
    pub fn new(config: &'a AnalysisConfig, required_paths: usize) -> Self {
        Self {
            config,
            required_paths,
        }
    }

    pub fn aggregate(
        &self,
        coverage: &CoverageResult,
        rule_score: u8,
        rows_parsed: usize,
        questionnaire: &Questionnaire,
    ) -> ScoreSet {
        let data = self.data_score(rows_parsed);
        let coverage = self.coverage_score(coverage);
        let rules = rule_score.min(100);
        let posture = posture_score(questionnaire);

        let weights = &self.config.weights;
        let weighted = f64::from(data) * weights.data
            + f64::from(coverage) * weights.coverage
            + f64::from(rules) * weights.rules
            + f64::from(posture) * weights.posture;

        ScoreSet {
            data,
            coverage,
            rules,
            posture,
            overall: clamp_score(weighted.round()),
        }
    }

    pub fn data_score(&self, rows_parsed: usize) -> u8 {
        let max_rows = self.config.max_rows;
        percent(rows_parsed.min(max_rows) as f64, max_rows as f64)
    }

    pub fn coverage_score(&self, coverage: &CoverageResult) -> u8 {
        percent(
            coverage.effective_coverage(self.config.close_match_confidence),
            self.required_paths as f64,
        )
    }
}

pub fn posture_score(questionnaire: &Questionnaire) -> u8 {
    percent(questionnaire.answered_yes() as f64, 3.0)
}

/// `round(numerator / denominator * 100)` clamped to `0..=100`; an empty
/// denominator scores zero.
pub(crate) fn percent(numerator: f64, denominator: f64) -> u8 {
    if denominator <= 0.0 {
        return 0;
    }
    clamp_score((numerator / denominator * 100.0).round())
}

fn clamp_score(value: f64) -> u8 {
    value.clamp(0.0, 100.0) as u8
}
