use serde::{Deserialize, Serialize};

/// Largest number of documents an analysis ever sees.
pub const MAX_ROWS: usize = 200;

/// Relative weight of each sub-score in the overall readiness number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub data: f64,
    pub coverage: f64,
    pub rules: f64,
    pub posture: f64,
}

impl ScoreWeights {
    pub const GETS_V0_1: ScoreWeights = ScoreWeights {
        data: 0.25,
        coverage: 0.35,
        rules: 0.30,
        posture: 0.10,
    };

    pub fn total(&self) -> f64 {
        self.data + self.coverage + self.rules + self.posture
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::GETS_V0_1
    }
}

/// Constants that shape matching, rule checks, and scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub max_rows: usize,
    /// Absolute tolerance for monetary comparisons.
    pub tolerance: f64,
    pub close_match_confidence: f64,
    pub weights: ScoreWeights,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_rows: MAX_ROWS,
            tolerance: 0.01,
            close_match_confidence: 0.8,
            weights: ScoreWeights::GETS_V0_1,
        }
    }
}
