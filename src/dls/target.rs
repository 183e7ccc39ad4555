//! Revised target and live par score.
//!
//! Every formula truncates toward zero on non-negative operands. `R1 <= 0` is a
//! borderline match state, not a bug, and returns a fixed fallback.

use serde::{Deserialize, Serialize};

/// Which revised-target formula is in force.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFormula {
    /// Three-branch Standard Edition formula; uses G50 when the chasing side has more
    /// resources.
    #[default]
    StandardEdition,
    /// `floor(S1 * R2 / R1) + 1` regardless of which side has more resources.
    RatioOnly,
}

impl TargetFormula {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StandardEdition => "standard_edition",
            Self::RatioOnly => "ratio_only",
        }
    }

    pub fn target(self, team1_score: u32, r1: f64, r2: f64, g50: f64) -> u32 {
        match self {
            Self::StandardEdition => revised_target(team1_score, r1, r2, g50),
            Self::RatioOnly => ratio_only_target(team1_score, r1, r2),
        }
    }
}

fn scaled_runs(team1_score: u32, numerator: f64, denominator: f64) -> u32 {
    (f64::from(team1_score) * numerator / denominator).floor() as u32
}

/// Runs the chasing side needs to win.
pub fn revised_target(team1_score: u32, r1: f64, r2: f64, g50: f64) -> u32 {
    if !(r1 > 0.0) {
        return team1_score.saturating_add(1);
    }
    if r2 < r1 {
        scaled_runs(team1_score, r2, r1) + 1
    } else if r2 > r1 {
        let extra = ((r2 - r1) * g50 / 100.0).floor() as u32;
        team1_score.saturating_add(extra).saturating_add(1)
    } else {
        team1_score.saturating_add(1)
    }
}

pub fn ratio_only_target(team1_score: u32, r1: f64, r2: f64) -> u32 {
    if !(r1 > 0.0) {
        return team1_score.saturating_add(1);
    }
    scaled_runs(team1_score, r2, r1).saturating_add(1)
}

/// Par score after the chasing side has used `r2_used` of its resources.
pub fn par_score_now(team1_score: u32, r1: f64, r2_used: f64) -> u32 {
    if !(r1 > 0.0) {
        return 0;
    }
    scaled_runs(team1_score, r2_used.max(0.0), r1).saturating_add(1)
}
