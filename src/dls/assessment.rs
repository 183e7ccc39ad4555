//! One-shot match assessment: both innings' resources, the revised target and where
//! the chase stands against par.

use serde::{Deserialize, Serialize};

use crate::dls::accountant::{innings_total_resources, team2_resources};
use crate::dls::context::MatchResourceContext;
use crate::dls::innings::{current_overs_limit, Delivery, DeliveryRecord, InningsState, InterruptionEvent};
use crate::dls::target::{par_score_now, TargetFormula};

/// One innings as recorded by the scoring workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InningsInput {
    pub max_overs_initial: u32,
    #[serde(default)]
    pub deliveries: Vec<DeliveryRecord>,
    #[serde(default)]
    pub interruptions: Vec<InterruptionEvent>,
}

impl InningsInput {
    pub fn state(&self) -> InningsState {
        InningsState::from_log(&self.deliveries)
    }

    pub fn current_limit(&self) -> u32 {
        current_overs_limit(self.max_overs_initial, &self.interruptions)
    }

    pub fn runs(&self) -> u32 {
        self.deliveries.iter().map(Delivery::runs).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DlsAssessment {
    pub format_overs: u32,
    pub formula: TargetFormula,
    pub team1_score: u32,
    pub team1_resources: f64,
    pub team2_resources: f64,
    pub target: u32,
    pub team2_overs_limit: u32,
    pub team2_overs_bowled: String,
    pub team2_wickets_lost: u32,
    pub team2_resources_remaining: f64,
    pub team2_resources_used: f64,
    pub par_score: u32,
    pub team2_runs: u32,
    pub runs_needed: u32,
}

pub fn assess(
    context: &MatchResourceContext,
    formula: TargetFormula,
    team1_score: u32,
    team1: &InningsInput,
    team2: &InningsInput,
) -> DlsAssessment {
    let r1 = innings_total_resources(
        context,
        team1.max_overs_initial,
        &team1.deliveries,
        &team1.interruptions,
    );
    let r2 = innings_total_resources(
        context,
        team2.max_overs_initial,
        &team2.deliveries,
        &team2.interruptions,
    );
    let target = formula.target(team1_score, r1, r2, context.g50);

    let state = team2.state();
    let limit = context.clamp_limit(team2.current_limit());
    let remaining = team2_resources(context, limit, state.balls_bowled, state.wickets_lost);
    let used = (r2 - remaining).max(0.0);
    let team2_runs = team2.runs();

    DlsAssessment {
        format_overs: context.format_overs,
        formula,
        team1_score,
        team1_resources: r1,
        team2_resources: r2,
        target,
        team2_overs_limit: limit,
        team2_overs_bowled: state.overs_notation(),
        team2_wickets_lost: state.wickets_lost,
        team2_resources_remaining: remaining,
        team2_resources_used: used,
        par_score: par_score_now(team1_score, r1, used),
        team2_runs,
        runs_needed: target.saturating_sub(team2_runs),
    }
}
