//! Par sheet: par score at the end of every over for each wickets-lost count, as
//! handed to match officials before the second innings.

use rayon::prelude::*;
use serde::Serialize;

use crate::data::table::{MAX_WICKETS_INDEX, WICKET_COLUMNS};
use crate::dls::context::MatchResourceContext;
use crate::dls::target::par_score_now;
use crate::parallel::WorkerPool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParSheetRow {
    pub overs_bowled: u32,
    /// Par score with 0..=9 wickets down.
    pub par_by_wickets: [u32; WICKET_COLUMNS],
}

/// Par scores for an uninterrupted chase of `innings_limit` overs against
/// `team1_score` made with `r1` resources. Rows are in ascending over order.
pub fn par_sheet(
    context: &MatchResourceContext,
    team1_score: u32,
    r1: f64,
    innings_limit: u32,
    pool: &WorkerPool,
) -> Vec<ParSheetRow> {
    let limit = context.clamp_limit(innings_limit);
    let table = &context.table;
    let available = table.resource(f64::from(limit), 0);

    pool.install(|| {
        (0..=limit)
            .into_par_iter()
            .map(|overs_bowled| {
                let remaining_overs = f64::from(limit - overs_bowled);
                let mut par_by_wickets = [0; WICKET_COLUMNS];
                for (wickets, par) in (0..=MAX_WICKETS_INDEX).zip(par_by_wickets.iter_mut()) {
                    let used = (available - table.resource(remaining_overs, wickets)).max(0.0);
                    *par = par_score_now(team1_score, r1, used);
                }
                ParSheetRow {
                    overs_bowled,
                    par_by_wickets,
                }
            })
            .collect()
    })
}
