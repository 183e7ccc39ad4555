//! Resource accounting for each innings.
//!
//! The side batting first starts with the resource of its initial overs limit and
//! loses, at every interruption, the difference between the resource it held under
//! the old limit and under the new one at that point of the innings. The chasing
//! side is read off the table at its current position.

use crate::data::table::MAX_RESOURCE;
use crate::dls::context::MatchResourceContext;
use crate::dls::innings::{Delivery, InningsState, InterruptionEvent};

/// Resource lost to one interruption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterruptionLoss {
    pub event: InterruptionEvent,
    pub state: InningsState,
    pub before: f64,
    pub after: f64,
    pub loss: f64,
}

/// Walk the interruption ledger in delivery order, returning each step's loss.
pub fn interruption_losses<D: Delivery>(
    context: &MatchResourceContext,
    initial_limit: u32,
    log: &[D],
    interruptions: &[InterruptionEvent],
) -> Vec<InterruptionLoss> {
    let table = &context.table;
    let mut ledger = interruptions.to_vec();
    ledger.sort_by_key(|event| event.at_delivery_index);

    let mut limit_now = context.clamp_limit(initial_limit);
    let mut losses = Vec::with_capacity(ledger.len());
    for event in ledger {
        let state = InningsState::from_prefix(log, event.at_delivery_index);
        let new_limit = context.clamp_limit(event.new_overs_limit);
        let before = table.resource(state.overs_remaining(limit_now), state.wickets_lost);
        let after = table.resource(state.overs_remaining(new_limit), state.wickets_lost);
        let raw_loss = before - after;
        if raw_loss < 0.0 {
            tracing::warn!(
                at_delivery_index = event.at_delivery_index,
                old_limit = limit_now,
                new_limit,
                "overs limit increased mid-innings, counted as no loss"
            );
        }
        let loss = raw_loss.max(0.0);
        tracing::debug!(
            at_delivery_index = event.at_delivery_index,
            balls_bowled = state.balls_bowled,
            wickets_lost = state.wickets_lost,
            before,
            after,
            loss,
            "interruption applied"
        );
        losses.push(InterruptionLoss {
            event,
            state,
            before,
            after,
            loss,
        });
        limit_now = new_limit;
    }
    losses
}

/// Total resources available to an innings that started with `initial_limit` overs
/// and was cut by `interruptions`. Never increases as interruptions are applied.
pub fn innings_total_resources<D: Delivery>(
    context: &MatchResourceContext,
    initial_limit: u32,
    log: &[D],
    interruptions: &[InterruptionEvent],
) -> f64 {
    let start = context
        .table
        .resource(f64::from(context.clamp_limit(initial_limit)), 0);
    let total = interruption_losses(context, initial_limit, log, interruptions)
        .iter()
        .fold(start, |total, step| total - step.loss);
    total.clamp(0.0, MAX_RESOURCE)
}

/// Resources used by the side batting first (R1).
pub fn team1_total_resources<D: Delivery>(
    context: &MatchResourceContext,
    max_overs_initial: u32,
    delivery_log: &[D],
    interruptions: &[InterruptionEvent],
) -> f64 {
    innings_total_resources(context, max_overs_initial, delivery_log, interruptions)
}

/// Resources available to the chasing side over its whole innings (R2), with any
/// interruptions to its own innings applied.
pub fn team2_total_resources<D: Delivery>(
    context: &MatchResourceContext,
    max_overs_initial: u32,
    delivery_log: &[D],
    interruptions: &[InterruptionEvent],
) -> f64 {
    innings_total_resources(context, max_overs_initial, delivery_log, interruptions)
}

/// Resources the chasing side still holds with `balls_bowled_so_far` legal balls
/// bowled and `wickets_lost_so_far` down under a `max_overs_current` limit.
/// Wickets above 9 read the w9 column, as in the first-innings ledger walk.
pub fn team2_resources(
    context: &MatchResourceContext,
    max_overs_current: u32,
    balls_bowled_so_far: u32,
    wickets_lost_so_far: u32,
) -> f64 {
    let state = InningsState {
        balls_bowled: balls_bowled_so_far,
        wickets_lost: wickets_lost_so_far,
    };
    let overs_remaining = state.overs_remaining(context.clamp_limit(max_overs_current));
    context.table.resource(overs_remaining, wickets_lost_so_far)
}

/// Resources the chasing side has consumed so far under an uninterrupted
/// `max_overs_current` limit.
pub fn team2_resources_used(
    context: &MatchResourceContext,
    max_overs_current: u32,
    balls_bowled_so_far: u32,
    wickets_lost_so_far: u32,
) -> f64 {
    let available = context
        .table
        .resource(f64::from(context.clamp_limit(max_overs_current)), 0);
    let remaining = team2_resources(
        context,
        max_overs_current,
        balls_bowled_so_far,
        wickets_lost_so_far,
    );
    (available - remaining).max(0.0)
}
