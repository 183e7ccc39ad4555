//! Innings state reconstructed from the delivery log, and the interruption ledger.

use serde::{Deserialize, Serialize};

use crate::data::table::BALLS_PER_OVER;

pub const ALL_OUT_WICKETS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraType {
    Wide,
    NoBall,
    Bye,
    LegBye,
    Penalty,
}

impl ExtraType {
    /// Wides and no-balls are re-bowled and never count as balls bowled.
    pub fn voids_delivery(self) -> bool {
        matches!(self, Self::Wide | Self::NoBall)
    }
}

/// A scored delivery as seen by the resource accountants.
pub trait Delivery {
    fn is_wicket(&self) -> bool;

    fn extra_type(&self) -> Option<ExtraType>;

    /// Runs credited to the batting side off this delivery, extras included.
    fn runs(&self) -> u32 {
        0
    }

    fn is_legal(&self) -> bool {
        !self.extra_type().is_some_and(ExtraType::voids_delivery)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    #[serde(default)]
    pub is_wicket: bool,
    #[serde(default, alias = "extras_type")]
    pub extra_type: Option<ExtraType>,
    #[serde(default)]
    pub runs: u32,
}

impl DeliveryRecord {
    pub fn legal(runs: u32) -> Self {
        DeliveryRecord {
            runs,
            ..Self::default()
        }
    }

    pub fn wicket() -> Self {
        DeliveryRecord {
            is_wicket: true,
            ..Self::default()
        }
    }

    pub fn extra(extra_type: ExtraType, runs: u32) -> Self {
        DeliveryRecord {
            is_wicket: false,
            extra_type: Some(extra_type),
            runs,
        }
    }
}

impl Delivery for DeliveryRecord {
    fn is_wicket(&self) -> bool {
        self.is_wicket
    }

    fn extra_type(&self) -> Option<ExtraType> {
        self.extra_type
    }

    fn runs(&self) -> u32 {
        self.runs
    }
}

/// Balls bowled and wickets lost at some point of an innings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsState {
    pub balls_bowled: u32,
    pub wickets_lost: u32,
}

impl InningsState {
    /// State after every delivery in `log`. A wicket counts even off a wide or no-ball.
    pub fn from_log<D: Delivery>(log: &[D]) -> Self {
        let (balls_bowled, wickets_lost) =
            log.iter().fold((0u32, 0u32), |(balls, wickets), delivery| {
                (
                    balls + u32::from(delivery.is_legal()),
                    wickets + u32::from(delivery.is_wicket()),
                )
            });
        InningsState {
            balls_bowled,
            wickets_lost: wickets_lost.min(ALL_OUT_WICKETS),
        }
    }

    /// State after the first `end` deliveries; an index past the log uses all of it.
    pub fn from_prefix<D: Delivery>(log: &[D], end: usize) -> Self {
        Self::from_log(&log[..end.min(log.len())])
    }

    pub fn overs_bowled(&self) -> f64 {
        f64::from(self.balls_bowled) / f64::from(BALLS_PER_OVER)
    }

    /// Decimal overs left under `overs_limit`, never negative.
    pub fn overs_remaining(&self, overs_limit: u32) -> f64 {
        (f64::from(overs_limit) - self.overs_bowled()).max(0.0)
    }

    /// Cricket overs notation, e.g. `14.3` for fourteen overs and three balls.
    pub fn overs_notation(&self) -> String {
        format!(
            "{}.{}",
            self.balls_bowled / BALLS_PER_OVER,
            self.balls_bowled % BALLS_PER_OVER
        )
    }
}

/// An official reduction of an innings' overs limit, effective after the first
/// `at_delivery_index` deliveries of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptionEvent {
    pub at_delivery_index: usize,
    pub new_overs_limit: u32,
}

/// Overs limit in force after applying every event in `interruptions`.
pub fn current_overs_limit(initial_limit: u32, interruptions: &[InterruptionEvent]) -> u32 {
    interruptions
        .iter()
        .enumerate()
        .max_by_key(|(position, event)| (event.at_delivery_index, *position))
        .map_or(initial_limit, |(_, event)| event.new_overs_limit)
}
