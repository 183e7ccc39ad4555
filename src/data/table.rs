//! Resource table: percentage of run-scoring resources a side still holds for a
//! given overs (or balls) remaining and wickets lost.
//!
//! Both asset shapes load into this one type. Overs-granularity tables interpolate
//! linearly between integer overs; balls-granularity tables are indexed exactly.

use serde::Serialize;

use crate::data::validate::validate_grid;
use crate::data::TableError;

pub const WICKET_COLUMNS: usize = 10;
pub const MAX_WICKETS_INDEX: u32 = 9;
pub const BALLS_PER_OVER: u32 = 6;
pub const MAX_RESOURCE: f64 = 100.0;
/// Longest innings an asset may describe.
pub const MAX_FORMAT_OVERS: u32 = 100;

/// Resource percentages for wickets lost 0..=9.
pub type ResourceRow = [f64; WICKET_COLUMNS];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One row per integer overs remaining; fractional overs interpolate.
    Overs,
    /// One row per ball remaining; no interpolation.
    Balls,
}

impl Granularity {
    pub fn row_count(self, format_overs: u32) -> usize {
        match self {
            Self::Overs => (format_overs as usize).saturating_add(1),
            Self::Balls => (format_overs as usize)
                .saturating_mul(BALLS_PER_OVER as usize)
                .saturating_add(1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overs => "overs",
            Self::Balls => "balls",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceTable {
    format_overs: u32,
    granularity: Granularity,
    /// `rows[i]` holds resources with `i` overs (or balls) remaining.
    rows: Vec<ResourceRow>,
}

/// Values at one integer overs-remaining point, for display and export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegralRow {
    pub overs_remaining: u32,
    pub resources: ResourceRow,
}

impl ResourceTable {
    /// Build a table from rows indexed by overs/balls remaining, rejecting any grid
    /// that fails validation.
    pub fn new(
        format_overs: u32,
        granularity: Granularity,
        rows: Vec<ResourceRow>,
    ) -> Result<Self, TableError> {
        let report = validate_grid(format_overs, granularity, &rows);
        if report.has_errors() {
            return Err(TableError::Invalid {
                asset: "<in-memory>".to_string(),
                report,
            });
        }
        Ok(Self::from_validated(format_overs, granularity, rows))
    }

    pub(crate) fn from_validated(
        format_overs: u32,
        granularity: Granularity,
        rows: Vec<ResourceRow>,
    ) -> Self {
        ResourceTable {
            format_overs,
            granularity,
            rows,
        }
    }

    pub fn format_overs(&self) -> u32 {
        self.format_overs
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn rows(&self) -> &[ResourceRow] {
        &self.rows
    }

    /// Resource percentage with `overs_remaining` overs left (decimal overs, so 14.5
    /// is fourteen overs and three balls) and `wickets_lost` down.
    ///
    /// Wickets clamp to 0..=9 and overs to `[0, format_overs]`; the result is always
    /// within `[0, 100]`.
    pub fn resource(&self, overs_remaining: f64, wickets_lost: u32) -> f64 {
        // NaN falls through here as well
        if !(overs_remaining > 0.0) {
            return 0.0;
        }
        let column = wickets_lost.min(MAX_WICKETS_INDEX) as usize;
        let overs = overs_remaining.min(f64::from(self.format_overs));

        let value = match self.granularity {
            Granularity::Overs => {
                let floor = overs.floor();
                let lower = floor as usize;
                let fraction = overs - floor;
                if fraction == 0.0 {
                    self.rows[lower][column]
                } else {
                    (1.0 - fraction) * self.rows[lower][column]
                        + fraction * self.rows[lower + 1][column]
                }
            }
            Granularity::Balls => {
                let balls = (overs * f64::from(BALLS_PER_OVER)).round() as usize;
                self.rows[balls.min(self.rows.len() - 1)][column]
            }
        };
        value.clamp(0.0, MAX_RESOURCE)
    }

    /// Resource with `balls_remaining` balls left, without going through decimal overs.
    pub fn resource_at_balls(&self, balls_remaining: u32, wickets_lost: u32) -> f64 {
        match self.granularity {
            Granularity::Balls => {
                let column = wickets_lost.min(MAX_WICKETS_INDEX) as usize;
                let index = (balls_remaining as usize).min(self.rows.len() - 1);
                self.rows[index][column].clamp(0.0, MAX_RESOURCE)
            }
            Granularity::Overs => self.resource(
                f64::from(balls_remaining) / f64::from(BALLS_PER_OVER),
                wickets_lost,
            ),
        }
    }

    /// Values at each integer overs-remaining point, from 0 up to the format maximum.
    pub fn integral_rows(&self) -> Vec<IntegralRow> {
        let stride = match self.granularity {
            Granularity::Overs => 1,
            Granularity::Balls => BALLS_PER_OVER as usize,
        };
        (0..=self.format_overs)
            .map(|overs| IntegralRow {
                overs_remaining: overs,
                resources: self.rows[overs as usize * stride],
            })
            .collect()
    }
}
