//! Parse resource-table assets into [`ResourceTable`].
//!
//! Two shapes are accepted and both normalize to the same table:
//! - overs grid CSV: header `overs_remaining,w0,...,w9`, one row per integer overs
//!   remaining from the format maximum down to 0;
//! - balls grid JSON: `{ "format_overs": n, "resources": { "0": [...], ..., "9": [...] } }`
//!   with `n*6+1` values per wickets key, indexed by balls remaining.
//!
//! Malformed assets are rejected with every diagnostic collected, never repaired.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::table::{
    Granularity, ResourceRow, ResourceTable, BALLS_PER_OVER, MAX_WICKETS_INDEX, WICKET_COLUMNS,
};
use crate::data::validate::{check_format_overs, validate_grid, ValidationReport};
use crate::data::TableError;

const OVERS_COLUMN: &str = "overs_remaining";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetShape {
    OversGrid,
    BallsGrid,
}

impl AssetShape {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => Some(Self::OversGrid),
            Some("json") => Some(Self::BallsGrid),
            _ => None,
        }
    }
}

/// Ball-granularity asset document, as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallsGridAsset {
    pub format_overs: u32,
    pub resources: BTreeMap<String, Vec<f64>>,
}

impl BallsGridAsset {
    /// Sample a table at every ball remaining. Values are rounded to `decimals` places.
    pub fn from_table(table: &ResourceTable, decimals: i32) -> Self {
        let scale = 10f64.powi(decimals);
        let balls = table.format_overs() * BALLS_PER_OVER;
        let resources = (0..=MAX_WICKETS_INDEX)
            .map(|wickets| {
                let column = (0..=balls)
                    .map(|ball| (table.resource_at_balls(ball, wickets) * scale).round() / scale)
                    .collect();
                (wickets.to_string(), column)
            })
            .collect();
        BallsGridAsset {
            format_overs: table.format_overs(),
            resources,
        }
    }
}

fn parse_cell(
    report: &mut ValidationReport,
    context: impl FnOnce() -> String,
    raw: &str,
) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            report.error(context(), format!("'{raw}' is not a number"));
            None
        }
    }
}

/// Parse an overs-granularity CSV grid. With `format_overs` of `None` the format is
/// taken from the largest overs-remaining row.
pub fn parse_overs_grid<R: Read>(
    reader: R,
    asset: &str,
    format_overs: Option<u32>,
) -> Result<(ResourceTable, ValidationReport), TableError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let csv_error = |source| TableError::Csv {
        asset: asset.to_string(),
        source,
    };

    let mut report = ValidationReport::default();
    let headers = csv_reader.headers().map_err(csv_error)?.clone();
    let expected_header: Vec<String> = std::iter::once(OVERS_COLUMN.to_string())
        .chain((0..WICKET_COLUMNS).map(|w| format!("w{w}")))
        .collect();
    if headers.len() != expected_header.len()
        || headers
            .iter()
            .zip(&expected_header)
            .any(|(found, expected)| !found.eq_ignore_ascii_case(expected))
    {
        report.error(
            "header",
            format!(
                "expected '{}', found '{}'",
                expected_header.join(","),
                headers.iter().collect::<Vec<_>>().join(",")
            ),
        );
        return Err(TableError::Invalid {
            asset: asset.to_string(),
            report,
        });
    }

    let mut parsed: BTreeMap<u32, ResourceRow> = BTreeMap::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let context = format!("row[{}]", line + 1);
        if record.len() != expected_header.len() {
            report.error(
                context,
                format!(
                    "expected {} columns, found {}",
                    expected_header.len(),
                    record.len()
                ),
            );
            continue;
        }
        let overs = match record[0].parse::<u32>() {
            Ok(overs) => overs,
            Err(_) => {
                report.error(
                    context,
                    format!("'{}' is not a whole number of overs", &record[0]),
                );
                continue;
            }
        };
        let mut row = [0.0; WICKET_COLUMNS];
        let mut complete = true;
        for (wickets, slot) in row.iter_mut().enumerate() {
            match parse_cell(&mut report, || format!("{context}.w{wickets}"), &record[wickets + 1]) {
                Some(value) => *slot = value,
                None => complete = false,
            }
        }
        if !complete {
            continue;
        }
        if parsed.insert(overs, row).is_some() {
            report.error(context, format!("duplicate row for {overs} overs remaining"));
        }
    }

    let Some(inferred) = parsed.keys().next_back().copied() else {
        report.error("rows", "no data rows");
        return Err(TableError::Invalid {
            asset: asset.to_string(),
            report,
        });
    };
    let format_overs = format_overs.unwrap_or(inferred);
    if !check_format_overs(&mut report, format_overs) {
        return Err(TableError::Invalid {
            asset: asset.to_string(),
            report,
        });
    }

    // Missing rows start out as zero; only the empty row may stay that way.
    let mut rows = vec![[0.0; WICKET_COLUMNS]; format_overs as usize + 1];
    for (overs, row) in &parsed {
        match rows.get_mut(*overs as usize) {
            Some(slot) => *slot = *row,
            None => report.error(
                format!("overs_remaining={overs}"),
                format!("beyond the {format_overs}-over format"),
            ),
        }
    }
    for overs in 1..=format_overs {
        if !parsed.contains_key(&overs) {
            report.error(
                format!("overs_remaining={overs}"),
                "missing row",
            );
        }
    }

    if report.has_errors() {
        return Err(TableError::Invalid {
            asset: asset.to_string(),
            report,
        });
    }
    finish(asset, format_overs, Granularity::Overs, rows, report)
}

/// Parse a ball-granularity JSON grid.
pub fn parse_balls_grid(
    raw: &str,
    asset: &str,
) -> Result<(ResourceTable, ValidationReport), TableError> {
    let document: BallsGridAsset = serde_json::from_str(raw).map_err(|source| TableError::Json {
        asset: asset.to_string(),
        source,
    })?;

    let mut report = ValidationReport::default();
    let format_overs = document.format_overs;
    if !check_format_overs(&mut report, format_overs) {
        return Err(TableError::Invalid {
            asset: asset.to_string(),
            report,
        });
    }
    let expected_len = Granularity::Balls.row_count(format_overs);
    let mut columns: [Option<&Vec<f64>>; WICKET_COLUMNS] = [None; WICKET_COLUMNS];

    for (key, values) in &document.resources {
        let context = format!("resources[\"{key}\"]");
        let wickets = match key.trim().parse::<u32>() {
            Ok(wickets) if wickets <= MAX_WICKETS_INDEX => wickets as usize,
            _ => {
                report.error(context, "wickets key outside 0-9");
                continue;
            }
        };
        if values.len() != expected_len {
            report.error(
                context,
                format!(
                    "expected {expected_len} values for {format_overs} overs, found {}",
                    values.len()
                ),
            );
            continue;
        }
        columns[wickets] = Some(values);
    }
    for (wickets, column) in columns.iter().enumerate() {
        if column.is_none() && !document.resources.contains_key(&wickets.to_string()) {
            report.error(format!("resources[\"{wickets}\"]"), "missing wickets key");
        }
    }
    if report.has_errors() {
        return Err(TableError::Invalid {
            asset: asset.to_string(),
            report,
        });
    }

    let rows = (0..expected_len)
        .map(|ball| {
            let mut row = [0.0; WICKET_COLUMNS];
            for (wickets, slot) in row.iter_mut().enumerate() {
                *slot = columns[wickets].map_or(0.0, |column| column[ball]);
            }
            row
        })
        .collect();
    finish(asset, format_overs, Granularity::Balls, rows, report)
}

fn finish(
    asset: &str,
    format_overs: u32,
    granularity: Granularity,
    rows: Vec<ResourceRow>,
    mut report: ValidationReport,
) -> Result<(ResourceTable, ValidationReport), TableError> {
    report.merge(validate_grid(format_overs, granularity, &rows));
    if report.has_errors() {
        return Err(TableError::Invalid {
            asset: asset.to_string(),
            report,
        });
    }
    Ok((
        ResourceTable::from_validated(format_overs, granularity, rows),
        report,
    ))
}

/// Load and validate the asset at `path` for the `expected_format`-over format,
/// returning the table with any warnings.
pub fn inspect_table_asset(
    path: &Path,
    expected_format: u32,
) -> Result<(ResourceTable, ValidationReport), TableError> {
    let asset = path.display().to_string();
    let shape =
        AssetShape::from_path(path).ok_or_else(|| TableError::UnsupportedShape(asset.clone()))?;
    let raw = fs::read_to_string(path).map_err(|source| TableError::Read {
        path: asset.clone(),
        source,
    })?;

    let (table, report) = match shape {
        AssetShape::OversGrid => parse_overs_grid(raw.as_bytes(), &asset, Some(expected_format))?,
        AssetShape::BallsGrid => parse_balls_grid(&raw, &asset)?,
    };
    if table.format_overs() != expected_format {
        return Err(TableError::FormatMismatch {
            asset,
            found: table.format_overs(),
            expected: expected_format,
        });
    }
    Ok((table, report))
}

pub fn load_table_asset(path: &Path, expected_format: u32) -> Result<ResourceTable, TableError> {
    inspect_table_asset(path, expected_format).map(|(table, _)| table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "overs_remaining,w0,w1,w2,w3,w4,w5,w6,w7,w8,w9\n";

    fn csv_row(overs: u32, value: f64) -> String {
        let cells: Vec<String> = (0..WICKET_COLUMNS).map(|_| format!("{value:.1}")).collect();
        format!("{overs},{}\n", cells.join(","))
    }

    fn errors_of(err: TableError) -> ValidationReport {
        match err {
            TableError::Invalid { report, .. } => report,
            other => panic!("expected validation failure, got {other}"),
        }
    }

    #[test]
    fn overs_grid_parses_in_descending_order() {
        let raw = format!("{HEADER}{}{}{}", csv_row(2, 100.0), csv_row(1, 60.0), csv_row(0, 0.0));
        let (table, report) = parse_overs_grid(raw.as_bytes(), "inline", None).expect("parse");
        assert!(report.diagnostics.is_empty());
        assert_eq!(table.format_overs(), 2);
        assert_eq!(table.granularity(), Granularity::Overs);
        assert_eq!(table.resource(1.0, 4), 60.0);
    }

    #[test]
    fn overs_grid_without_empty_row_defaults_it_to_zero() {
        let raw = format!("{HEADER}{}{}", csv_row(2, 100.0), csv_row(1, 60.0));
        let (table, _) = parse_overs_grid(raw.as_bytes(), "inline", Some(2)).expect("parse");
        assert_eq!(table.rows()[0], [0.0; WICKET_COLUMNS]);
    }

    #[test]
    fn overs_grid_missing_interior_row_is_rejected() {
        let raw = format!("{HEADER}{}{}", csv_row(3, 100.0), csv_row(1, 40.0));
        let report = errors_of(parse_overs_grid(raw.as_bytes(), "inline", Some(3)).unwrap_err());
        assert!(report
            .diagnostics
            .iter()
            .any(|diag| diag.context == "overs_remaining=2" && diag.message == "missing row"));
    }

    #[test]
    fn overs_grid_ragged_row_is_rejected() {
        let raw = format!("{HEADER}{}1,50,50\n0,0,0,0,0,0,0,0,0,0,0\n", csv_row(2, 100.0));
        let report = errors_of(parse_overs_grid(raw.as_bytes(), "inline", Some(2)).unwrap_err());
        assert!(report
            .diagnostics
            .iter()
            .any(|diag| diag.message.contains("expected 11 columns, found 3")));
    }

    #[test]
    fn overs_grid_bad_header_is_rejected() {
        let raw = format!("overs,a,b\n{}", csv_row(1, 100.0));
        let report = errors_of(parse_overs_grid(raw.as_bytes(), "inline", None).unwrap_err());
        assert_eq!(report.first_error().map(|d| d.context.as_str()), Some("header"));
    }

    fn balls_json(format_overs: u32, keys: &[&str], len: usize) -> String {
        let columns: Vec<String> = keys
            .iter()
            .map(|key| {
                let values: Vec<String> = (0..len)
                    .map(|ball| format!("{:.2}", ball as f64 * 100.0 / (len - 1) as f64))
                    .collect();
                format!("\"{key}\": [{}]", values.join(","))
            })
            .collect();
        format!(
            "{{\"format_overs\": {format_overs}, \"resources\": {{{}}}}}",
            columns.join(",")
        )
    }

    const ALL_KEYS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

    #[test]
    fn balls_grid_parses_every_wickets_key() {
        let raw = balls_json(1, &ALL_KEYS, 7);
        let (table, _) = parse_balls_grid(&raw, "inline").expect("parse");
        assert_eq!(table.granularity(), Granularity::Balls);
        assert_eq!(table.format_overs(), 1);
        assert_eq!(table.resource_at_balls(3, 7), 50.0);
    }

    #[test]
    fn balls_grid_wrong_length_is_rejected() {
        let raw = balls_json(1, &ALL_KEYS, 6);
        let report = errors_of(parse_balls_grid(&raw, "inline").unwrap_err());
        assert_eq!(report.error_count(), WICKET_COLUMNS);
    }

    #[test]
    fn balls_grid_wickets_key_outside_range_is_rejected() {
        let mut keys = ALL_KEYS.to_vec();
        keys.push("10");
        let raw = balls_json(1, &keys, 7);
        let report = errors_of(parse_balls_grid(&raw, "inline").unwrap_err());
        assert!(report
            .diagnostics
            .iter()
            .any(|diag| diag.context == "resources[\"10\"]"));
    }

    #[test]
    fn balls_grid_missing_key_is_rejected() {
        let raw = balls_json(1, &ALL_KEYS[..9], 7);
        let report = errors_of(parse_balls_grid(&raw, "inline").unwrap_err());
        assert_eq!(
            report.first_error().map(|d| d.message.as_str()),
            Some("missing wickets key")
        );
    }

    #[test]
    fn balls_grid_oversized_format_is_rejected_before_sizing() {
        for format_overs in [800_000_000u32, 715_827_883, u32::MAX] {
            let raw = format!("{{\"format_overs\": {format_overs}, \"resources\": {{}}}}");
            let report = errors_of(parse_balls_grid(&raw, "inline").unwrap_err());
            assert_eq!(report.error_count(), 1);
            assert_eq!(report.first_error().map(|d| d.context.as_str()), Some("format_overs"));
        }

        let raw = balls_json(715_827_883, &ALL_KEYS, 3);
        let report = errors_of(parse_balls_grid(&raw, "inline").unwrap_err());
        assert_eq!(report.first_error().map(|d| d.context.as_str()), Some("format_overs"));
    }

    #[test]
    fn overs_grid_huge_inferred_format_is_rejected() {
        let raw = format!("{HEADER}{}{}", csv_row(u32::MAX, 100.0), csv_row(0, 0.0));
        let report = errors_of(parse_overs_grid(raw.as_bytes(), "inline", None).unwrap_err());
        assert_eq!(report.error_count(), 1);
        assert!(report
            .first_error()
            .is_some_and(|d| d.context == "format_overs" && d.message.contains("4294967295")));

        let raw = format!("{HEADER}{}", csv_row(0, 0.0));
        let report = errors_of(parse_overs_grid(raw.as_bytes(), "inline", None).unwrap_err());
        assert_eq!(
            report.first_error().map(|d| d.message.as_str()),
            Some("format must have at least one over")
        );
    }

    #[test]
    fn asset_shape_follows_extension() {
        assert_eq!(
            AssetShape::from_path(Path::new("a/odi.CSV")),
            Some(AssetShape::OversGrid)
        );
        assert_eq!(
            AssetShape::from_path(Path::new("t20.json")),
            Some(AssetShape::BallsGrid)
        );
        assert_eq!(AssetShape::from_path(Path::new("t20.yaml")), None);
    }

    #[test]
    fn converted_balls_grid_round_trips_through_the_loader() {
        let raw = format!("{HEADER}{}{}{}", csv_row(2, 100.0), csv_row(1, 60.0), csv_row(0, 0.0));
        let (table, _) = parse_overs_grid(raw.as_bytes(), "inline", None).expect("parse");
        let document = BallsGridAsset::from_table(&table, 4);
        let json = serde_json::to_string(&document).expect("serialize");
        let (balls, _) = parse_balls_grid(&json, "converted").expect("reparse");

        assert_eq!(balls.resource_at_balls(9, 0), 80.0);
        for overs in 0..=2 {
            assert_eq!(balls.resource(f64::from(overs), 3), table.resource(f64::from(overs), 3));
        }
    }
}
